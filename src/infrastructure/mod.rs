// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod file_snapshot_store;
pub mod http_dataset_source;
pub mod websocket;
