// Application layer - Refresh protocol and the seams it drives
pub mod dashboard_view;
pub mod dataset_source;
pub mod live_update;
pub mod refresh_service;
pub mod snapshot_store;

#[cfg(test)]
pub mod test_support;
