// Presentation layer - Rendering and the local viewer
pub mod app_state;
pub mod format;
pub mod handlers;
pub mod surface;
pub mod table;
