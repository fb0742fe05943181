// Application state for HTTP handlers
use crate::presentation::surface::DashboardSurface;

#[derive(Clone)]
pub struct AppState {
    pub surface: DashboardSurface,
}
