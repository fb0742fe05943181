// View trait for whatever displays the dashboard
use crate::domain::connection::ConnectionState;
use crate::domain::measurement::Dataset;
use chrono::{DateTime, Local};

pub trait DashboardView: Send + Sync {
    /// Replace the table with `dataset`, highlighting rows whose flag is set.
    fn show_dataset(&self, dataset: &Dataset, changed: &[bool]);

    /// Replace the table contents with markup rendered by the server.
    fn show_markup(&self, html: &str);

    /// Record when the table was last refreshed.
    fn show_last_update(&self, at: DateTime<Local>);

    fn show_connection(&self, state: ConnectionState);
}
