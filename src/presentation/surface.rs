// Dashboard surface - The rendered table and indicators served to viewers
use crate::application::dashboard_view::DashboardView;
use crate::domain::connection::ConnectionState;
use crate::domain::measurement::Dataset;
use crate::presentation::format::{escape_html, format_time_of_day};
use crate::presentation::table::render_table;
use chrono::{DateTime, Local};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceState {
    /// Inner HTML of the `perf-table` element
    pub table_html: String,
    pub connection: ConnectionState,
    pub last_update: String,
}

#[derive(Clone, Default)]
pub struct DashboardSurface {
    state: Arc<RwLock<SurfaceState>>,
    auto_reload_secs: u64,
}

impl DashboardSurface {
    pub fn new(auto_reload_secs: u64) -> Self {
        Self {
            state: Arc::new(RwLock::new(SurfaceState {
                table_html: render_table(&[], &[]),
                ..Default::default()
            })),
            auto_reload_secs,
        }
    }

    pub fn snapshot(&self) -> SurfaceState {
        self.read().clone()
    }

    /// Full HTML page with the status indicator, last update time and table.
    pub fn render_page(&self) -> String {
        let state = self.snapshot();
        let reload = if self.auto_reload_secs > 0 {
            format!(
                "\n    <meta http-equiv=\"refresh\" content=\"{}\">",
                self.auto_reload_secs
            )
        } else {
            String::new()
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">{reload}
    <title>webperf3</title>
</head>
<body>
    <p>
        Server status: <span id="is_connected" style="background-color: {color}">{status}</span>
        Last update: <span id="last-update">{last_update}</span>
    </p>
    <table id="perf-table">
{table}
    </table>
</body>
</html>
"#,
            color = state.connection.color(),
            status = state.connection.label(),
            last_update = escape_html(&state.last_update),
            table = state.table_html,
        )
    }

    // A panic while holding the lock leaves plain strings behind, which are still fine to show.
    fn read(&self) -> RwLockReadGuard<'_, SurfaceState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SurfaceState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DashboardView for DashboardSurface {
    fn show_dataset(&self, dataset: &Dataset, changed: &[bool]) {
        let html = render_table(dataset, changed);
        self.write().table_html = html;
    }

    fn show_markup(&self, html: &str) {
        self.write().table_html = html.to_string();
    }

    fn show_last_update(&self, at: DateTime<Local>) {
        self.write().last_update = format_time_of_day(&at);
    }

    fn show_connection(&self, state: ConnectionState) {
        self.write().connection = state;
    }
}
