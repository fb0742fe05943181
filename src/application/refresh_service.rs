// Refresh service - Fetch, reconcile against the snapshot, render, persist
use crate::application::dashboard_view::DashboardView;
use crate::application::dataset_source::{DatasetSource, FetchError};
use crate::application::snapshot_store::SnapshotStore;
use crate::domain::measurement::{changed_rows, ChangeDetection};
use chrono::Local;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

/// How the table endpoint is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Fetch the dataset as JSON, diff it against the snapshot and render locally.
    #[default]
    Json,
    /// Fetch server-rendered rows and show them as-is; no diffing, no snapshot.
    Markup,
}

#[derive(Clone)]
pub struct RefreshService {
    source: Arc<dyn DatasetSource>,
    store: Arc<dyn SnapshotStore>,
    view: Arc<dyn DashboardView>,
    mode: RefreshMode,
    detection: ChangeDetection,
}

impl RefreshService {
    pub fn new(
        source: Arc<dyn DatasetSource>,
        store: Arc<dyn SnapshotStore>,
        view: Arc<dyn DashboardView>,
        mode: RefreshMode,
        detection: ChangeDetection,
    ) -> Self {
        Self {
            source,
            store,
            view,
            mode,
            detection,
        }
    }

    /// Run one refresh cycle. Failures are logged and leave both the view and
    /// the snapshot untouched.
    pub async fn refresh(&self) {
        let result = match self.mode {
            RefreshMode::Json => self.refresh_dataset().await,
            RefreshMode::Markup => self.refresh_markup().await,
        };

        if let Err(e) = result {
            tracing::error!(error = %e, "Problem refreshing the performance table");
        }
    }

    async fn refresh_dataset(&self) -> Result<(), FetchError> {
        let dataset = self.source.fetch_dataset().await?;
        let prior = self.store.load().await;
        let changed = changed_rows(&prior, &dataset, self.detection);

        self.view.show_dataset(&dataset, &changed);
        self.store.save(&dataset).await;
        self.view.show_last_update(Local::now());

        tracing::info!(
            rows = dataset.len(),
            changed = changed.iter().filter(|c| **c).count(),
            "Refreshed performance table"
        );
        Ok(())
    }

    async fn refresh_markup(&self) -> Result<(), FetchError> {
        let html = self.source.fetch_markup().await?;

        self.view.show_markup(&html);
        self.view.show_last_update(Local::now());

        tracing::info!(bytes = html.len(), "Replaced performance table markup");
        Ok(())
    }
}

/// Fire-and-forget handle for requesting a refresh.
///
/// At most one refresh runs at a time. A trigger arriving while one is in
/// flight queues a single follow-up; triggers beyond that are dropped since
/// the queued refresh will fetch the latest data anyway.
#[derive(Clone)]
pub struct RefreshTrigger {
    tx: mpsc::Sender<()>,
}

impl RefreshTrigger {
    pub fn fire(&self) {
        match self.tx.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                tracing::debug!("Refresh already queued, trigger coalesced");
            }
            Err(TrySendError::Closed(())) => {
                tracing::warn!("Refresh worker has stopped, trigger dropped");
            }
        }
    }
}

/// Spawn the task that owns `service` and runs refreshes one after another.
/// The task ends once every trigger has been dropped.
pub fn spawn_refresh_worker(service: RefreshService) -> (RefreshTrigger, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(1);

    let handle = tokio::spawn(async move {
        while rx.recv().await.is_some() {
            service.refresh().await;
        }
        tracing::debug!("Refresh worker stopped");
    });

    (RefreshTrigger { tx }, handle)
}
