// In-memory fakes shared by the application tests
use crate::application::dashboard_view::DashboardView;
use crate::application::dataset_source::{DatasetSource, FetchError};
use crate::application::snapshot_store::SnapshotStore;
use crate::domain::connection::ConnectionState;
use crate::domain::measurement::Dataset;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

#[derive(Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<Dataset>>,
    saves: AtomicUsize,
}

impl MemorySnapshotStore {
    pub fn with(dataset: Dataset) -> Self {
        Self {
            slot: Mutex::new(Some(dataset)),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn stored(&self) -> Option<Dataset> {
        self.slot.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Dataset {
        self.stored().unwrap_or_default()
    }

    async fn save(&self, dataset: &Dataset) {
        *self.slot.lock().unwrap() = Some(dataset.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
    }
}

pub enum Reply {
    Dataset(Dataset),
    Markup(String),
    Status(u16),
}

/// Answers fetches from a script; fetches past its end fail with status 503.
/// When gated, every fetch waits for a permit before answering.
#[derive(Default)]
pub struct ScriptedSource {
    replies: Mutex<VecDeque<Reply>>,
    fetches: AtomicUsize,
    gate: Option<Semaphore>,
}

impl ScriptedSource {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    pub fn gated(replies: Vec<Reply>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(replies)
        }
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Option<Reply> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.replies.lock().unwrap().pop_front()
    }

    fn status(code: u16) -> FetchError {
        FetchError::Status {
            url: "http://test/table".to_string(),
            status: code,
        }
    }
}

#[async_trait]
impl DatasetSource for ScriptedSource {
    async fn fetch_dataset(&self) -> Result<Dataset, FetchError> {
        match self.next().await {
            Some(Reply::Dataset(dataset)) => Ok(dataset),
            Some(Reply::Status(code)) => Err(Self::status(code)),
            Some(Reply::Markup(_)) | None => Err(Self::status(503)),
        }
    }

    async fn fetch_markup(&self) -> Result<String, FetchError> {
        match self.next().await {
            Some(Reply::Markup(html)) => Ok(html),
            Some(Reply::Status(code)) => Err(Self::status(code)),
            Some(Reply::Dataset(_)) | None => Err(Self::status(503)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Dataset(Dataset, Vec<bool>),
    Markup(String),
    LastUpdate,
    Connection(ConnectionState),
}

#[derive(Default)]
pub struct RecordingView {
    shown: Mutex<Vec<Shown>>,
}

impl RecordingView {
    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }
}

impl DashboardView for RecordingView {
    fn show_dataset(&self, dataset: &Dataset, changed: &[bool]) {
        self.shown
            .lock()
            .unwrap()
            .push(Shown::Dataset(dataset.clone(), changed.to_vec()));
    }

    fn show_markup(&self, html: &str) {
        self.shown.lock().unwrap().push(Shown::Markup(html.to_string()));
    }

    fn show_last_update(&self, _at: DateTime<Local>) {
        self.shown.lock().unwrap().push(Shown::LastUpdate);
    }

    fn show_connection(&self, state: ConnectionState) {
        self.shown.lock().unwrap().push(Shown::Connection(state));
    }
}
