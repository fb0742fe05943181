// Live-update channel - Push notifications driving table refreshes
use crate::application::dashboard_view::DashboardView;
use crate::application::refresh_service::RefreshTrigger;
use crate::domain::connection::ConnectionState;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The only payload the server sends: new measurements are available.
pub const NEW_DATA: &str = "new data";

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Opened,
    Closed,
    Error(String),
    Message(String),
}

#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Keep a connection to the notification endpoint alive, reconnecting as
    /// needed, and report its lifecycle on `events`. Only returns once the
    /// receiving side has gone away.
    async fn run(&self, events: mpsc::Sender<ChannelEvent>);
}

/// Connection state machine plus the reaction to each channel event.
pub struct ChannelSession {
    state: ConnectionState,
    view: Arc<dyn DashboardView>,
    trigger: RefreshTrigger,
}

impl ChannelSession {
    pub fn new(view: Arc<dyn DashboardView>, trigger: RefreshTrigger) -> Self {
        let state = ConnectionState::Connecting;
        view.show_connection(state);
        Self {
            state,
            view,
            trigger,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn handle(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened => {
                tracing::info!("Websocket to webperf3 server open");
                self.set_state(ConnectionState::Online);
            }
            ChannelEvent::Closed => {
                tracing::info!("Websocket to webperf3 server closed");
                self.set_state(ConnectionState::Offline);
            }
            // An error does not necessarily end the session; a close follows if it did.
            ChannelEvent::Error(detail) => {
                tracing::error!(error = %detail, "Websocket error");
            }
            ChannelEvent::Message(payload) if payload == NEW_DATA => {
                self.trigger.fire();
            }
            ChannelEvent::Message(payload) => {
                tracing::error!(message = %payload, "Websocket received unknown message");
            }
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
        self.view.show_connection(state);
    }
}

/// Owned handle on the running channel: the transport task and the task
/// feeding its events through a `ChannelSession`.
pub struct LiveUpdateChannel {
    transport_task: JoinHandle<()>,
    session_task: JoinHandle<()>,
}

impl LiveUpdateChannel {
    pub fn open(
        transport: Arc<dyn NotificationTransport>,
        view: Arc<dyn DashboardView>,
        trigger: RefreshTrigger,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel(64);
        let mut session = ChannelSession::new(view, trigger);

        let transport_task = tokio::spawn(async move {
            transport.run(tx).await;
        });

        let session_task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                session.handle(event);
            }
        });

        Self {
            transport_task,
            session_task,
        }
    }

    /// Stop the transport and wait for already-received events to be handled.
    pub async fn close(self) {
        self.transport_task.abort();
        let _ = self.transport_task.await;
        let _ = self.session_task.await;
        tracing::info!("Live-update channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::refresh_service::{spawn_refresh_worker, RefreshMode, RefreshService};
    use crate::application::test_support::{
        MemorySnapshotStore, RecordingView, Reply, ScriptedSource, Shown,
    };
    use crate::domain::measurement::{ChangeDetection, MeasurementRow};

    struct Harness {
        source: Arc<ScriptedSource>,
        view: Arc<RecordingView>,
        worker: JoinHandle<()>,
        trigger: RefreshTrigger,
    }

    fn harness(replies: Vec<Reply>) -> Harness {
        let source = Arc::new(ScriptedSource::new(replies));
        let view = Arc::new(RecordingView::default());
        let service = RefreshService::new(
            source.clone(),
            Arc::new(MemorySnapshotStore::default()),
            view.clone(),
            RefreshMode::Json,
            ChangeDetection::Readings,
        );
        let (trigger, worker) = spawn_refresh_worker(service);
        Harness {
            source,
            view,
            worker,
            trigger,
        }
    }

    fn client_a() -> Vec<MeasurementRow> {
        vec![MeasurementRow::new(
            Some(1_700_000_000.0),
            Some(5_000_000.0),
            Some(4_000_000.0),
            "client-A",
        )]
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let h = harness(vec![]);
        let mut session = ChannelSession::new(h.view.clone(), h.trigger.clone());
        assert_eq!(session.state(), ConnectionState::Connecting);

        session.handle(ChannelEvent::Opened);
        assert_eq!(session.state(), ConnectionState::Online);

        session.handle(ChannelEvent::Error("reset".to_string()));
        assert_eq!(session.state(), ConnectionState::Online);

        session.handle(ChannelEvent::Closed);
        assert_eq!(session.state(), ConnectionState::Offline);

        session.handle(ChannelEvent::Opened);
        assert_eq!(session.state(), ConnectionState::Online);

        assert_eq!(
            h.view.shown(),
            vec![
                Shown::Connection(ConnectionState::Connecting),
                Shown::Connection(ConnectionState::Online),
                Shown::Connection(ConnectionState::Offline),
                Shown::Connection(ConnectionState::Online),
            ]
        );
    }

    #[tokio::test]
    async fn test_new_data_triggers_refresh() {
        let h = harness(vec![Reply::Dataset(client_a())]);
        let mut session = ChannelSession::new(h.view.clone(), h.trigger);

        session.handle(ChannelEvent::Opened);
        session.handle(ChannelEvent::Message(NEW_DATA.to_string()));
        drop(session);
        h.worker.await.unwrap();

        assert_eq!(h.source.fetches(), 1);
        assert!(h
            .view
            .shown()
            .contains(&Shown::Dataset(client_a(), vec![true])));
    }

    #[tokio::test]
    async fn test_unknown_message_is_ignored() {
        let h = harness(vec![Reply::Dataset(client_a())]);
        let mut session = ChannelSession::new(h.view.clone(), h.trigger);

        session.handle(ChannelEvent::Opened);
        session.handle(ChannelEvent::Message("foo".to_string()));
        drop(session);
        h.worker.await.unwrap();

        assert_eq!(h.source.fetches(), 0);
        assert_eq!(
            h.view.shown(),
            vec![
                Shown::Connection(ConnectionState::Connecting),
                Shown::Connection(ConnectionState::Online),
            ]
        );
    }

    #[tokio::test]
    async fn test_close_only_touches_indicator() {
        let h = harness(vec![Reply::Dataset(client_a())]);
        let mut session = ChannelSession::new(h.view.clone(), h.trigger);

        session.handle(ChannelEvent::Opened);
        session.handle(ChannelEvent::Closed);
        drop(session);
        h.worker.await.unwrap();

        assert_eq!(h.source.fetches(), 0);
        assert_eq!(
            h.view.shown().last(),
            Some(&Shown::Connection(ConnectionState::Offline))
        );
        assert!(!h
            .view
            .shown()
            .iter()
            .any(|shown| matches!(shown, Shown::Dataset(..) | Shown::Markup(_))));
    }

    struct ScriptedTransport {
        events: Vec<ChannelEvent>,
    }

    #[async_trait]
    impl NotificationTransport for ScriptedTransport {
        async fn run(&self, events: mpsc::Sender<ChannelEvent>) {
            for event in self.events.clone() {
                if events.send(event).await.is_err() {
                    return;
                }
            }
            std::future::pending::<()>().await;
        }
    }

    #[tokio::test]
    async fn test_open_and_close_channel() {
        let h = harness(vec![Reply::Dataset(client_a())]);
        let transport = Arc::new(ScriptedTransport {
            events: vec![
                ChannelEvent::Opened,
                ChannelEvent::Message(NEW_DATA.to_string()),
                ChannelEvent::Closed,
            ],
        });

        let channel = LiveUpdateChannel::open(transport, h.view.clone(), h.trigger);
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while !h
                .view
                .shown()
                .contains(&Shown::Connection(ConnectionState::Offline))
            {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        channel.close().await;
        h.worker.await.unwrap();

        let shown = h.view.shown();
        assert_eq!(shown[0], Shown::Connection(ConnectionState::Connecting));
        assert!(shown.contains(&Shown::Connection(ConnectionState::Online)));
        assert!(shown.contains(&Shown::Dataset(client_a(), vec![true])));
        assert_eq!(h.source.fetches(), 1);
    }
}
