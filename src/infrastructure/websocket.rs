// Reconnecting websocket transport for server notifications
use crate::application::live_update::{ChannelEvent, NotificationTransport};
use crate::infrastructure::config::ReconnectSettings;
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Exponential reconnect delay, capped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    decay: f64,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, decay: f64) -> Self {
        Self {
            initial,
            max,
            decay: decay.max(1.0),
        }
    }

    pub fn from_settings(settings: &ReconnectSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.initial_delay_ms),
            Duration::from_millis(settings.max_delay_ms),
            settings.decay,
        )
    }

    /// Delay before the next attempt after `failures` consecutive failed ones.
    pub fn delay(&self, failures: u32) -> Duration {
        let factor = self.decay.powi(failures.min(64) as i32);
        let millis = (self.initial.as_millis() as f64 * factor).min(self.max.as_millis() as f64);
        Duration::from_millis(millis as u64)
    }
}

pub struct ReconnectingWebSocket {
    url: String,
    backoff: Backoff,
}

impl ReconnectingWebSocket {
    pub fn new(url: String, backoff: Backoff) -> Self {
        Self { url, backoff }
    }

    /// Forward frames from one open session. Returns false once nobody is
    /// listening for events any more.
    async fn pump(&self, mut socket: Socket, events: &mpsc::Sender<ChannelEvent>) -> bool {
        while let Some(frame) = socket.next().await {
            let event = match frame {
                Ok(Message::Text(text)) => ChannelEvent::Message(text),
                Ok(Message::Binary(bytes)) => {
                    ChannelEvent::Message(String::from_utf8_lossy(&bytes).into_owned())
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    let _ = events.send(ChannelEvent::Error(e.to_string())).await;
                    break;
                }
            };

            if events.send(event).await.is_err() {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl NotificationTransport for ReconnectingWebSocket {
    async fn run(&self, events: mpsc::Sender<ChannelEvent>) {
        let mut failures: u32 = 0;
        // A close is reported once per outage, not once per failed attempt.
        let mut outage_reported = false;

        loop {
            match connect_async(self.url.as_str()).await {
                Ok((socket, _response)) => {
                    failures = 0;
                    if events.send(ChannelEvent::Opened).await.is_err() {
                        return;
                    }
                    if !self.pump(socket, &events).await {
                        return;
                    }
                    if events.send(ChannelEvent::Closed).await.is_err() {
                        return;
                    }
                    outage_reported = true;
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    if events.send(ChannelEvent::Error(e.to_string())).await.is_err() {
                        return;
                    }
                    if !outage_reported {
                        if events.send(ChannelEvent::Closed).await.is_err() {
                            return;
                        }
                        outage_reported = true;
                    }
                }
            }

            let delay = self.backoff.delay(failures);
            tracing::warn!(
                url = %self.url,
                delay_ms = delay.as_millis() as u64,
                "Websocket disconnected, reconnecting"
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = events.closed() => return,
            }
        }
    }
}
