// Connection state of the notification channel

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Online,
    Offline,
}

impl ConnectionState {
    /// Text shown in the status indicator
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Online => "online",
            ConnectionState::Offline => "offline",
        }
    }

    /// CSS background color of the status indicator
    pub fn color(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "lightgray",
            ConnectionState::Online => "white",
            ConnectionState::Offline => "salmon",
        }
    }
}
