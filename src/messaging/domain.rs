use async_trait::async_trait;
use std::collections::BTreeMap;

/// Attributes sent alongside a message on backends that support them
pub type MessageAttributes = BTreeMap<String, String>;

/// A pub/sub destination that serialized objects are sent to
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send one message
    async fn publish(&mut self, payload: &[u8], attributes: &MessageAttributes) -> crate::Result<()>;

    /// Drop the current connection and establish a fresh one
    async fn reconnect(&mut self) -> crate::Result<()>;

    /// Channel or topic path, for log lines
    fn destination(&self) -> &str;

    /// What the destination is called on this backend: "channel" or "topic"
    fn destination_kind(&self) -> &'static str;

    fn backend_name(&self) -> &'static str;

    fn stats(&self) -> SinkStats;
}

/// Sink statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SinkStats {
    pub messages_published: u64,
    pub failed_attempts: u64,
    pub reconnects: u64,
    pub connection_status: ConnectionStatus,
    pub last_activity: Option<u64>,
}

/// Connection status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Disconnected,
    Error(String),
}

impl SinkStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_published(&mut self) {
        self.messages_published += 1;
        self.connection_status = ConnectionStatus::Connected;
        self.update_last_activity();
    }

    pub fn record_failure(&mut self, reason: impl Into<String>) {
        self.failed_attempts += 1;
        self.connection_status = ConnectionStatus::Error(reason.into());
    }

    pub fn record_reconnect(&mut self) {
        self.reconnects += 1;
        self.connection_status = ConnectionStatus::Connected;
        self.update_last_activity();
    }

    pub fn set_connection_status(&mut self, status: ConnectionStatus) {
        self.connection_status = status;
    }

    fn update_last_activity(&mut self) {
        self.last_activity = Some(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        );
    }
}
