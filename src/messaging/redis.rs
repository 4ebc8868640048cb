use crate::{
    infrastructure::config::RedisConfig,
    messaging::domain::{ConnectionStatus, MessageAttributes, MessageSink, SinkStats},
    shared::{RelayError, Result},
};
use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client as RedisClient};
use tracing::{debug, info, warn};

/// Redis pub/sub implementation of the message sink
pub struct RedisSink {
    client: RedisClient,
    connection: Option<MultiplexedConnection>,
    channel: String,
    stats: SinkStats,
}

impl RedisSink {
    /// Open a client for the configured server and connect to it
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let channel = config.require_channel()?.to_string();
        let client = RedisClient::open(config.connection_info())?;

        let mut sink = Self::from_client(client, channel);
        sink.reconnect().await?;

        info!(
            "Connected to Redis at {}:{} (db {}), publishing to channel {}",
            config.host, config.port, config.db, sink.channel
        );
        Ok(sink)
    }

    /// Wrap a client without connecting; the first `reconnect` opens the connection
    pub fn from_client(client: RedisClient, channel: impl Into<String>) -> Self {
        Self {
            client,
            connection: None,
            channel: channel.into(),
            stats: SinkStats::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Check Redis connection health
    pub async fn health_check(&mut self) -> Result<bool> {
        let Some(connection) = self.connection.as_mut() else {
            return Ok(false);
        };

        let result: std::result::Result<String, redis::RedisError> =
            redis::cmd("PING").query_async(connection).await;

        match result {
            Ok(_) => {
                self.stats.set_connection_status(ConnectionStatus::Connected);
                Ok(true)
            }
            Err(e) => {
                warn!("Redis health check failed: {}", e);
                self.stats
                    .set_connection_status(ConnectionStatus::Error("Health check failed".to_string()));
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl MessageSink for RedisSink {
    // Redis pub/sub messages carry no attributes
    async fn publish(&mut self, payload: &[u8], _attributes: &MessageAttributes) -> Result<()> {
        let Some(connection) = self.connection.as_mut() else {
            self.stats.record_failure("not connected");
            return Err(RelayError::Disconnected(self.channel.clone()));
        };

        let result: std::result::Result<i64, redis::RedisError> =
            connection.publish(self.channel.as_str(), payload).await;

        match result {
            Ok(receivers) => {
                self.stats.record_published();
                debug!(
                    "Published {} bytes to Redis channel {} ({} receivers)",
                    payload.len(),
                    self.channel,
                    receivers
                );
                Ok(())
            }
            Err(e) => {
                self.stats.record_failure(e.to_string());
                Err(e.into())
            }
        }
    }

    async fn reconnect(&mut self) -> Result<()> {
        self.connection = None;

        match self.client.get_multiplexed_async_connection().await {
            Ok(connection) => {
                self.connection = Some(connection);
                self.stats.record_reconnect();
                debug!("Opened Redis connection for channel {}", self.channel);
                Ok(())
            }
            Err(e) => {
                self.stats.record_failure(e.to_string());
                Err(e.into())
            }
        }
    }

    fn destination(&self) -> &str {
        &self.channel
    }

    fn destination_kind(&self) -> &'static str {
        "channel"
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }

    fn stats(&self) -> SinkStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_requires_channel() {
        let config = RedisConfig::default();
        let result = RedisSink::connect(&config).await;
        assert!(matches!(result, Err(RelayError::Config(_))));
    }

    #[tokio::test]
    async fn test_publish_without_connection_fails() {
        let client = RedisClient::open("redis://127.0.0.1:6379/0").unwrap();
        let mut sink = RedisSink::from_client(client, "scrapes");

        assert!(!sink.is_connected());
        let err = sink.publish(b"{}", &MessageAttributes::new()).await.unwrap_err();
        assert!(matches!(err, RelayError::Disconnected(channel) if channel == "scrapes"));
        assert_eq!(sink.stats().failed_attempts, 1);
    }

    #[tokio::test]
    async fn test_health_check_without_connection() {
        let client = RedisClient::open("redis://127.0.0.1:6379/0").unwrap();
        let mut sink = RedisSink::from_client(client, "scrapes");
        assert!(!sink.health_check().await.unwrap());
        assert_eq!(sink.destination(), "scrapes");
        assert_eq!(sink.destination_kind(), "channel");
        assert_eq!(sink.backend_name(), "redis");
    }
}
