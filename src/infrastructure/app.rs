use crate::{
    infrastructure::config::{Backend, Config},
    messaging::{
        domain::MessageSink,
        google_cloud::GoogleCloudSink,
        publisher::{ObjectPublisher, PublishContext, PublishReport},
        redis::RedisSink,
    },
    scrape::{domain::ScrapeObject, parser::read_objects},
    shared::Result,
};
use std::path::Path;
use tracing::info;

/// Main application: reads scraped objects and publishes them to the
/// configured backend.
pub struct ScrapeRelay {
    config: Config,
}

impl ScrapeRelay {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Publish every object found at `input` (`-` for stdin)
    pub async fn run(&self, input: &Path) -> Result<PublishReport> {
        let mut objects = read_objects(input).await?;
        let total: usize = objects.iter().map(ScrapeObject::graph_size).sum();
        info!(
            "Read {} objects ({} including related) from {}",
            objects.len(),
            total,
            input.display()
        );

        match self.config.output.backend {
            Backend::Redis => {
                let sink = RedisSink::connect(&self.config.redis).await?;
                self.publish_with(sink, &mut objects).await
            }
            Backend::GoogleCloud => {
                let sink = GoogleCloudSink::connect(&self.config.google_cloud).await?;
                self.publish_with(sink, &mut objects).await
            }
        }
    }

    /// Publish objects through an already connected sink
    pub async fn publish_with<S: MessageSink>(
        &self,
        sink: S,
        objects: &mut [ScrapeObject],
    ) -> Result<PublishReport> {
        let context = PublishContext::from(&self.config.output);
        if let Some(jurisdiction) = &context.jurisdiction {
            info!("Publishing for jurisdiction {}", jurisdiction);
        }

        let mut publisher = ObjectPublisher::new(sink, context);
        let report = publisher.publish_all(objects).await?;

        let stats = publisher.sink().stats();
        info!(
            "{} sink finished: {} published, {} failed attempts, {} reconnects",
            publisher.sink().backend_name(),
            stats.messages_published,
            stats.failed_attempts,
            stats.reconnects
        );

        Ok(report)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::RelayError;

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = ScrapeRelay::new(Config::default());
        assert!(matches!(result, Err(RelayError::Config(_))));
    }

    #[test]
    fn test_new_accepts_valid_config() {
        let mut config = Config::default();
        config.redis.channel = Some("scrapes".to_string());
        let relay = ScrapeRelay::new(config).unwrap();
        assert_eq!(relay.config().redis.channel.as_deref(), Some("scrapes"));
    }
}
