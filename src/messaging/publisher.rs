use crate::{
    infrastructure::config::OutputConfig,
    messaging::{
        domain::MessageSink,
        envelope::{build_message, pretty_dump, publish_attributes},
    },
    scrape::{
        domain::{Jurisdiction, ObjectType, ScrapeObject},
        validation::ValidationError,
    },
    shared::RelayError,
};
use futures::future::{BoxFuture, FutureExt};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn, Level};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("giving up on {destination} after {attempts} attempts: {source}")]
    RetriesExhausted {
        destination: String,
        attempts: u32,
        source: Box<RelayError>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to serialize {object_type} {object_id}: {source}")]
    Serialize {
        object_type: ObjectType,
        object_id: String,
        source: serde_json::Error,
    },
}

/// Settings shared by every object published in a run
#[derive(Debug, Clone)]
pub struct PublishContext {
    pub jurisdiction: Option<Jurisdiction>,
    pub strict_validation: bool,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for PublishContext {
    fn default() -> Self {
        Self::from(&OutputConfig::default())
    }
}

impl From<&OutputConfig> for PublishContext {
    fn from(config: &OutputConfig) -> Self {
        Self {
            jurisdiction: config.jurisdiction(),
            strict_validation: config.strict_validation,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Outcome of a publishing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub messages_sent: u64,
    pub retries: u64,
    pub validation_warnings: u64,
    pub sent_by_type: BTreeMap<ObjectType, u64>,
}

impl PublishReport {
    fn record_sent(&mut self, object_type: ObjectType) {
        self.messages_sent += 1;
        *self.sent_by_type.entry(object_type).or_insert(0) += 1;
    }
}

/// Publishes scraped objects, and everything related to them, to a sink.
pub struct ObjectPublisher<S: MessageSink> {
    sink: S,
    context: PublishContext,
    output_names: BTreeMap<ObjectType, BTreeSet<String>>,
    report: PublishReport,
}

impl<S: MessageSink> ObjectPublisher<S> {
    pub fn new(sink: S, context: PublishContext) -> Self {
        Self {
            sink,
            context,
            output_names: BTreeMap::new(),
            report: PublishReport::default(),
        }
    }

    /// Publish a batch of top-level objects in order, stopping at the first error.
    pub async fn publish_all(
        &mut self,
        objects: &mut [ScrapeObject],
    ) -> Result<PublishReport, PublishError> {
        for obj in objects.iter_mut() {
            self.save_object(obj).await?;
        }

        info!(
            "Published {} messages to {} ({} retries, {} validation warnings)",
            self.report.messages_sent,
            self.sink.destination(),
            self.report.retries,
            self.report.validation_warnings
        );
        Ok(self.report.clone())
    }

    /// Publish one object, validate it, then publish its related objects
    /// depth first.
    ///
    /// The object is validated after it has been sent so a failing object can
    /// still be inspected downstream. Validation failures abort only when
    /// strict validation is on; otherwise they are logged.
    pub fn save_object<'a>(
        &'a mut self,
        obj: &'a mut ScrapeObject,
    ) -> BoxFuture<'a, Result<(), PublishError>> {
        async move {
            if let Some(jurisdiction) = &self.context.jurisdiction {
                obj.pre_save(&jurisdiction.jurisdiction_id);
            }

            info!("{}", self.describe_save(obj));
            if tracing::enabled!(Level::DEBUG) {
                match pretty_dump(obj) {
                    Ok(dump) => debug!("{}", dump),
                    Err(e) => debug!("could not render {} {}: {}", obj.object_type, obj.id, e),
                }
            }

            self.output_names
                .entry(obj.object_type)
                .or_default()
                .insert(obj.id.clone());

            let payload = build_message(obj, self.context.jurisdiction.as_ref()).map_err(
                |source| PublishError::Serialize {
                    object_type: obj.object_type,
                    object_id: obj.id.clone(),
                    source,
                },
            )?;

            self.send_with_retry(&payload).await?;
            self.report.record_sent(obj.object_type);

            // Validate the original object, not the message: the added
            // metadata is not part of the object's schema.
            if let Err(e) = obj.validate() {
                if self.context.strict_validation {
                    return Err(e.into());
                }
                warn!("{}", e);
                self.report.validation_warnings += 1;
            }

            for child in obj.related.iter_mut() {
                self.save_object(child).await?;
            }

            Ok(())
        }
        .boxed()
    }

    /// Send a payload, reconnecting between attempts with a linearly growing
    /// delay. Makes at most `max_retries + 1` attempts.
    async fn send_with_retry(&mut self, payload: &[u8]) -> Result<(), PublishError> {
        let attributes = publish_attributes();
        let max_attempts = self.context.max_retries.saturating_add(1);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let err = match self.sink.publish(payload, &attributes).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            if attempt > self.context.max_retries {
                error!(
                    "Failed to publish to {} after {} attempts: {}",
                    self.sink.destination(),
                    attempt,
                    err
                );
                return Err(PublishError::RetriesExhausted {
                    destination: self.sink.destination().to_string(),
                    attempts: attempt,
                    source: Box::new(err),
                });
            }

            warn!(
                "Publish to {} failed (attempt {} of {}): {}",
                self.sink.destination(),
                attempt,
                max_attempts,
                err
            );
            self.report.retries += 1;

            tokio::time::sleep(self.retry_delay(attempt)).await;

            if let Err(e) = self.sink.reconnect().await {
                warn!("Reconnect to {} failed: {}", self.sink.destination(), e);
            }
        }
    }

    /// Linear backoff, saturating instead of overflowing on huge delays
    fn retry_delay(&self, attempt: u32) -> Duration {
        self.context
            .retry_delay
            .checked_mul(attempt)
            .unwrap_or(Duration::MAX)
    }

    fn describe_save(&self, obj: &ScrapeObject) -> String {
        format!(
            "save {} {} to {} {}",
            obj.object_type,
            obj,
            self.sink.destination_kind(),
            self.sink.destination()
        )
    }

    /// Ids of every object handed to the sink, by type
    pub fn output_names(&self) -> &BTreeMap<ObjectType, BTreeSet<String>> {
        &self.output_names
    }

    pub fn report(&self) -> &PublishReport {
        &self.report
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
