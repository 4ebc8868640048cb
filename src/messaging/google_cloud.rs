use crate::{
    infrastructure::config::GoogleCloudConfig,
    messaging::domain::{MessageAttributes, MessageSink, SinkStats},
    shared::{
        constants::google_cloud::{PUBSUB_SCOPE, REQUEST_TIMEOUT_SECS},
        RelayError, Result,
    },
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use gcp_auth::{CustomServiceAccount, TokenProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Google Cloud Pub/Sub implementation of the message sink, speaking the
/// REST publish endpoint.
pub struct GoogleCloudSink {
    config: GoogleCloudConfig,
    http: reqwest::Client,
    // None when talking to the emulator, which takes no credentials
    auth: Option<Arc<dyn TokenProvider>>,
    topic_path: String,
    publish_url: String,
    stats: SinkStats,
}

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    messages: Vec<PubsubMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct PubsubMessage<'a> {
    data: String,
    #[serde(skip_serializing_if = "no_attributes")]
    attributes: &'a MessageAttributes,
}

fn no_attributes(attributes: &&MessageAttributes) -> bool {
    attributes.is_empty()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

impl GoogleCloudSink {
    pub async fn connect(config: &GoogleCloudConfig) -> Result<Self> {
        let topic_path = config.topic_path()?;
        let publish_url = format!(
            "{}/v1/{}:publish",
            config.base_url().trim_end_matches('/'),
            topic_path
        );

        let auth = match config.emulator_host {
            Some(_) => None,
            None => Some(resolve_token_provider(config.credentials.as_deref()).await?),
        };

        info!("Publishing to Google Cloud Pub/Sub topic {}", topic_path);

        Ok(Self {
            config: config.clone(),
            http: build_http_client()?,
            auth,
            topic_path,
            publish_url,
            stats: SinkStats::new(),
        })
    }

    pub fn topic_path(&self) -> &str {
        &self.topic_path
    }

    pub fn publish_url(&self) -> &str {
        &self.publish_url
    }

    async fn send(&self, payload: &[u8], attributes: &MessageAttributes) -> Result<PublishResponse> {
        let body = PublishRequest {
            messages: vec![PubsubMessage {
                data: STANDARD.encode(payload),
                attributes,
            }],
        };

        let mut request = self.http.post(&self.publish_url).json(&body);
        if let Some(auth) = &self.auth {
            let token = auth.token(&[PUBSUB_SCOPE]).await?;
            request = request.bearer_auth(token.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::PubSubStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<PublishResponse>().await?)
    }
}

#[async_trait]
impl MessageSink for GoogleCloudSink {
    async fn publish(&mut self, payload: &[u8], attributes: &MessageAttributes) -> Result<()> {
        match self.send(payload, attributes).await {
            Ok(response) => {
                self.stats.record_published();
                debug!(
                    "Published {} bytes to {} as message {:?}",
                    payload.len(),
                    self.topic_path,
                    response.message_ids
                );
                Ok(())
            }
            Err(e) => {
                self.stats.record_failure(e.to_string());
                Err(e)
            }
        }
    }

    async fn reconnect(&mut self) -> Result<()> {
        self.http = build_http_client()?;
        if self.config.emulator_host.is_none() {
            self.auth = Some(resolve_token_provider(self.config.credentials.as_deref()).await?);
        }
        self.stats.record_reconnect();
        debug!("Rebuilt Pub/Sub client for {}", self.topic_path);
        Ok(())
    }

    fn destination(&self) -> &str {
        &self.topic_path
    }

    fn destination_kind(&self) -> &'static str {
        "topic"
    }

    fn backend_name(&self) -> &'static str {
        "google_cloud"
    }

    fn stats(&self) -> SinkStats {
        self.stats.clone()
    }
}

fn build_http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}

/// Explicit service-account JSON wins; otherwise fall back to whatever
/// credentials the environment provides.
async fn resolve_token_provider(credentials: Option<&str>) -> Result<Arc<dyn TokenProvider>> {
    match credentials {
        Some(json) => {
            let account = CustomServiceAccount::from_json(json)?;
            debug!("Using service account credentials from configuration");
            let provider: Arc<dyn TokenProvider> = Arc::new(account);
            Ok(provider)
        }
        None => Ok(gcp_auth::provider().await?),
    }
}
