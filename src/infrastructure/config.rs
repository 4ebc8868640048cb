use crate::scrape::domain::Jurisdiction;
use crate::shared::constants::{env, google_cloud, publish, redis as redis_defaults};
use crate::shared::{RelayError, Result};
use config::{Config as ConfigSource, Environment, File};
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub redis: RedisConfig,
    pub google_cloud: GoogleCloudConfig,
    pub logging: LoggingConfig,
}

/// Which pub/sub service receives the objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Redis,
    GoogleCloud,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub backend: Backend,
    pub strict_validation: bool,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub jurisdiction_id: Option<String>,
    pub jurisdiction_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<String>,
    pub channel: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleCloudConfig {
    pub project: Option<String>,
    pub topic: Option<String>,
    /// Service-account key as a JSON string
    pub credentials: Option<String>,
    pub endpoint: String,
    pub emulator_host: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_with_env(std::env::vars().collect())
    }

    /// Load configuration, reading environment variables from `vars`
    /// instead of the process environment.
    pub fn load_with_env(vars: HashMap<String, String>) -> Result<Self> {
        let config_path = vars
            .get(env::CONFIG_PATH)
            .cloned()
            .unwrap_or_else(|| "scrape-relay.toml".to_string());

        info!("Loading configuration from: {}", config_path);

        let legacy = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let config = ConfigSource::builder()
            .add_source(File::from(Path::new("config/default.toml")).required(false))
            .add_source(File::from(Path::new(&config_path)).required(false))
            .add_source(
                Environment::with_prefix(env::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .ignore_empty(true)
                    .source(Some(vars.clone())),
            )
            .set_override_option("redis.host", legacy(env::REDIS_HOST))?
            .set_override_option("redis.port", legacy(env::REDIS_PORT))?
            .set_override_option("redis.db", legacy(env::REDIS_DB))?
            .set_override_option("redis.password", legacy(env::REDIS_PASSWORD))?
            .set_override_option("redis.channel", legacy(env::REDIS_PUBSUB_CHANNEL))?
            .set_override_option("google_cloud.project", legacy(env::GOOGLE_CLOUD_PROJECT))?
            .set_override_option("google_cloud.topic", legacy(env::GOOGLE_CLOUD_PUBSUB_TOPIC))?
            .set_override_option(
                "google_cloud.credentials",
                legacy(env::GOOGLE_CLOUD_PUBSUB_CREDENTIALS),
            )?
            .set_override_option("google_cloud.emulator_host", legacy(env::PUBSUB_EMULATOR_HOST))?
            .build()?;

        let config: Config = config.try_deserialize()?;

        info!("Configuration loaded, backend: {:?}", config.output.backend);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.output.backend {
            Backend::Redis => {
                self.redis.require_channel()?;
                if self.redis.host.is_empty() {
                    return Err(RelayError::Config("Redis host cannot be empty".to_string()));
                }
                if self.redis.port == 0 {
                    return Err(RelayError::Config("Redis port must be greater than 0".to_string()));
                }
            }
            Backend::GoogleCloud => {
                self.google_cloud.topic_path()?;
            }
        }

        if let Some(id) = &self.output.jurisdiction_id {
            if id.trim().is_empty() {
                return Err(RelayError::Config("Jurisdiction id cannot be blank".to_string()));
            }
        }

        Ok(())
    }
}

impl OutputConfig {
    pub fn jurisdiction(&self) -> Option<Jurisdiction> {
        self.jurisdiction_id.as_ref().map(|id| Jurisdiction {
            jurisdiction_id: id.clone(),
            name: self.jurisdiction_name.clone(),
        })
    }
}

impl RedisConfig {
    pub fn require_channel(&self) -> Result<&str> {
        self.channel
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| RelayError::Config("Redis pub/sub channel is not set".to_string()))
    }

    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.db,
                password: self.password.clone(),
                ..RedisConnectionInfo::default()
            },
        }
    }
}

impl GoogleCloudConfig {
    pub fn topic_path(&self) -> Result<String> {
        let project = self
            .project
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| RelayError::Config("Google Cloud project is not set".to_string()))?;
        let topic = self
            .topic
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RelayError::Config("Google Cloud Pub/Sub topic is not set".to_string()))?;

        Ok(format!("projects/{}/topics/{}", project, topic))
    }

    /// REST base URL; the emulator, when configured, takes precedence
    pub fn base_url(&self) -> String {
        match &self.emulator_host {
            Some(host) => format!("http://{}", host),
            None => self.endpoint.clone(),
        }
    }
}

// Keeps service-account keys out of logs
impl fmt::Debug for GoogleCloudConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCloudConfig")
            .field("project", &self.project)
            .field("topic", &self.topic)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("emulator_host", &self.emulator_host)
            .finish()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            strict_validation: true,
            max_retries: publish::DEFAULT_MAX_RETRIES,
            retry_delay_ms: publish::DEFAULT_RETRY_DELAY_MS,
            jurisdiction_id: None,
            jurisdiction_name: None,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: redis_defaults::DEFAULT_HOST.to_string(),
            port: redis_defaults::DEFAULT_PORT,
            db: redis_defaults::DEFAULT_DB,
            password: None,
            channel: None,
        }
    }
}

impl Default for GoogleCloudConfig {
    fn default() -> Self {
        Self {
            project: None,
            topic: None,
            credentials: None,
            endpoint: google_cloud::DEFAULT_ENDPOINT.to_string(),
            emulator_host: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}
