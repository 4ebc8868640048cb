use crate::infrastructure::config::LoggingConfig;
use crate::shared::{RelayError, Result};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub struct Logging {
    config: LoggingConfig,
}

impl Logging {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    /// Install the global subscriber. `RUST_LOG` takes precedence over the
    /// configured level. Logs go to stderr.
    pub fn init(&self) -> Result<()> {
        let level = self.level()?;
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("scrape_relay={}", level)));

        let registry = tracing_subscriber::registry().with(env_filter);

        let result = match self.config.format.as_str() {
            "json" => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
            "text" => registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .try_init(),
            other => {
                return Err(RelayError::Config(format!(
                    "Unknown log format '{}', expected 'json' or 'text'",
                    other
                )))
            }
        };

        result.map_err(|e| RelayError::Config(format!("Failed to initialize logging: {}", e)))?;

        tracing::info!("Logging initialized with format: {}", self.config.format);
        Ok(())
    }

    pub fn level(&self) -> Result<Level> {
        self.config
            .level
            .parse::<Level>()
            .map_err(|e| RelayError::Config(format!("Invalid log level '{}': {}", self.config.level, e)))
    }
}
