use crate::infrastructure::config::{Backend, Config};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "scrape-relay")]
#[command(about = "Publish scraped legislative objects to Redis or Google Cloud Pub/Sub")]
pub struct Cli {
    /// JSON file of scraped objects (array or one object per line); `-` reads stdin
    #[arg(default_value = "-")]
    pub input: PathBuf,

    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Jurisdiction id stamped on every message, e.g. ocd-jurisdiction/country:us/state:nc/government
    #[arg(long)]
    pub jurisdiction: Option<String>,

    /// Log validation failures instead of aborting
    #[arg(long)]
    pub lenient: bool,

    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Log format: json or text
    #[arg(long)]
    pub log_format: Option<String>,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,
}

impl Cli {
    /// Command-line flags win over every other configuration source
    pub fn apply(&self, config: &mut Config) {
        if let Some(backend) = self.backend {
            config.output.backend = backend;
        }
        if let Some(jurisdiction) = &self.jurisdiction {
            config.output.jurisdiction_id = Some(jurisdiction.clone());
        }
        if self.lenient {
            config.output.strict_validation = false;
        }
        if let Some(max_retries) = self.max_retries {
            config.output.max_retries = max_retries;
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}
