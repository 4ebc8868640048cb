// Domain constants for scrape-relay

pub mod redis {
    pub const DEFAULT_HOST: &str = "localhost";
    pub const DEFAULT_PORT: u16 = 6379;
    pub const DEFAULT_DB: i64 = 0;
}

pub mod google_cloud {
    pub const PUBSUB_SCOPE: &str = "https://www.googleapis.com/auth/pubsub";
    pub const DEFAULT_ENDPOINT: &str = "https://pubsub.googleapis.com";
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}

pub mod publish {
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

    // Attribute carrying the publish timestamp on backends with attributes
    pub const PUBDATE_ATTRIBUTE: &str = "pubdate";
    pub const PUBDATE_FORMAT: &str = "%c";
}

pub mod env {
    pub const CONFIG_PATH: &str = "SCRAPE_RELAY_CONFIG";
    pub const ENV_PREFIX: &str = "SCRAPE_RELAY";

    pub const REDIS_HOST: &str = "REDIS_HOST";
    pub const REDIS_PORT: &str = "REDIS_PORT";
    pub const REDIS_DB: &str = "REDIS_DB";
    pub const REDIS_PASSWORD: &str = "REDIS_PASSWORD";
    pub const REDIS_PUBSUB_CHANNEL: &str = "REDIS_PUBSUB_CHANNEL";

    pub const GOOGLE_CLOUD_PROJECT: &str = "GOOGLE_CLOUD_PROJECT";
    pub const GOOGLE_CLOUD_PUBSUB_TOPIC: &str = "GOOGLE_CLOUD_PUBSUB_TOPIC";
    pub const GOOGLE_CLOUD_PUBSUB_CREDENTIALS: &str = "GOOGLE_CLOUD_PUBSUB_CREDENTIALS";
    pub const PUBSUB_EMULATOR_HOST: &str = "PUBSUB_EMULATOR_HOST";
}
