pub mod shared;
pub mod scrape;
pub mod messaging;
pub mod infrastructure;

// Re-export commonly used types
pub use scrape::domain::{Jurisdiction, ObjectType, ScrapeObject};
pub use messaging::domain::MessageSink;
pub use messaging::publisher::{ObjectPublisher, PublishContext, PublishReport};

// Re-export result type
pub use shared::error::{RelayError, Result};
