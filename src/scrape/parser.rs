use crate::scrape::domain::ScrapeObject;
use crate::shared::{RelayError, Result};
use serde_json::Deserializer;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Parse scraped objects from a JSON array, a single JSON object, or a
/// stream of JSON objects (one per line or simply concatenated).
pub fn parse_objects(input: &str) -> Result<Vec<ScrapeObject>> {
    let trimmed = input.trim_start();

    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<ScrapeObject>>(trimmed)
            .map_err(|e| RelayError::Input(format!("invalid object array: {}", e)));
    }

    let mut objects = Vec::new();
    for (index, item) in Deserializer::from_str(trimmed)
        .into_iter::<ScrapeObject>()
        .enumerate()
    {
        let obj = item.map_err(|e| {
            RelayError::Input(format!("invalid object at position {}: {}", index + 1, e))
        })?;
        objects.push(obj);
    }

    debug!("Parsed {} top-level objects", objects.len());
    Ok(objects)
}

/// Read objects from a file, or from stdin when the path is `-`.
pub async fn read_objects(path: &Path) -> Result<Vec<ScrapeObject>> {
    let mut input = String::new();

    if path.as_os_str() == "-" {
        tokio::io::stdin().read_to_string(&mut input).await?;
    } else {
        input = tokio::fs::read_to_string(path).await?;
    }

    parse_objects(&input)
}
