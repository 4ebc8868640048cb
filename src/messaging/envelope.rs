use crate::messaging::domain::MessageAttributes;
use crate::scrape::domain::{Jurisdiction, ScrapeObject};
use crate::shared::constants::publish::{PUBDATE_ATTRIBUTE, PUBDATE_FORMAT};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Serialize an object for the wire.
///
/// The body is a copy of the object's own map with `jurisdiction` and `type`
/// added, written as compact UTF-8 JSON. The object itself is left untouched
/// so later validation sees only its own fields.
pub fn build_message(
    obj: &ScrapeObject,
    jurisdiction: Option<&Jurisdiction>,
) -> Result<Vec<u8>, serde_json::Error> {
    let mut output = obj.as_map();

    if let Some(jurisdiction) = jurisdiction {
        output.insert(
            "jurisdiction".to_string(),
            Value::String(jurisdiction.jurisdiction_id.clone()),
        );
    }

    output.insert(
        "type".to_string(),
        Value::String(obj.object_type.as_str().to_string()),
    );

    serde_json::to_vec(&output)
}

/// Object map with sorted keys and four-space indentation, for debug logs.
pub fn pretty_dump(obj: &ScrapeObject) -> Result<String, serde_json::Error> {
    let mut entries: Vec<(String, Value)> = obj.as_map().into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let sorted: Map<String, Value> = entries.into_iter().collect();

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    sorted.serialize(&mut serializer)?;

    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn publish_attributes() -> MessageAttributes {
    publish_attributes_at(Utc::now())
}

pub fn publish_attributes_at(now: DateTime<Utc>) -> MessageAttributes {
    let mut attributes = MessageAttributes::new();
    attributes.insert(
        PUBDATE_ATTRIBUTE.to_string(),
        now.format(PUBDATE_FORMAT).to_string(),
    );
    attributes
}
