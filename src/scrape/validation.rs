use crate::scrape::domain::{ObjectType, ScrapeObject};
use serde_json::Value;
use thiserror::Error;

/// Problems found when checking a scraped object against its type's rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation of {object_type} {object_id} failed: {}", .problems.join("; "))]
pub struct ValidationError {
    pub object_type: ObjectType,
    pub object_id: String,
    pub problems: Vec<String>,
}

/// Fields every object of the given type must carry with a non-empty value.
pub fn required_fields(object_type: ObjectType) -> &'static [&'static str] {
    match object_type {
        ObjectType::Jurisdiction => &["name", "url", "classification"],
        ObjectType::Organization => &["name", "classification"],
        ObjectType::Person => &["name"],
        ObjectType::Post => &["label", "role"],
        ObjectType::Membership => &["person_id", "organization_id"],
        ObjectType::Bill => &["identifier", "title", "legislative_session"],
        ObjectType::VoteEvent => &["motion_text", "start_date", "result"],
        ObjectType::Event => &["name", "start_date", "location"],
    }
}

// Fields that must be lists whenever present
const LIST_FIELDS: &[&str] = &["sources", "links", "other_names", "identifiers"];

pub fn validate(obj: &ScrapeObject) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    for field in required_fields(obj.object_type) {
        match obj.data.get(*field) {
            None => problems.push(format!("'{}' is required", field)),
            Some(value) if is_empty(value) => {
                problems.push(format!("'{}' must not be empty", field))
            }
            Some(_) => {}
        }
    }

    for field in LIST_FIELDS {
        if let Some(value) = obj.data.get(*field) {
            if !value.is_array() {
                problems.push(format!("'{}' must be a list", field));
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            object_type: obj.object_type,
            object_id: obj.id.clone(),
            problems,
        })
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_bill_passes() {
        let bill = ScrapeObject::new(ObjectType::Bill)
            .with_field("identifier", "HB 101")
            .with_field("title", "An Act concerning libraries")
            .with_field("legislative_session", "2025")
            .with_field("sources", json!([{"url": "https://example.org/hb101"}]));

        assert!(bill.validate().is_ok());
    }

    #[test]
    fn test_missing_and_empty_fields_are_all_reported() {
        let bill = ScrapeObject::new(ObjectType::Bill)
            .with_field("identifier", "HB 101")
            .with_field("title", "   ");

        let err = bill.validate().unwrap_err();
        assert_eq!(err.object_type, ObjectType::Bill);
        assert_eq!(err.object_id, bill.id);
        assert_eq!(
            err.problems,
            vec![
                "'title' must not be empty".to_string(),
                "'legislative_session' is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_list_fields_must_be_lists() {
        let person = ScrapeObject::new(ObjectType::Person)
            .with_field("name", "Jane Doe")
            .with_field("sources", "https://example.org");

        let err = person.validate().unwrap_err();
        assert_eq!(err.problems, vec!["'sources' must be a list".to_string()]);
    }

    #[test]
    fn test_event_location_object_must_not_be_empty() {
        let event = ScrapeObject::new(ObjectType::Event)
            .with_field("name", "Committee hearing")
            .with_field("start_date", "2026-03-01T10:00:00Z")
            .with_field("location", json!({}));

        let err = event.validate().unwrap_err();
        assert!(err.to_string().contains("'location' must not be empty"));
    }

    #[test]
    fn test_every_type_has_rules() {
        for object_type in ObjectType::ALL {
            assert!(!required_fields(object_type).is_empty());
        }
    }
}
