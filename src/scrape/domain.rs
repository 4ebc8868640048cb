use crate::scrape::validation::{self, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A scraped object together with the objects scraped alongside it.
///
/// Input documents use the same keys the object is published with: `_id`
/// and `_type` are metadata, `_related` holds child objects, and every other
/// key is the object's own data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeObject {
    #[serde(rename = "_id", default = "new_object_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub object_type: ObjectType,
    #[serde(rename = "_related", default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<ScrapeObject>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// Kinds of scraped objects
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Jurisdiction,
    Organization,
    Person,
    Post,
    Membership,
    Bill,
    VoteEvent,
    Event,
}

/// Jurisdiction the scrape belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub jurisdiction_id: String,
    pub name: Option<String>,
}

fn new_object_id() -> String {
    Uuid::new_v4().to_string()
}

impl ObjectType {
    pub const ALL: [ObjectType; 8] = [
        ObjectType::Jurisdiction,
        ObjectType::Organization,
        ObjectType::Person,
        ObjectType::Post,
        ObjectType::Membership,
        ObjectType::Bill,
        ObjectType::VoteEvent,
        ObjectType::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Jurisdiction => "jurisdiction",
            ObjectType::Organization => "organization",
            ObjectType::Person => "person",
            ObjectType::Post => "post",
            ObjectType::Membership => "membership",
            ObjectType::Bill => "bill",
            ObjectType::VoteEvent => "vote_event",
            ObjectType::Event => "event",
        }
    }

    /// Whether objects of this type hold a reference to their jurisdiction
    pub fn carries_jurisdiction(&self) -> bool {
        matches!(
            self,
            ObjectType::Organization | ObjectType::Event | ObjectType::VoteEvent
        )
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown object type '{}'", s))
    }
}

impl ScrapeObject {
    pub fn new(object_type: ObjectType) -> Self {
        Self {
            id: new_object_id(),
            object_type,
            related: Vec::new(),
            data: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_related(mut self, child: ScrapeObject) -> Self {
        self.related.push(child);
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Prepare the object for output under the given jurisdiction
    pub fn pre_save(&mut self, jurisdiction_id: &str) {
        if self.object_type.carries_jurisdiction() {
            self.data.insert(
                "jurisdiction_id".to_string(),
                Value::String(jurisdiction_id.to_string()),
            );
        }
    }

    /// The object's own dictionary: `_id` followed by its data fields.
    pub fn as_map(&self) -> Map<String, Value> {
        let mut map = Map::with_capacity(self.data.len() + 1);
        map.insert("_id".to_string(), Value::String(self.id.clone()));
        for (key, value) in &self.data {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }

    /// Label used when logging the object
    pub fn display_name(&self) -> String {
        ["name", "title", "identifier", "motion_text"]
            .iter()
            .find_map(|key| match self.data.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_else(|| self.id.clone())
    }

    /// Number of objects in this graph, the object itself included
    pub fn graph_size(&self) -> usize {
        1 + self.related.iter().map(ScrapeObject::graph_size).sum::<usize>()
    }
}

impl fmt::Display for ScrapeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl Jurisdiction {
    pub fn new(jurisdiction_id: impl Into<String>) -> Self {
        Self {
            jurisdiction_id: jurisdiction_id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", name, self.jurisdiction_id),
            None => f.write_str(&self.jurisdiction_id),
        }
    }
}
