use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Server-assigned identifier of an entity.
///
/// Servers hand out either integer or string ids; both are kept verbatim so
/// that the JSON written back matches what was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Number(value)
    }
}

impl From<i32> for EntityId {
    fn from(value: i32) -> Self {
        EntityId::Number(value.into())
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId::Text(value)
    }
}

impl EntityId {
    /// True when both ids name the same resource path on the server, so the
    /// number `42` and the string `"42"` match while `"042"` does not.
    pub fn matches(&self, other: &EntityId) -> bool {
        match (self, other) {
            (EntityId::Number(a), EntityId::Number(b)) => a == b,
            (EntityId::Text(a), EntityId::Text(b)) => a == b,
            (EntityId::Number(n), EntityId::Text(s)) | (EntityId::Text(s), EntityId::Number(n)) => {
                n.to_string() == *s
            }
        }
    }
}

/// Parses command-line style ids: anything that reads as an integer is
/// numeric, everything else is text.
impl FromStr for EntityId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(n) => EntityId::Number(n),
            Err(_) => EntityId::Text(trimmed.to_string()),
        })
    }
}

/// One record of a remote collection. Everything except `id` is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        let id = match &self.id {
            EntityId::Number(n) => Value::from(*n),
            EntityId::Text(s) => Value::from(s.as_str()),
        };
        object.insert("id".to_string(), id);
        Value::Object(object)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateError {
    #[error("candidate must be a JSON object")]
    NotAnObject,
    #[error("candidate must not carry an id; ids are assigned by the server")]
    HasId,
}

/// An entity that has not been persisted yet, sent as the body of a POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Candidate {
    fields: Map<String, Value>,
}

impl Candidate {
    pub fn new(fields: Map<String, Value>) -> Result<Self, CandidateError> {
        if fields.contains_key("id") {
            return Err(CandidateError::HasId);
        }
        Ok(Self { fields })
    }

    pub fn from_value(value: Value) -> Result<Self, CandidateError> {
        match value {
            Value::Object(fields) => Self::new(fields),
            _ => Err(CandidateError::NotAnObject),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
