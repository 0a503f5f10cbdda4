//! Deterministic record identity
//!
//! A record's `fibery/id` is the version-5 UUID (DNS namespace) of its name
//! attribute followed by its age attribute. Two records with the same pair
//! always address the same remote entity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Attribute names identity is derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityKeys {
    /// Name attribute
    pub name: String,
    /// Age attribute
    pub age: String,
}

impl IdentityKeys {
    /// Create keys
    pub fn new(name: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
        }
    }
}

impl Default for IdentityKeys {
    fn default() -> Self {
        Self::new("NameSurname", "Age")
    }
}

/// Identity of one remote entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordIdentity(Uuid);

impl RecordIdentity {
    /// Derive identity from a name and an age rendering
    #[must_use]
    pub fn derive(name: &str, age: &str) -> Self {
        let seed = format!("{name}{age}");
        Self(Uuid::new_v5(&Uuid::NAMESPACE_DNS, seed.as_bytes()))
    }

    /// Derive identity from a record, `None` if either attribute is missing
    #[must_use]
    pub fn from_record(record: &Map<String, Value>, keys: &IdentityKeys) -> Option<Self> {
        let name = attribute_text(record.get(&keys.name)?)?;
        let age = attribute_text(record.get(&keys.age)?)?;
        Some(Self::derive(&name, &age))
    }

    /// Underlying UUID
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RecordIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

// Strings contribute raw text, other values their JSON rendering.
fn attribute_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
