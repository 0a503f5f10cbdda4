//! What the lifecycle creates, adds and deletes

use anyhow::Context;
use fibery_client::{IdentityKeys, QueryLimit, Record};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

/// Inputs of one lifecycle run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecyclePlan {
    /// Owning application
    pub app: String,
    /// Database name
    pub schema: String,
    /// Ordered `field -> logical type` declaration, title field first
    pub fields: IndexMap<String, String>,
    /// Records created after the database exists
    #[serde(default)]
    pub records_to_add: Vec<Record>,
    /// Records deleted before the database is dropped
    #[serde(default)]
    pub records_to_delete: Vec<Record>,
    /// Record attributes identity is derived from
    #[serde(default)]
    pub identity_keys: IdentityKeys,
    /// Most rows the read step returns, every row when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_limit: Option<u64>,
}

impl LifecyclePlan {
    /// Load a plan from a JSON file
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plan {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse plan {}", path.display()))
    }

    /// With owning application
    #[must_use]
    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = app.into();
        self
    }

    /// With database name
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Field names projected by the read step
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Row limit of the read step
    #[must_use]
    pub fn query_limit(&self) -> QueryLimit {
        self.row_limit.map_or(QueryLimit::Unbounded, QueryLimit::Count)
    }

    /// Built-in employee dataset
    #[must_use]
    pub fn demo() -> Self {
        let fields = [
            ("NameSurname", "text"),
            ("Age", "int"),
            ("Manager", "text"),
            ("Subdivision", "text"),
            ("Salary", "float"),
            ("JoinDate", "date-time"),
            ("IsActive", "boolean"),
        ]
        .into_iter()
        .map(|(name, ty)| (name.to_string(), ty.to_string()))
        .collect();

        let records_to_add = vec![
            object(json!({
                "NameSurname": "Stiven Fox",
                "Age": 25,
                "Manager": "Tim Brown",
                "Subdivision": "Department A",
                "Salary": 1000.10,
                "JoinDate": "2023-01-01T00:00:00.000Z",
                "IsActive": true
            })),
            object(json!({
                "NameSurname": "Foxy Stivenson",
                "Age": 35,
                "Manager": "Roger Smith",
                "Subdivision": "Department B",
                "Salary": 2000.20,
                "JoinDate": "2024-01-01T00:00:00.000Z",
                "IsActive": true
            })),
        ];

        let records_to_delete = vec![
            object(json!({"NameSurname": "Stiven Fox", "Age": 25})),
            object(json!({"NameSurname": "Foxy Stivenson", "Age": 35})),
        ];

        Self {
            app: "TestSpace".to_string(),
            schema: "Empoyees".to_string(),
            fields,
            records_to_add,
            records_to_delete,
            identity_keys: IdentityKeys::default(),
            row_limit: None,
        }
    }
}

fn object(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
