//! Schema descriptors for database creation
//!
//! A new database always carries:
//! - The first declared field as a text title field
//! - The four Fibery system fields
//! - The remaining declared fields, in declaration order

use crate::error::{FiberyError, FiberyResult};
use crate::field_type::FieldType;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Metadata flags attached to a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Field is access controlled
    #[serde(rename = "fibery/secured?", skip_serializing_if = "Option::is_none")]
    pub secured: Option<bool>,
    /// Field is the database title
    #[serde(rename = "ui/title?", skip_serializing_if = "Option::is_none")]
    pub title: Option<bool>,
    /// Field holds the entity id
    #[serde(rename = "fibery/id?", skip_serializing_if = "Option::is_none")]
    pub id: Option<bool>,
    /// Field holds the public id
    #[serde(rename = "fibery/public-id?", skip_serializing_if = "Option::is_none")]
    pub public_id: Option<bool>,
    /// Field holds the creation date
    #[serde(rename = "fibery/creation-date?", skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<bool>,
    /// Field holds the modification date
    #[serde(
        rename = "fibery/modification-date?",
        skip_serializing_if = "Option::is_none"
    )]
    pub modification_date: Option<bool>,
    /// Value is required
    #[serde(rename = "fibery/required?", skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Value is set by Fibery only
    #[serde(rename = "fibery/readonly?", skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
    /// Default value expression
    #[serde(rename = "fibery/default-value", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl FieldMeta {
    /// Meta for an ordinary user field
    #[must_use]
    pub fn user() -> Self {
        Self {
            secured: Some(false),
            ..Self::default()
        }
    }

    /// Meta for the title field
    #[must_use]
    pub fn title() -> Self {
        Self {
            secured: Some(false),
            title: Some(true),
            ..Self::default()
        }
    }
}

/// One field of a database: qualified name, Fibery type, metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Qualified field name
    #[serde(rename = "fibery/name")]
    pub name: String,
    /// Fibery type id
    #[serde(rename = "fibery/type")]
    pub field_type: String,
    /// Metadata flags
    #[serde(rename = "fibery/meta")]
    pub meta: FieldMeta,
}

impl FieldDescriptor {
    /// Create descriptor
    pub fn new(name: impl Into<String>, field_type: impl Into<String>, meta: FieldMeta) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            meta,
        }
    }
}

/// Fields Fibery expects on every database
pub static SYSTEM_FIELDS: Lazy<[FieldDescriptor; 4]> = Lazy::new(|| {
    [
        FieldDescriptor::new(
            "fibery/id",
            FieldType::Uuid.external_id(),
            FieldMeta {
                secured: Some(false),
                id: Some(true),
                readonly: Some(true),
                ..FieldMeta::default()
            },
        ),
        FieldDescriptor::new(
            "fibery/public-id",
            FieldType::Text.external_id(),
            FieldMeta {
                secured: Some(false),
                public_id: Some(true),
                readonly: Some(true),
                ..FieldMeta::default()
            },
        ),
        FieldDescriptor::new(
            "fibery/creation-date",
            FieldType::DateTime.external_id(),
            FieldMeta {
                secured: Some(false),
                creation_date: Some(true),
                readonly: Some(true),
                default_value: Some("$now".to_string()),
                ..FieldMeta::default()
            },
        ),
        FieldDescriptor::new(
            "fibery/modification-date",
            FieldType::DateTime.external_id(),
            FieldMeta {
                secured: Some(false),
                modification_date: Some(true),
                required: Some(true),
                readonly: Some(true),
                default_value: Some("$now".to_string()),
                ..FieldMeta::default()
            },
        ),
    ]
});

/// Database about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    /// Owning application
    pub app: String,
    /// Database name
    pub name: String,
    /// Title field, system fields, then remaining user fields
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    /// Build descriptor from an ordered `name -> logical type` map
    ///
    /// Every declared type is checked before anything is built.
    pub fn build(
        app: impl Into<String>,
        name: impl Into<String>,
        declared: &IndexMap<String, String>,
    ) -> FiberyResult<Self> {
        let name = name.into();
        if declared.is_empty() {
            return Err(FiberyError::NoFieldsDeclared);
        }

        let resolved = declared
            .iter()
            .map(|(field, ty)| FieldType::for_field(field, ty).map(|t| (field, t)))
            .collect::<FiberyResult<Vec<_>>>()?;

        let mut fields = Vec::with_capacity(resolved.len() + SYSTEM_FIELDS.len());
        for (index, (field, ty)) in resolved.into_iter().enumerate() {
            let qualified = format!("{name}/{field}");
            if index == 0 {
                // Title is always text whatever was declared
                fields.push(FieldDescriptor::new(
                    qualified,
                    FieldType::Text.external_id(),
                    FieldMeta::title(),
                ));
                fields.extend(SYSTEM_FIELDS.iter().cloned());
            } else {
                fields.push(FieldDescriptor::new(
                    qualified,
                    ty.external_id(),
                    FieldMeta::user(),
                ));
            }
        }

        Ok(Self {
            app: app.into(),
            name,
            fields,
        })
    }

    /// `<app>/<name>`
    #[inline]
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualified_type(&self.app, &self.name)
    }
}

/// Fully qualified database type name
#[inline]
#[must_use]
pub fn qualified_type(app: &str, schema: &str) -> String {
    format!("{app}/{schema}")
}
