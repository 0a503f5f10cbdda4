//! Typed Fibery command payloads
//!
//! Every request body is a JSON list of commands. Each variant here
//! serializes to exactly the shape the Fibery `/api/commands` endpoint reads.

use crate::schema::{qualified_type, FieldDescriptor, SchemaDescriptor};
use serde::ser::Serializer;
use serde::Serialize;
use serde_json::{Map, Value};

/// Color given to databases created by this client
pub const DATABASE_COLOR: &str = "#F7D130";

/// Top-level command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command")]
pub enum Command {
    /// Read the workspace schema, optionally scoped to one database
    #[serde(rename = "fibery.schema/query")]
    SchemaQuery {
        /// Qualified database the query is scoped to
        #[serde(skip_serializing_if = "Option::is_none")]
        database: Option<String>,
    },

    /// Run schema instructions together
    #[serde(rename = "fibery.schema/batch")]
    SchemaBatch {
        /// Instructions run together
        args: SchemaBatchArgs,
    },

    /// Create one entity
    #[serde(rename = "fibery.entity/create")]
    EntityCreate {
        /// Entity to create
        args: EntityArgs,
    },

    /// Delete one entity
    #[serde(rename = "fibery.entity/delete")]
    EntityDelete {
        /// Entity to delete
        args: EntityArgs,
    },

    /// Query entities
    #[serde(rename = "fibery.entity/query")]
    EntityQuery {
        /// Query to run
        args: QueryArgs,
    },
}

impl Command {
    /// Unscoped schema query
    #[must_use]
    pub fn schema_query() -> Self {
        Self::SchemaQuery { database: None }
    }

    /// Schema query scoped to `<app>/<schema>`
    #[must_use]
    pub fn schema_query_for(app: &str, schema: &str) -> Self {
        Self::SchemaQuery {
            database: Some(qualified_type(app, schema)),
        }
    }

    /// Batch holding a single type-create instruction
    #[must_use]
    pub fn create_type(schema: SchemaDescriptor) -> Self {
        Self::SchemaBatch {
            args: SchemaBatchArgs {
                commands: vec![SchemaInstruction::TypeCreate {
                    args: TypeCreateArgs::from(schema),
                }],
            },
        }
    }

    /// Batch holding a single cascading type-delete instruction
    #[must_use]
    pub fn delete_type(app: &str, schema: &str) -> Self {
        Self::SchemaBatch {
            args: SchemaBatchArgs {
                commands: vec![SchemaInstruction::TypeDelete {
                    args: TypeDeleteArgs {
                        name: qualified_type(app, schema),
                        delete_entities: true,
                        delete_related_fields: true,
                    },
                }],
            },
        }
    }

    /// Wire name of this command
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SchemaQuery { .. } => "fibery.schema/query",
            Self::SchemaBatch { .. } => "fibery.schema/batch",
            Self::EntityCreate { .. } => "fibery.entity/create",
            Self::EntityDelete { .. } => "fibery.entity/delete",
            Self::EntityQuery { .. } => "fibery.entity/query",
        }
    }
}

/// Arguments of `fibery.schema/batch`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaBatchArgs {
    /// Instructions in execution order
    pub commands: Vec<SchemaInstruction>,
}

/// Instruction inside a schema batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command")]
pub enum SchemaInstruction {
    /// Create a database
    #[serde(rename = "schema.type/create")]
    TypeCreate {
        /// Database to create
        args: TypeCreateArgs,
    },
    /// Delete a database
    #[serde(rename = "schema.type/delete")]
    TypeDelete {
        /// Database to delete
        args: TypeDeleteArgs,
    },
}

/// Database-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMeta {
    /// Shown as a database in the workspace
    #[serde(rename = "fibery/domain?")]
    pub domain: bool,
    /// Access controlled
    #[serde(rename = "fibery/secured?")]
    pub secured: bool,
    /// Display color
    #[serde(rename = "ui/color")]
    pub color: String,
}

impl Default for TypeMeta {
    fn default() -> Self {
        Self {
            domain: true,
            secured: true,
            color: DATABASE_COLOR.to_string(),
        }
    }
}

/// Arguments of `schema.type/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCreateArgs {
    /// Qualified database name
    #[serde(rename = "fibery/name")]
    pub name: String,
    /// Database metadata
    #[serde(rename = "fibery/meta")]
    pub meta: TypeMeta,
    /// Title, system and declared fields
    #[serde(rename = "fibery/fields")]
    pub fields: Vec<FieldDescriptor>,
}

impl From<SchemaDescriptor> for TypeCreateArgs {
    fn from(schema: SchemaDescriptor) -> Self {
        Self {
            name: schema.qualified_name(),
            meta: TypeMeta::default(),
            fields: schema.fields,
        }
    }
}

/// Arguments of `schema.type/delete`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDeleteArgs {
    /// Qualified database name
    pub name: String,
    /// Drop the entities with the database
    #[serde(rename = "delete-entities?")]
    pub delete_entities: bool,
    /// Drop fields in other databases that point here
    #[serde(rename = "delete-related-fields?")]
    pub delete_related_fields: bool,
}

/// Arguments of entity create/delete
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityArgs {
    /// Qualified database name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Qualified attributes, `fibery/id` included
    pub entity: Map<String, Value>,
}

/// Arguments of `fibery.entity/query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryArgs {
    /// Query body
    pub query: Query,
}

/// Entity query body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// Qualified database name
    #[serde(rename = "q/from")]
    pub from: String,
    /// Qualified attributes to project
    #[serde(rename = "q/select")]
    pub select: Vec<String>,
    /// Row limit
    #[serde(rename = "q/limit")]
    pub limit: QueryLimit,
}

/// Row limit of an entity query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryLimit {
    /// Every matching row (`"q/no-limit"`)
    #[default]
    Unbounded,
    /// At most this many rows
    Count(u64),
}

impl Serialize for QueryLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unbounded => serializer.serialize_str("q/no-limit"),
            Self::Count(n) => serializer.serialize_u64(*n),
        }
    }
}
