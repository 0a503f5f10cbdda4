//! Fibery Client - typed access to the Fibery commands API
//!
//! Covers the database lifecycle:
//! - Verifying the endpoint and token
//! - Creating a database from an ordered field declaration
//! - Adding, querying and deleting entities in one batch each
//! - Deleting the database with its entities
//!
//! # Example
//!
//! ```rust,ignore
//! use fibery_client::{ClientConfig, FiberyClient, TracingLog};
//!
//! # async fn example() -> Result<(), fibery_client::FiberyError> {
//! let config = ClientConfig::new("https://acme.fibery.io/api/commands", "token");
//! let client = FiberyClient::connect(&config, TracingLog::shared("fibery"))?;
//!
//! client.verify().await?;
//! let fields = [("Name".to_string(), "text".to_string())].into_iter().collect();
//! client.create_schema("TestSpace", "People", &fields).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod field_type;
pub mod identity;
pub mod log;
pub mod schema;
pub mod transport;

// Re-exports for convenience
pub use client::{last_segment, result_rows, FiberyClient, Record};
pub use command::{Command, QueryLimit};
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use error::{FiberyError, FiberyResult, TransportError};
pub use field_type::FieldType;
pub use identity::{IdentityKeys, RecordIdentity};
pub use log::{LogSink, TracingLog};
pub use schema::{FieldDescriptor, FieldMeta, SchemaDescriptor, SYSTEM_FIELDS};
pub use transport::{HttpTransport, RemoteResponse, Transport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
