//! Error types for the Fibery client
//!
//! Provides error handling for:
//! - Caller input rejected before any request is sent
//! - Transport failures and non-success HTTP statuses
//! - Remote refusals of schema creation

/// Main client error type
#[derive(Debug, thiserror::Error)]
pub enum FiberyError {
    /// Declared field type is not in the supported table
    #[error("field '{field}' has unsupported type '{field_type}', supported types: {supported}")]
    UnsupportedFieldType {
        /// Declared field name
        field: String,
        /// Declared logical type
        field_type: String,
        /// Comma separated list of supported logical types
        supported: String,
    },

    /// Transport failure or non-success HTTP status
    #[error("api error: {0}")]
    Api(String),

    /// Empty record list passed to a batch operation
    #[error("no data provided for entity operation")]
    NoDataProvided,

    /// Every record in a batch lacked an identity attribute
    #[error("no valid entities: every record is missing an identity attribute")]
    NoValidEntities,

    /// Empty projection passed to a query
    #[error("no fields provided for data retrieval")]
    NoFieldsRequested,

    /// Empty field map passed to schema creation
    #[error("no fields declared for database")]
    NoFieldsDeclared,

    /// Remote refused schema creation for a reason other than "already exists"
    #[error(
        "database '{schema}' was not created in app '{app}' (check that the app exists, \
         create it manually if needed): {message}"
    )]
    SchemaRejected {
        /// Schema name
        schema: String,
        /// Owning application
        app: String,
        /// Remote message
        message: String,
    },

    /// Client configuration rejected
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Payload serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FiberyError {
    /// Check if error was caused by caller input rather than the remote side
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFieldType { .. }
                | Self::NoDataProvided
                | Self::NoValidEntities
                | Self::NoFieldsRequested
                | Self::NoFieldsDeclared
        )
    }

    /// Create API error from status and body
    pub fn status(status: u16, body: impl AsRef<str>) -> Self {
        Self::Api(format!("{status}: {}", body.as_ref()))
    }

    /// Create API error for a body that does not have the expected shape
    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        Self::Api(format!("malformed response: {detail}"))
    }
}

/// Errors raised below the HTTP status level
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Request could not be sent or the response could not be read
    #[error("failed to send data to Fibery: {0}")]
    Send(String),

    /// Request did not complete within the configured timeout
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout
        timeout_secs: u64,
    },
}

impl From<TransportError> for FiberyError {
    fn from(err: TransportError) -> Self {
        Self::Api(err.to_string())
    }
}

/// Result type alias for client operations
pub type FiberyResult<T> = Result<T, FiberyError>;
