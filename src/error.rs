//! Error types for schema lifecycle operations.

use thiserror::Error;

use crate::schema::ValidationError;

/// Errors raised while creating, dropping, migrating or validating an index schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Fetching the actual mapping or settings of an index failed
    #[error("Unable to retrieve the current schema of index '{index}' for validation: {source}")]
    Retrieval {
        index: String,
        #[source]
        source: Box<SchemaError>,
    },

    /// The cluster rejected an index creation request
    #[error("Unable to create index '{index}': {message}")]
    IndexCreation { index: String, message: String },

    /// The cluster rejected a settings update
    #[error("Unable to update settings of index '{index}': {message}")]
    SettingsUpdate { index: String, message: String },

    /// The cluster rejected a mapping update
    #[error("Unable to create or update the mapping of index '{index}': {message}")]
    MappingUpdate { index: String, message: String },

    /// The index did not reach the required health status in time
    #[error(
        "Index '{index}' did not reach status '{required_status}' within {timeout_ms}ms: {message}"
    )]
    StatusWait {
        index: String,
        required_status: String,
        timeout_ms: u64,
        message: String,
    },

    /// The index does not exist although it was required to
    #[error("Index '{index}' does not exist")]
    IndexMissing { index: String },

    /// Wraps the first failure met while updating the schema of an index
    #[error("Unable to update the schema of index '{index}': {source}")]
    SchemaUpdate {
        index: String,
        #[source]
        source: Box<SchemaError>,
    },

    /// The actual schema of an index does not match the expected one
    #[error("Schema validation failed for index '{index}':{}", format_errors(.errors))]
    Validation {
        index: String,
        errors: Vec<ValidationError>,
    },

    /// A remote operation failed for a reason with no dedicated variant
    #[error("Request '{operation}' on index '{index}' failed: {message}")]
    Request {
        index: String,
        operation: &'static str,
        message: String,
    },

    /// A step failed, then the cleanup that had to run after it failed too
    #[error("{primary}; in addition, cleanup failed: {cleanup}")]
    Cleanup {
        primary: Box<SchemaError>,
        cleanup: Box<SchemaError>,
    },

    /// The orchestrator answered a work unit with a result of the wrong kind
    #[error("Unexpected result for work '{work}': {result}")]
    UnexpectedResult { work: &'static str, result: String },

    /// Transport-level errors from the Elasticsearch client
    #[error("Elasticsearch error: {0}")]
    Http(#[from] elasticsearch::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

impl SchemaError {
    /// Wrap a failure met while updating the schema of `index`.
    pub fn schema_update(index: &str, source: SchemaError) -> Self {
        SchemaError::SchemaUpdate {
            index: index.to_string(),
            source: Box::new(source),
        }
    }

    /// Wrap a failure met while fetching the actual schema of `index`.
    pub fn retrieval(index: &str, source: SchemaError) -> Self {
        SchemaError::Retrieval {
            index: index.to_string(),
            source: Box::new(source),
        }
    }

    /// Combine a primary failure with a failing cleanup step.
    pub fn with_cleanup_failure(self, cleanup: SchemaError) -> Self {
        SchemaError::Cleanup {
            primary: Box::new(self),
            cleanup: Box::new(cleanup),
        }
    }
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| format!("\n    {}", e)).collect()
}
