//! Cedar - Elasticsearch index schema lifecycle management
//!
//! This library creates, drops, migrates and validates index schemas, and provides
//! the shared types used by the `schema-admin` binary.

pub mod config;
pub mod elasticsearch;
pub mod error;
pub mod schema;

pub use error::{Result, SchemaError};
pub use schema::{
    ExecutionOptions, IndexMetadata, IndexStatus, SchemaAdministrationClient,
    SchemaManagementStrategy, ValidationError, ValidationReport,
};
