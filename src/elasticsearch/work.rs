//! Schema-level work units and the orchestrator that executes them.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::schema::{IndexSettings, IndexStatus, RootTypeMapping};

/// One remote schema operation against a single index
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaWork {
    CreateIndex {
        index: String,
        body: Value,
        /// Report an already existing index as `Created(false)` instead of failing
        ignore_existing: bool,
    },
    IndexExists {
        index: String,
    },
    GetMapping {
        index: String,
        type_name: Option<String>,
    },
    GetSettings {
        index: String,
    },
    PutMapping {
        index: String,
        body: Value,
    },
    PutSettings {
        index: String,
        body: Value,
    },
    CloseIndex {
        index: String,
    },
    OpenIndex {
        index: String,
    },
    DropIndex {
        index: String,
        /// Report a missing index as `Dropped(false)` instead of failing
        ignore_missing: bool,
    },
    WaitForStatus {
        index: String,
        status: IndexStatus,
        timeout_ms: u64,
    },
}

impl SchemaWork {
    /// Index the work targets; work on the same index is serialized
    pub fn index(&self) -> &str {
        match self {
            SchemaWork::CreateIndex { index, .. }
            | SchemaWork::IndexExists { index }
            | SchemaWork::GetMapping { index, .. }
            | SchemaWork::GetSettings { index }
            | SchemaWork::PutMapping { index, .. }
            | SchemaWork::PutSettings { index, .. }
            | SchemaWork::CloseIndex { index }
            | SchemaWork::OpenIndex { index }
            | SchemaWork::DropIndex { index, .. }
            | SchemaWork::WaitForStatus { index, .. } => index,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SchemaWork::CreateIndex { .. } => "create_index",
            SchemaWork::IndexExists { .. } => "index_exists",
            SchemaWork::GetMapping { .. } => "get_mapping",
            SchemaWork::GetSettings { .. } => "get_settings",
            SchemaWork::PutMapping { .. } => "put_mapping",
            SchemaWork::PutSettings { .. } => "put_settings",
            SchemaWork::CloseIndex { .. } => "close_index",
            SchemaWork::OpenIndex { .. } => "open_index",
            SchemaWork::DropIndex { .. } => "drop_index",
            SchemaWork::WaitForStatus { .. } => "wait_for_status",
        }
    }
}

/// Typed outcome of a work unit
#[derive(Debug, Clone, PartialEq)]
pub enum WorkResult {
    /// Whether the index was newly created
    Created(bool),
    Exists(bool),
    /// `None` when the index does not exist
    Mapping(Option<RootTypeMapping>),
    /// `None` when the index does not exist
    Settings(Option<IndexSettings>),
    /// Whether an index was actually deleted
    Dropped(bool),
    Acknowledged,
}

/// Executes schema work units.
///
/// Implementations keep at most one work unit in flight per index, in submission
/// order, while work on different indexes may run concurrently.
#[async_trait]
pub trait WorkOrchestrator: Send + Sync {
    async fn submit(&self, work: SchemaWork) -> Result<WorkResult>;
}
