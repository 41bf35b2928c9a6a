//! Thin async wrapper issuing one schema work unit per call.

use std::sync::Arc;

use tracing::debug;

use super::{ExecutionOptions, IndexMetadata, IndexSettings};
use crate::elasticsearch::{SchemaWork, WorkOrchestrator, WorkResult};
use crate::error::{Result, SchemaError};

/// Issues schema operations through the work orchestrator
#[derive(Clone)]
pub struct SchemaAccessor {
    orchestrator: Arc<dyn WorkOrchestrator>,
}

impl SchemaAccessor {
    pub fn new(orchestrator: Arc<dyn WorkOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Create the index; fails if it already exists
    pub async fn create_index(&self, metadata: &IndexMetadata) -> Result<()> {
        let work = SchemaWork::CreateIndex {
            index: metadata.name.clone(),
            body: metadata.create_body()?,
            ignore_existing: false,
        };
        match self.orchestrator.submit(work).await? {
            WorkResult::Created(_) => Ok(()),
            other => Err(unexpected("create_index", other)),
        }
    }

    /// Create the index in a single round trip; `false` if it already existed
    pub async fn create_index_if_absent(&self, metadata: &IndexMetadata) -> Result<bool> {
        let work = SchemaWork::CreateIndex {
            index: metadata.name.clone(),
            body: metadata.create_body()?,
            ignore_existing: true,
        };
        match self.orchestrator.submit(work).await? {
            WorkResult::Created(created) => Ok(created),
            other => Err(unexpected("create_index", other)),
        }
    }

    pub async fn index_exists(&self, name: &str) -> Result<bool> {
        let work = SchemaWork::IndexExists {
            index: name.to_string(),
        };
        match self.orchestrator.submit(work).await? {
            WorkResult::Exists(exists) => Ok(exists),
            other => Err(unexpected("index_exists", other)),
        }
    }

    /// Fetch the actual mapping then settings of an index
    pub async fn get_current_index_metadata(
        &self,
        name: &str,
        type_name: Option<&str>,
    ) -> Result<IndexMetadata> {
        self.get_current_index_metadata_or_none(name, type_name)
            .await?
            .ok_or_else(|| {
                SchemaError::retrieval(
                    name,
                    SchemaError::IndexMissing {
                        index: name.to_string(),
                    },
                )
            })
    }

    /// Like [`Self::get_current_index_metadata`], but `None` when the index does not exist
    pub async fn get_current_index_metadata_or_none(
        &self,
        name: &str,
        type_name: Option<&str>,
    ) -> Result<Option<IndexMetadata>> {
        self.fetch_metadata(name, type_name)
            .await
            .map_err(|e| SchemaError::retrieval(name, e))
    }

    async fn fetch_metadata(
        &self,
        name: &str,
        type_name: Option<&str>,
    ) -> Result<Option<IndexMetadata>> {
        let mapping = match self
            .orchestrator
            .submit(SchemaWork::GetMapping {
                index: name.to_string(),
                type_name: type_name.map(str::to_string),
            })
            .await?
        {
            WorkResult::Mapping(Some(mapping)) => mapping,
            WorkResult::Mapping(None) => return Ok(None),
            other => return Err(unexpected("get_mapping", other)),
        };

        let settings = match self
            .orchestrator
            .submit(SchemaWork::GetSettings {
                index: name.to_string(),
            })
            .await?
        {
            WorkResult::Settings(Some(settings)) => settings,
            WorkResult::Settings(None) => return Ok(None),
            other => return Err(unexpected("get_settings", other)),
        };

        debug!("Fetched current schema of index '{}'", name);
        Ok(Some(IndexMetadata {
            name: name.to_string(),
            type_name: type_name.map(str::to_string),
            mapping,
            settings,
        }))
    }

    /// Apply the updatable part of `settings`; the index must be closed for analysis changes
    pub async fn update_settings(&self, name: &str, settings: &IndexSettings) -> Result<()> {
        let work = SchemaWork::PutSettings {
            index: name.to_string(),
            body: settings.to_update_body(),
        };
        match self.orchestrator.submit(work).await {
            Ok(WorkResult::Acknowledged) => Ok(()),
            Ok(other) => Err(unexpected("put_settings", other)),
            Err(SchemaError::Request { message, .. }) => Err(SchemaError::SettingsUpdate {
                index: name.to_string(),
                message,
            }),
            Err(e) => Err(e),
        }
    }

    pub async fn put_mapping(&self, metadata: &IndexMetadata) -> Result<()> {
        let work = SchemaWork::PutMapping {
            index: metadata.name.clone(),
            body: metadata.mapping_body()?,
        };
        match self.orchestrator.submit(work).await {
            Ok(WorkResult::Acknowledged) => Ok(()),
            Ok(other) => Err(unexpected("put_mapping", other)),
            Err(SchemaError::Request { message, .. }) => Err(SchemaError::MappingUpdate {
                index: metadata.name.clone(),
                message,
            }),
            Err(e) => Err(e),
        }
    }

    /// Wait until the index reaches at least the required status, within the configured timeout
    pub async fn wait_for_index_status(&self, name: &str, options: &ExecutionOptions) -> Result<()> {
        let work = SchemaWork::WaitForStatus {
            index: name.to_string(),
            status: options.required_status,
            timeout_ms: options.required_status_timeout_ms,
        };
        match self.orchestrator.submit(work).await {
            Ok(WorkResult::Acknowledged) => Ok(()),
            Ok(other) => Err(unexpected("wait_for_status", other)),
            Err(SchemaError::Request { message, .. }) => Err(SchemaError::StatusWait {
                index: name.to_string(),
                required_status: options.required_status.to_string(),
                timeout_ms: options.required_status_timeout_ms,
                message,
            }),
            Err(e) => Err(e),
        }
    }

    /// Delete the index; a missing index is not an error. `true` if something was deleted.
    pub async fn drop_index_if_existing(&self, name: &str) -> Result<bool> {
        let work = SchemaWork::DropIndex {
            index: name.to_string(),
            ignore_missing: true,
        };
        match self.orchestrator.submit(work).await? {
            WorkResult::Dropped(dropped) => Ok(dropped),
            other => Err(unexpected("drop_index", other)),
        }
    }

    pub async fn close_index(&self, name: &str) -> Result<()> {
        let work = SchemaWork::CloseIndex {
            index: name.to_string(),
        };
        match self.orchestrator.submit(work).await? {
            WorkResult::Acknowledged => Ok(()),
            other => Err(unexpected("close_index", other)),
        }
    }

    pub async fn open_index(&self, name: &str) -> Result<()> {
        let work = SchemaWork::OpenIndex {
            index: name.to_string(),
        };
        match self.orchestrator.submit(work).await? {
            WorkResult::Acknowledged => Ok(()),
            other => Err(unexpected("open_index", other)),
        }
    }
}

fn unexpected(work: &'static str, result: WorkResult) -> SchemaError {
    SchemaError::UnexpectedResult {
        work,
        result: format!("{:?}", result),
    }
}
