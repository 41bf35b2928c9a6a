//! Index creation and existence checks.

use tracing::info;

use super::{ExecutionOptions, IndexMetadata, SchemaAccessor};
use crate::error::{Result, SchemaError};

pub struct SchemaCreator {
    accessor: SchemaAccessor,
}

impl SchemaCreator {
    pub fn new(accessor: SchemaAccessor) -> Self {
        Self { accessor }
    }

    /// Create the index unconditionally
    pub async fn create_index(&self, metadata: &IndexMetadata) -> Result<()> {
        self.accessor.create_index(metadata).await?;
        info!("Created index '{}'", metadata.name);
        Ok(())
    }

    /// Create the index unless it exists; `true` if it was created
    pub async fn create_index_if_absent(&self, metadata: &IndexMetadata) -> Result<bool> {
        let created = self.accessor.create_index_if_absent(metadata).await?;
        if created {
            info!("Created index '{}'", metadata.name);
        } else {
            info!("Index '{}' already exists, skipping creation", metadata.name);
        }
        Ok(created)
    }

    /// Fail unless the index exists, then wait until it reaches the required status
    pub async fn check_index_exists(&self, name: &str, options: &ExecutionOptions) -> Result<()> {
        if !self.accessor.index_exists(name).await? {
            return Err(SchemaError::IndexMissing {
                index: name.to_string(),
            });
        }
        self.accessor.wait_for_index_status(name, options).await
    }
}
