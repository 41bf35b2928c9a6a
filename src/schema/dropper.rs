//! Index deletion.

use tracing::{debug, info};

use super::SchemaAccessor;
use crate::error::Result;

pub struct SchemaDropper {
    accessor: SchemaAccessor,
}

impl SchemaDropper {
    pub fn new(accessor: SchemaAccessor) -> Self {
        Self { accessor }
    }

    /// Delete the index if it exists.
    ///
    /// The drop itself tolerates a missing index; probing first keeps the cluster's
    /// own log free of "index not found" noise.
    pub async fn drop_if_existing(&self, name: &str) -> Result<()> {
        if !self.accessor.index_exists(name).await? {
            debug!("Index '{}' does not exist, nothing to drop", name);
            return Ok(());
        }

        if self.accessor.drop_index_if_existing(name).await? {
            info!("Dropped index '{}'", name);
        }
        Ok(())
    }
}
