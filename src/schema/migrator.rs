//! In-place schema migration of an existing index.
//!
//! Closing an index blocks readers and writers, so settings are only pushed when the
//! actual settings do not already satisfy the expected ones, and the index is only
//! closed around the update when a static setting differs. The mapping is pushed
//! whenever one is declared: the cluster merges it on its own.

use tracing::{debug, info};

use super::finally::with_finally;
use super::{IndexMetadata, SchemaAccessor, SchemaValidator};
use crate::error::{Result, SchemaError};

pub struct SchemaMigrator {
    accessor: SchemaAccessor,
    validator: SchemaValidator,
}

impl SchemaMigrator {
    pub fn new(accessor: SchemaAccessor, validator: SchemaValidator) -> Self {
        Self {
            accessor,
            validator,
        }
    }

    /// Bring an existing index in line with `expected`
    pub async fn migrate(&self, expected: &IndexMetadata) -> Result<()> {
        self.migrate_settings(expected)
            .await
            .map_err(|e| SchemaError::schema_update(&expected.name, e))?;
        self.migrate_mapping(expected)
            .await
            .map_err(|e| SchemaError::schema_update(&expected.name, e))
    }

    async fn migrate_settings(&self, expected: &IndexMetadata) -> Result<()> {
        let name = &expected.name;

        if expected.settings.is_empty() {
            debug!("No settings to migrate for index '{}'", name);
            return Ok(());
        }

        let actual = self
            .accessor
            .get_current_index_metadata_or_none(name, expected.type_name.as_deref())
            .await?
            .ok_or_else(|| SchemaError::IndexMissing {
                index: name.to_string(),
            })?;

        if self.validator.is_settings_valid(expected, &actual) {
            debug!("Settings of index '{}' are up to date", name);
            return Ok(());
        }

        let static_settings = expected.settings.static_settings();
        if self
            .validator
            .settings_satisfied(&static_settings, &actual.settings)
        {
            info!("Updating dynamic settings of index '{}'", name);
            return self
                .accessor
                .update_settings(name, &expected.settings.dynamic_settings())
                .await;
        }

        info!("Updating settings of closed index '{}'", name);
        self.accessor.close_index(name).await?;
        with_finally(
            self.accessor.update_settings(name, &expected.settings),
            self.accessor.open_index(name),
        )
        .await
    }

    async fn migrate_mapping(&self, expected: &IndexMetadata) -> Result<()> {
        if expected.mapping.is_empty() {
            debug!("No mapping to migrate for index '{}'", expected.name);
            return Ok(());
        }
        self.accessor.put_mapping(expected).await?;
        info!("Applied mapping to index '{}'", expected.name);
        Ok(())
    }
}
