//! Lifecycle operations on one index, composed from the creator, dropper,
//! migrator and validator.

use std::sync::Arc;

use tracing::{info, warn};

use super::{
    ContextualFailureCollector, ExecutionOptions, IndexMetadata, SchemaAccessor, SchemaCreator,
    SchemaDropper, SchemaMigrator, SchemaValidator,
};
use crate::elasticsearch::WorkOrchestrator;
use crate::error::Result;

/// Schema administration for a single index.
///
/// Holds the expected metadata for its whole lifetime so that later `update` and
/// `validate` calls compare against the schema declared at bootstrap.
pub struct SchemaAdministrationClient {
    expected: IndexMetadata,
    accessor: SchemaAccessor,
    creator: SchemaCreator,
    dropper: SchemaDropper,
    migrator: SchemaMigrator,
    validator: SchemaValidator,
}

impl SchemaAdministrationClient {
    pub fn new(orchestrator: Arc<dyn WorkOrchestrator>, expected: IndexMetadata) -> Self {
        let accessor = SchemaAccessor::new(orchestrator);
        let validator = SchemaValidator::new();
        Self {
            expected,
            creator: SchemaCreator::new(accessor.clone()),
            dropper: SchemaDropper::new(accessor.clone()),
            migrator: SchemaMigrator::new(accessor.clone(), validator),
            accessor,
            validator,
        }
    }

    pub fn expected(&self) -> &IndexMetadata {
        &self.expected
    }

    pub fn index_name(&self) -> &str {
        &self.expected.name
    }

    /// Create the index if it does not exist yet
    pub async fn create_if_absent(&self, options: &ExecutionOptions) -> Result<()> {
        self.creator.create_index_if_absent(&self.expected).await?;
        self.accessor
            .wait_for_index_status(self.index_name(), options)
            .await
    }

    /// Drop the index if it exists, then create it from scratch
    pub async fn drop_and_create(&self, options: &ExecutionOptions) -> Result<()> {
        self.dropper.drop_if_existing(self.index_name()).await?;
        self.creator.create_index(&self.expected).await?;
        self.accessor
            .wait_for_index_status(self.index_name(), options)
            .await
    }

    pub async fn drop_if_existing(&self, _options: &ExecutionOptions) -> Result<()> {
        self.dropper.drop_if_existing(self.index_name()).await
    }

    /// Create the index, or migrate it in place when it already exists
    pub async fn update(&self, options: &ExecutionOptions) -> Result<()> {
        let created = self.creator.create_index_if_absent(&self.expected).await?;
        if !created {
            self.migrator.migrate(&self.expected).await?;
        }
        self.accessor
            .wait_for_index_status(self.index_name(), options)
            .await
    }

    /// Check the index is usable, then report every schema mismatch to `failures`
    pub async fn validate(
        &self,
        options: &ExecutionOptions,
        failures: &mut dyn ContextualFailureCollector,
    ) -> Result<()> {
        self.creator
            .check_index_exists(self.index_name(), options)
            .await?;

        let actual = self
            .accessor
            .get_current_index_metadata(self.index_name(), self.expected.type_name.as_deref())
            .await?;

        let mut found = Vec::new();
        self.validator.validate(&self.expected, &actual, &mut found);
        if found.is_empty() {
            info!("Schema of index '{}' is valid", self.index_name());
        } else {
            warn!(
                "Schema of index '{}' has {} mismatches",
                self.index_name(),
                found.len()
            );
        }
        for failure in found {
            failures.add_failure(failure);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::schema::testing::{books_metadata, FakeCluster};
    use crate::schema::{PropertyMapping, RootTypeMapping, ValidationReport};

    fn title_only() -> IndexMetadata {
        IndexMetadata::new(
            "books",
            RootTypeMapping::default().with_property("title", PropertyMapping::of_type("text")),
            Default::default(),
        )
    }

    #[tokio::test]
    async fn test_update_creates_missing_index_without_migrating() {
        let cluster = Arc::new(FakeCluster::new());
        let client = SchemaAdministrationClient::new(cluster.clone(), books_metadata());

        client.update(&ExecutionOptions::default()).await.unwrap();

        assert_eq!(cluster.calls(), vec!["create_index", "wait_for_status"]);
        assert_eq!(cluster.count("put_mapping"), 0);
        assert_eq!(cluster.index("books").unwrap().mapping, books_metadata().mapping);
    }

    #[tokio::test]
    async fn test_update_migrates_existing_index() {
        let cluster = Arc::new(FakeCluster::new().with_index(title_only()));
        let client = SchemaAdministrationClient::new(cluster.clone(), books_metadata());

        client.update(&ExecutionOptions::default()).await.unwrap();

        assert_eq!(
            cluster.calls(),
            vec!["create_index", "put_mapping", "wait_for_status"]
        );
        let body = cluster.last_mapping_body("books").unwrap();
        assert_eq!(body["properties"]["price"]["type"], "double");
    }

    #[tokio::test]
    async fn test_drop_and_create() {
        let cluster = Arc::new(FakeCluster::new().with_index(title_only()));
        let client = SchemaAdministrationClient::new(cluster.clone(), books_metadata());

        client
            .drop_and_create(&ExecutionOptions::default())
            .await
            .unwrap();

        assert_eq!(
            cluster.calls(),
            vec!["index_exists", "drop_index", "create_index", "wait_for_status"]
        );
        assert!(cluster
            .index("books")
            .unwrap()
            .mapping
            .properties
            .contains_key("price"));
    }

    #[tokio::test]
    async fn test_create_if_absent_keeps_existing_index() {
        let cluster = Arc::new(FakeCluster::new().with_index(title_only()));
        let client = SchemaAdministrationClient::new(cluster.clone(), books_metadata());

        client
            .create_if_absent(&ExecutionOptions::default())
            .await
            .unwrap();

        assert_eq!(cluster.index("books").unwrap().mapping, title_only().mapping);
    }

    #[tokio::test]
    async fn test_validate_reports_missing_property() {
        let cluster = Arc::new(FakeCluster::new().with_index(title_only()));
        let client = SchemaAdministrationClient::new(cluster.clone(), books_metadata());

        let mut report = ValidationReport::new();
        client
            .validate(&ExecutionOptions::default(), &mut report)
            .await
            .unwrap();

        let rendered: Vec<String> = report.failures().iter().map(|f| f.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["index 'books', field 'price': Missing property mapping"]
        );
        assert_eq!(
            cluster.calls(),
            vec!["index_exists", "wait_for_status", "get_mapping", "get_settings"]
        );
    }

    #[tokio::test]
    async fn test_validate_requires_index() {
        let cluster = Arc::new(FakeCluster::new());
        let client = SchemaAdministrationClient::new(cluster, books_metadata());

        let mut report = ValidationReport::new();
        let err = client
            .validate(&ExecutionOptions::default(), &mut report)
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaError::IndexMissing { .. }));
        assert!(report.is_empty());
    }
}
