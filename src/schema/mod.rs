//! Index schema model and lifecycle management.

mod accessor;
mod admin;
mod creator;
mod dropper;
mod finally;
mod mapping;
mod metadata;
mod migrator;
mod options;
mod settings;
mod strategy;
mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use accessor::SchemaAccessor;
pub use admin::SchemaAdministrationClient;
pub use creator::SchemaCreator;
pub use dropper::SchemaDropper;
pub use finally::with_finally;
pub use mapping::{
    DynamicTemplate, DynamicType, NamedDynamicTemplate, PropertyMapping, RootTypeMapping,
    RoutingMapping,
};
pub use metadata::IndexMetadata;
pub use migrator::SchemaMigrator;
pub use options::{ExecutionOptions, IndexStatus};
pub use settings::{
    Analysis, AnalysisComponentDefinition, AnalyzerDefinition, IndexSettings, NormalizerDefinition,
};
pub use strategy::SchemaManagementStrategy;
pub use validation::{
    json_equivalent, ContextGuard, ContextualFailureCollector, EventContextElement,
    SchemaValidator, ValidationContextElement, ValidationContextType, ValidationError,
    ValidationErrorCollector, ValidationReport,
};
