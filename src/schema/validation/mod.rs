//! Schema validation: context tracking, error collection and the validator itself.

mod collector;
mod context;
mod validator;

pub use collector::{
    ContextGuard, ContextualFailureCollector, ValidationErrorCollector, ValidationError,
    ValidationReport,
};
pub use context::{EventContextElement, ValidationContextElement, ValidationContextType};
pub use validator::{json_equivalent, SchemaValidator};
