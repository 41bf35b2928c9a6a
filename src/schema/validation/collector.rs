//! Accumulates validation errors along with the location they were found at.

use std::fmt;
use std::ops::{Deref, DerefMut};

use super::context::{
    collapse, EventContextElement, ValidationContextElement, ValidationContextType,
};
use crate::error::{Result, SchemaError};

/// A single validation failure and where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub context: Vec<EventContextElement>,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.context.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", element)?;
        }
        if !self.context.is_empty() {
            f.write_str(": ")?;
        }
        f.write_str(&self.message)
    }
}

/// Receives validation failures; the caller decides how to report them
pub trait ContextualFailureCollector {
    fn add_failure(&mut self, error: ValidationError);
}

impl ContextualFailureCollector for Vec<ValidationError> {
    fn add_failure(&mut self, error: ValidationError) {
        self.push(error);
    }
}

/// Failure collector that turns into a single error listing every failure
#[derive(Debug, Default)]
pub struct ValidationReport {
    failures: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> &[ValidationError] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Ok` when nothing was reported, a `Validation` error otherwise
    pub fn into_result(self, index: &str) -> Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        Err(SchemaError::Validation {
            index: index.to_string(),
            errors: self.failures,
        })
    }
}

impl ContextualFailureCollector for ValidationReport {
    fn add_failure(&mut self, error: ValidationError) {
        self.failures.push(error);
    }
}

/// Tracks the validation context stack and the errors recorded under it.
///
/// Frames are entered through [`ValidationErrorCollector::enter`], whose guard pops
/// the frame when dropped, so the stack is balanced on every exit path.
#[derive(Debug)]
pub struct ValidationErrorCollector {
    stack: Vec<ValidationContextElement>,
    // None when only the error flag matters
    errors: Option<Vec<ValidationError>>,
    has_error: bool,
}

impl ValidationErrorCollector {
    /// Collector recording every error with its context path
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            errors: Some(Vec::new()),
            has_error: false,
        }
    }

    /// Collector recording only whether an error occurred
    pub fn flag_only() -> Self {
        Self {
            stack: Vec::new(),
            errors: None,
            has_error: false,
        }
    }

    /// Enter a context frame for the lifetime of the returned guard
    pub fn enter(&mut self, context_type: ValidationContextType, name: &str) -> ContextGuard<'_> {
        let pushed = self.errors.is_some();
        if pushed {
            self.push(context_type, name);
        }
        ContextGuard {
            collector: self,
            pushed,
        }
    }

    fn push(&mut self, context_type: ValidationContextType, name: &str) {
        self.stack.push(ValidationContextElement {
            context_type,
            name: name.to_string(),
        });
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    /// Record an error at the current context
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.has_error = true;
        if let Some(errors) = self.errors.as_mut() {
            errors.push(ValidationError {
                context: collapse(&self.stack),
                message: message.into(),
            });
        }
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors.unwrap_or_default()
    }
}

impl Default for ValidationErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope of one context frame; pops the frame on drop
pub struct ContextGuard<'a> {
    collector: &'a mut ValidationErrorCollector,
    pushed: bool,
}

impl Deref for ContextGuard<'_> {
    type Target = ValidationErrorCollector;

    fn deref(&self) -> &Self::Target {
        self.collector
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.collector
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        if self.pushed {
            self.collector.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ValidationContextType::*;

    #[test]
    fn test_nested_fields_collapse_into_one_path() {
        let mut collector = ValidationErrorCollector::new();
        {
            let mut book = collector.enter(MappingProperty, "addressBook");
            let mut entries = book.enter(MappingProperty, "entries");
            let mut email = entries.enter(MappingPropertyField, "email");
            email.add_error("Missing multi-field mapping");
        }

        let errors = collector.into_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].context,
            vec![EventContextElement::FieldPath(
                "addressBook.entries.email".to_string()
            )]
        );
    }

    #[test]
    fn test_non_field_frame_flushes_pending_path() {
        let mut collector = ValidationErrorCollector::new();
        {
            let mut bio = collector.enter(MappingPropertyField, "bio");
            let mut english = bio.enter(Analyzer, "english");
            english.add_error("Missing analyzer");
        }

        let errors = collector.into_errors();
        assert_eq!(
            errors[0].context,
            vec![
                EventContextElement::FieldPath("bio".to_string()),
                EventContextElement::Analyzer("english".to_string()),
            ]
        );
        assert_eq!(
            errors[0].to_string(),
            "field 'bio', analyzer 'english': Missing analyzer"
        );
    }

    #[test]
    fn test_guard_pops_on_early_return() {
        fn fail_inside(collector: &mut ValidationErrorCollector) -> Option<()> {
            let mut scope = collector.enter(Tokenizer, "ngram");
            scope.add_error("Missing tokenizer");
            let missing: Option<()> = None;
            missing?;
            Some(())
        }

        let mut collector = ValidationErrorCollector::new();
        assert!(fail_inside(&mut collector).is_none());
        assert_eq!(collector.depth(), 0);
        assert!(collector.has_error());
    }

    #[test]
    fn test_sibling_frames_do_not_leak() {
        let mut collector = ValidationErrorCollector::new();
        {
            let mut index = collector.enter(Index, "books");
            {
                let _title = index.enter(MappingProperty, "title");
            }
            let mut price = index.enter(MappingProperty, "price");
            price.add_error("Missing property mapping");
        }

        let errors = collector.into_errors();
        assert_eq!(
            errors[0].context,
            vec![
                EventContextElement::Index("books".to_string()),
                EventContextElement::FieldPath("price".to_string()),
            ]
        );
    }

    #[test]
    fn test_flag_only_records_no_paths() {
        let mut collector = ValidationErrorCollector::flag_only();
        {
            let mut scope = collector.enter(Analyzer, "english");
            assert_eq!(scope.depth(), 0);
            scope.add_error("Missing analyzer");
        }

        assert!(collector.has_error());
        assert!(collector.into_errors().is_empty());
    }

    #[test]
    fn test_report_into_result() {
        assert!(ValidationReport::new().into_result("books").is_ok());

        let mut report = ValidationReport::new();
        report.add_failure(ValidationError {
            context: vec![],
            message: "Missing property mapping".to_string(),
        });
        assert!(matches!(
            report.into_result("books"),
            Err(SchemaError::Validation { errors, .. }) if errors.len() == 1
        ));
    }
}
