//! Validation context frames and the event contexts they collapse into.

use std::fmt;

/// Kind of structure the validator is currently descending into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationContextType {
    Index,
    MappingProperty,
    MappingPropertyField,
    Analyzer,
    Normalizer,
    CharFilter,
    Tokenizer,
    TokenFilter,
}

/// One frame of the validation context stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContextElement {
    pub context_type: ValidationContextType,
    pub name: String,
}

/// A location element attached to a reported validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventContextElement {
    Index(String),
    FieldPath(String),
    Analyzer(String),
    Normalizer(String),
    CharFilter(String),
    Tokenizer(String),
    TokenFilter(String),
}

impl fmt::Display for EventContextElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventContextElement::Index(name) => write!(f, "index '{}'", name),
            EventContextElement::FieldPath(path) => write!(f, "field '{}'", path),
            EventContextElement::Analyzer(name) => write!(f, "analyzer '{}'", name),
            EventContextElement::Normalizer(name) => write!(f, "normalizer '{}'", name),
            EventContextElement::CharFilter(name) => write!(f, "char filter '{}'", name),
            EventContextElement::Tokenizer(name) => write!(f, "tokenizer '{}'", name),
            EventContextElement::TokenFilter(name) => write!(f, "token filter '{}'", name),
        }
    }
}

/// Collapse a context stack, outermost first, into event context elements.
///
/// Consecutive property/field frames become a single `FieldPath`; any other frame
/// flushes the pending path, then appears on its own.
pub fn collapse(stack: &[ValidationContextElement]) -> Vec<EventContextElement> {
    let mut result = Vec::new();
    let mut path = String::new();

    for element in stack {
        let make: fn(String) -> EventContextElement = match element.context_type {
            ValidationContextType::MappingProperty
            | ValidationContextType::MappingPropertyField => {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(&element.name);
                continue;
            }
            ValidationContextType::Index => EventContextElement::Index,
            ValidationContextType::Analyzer => EventContextElement::Analyzer,
            ValidationContextType::Normalizer => EventContextElement::Normalizer,
            ValidationContextType::CharFilter => EventContextElement::CharFilter,
            ValidationContextType::Tokenizer => EventContextElement::Tokenizer,
            ValidationContextType::TokenFilter => EventContextElement::TokenFilter,
        };

        if !path.is_empty() {
            result.push(EventContextElement::FieldPath(std::mem::take(&mut path)));
        }
        result.push(make(element.name.clone()));
    }

    if !path.is_empty() {
        result.push(EventContextElement::FieldPath(path));
    }

    result
}
