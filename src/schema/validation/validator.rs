//! Structural comparison of an expected index schema against the actual one.
//!
//! Only what the expected schema declares is checked: attributes, properties or
//! analysis parameters that exist solely on the cluster are ignored, so operators
//! can tune settings this crate does not model.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::debug;

use super::collector::{ContextualFailureCollector, ValidationErrorCollector};
use super::context::ValidationContextType;
use crate::schema::{
    Analysis, AnalysisComponentDefinition, AnalyzerDefinition, DynamicType, IndexMetadata,
    IndexSettings, NamedDynamicTemplate, NormalizerDefinition, PropertyMapping, RootTypeMapping,
};

const DEFAULT_ANALYZER: &str = "default";
const DEFAULT_DATE_FORMAT: &str = "strict_date_optional_time||epoch_millis";
const DEFAULT_MAX_RESULT_WINDOW: u32 = 10_000;
const OBJECT_TYPE: &str = "object";

/// Compares expected and actual index metadata
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Report every mismatch between `expected` and `actual` to `failures`
    pub fn validate(
        &self,
        expected: &IndexMetadata,
        actual: &IndexMetadata,
        failures: &mut dyn ContextualFailureCollector,
    ) {
        let mut errors = ValidationErrorCollector::new();
        {
            let mut index = errors.enter(ValidationContextType::Index, &expected.name);
            validate_mapping(&mut index, &expected.mapping, &actual.mapping);
            validate_settings(&mut index, &expected.settings, &actual.settings);
        }

        let errors = errors.into_errors();
        debug!(
            "Validated index '{}': {} mismatches",
            expected.name,
            errors.len()
        );
        for error in errors {
            failures.add_failure(error);
        }
    }

    /// Whether the actual settings satisfy the expected ones; mappings are not compared
    pub fn is_settings_valid(&self, expected: &IndexMetadata, actual: &IndexMetadata) -> bool {
        self.settings_satisfied(&expected.settings, &actual.settings)
    }

    /// Whether `actual` holds every setting declared in `expected`
    pub fn settings_satisfied(&self, expected: &IndexSettings, actual: &IndexSettings) -> bool {
        let mut errors = ValidationErrorCollector::flag_only();
        validate_settings(&mut errors, expected, actual);
        !errors.has_error()
    }
}

fn validate_mapping(
    errors: &mut ValidationErrorCollector,
    expected: &RootTypeMapping,
    actual: &RootTypeMapping,
) {
    validate_with_default(
        errors,
        "dynamic",
        expected.dynamic,
        actual.dynamic,
        DynamicType::True,
    );
    validate_with_default(
        errors,
        "_routing.required",
        expected.routing.as_ref().map(|r| r.required),
        actual.routing.as_ref().map(|r| r.required),
        false,
    );
    validate_properties(
        errors,
        ValidationContextType::MappingProperty,
        &expected.properties,
        &actual.properties,
    );
    validate_dynamic_templates(errors, &expected.dynamic_templates, &actual.dynamic_templates);
    validate_extra_attributes(errors, &expected.extra_attributes, &actual.extra_attributes);
}

fn validate_properties(
    errors: &mut ValidationErrorCollector,
    context_type: ValidationContextType,
    expected: &BTreeMap<String, PropertyMapping>,
    actual: &BTreeMap<String, PropertyMapping>,
) {
    for (name, expected_property) in expected {
        let mut scope = errors.enter(context_type, name);
        match actual.get(name) {
            Some(actual_property) => validate_property(&mut scope, expected_property, actual_property),
            None => scope.add_error(match context_type {
                ValidationContextType::MappingPropertyField => "Missing multi-field mapping",
                _ => "Missing property mapping",
            }),
        }
    }
}

fn validate_property(
    errors: &mut ValidationErrorCollector,
    expected: &PropertyMapping,
    actual: &PropertyMapping,
) {
    let expected_type = expected.data_type.as_deref().unwrap_or(OBJECT_TYPE);
    validate_with_default(
        errors,
        "type",
        expected.data_type.as_deref(),
        actual.data_type.as_deref(),
        OBJECT_TYPE,
    );

    validate_with_default(errors, "index", expected.index, actual.index, true);
    validate_with_default(
        errors,
        "norms",
        expected.norms,
        actual.norms,
        expected_type == "text",
    );
    validate_with_default(errors, "doc_values", expected.doc_values, actual.doc_values, true);
    validate_with_default(errors, "store", expected.store, actual.store, false);

    validate_with_default(
        errors,
        "analyzer",
        expected.analyzer.as_deref(),
        actual.analyzer.as_deref(),
        DEFAULT_ANALYZER,
    );
    // The search analyzer falls back to the index-time analyzer
    let actual_analyzer = actual.analyzer.as_deref().unwrap_or(DEFAULT_ANALYZER);
    validate_with_default(
        errors,
        "search_analyzer",
        expected.search_analyzer.as_deref(),
        actual.search_analyzer.as_deref(),
        actual_analyzer,
    );
    validate_equal(
        errors,
        "normalizer",
        expected.normalizer.as_deref(),
        actual.normalizer.as_deref(),
    );
    validate_with_default(
        errors,
        "term_vector",
        expected.term_vector.as_deref(),
        actual.term_vector.as_deref(),
        "no",
    );
    validate_format(errors, expected_type, expected.format.as_deref(), actual.format.as_deref());

    if let Some(expected_factor) = expected.scaling_factor {
        if actual.scaling_factor != Some(expected_factor) {
            errors.add_error(invalid_value(
                "scaling_factor",
                expected_factor,
                display_or_null(actual.scaling_factor),
            ));
        }
    }

    if let Some(expected_null) = &expected.null_value {
        let matches = actual
            .null_value
            .as_ref()
            .is_some_and(|actual_null| json_equivalent(expected_null, actual_null));
        if !matches {
            errors.add_error(invalid_value(
                "null_value",
                expected_null,
                display_or_null(actual.null_value.as_ref()),
            ));
        }
    }

    validate_with_default(
        errors,
        "dynamic",
        expected.dynamic,
        actual.dynamic,
        DynamicType::True,
    );
    validate_properties(
        errors,
        ValidationContextType::MappingProperty,
        &expected.properties,
        &actual.properties,
    );
    validate_extra_attributes(errors, &expected.extra_attributes, &actual.extra_attributes);
    validate_properties(
        errors,
        ValidationContextType::MappingPropertyField,
        &expected.fields,
        &actual.fields,
    );
}

fn validate_format(
    errors: &mut ValidationErrorCollector,
    expected_type: &str,
    expected: Option<&str>,
    actual: Option<&str>,
) {
    let Some(expected) = expected else {
        return;
    };
    let actual = match actual {
        Some(format) => Some(format),
        None if expected_type == "date" => Some(DEFAULT_DATE_FORMAT),
        None => None,
    };

    let expected_formats: Vec<&str> = expected.split("||").map(str::trim).collect();
    let actual_formats: Option<Vec<&str>> =
        actual.map(|a| a.split("||").map(str::trim).collect());
    if actual_formats.as_ref() != Some(&expected_formats) {
        errors.add_error(invalid_value("format", expected, display_or_null(actual)));
    }
}

fn validate_dynamic_templates(
    errors: &mut ValidationErrorCollector,
    expected: &[NamedDynamicTemplate],
    actual: &[NamedDynamicTemplate],
) {
    for expected_template in expected {
        match actual.iter().find(|t| t.name == expected_template.name) {
            None => errors.add_error(format!(
                "Missing dynamic field template '{}'",
                expected_template.name
            )),
            Some(actual_template) => {
                let expected_json = serde_json::to_value(&expected_template.template);
                let actual_json = serde_json::to_value(&actual_template.template);
                let matches = match (&expected_json, &actual_json) {
                    (Ok(e), Ok(a)) => json_equivalent(e, a),
                    _ => false,
                };
                if !matches {
                    errors.add_error(format!(
                        "Invalid dynamic field template '{}'. Expected '{}', actual is '{}'",
                        expected_template.name,
                        to_json_string(&expected_template.template),
                        to_json_string(&actual_template.template)
                    ))
                }
            }
        }
    }
}

/// Compare attributes the model keeps verbatim; actual-only attributes are ignored
fn validate_extra_attributes(
    errors: &mut ValidationErrorCollector,
    expected: &BTreeMap<String, Value>,
    actual: &BTreeMap<String, Value>,
) {
    for (name, expected_value) in expected {
        let actual_value = actual.get(name);
        if !actual_value.is_some_and(|a| json_equivalent(expected_value, a)) {
            errors.add_error(invalid_value(
                name,
                expected_value,
                display_or_null(actual_value),
            ));
        }
    }
}

fn validate_settings(
    errors: &mut ValidationErrorCollector,
    expected: &IndexSettings,
    actual: &IndexSettings,
) {
    validate_with_default(
        errors,
        "max_result_window",
        expected.max_result_window,
        actual.max_result_window,
        DEFAULT_MAX_RESULT_WINDOW,
    );
    validate_analysis(errors, &expected.analysis, &actual.analysis);
    validate_extra_attributes(errors, &expected.extra_settings, &actual.extra_settings);
}

fn validate_analysis(errors: &mut ValidationErrorCollector, expected: &Analysis, actual: &Analysis) {
    validate_named(
        errors,
        ValidationContextType::Analyzer,
        "Missing analyzer",
        &expected.analyzer,
        &actual.analyzer,
        validate_analyzer,
    );
    validate_named(
        errors,
        ValidationContextType::Normalizer,
        "Missing normalizer",
        &expected.normalizer,
        &actual.normalizer,
        validate_normalizer,
    );
    validate_named(
        errors,
        ValidationContextType::CharFilter,
        "Missing char filter",
        &expected.char_filter,
        &actual.char_filter,
        validate_component,
    );
    validate_named(
        errors,
        ValidationContextType::Tokenizer,
        "Missing tokenizer",
        &expected.tokenizer,
        &actual.tokenizer,
        validate_component,
    );
    validate_named(
        errors,
        ValidationContextType::TokenFilter,
        "Missing token filter",
        &expected.filter,
        &actual.filter,
        validate_component,
    );
}

/// Validate each expected named definition under its own context frame
fn validate_named<T>(
    errors: &mut ValidationErrorCollector,
    context_type: ValidationContextType,
    missing_message: &str,
    expected: &BTreeMap<String, T>,
    actual: &BTreeMap<String, T>,
    validate: fn(&mut ValidationErrorCollector, &T, &T),
) {
    for (name, expected_definition) in expected {
        let mut scope = errors.enter(context_type, name);
        match actual.get(name) {
            Some(actual_definition) => validate(&mut scope, expected_definition, actual_definition),
            None => scope.add_error(missing_message),
        }
    }
}

fn validate_analyzer(
    errors: &mut ValidationErrorCollector,
    expected: &AnalyzerDefinition,
    actual: &AnalyzerDefinition,
) {
    validate_equal(
        errors,
        "type",
        expected.analyzer_type.as_deref(),
        actual.analyzer_type.as_deref(),
    );
    validate_equal(
        errors,
        "tokenizer",
        expected.tokenizer.as_deref(),
        actual.tokenizer.as_deref(),
    );
    validate_list(errors, "char_filter", &expected.char_filter, &actual.char_filter);
    validate_list(errors, "filter", &expected.filter, &actual.filter);
    validate_parameters(errors, &expected.parameters, &actual.parameters);
}

fn validate_normalizer(
    errors: &mut ValidationErrorCollector,
    expected: &NormalizerDefinition,
    actual: &NormalizerDefinition,
) {
    validate_equal(
        errors,
        "type",
        expected.normalizer_type.as_deref(),
        actual.normalizer_type.as_deref(),
    );
    validate_list(errors, "char_filter", &expected.char_filter, &actual.char_filter);
    validate_list(errors, "filter", &expected.filter, &actual.filter);
    validate_parameters(errors, &expected.parameters, &actual.parameters);
}

fn validate_component(
    errors: &mut ValidationErrorCollector,
    expected: &AnalysisComponentDefinition,
    actual: &AnalysisComponentDefinition,
) {
    validate_equal(
        errors,
        "type",
        expected.component_type.as_deref(),
        actual.component_type.as_deref(),
    );
    validate_parameters(errors, &expected.parameters, &actual.parameters);
}

fn validate_parameters(
    errors: &mut ValidationErrorCollector,
    expected: &BTreeMap<String, Value>,
    actual: &BTreeMap<String, Value>,
) {
    for (name, expected_value) in expected {
        match actual.get(name) {
            None => errors.add_error(format!(
                "Missing value for parameter '{}'. Expected '{}'",
                name, expected_value
            )),
            Some(actual_value) if !json_equivalent(expected_value, actual_value) => {
                errors.add_error(format!(
                    "Invalid value for parameter '{}'. Expected '{}', actual is '{}'",
                    name, expected_value, actual_value
                ))
            }
            Some(_) => {}
        }
    }
}

fn validate_list(
    errors: &mut ValidationErrorCollector,
    attribute: &str,
    expected: &[String],
    actual: &[String],
) {
    if !expected.is_empty() && expected != actual {
        errors.add_error(invalid_value(
            attribute,
            format!("[{}]", expected.join(", ")),
            format!("[{}]", actual.join(", ")),
        ));
    }
}

/// Compare an attribute the cluster may omit when it holds its default value
fn validate_with_default<T: PartialEq + Display + Copy>(
    errors: &mut ValidationErrorCollector,
    attribute: &str,
    expected: Option<T>,
    actual: Option<T>,
    default: T,
) {
    let Some(expected) = expected else {
        return;
    };
    let actual = actual.unwrap_or(default);
    if expected != actual {
        errors.add_error(invalid_value(attribute, expected, actual));
    }
}

/// Compare an attribute that has no default
fn validate_equal<T: PartialEq + Display + Copy>(
    errors: &mut ValidationErrorCollector,
    attribute: &str,
    expected: Option<T>,
    actual: Option<T>,
) {
    let Some(expected) = expected else {
        return;
    };
    if actual != Some(expected) {
        errors.add_error(invalid_value(attribute, expected, display_or_null(actual)));
    }
}

fn invalid_value(attribute: &str, expected: impl Display, actual: impl Display) -> String {
    format!(
        "Invalid value for attribute '{}'. Expected '{}', actual is '{}'",
        attribute, expected, actual
    )
}

fn display_or_null<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "null".to_string())
}

fn to_json_string<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("<{}>", e))
}

/// Lenient JSON equivalence as the cluster echoes values back.
///
/// Scalars match their string rendering (`1` ≡ `"1"`), a single-element array matches
/// its element, and objects match when every expected key matches.
pub fn json_equivalent(expected: &Value, actual: &Value) -> bool {
    if expected == actual {
        return true;
    }
    match (expected, actual) {
        (Value::Number(_) | Value::Bool(_), Value::String(s)) => expected.to_string() == *s,
        (Value::String(s), Value::Number(_) | Value::Bool(_)) => *s == actual.to_string(),
        (Value::Array(e), Value::Array(a)) => {
            e.len() == a.len() && e.iter().zip(a).all(|(e, a)| json_equivalent(e, a))
        }
        (Value::Array(e), _) if e.len() == 1 => json_equivalent(&e[0], actual),
        (_, Value::Array(a)) if a.len() == 1 => json_equivalent(expected, &a[0]),
        (Value::Object(e), Value::Object(a)) => e
            .iter()
            .all(|(key, e)| a.get(key).is_some_and(|a| json_equivalent(e, a))),
        _ => false,
    }
}
