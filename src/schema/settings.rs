//! Wire-level index settings model.
//!
//! The cluster reports every setting value as a string (`"number_of_shards": "1"`),
//! so numeric knobs and list-valued references are read leniently.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Settings that can only change while the index is closed
const STATIC_SETTINGS: &[&str] = &[
    "analysis",
    "codec",
    "number_of_routing_shards",
    "routing_partition_size",
    "shard",
    "similarity",
    "soft_deletes",
    "sort",
    "store",
];

/// Whether a top-level setting requires closing the index to be updated
pub fn is_static_setting(name: &str) -> bool {
    STATIC_SETTINGS.contains(&name.strip_prefix("index.").unwrap_or(name))
}

/// Analyzer definition, either custom or a configured built-in type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub analyzer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub char_filter: Vec<String>,
    #[serde(
        default,
        deserialize_with = "string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub filter: Vec<String>,
    #[serde(flatten)]
    pub parameters: BTreeMap<String, Value>,
}

/// Normalizer definition: an analyzer without a tokenizer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizerDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub normalizer_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub char_filter: Vec<String>,
    #[serde(
        default,
        deserialize_with = "string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub filter: Vec<String>,
    #[serde(flatten)]
    pub parameters: BTreeMap<String, Value>,
}

/// Tokenizer, char filter or token filter definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisComponentDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(flatten)]
    pub parameters: BTreeMap<String, Value>,
}

impl AnalysisComponentDefinition {
    pub fn of_type(component_type: &str) -> Self {
        Self {
            component_type: Some(component_type.to_string()),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: &str, value: Value) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }
}

/// `analysis` section of the index settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub analyzer: BTreeMap<String, AnalyzerDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub normalizer: BTreeMap<String, NormalizerDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tokenizer: BTreeMap<String, AnalysisComponentDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub char_filter: BTreeMap<String, AnalysisComponentDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filter: BTreeMap<String, AnalysisComponentDefinition>,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.analyzer.is_empty()
            && self.normalizer.is_empty()
            && self.tokenizer.is_empty()
            && self.char_filter.is_empty()
            && self.filter.is_empty()
    }
}

/// Index-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub number_of_shards: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub number_of_replicas: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_result_window: Option<u32>,
    #[serde(default, skip_serializing_if = "Analysis::is_empty")]
    pub analysis: Analysis,
    /// Other settings (`refresh_interval`, `max_ngram_diff`, ...), kept verbatim
    #[serde(flatten)]
    pub extra_settings: BTreeMap<String, Value>,
}

impl IndexSettings {
    /// Whether these settings hold nothing a settings update could apply.
    ///
    /// Shard and replica counts only matter at creation time.
    pub fn is_empty(&self) -> bool {
        self.analysis.is_empty()
            && self.max_result_window.is_none()
            && self.extra_settings.is_empty()
    }

    /// The part of these settings that needs a closed index to be applied
    pub fn static_settings(&self) -> IndexSettings {
        IndexSettings {
            analysis: self.analysis.clone(),
            extra_settings: self
                .extra_settings
                .iter()
                .filter(|(name, _)| is_static_setting(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            ..Default::default()
        }
    }

    /// The part of these settings that can be applied to an open index
    pub fn dynamic_settings(&self) -> IndexSettings {
        IndexSettings {
            max_result_window: self.max_result_window,
            extra_settings: self
                .extra_settings
                .iter()
                .filter(|(name, _)| !is_static_setting(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            ..Default::default()
        }
    }

    /// Body of a settings update request: updatable settings only
    pub fn to_update_body(&self) -> Value {
        let mut body = Map::new();
        for (name, value) in &self.extra_settings {
            body.insert(name.clone(), value.clone());
        }
        if let Some(window) = self.max_result_window {
            body.insert("max_result_window".to_string(), json!(window));
        }
        if !self.analysis.is_empty() {
            // Serializing plain maps of serializable values cannot fail
            body.insert(
                "analysis".to_string(),
                serde_json::to_value(&self.analysis).unwrap_or(Value::Null),
            );
        }
        Value::Object(body)
    }
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u32),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) => s
            .parse::<u32>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid numeric setting '{}'", s))),
    }
}

fn string_or_seq<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(Raw::One(s)) => Ok(vec![s]),
        Some(Raw::Many(v)) => Ok(v),
    }
}
