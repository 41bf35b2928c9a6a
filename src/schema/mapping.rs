//! Wire-level index mapping model.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// How the cluster treats fields absent from the mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicType {
    True,
    False,
    Strict,
}

impl DynamicType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DynamicType::True => "true",
            DynamicType::False => "false",
            DynamicType::Strict => "strict",
        }
    }
}

impl std::fmt::Display for DynamicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DynamicType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DynamicType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The cluster echoes back `true`/`false` either as booleans or as strings
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(true) => Ok(DynamicType::True),
            Raw::Bool(false) => Ok(DynamicType::False),
            Raw::Str(s) => match s.as_str() {
                "true" => Ok(DynamicType::True),
                "false" => Ok(DynamicType::False),
                "strict" => Ok(DynamicType::Strict),
                other => Err(serde::de::Error::custom(format!(
                    "invalid dynamic mapping type '{}'",
                    other
                ))),
            },
        }
    }
}

/// `_routing` meta-field of the root mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingMapping {
    #[serde(default)]
    pub required: bool,
}

/// Mapping of a single property, or of a multi-field attached to one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMapping {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<DynamicType>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyMapping>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, PropertyMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norms: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_values: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_vector: Option<String>,
    /// Attributes without a dedicated field (`ignore_above`, `copy_to`, ...), kept verbatim
    #[serde(flatten)]
    pub extra_attributes: BTreeMap<String, Value>,
}

impl PropertyMapping {
    /// Create a property of the given type with every other attribute left to the cluster default
    pub fn of_type(data_type: &str) -> Self {
        Self {
            data_type: Some(data_type.to_string()),
            ..Default::default()
        }
    }
}

/// Body of a dynamic template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_mapping_type: Option<String>,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_match: Option<String>,
    pub mapping: PropertyMapping,
    #[serde(flatten)]
    pub extra_attributes: BTreeMap<String, Value>,
}

/// A dynamic template together with its name.
///
/// On the wire each template is a single-key object: `{"name": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, DynamicTemplate>",
    into = "BTreeMap<String, DynamicTemplate>"
)]
pub struct NamedDynamicTemplate {
    pub name: String,
    pub template: DynamicTemplate,
}

impl TryFrom<BTreeMap<String, DynamicTemplate>> for NamedDynamicTemplate {
    type Error = String;

    fn try_from(map: BTreeMap<String, DynamicTemplate>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "a dynamic template must hold exactly one named entry, found {}",
                map.len()
            ));
        }
        let (name, template) = map
            .into_iter()
            .next()
            .ok_or_else(|| "empty dynamic template".to_string())?;
        Ok(Self { name, template })
    }
}

impl From<NamedDynamicTemplate> for BTreeMap<String, DynamicTemplate> {
    fn from(named: NamedDynamicTemplate) -> Self {
        let mut map = BTreeMap::new();
        map.insert(named.name, named.template);
        map
    }
}

/// Root of an index mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootTypeMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<DynamicType>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyMapping>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic_templates: Vec<NamedDynamicTemplate>,
    #[serde(rename = "_routing", default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingMapping>,
    /// Other root attributes such as `_source` or `_meta`
    #[serde(flatten)]
    pub extra_attributes: BTreeMap<String, Value>,
}

impl RootTypeMapping {
    /// Add a root property, replacing any previous one with the same name
    pub fn with_property(mut self, name: &str, property: PropertyMapping) -> Self {
        self.properties.insert(name.to_string(), property);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.dynamic.is_none()
            && self.properties.is_empty()
            && self.dynamic_templates.is_empty()
            && self.routing.is_none()
            && self.extra_attributes.is_empty()
    }
}
