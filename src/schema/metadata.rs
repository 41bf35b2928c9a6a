//! Index metadata: the value passed between every schema component.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{IndexSettings, RootTypeMapping};

/// Name, mapping and settings of one index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMetadata {
    pub name: String,
    /// Legacy document type; when set, mapping bodies are nested under it
    pub type_name: Option<String>,
    pub mapping: RootTypeMapping,
    pub settings: IndexSettings,
}

/// Expected schema document as stored on disk: `{"mappings": {...}, "settings": {...}}`
#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    type_name: Option<String>,
    #[serde(default)]
    mappings: RootTypeMapping,
    #[serde(default)]
    settings: IndexSettings,
}

impl IndexMetadata {
    pub fn new(name: &str, mapping: RootTypeMapping, settings: IndexSettings) -> Self {
        Self {
            name: name.to_string(),
            type_name: None,
            mapping,
            settings,
        }
    }

    pub fn with_type_name(mut self, type_name: &str) -> Self {
        self.type_name = Some(type_name.to_string());
        self
    }

    /// Parse an expected schema document for the index `name`
    pub fn from_schema_json(name: &str, json: &str) -> serde_json::Result<Self> {
        let doc: SchemaDocument = serde_json::from_str(json)?;
        Ok(Self {
            name: name.to_string(),
            type_name: doc.type_name,
            mapping: doc.mappings,
            settings: doc.settings,
        })
    }

    /// Mapping as sent to the cluster
    pub fn mapping_body(&self) -> serde_json::Result<Value> {
        let mapping = serde_json::to_value(&self.mapping)?;
        Ok(match &self.type_name {
            Some(type_name) => json!({ type_name.as_str(): mapping }),
            None => mapping,
        })
    }

    /// Body of an index creation request
    pub fn create_body(&self) -> serde_json::Result<Value> {
        Ok(json!({
            "settings": serde_json::to_value(&self.settings)?,
            "mappings": self.mapping_body()?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyMapping;

    const BOOKS_SCHEMA: &str = include_str!("../../schema/books.json");

    #[test]
    fn test_load_sample_schema() {
        let metadata = IndexMetadata::from_schema_json("books", BOOKS_SCHEMA).unwrap();
        assert_eq!(metadata.name, "books");
        assert!(metadata.mapping.properties.contains_key("title"));
        assert!(metadata.mapping.properties.contains_key("price"));
        assert!(!metadata.settings.is_empty());
    }

    #[test]
    fn test_create_body_keeps_declared_attributes() {
        let json = r#"{
            "mappings": {
                "_source": { "enabled": false },
                "properties": {
                    "all": { "type": "text" },
                    "isbn": { "type": "keyword", "ignore_above": 32, "copy_to": "all" }
                }
            },
            "settings": {
                "refresh_interval": "30s",
                "max_ngram_diff": 5,
                "analysis": {
                    "tokenizer": { "ng": { "type": "ngram", "min_gram": 2, "max_gram": 7 } }
                }
            }
        }"#;

        let metadata = IndexMetadata::from_schema_json("books", json).unwrap();
        let body = metadata.create_body().unwrap();

        let isbn = &body["mappings"]["properties"]["isbn"];
        assert_eq!(isbn["ignore_above"], json!(32));
        assert_eq!(isbn["copy_to"], json!("all"));
        assert_eq!(body["mappings"]["_source"], json!({ "enabled": false }));
        assert_eq!(body["settings"]["refresh_interval"], json!("30s"));
        assert_eq!(body["settings"]["max_ngram_diff"], json!(5));
        assert_eq!(body["settings"]["analysis"]["tokenizer"]["ng"]["max_gram"], json!(7));
    }

    #[test]
    fn test_create_body_nests_legacy_type() {
        let mapping =
            RootTypeMapping::default().with_property("title", PropertyMapping::of_type("text"));
        let metadata =
            IndexMetadata::new("books", mapping, IndexSettings::default()).with_type_name("_doc");

        let body = metadata.create_body().unwrap();
        assert_eq!(body["mappings"]["_doc"]["properties"]["title"]["type"], json!("text"));
        assert_eq!(body["settings"], json!({}));
    }
}
