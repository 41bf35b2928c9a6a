//! Work orchestrator executing schema work against a live cluster.

use std::sync::Arc;

use async_trait::async_trait;
use elasticsearch::cluster::ClusterHealthParts;
use elasticsearch::http::response::Response;
use elasticsearch::indices::{
    IndicesCloseParts, IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts,
    IndicesGetMappingParts, IndicesGetSettingsParts, IndicesOpenParts, IndicesPutMappingParts,
    IndicesPutSettingsParts,
};
use elasticsearch::params::WaitForStatus;
use hashbrown::HashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use super::work::{SchemaWork, WorkOrchestrator, WorkResult};
use super::EsClient;
use crate::error::{Result, SchemaError};
use crate::schema::{IndexSettings, IndexStatus, RootTypeMapping};

const ALREADY_EXISTS: &str = "resource_already_exists_exception";

/// Orchestrator keeping one FIFO queue per index
pub struct EsWorkOrchestrator {
    client: EsClient,
    queues: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl EsWorkOrchestrator {
    pub fn new(client: EsClient) -> Self {
        Self {
            client,
            queues: Mutex::new(HashMap::new()),
        }
    }

    fn queue_for(&self, index: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut queues = self.queues.lock();
        queues
            .entry(index.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    async fn execute(&self, work: SchemaWork) -> Result<WorkResult> {
        let es = self.client.client();

        match work {
            SchemaWork::CreateIndex {
                index,
                body,
                ignore_existing,
            } => {
                let response = es
                    .indices()
                    .create(IndicesCreateParts::Index(&index))
                    .body(body)
                    .send()
                    .await?;

                if response.status_code().is_success() {
                    return Ok(WorkResult::Created(true));
                }

                let status = response.status_code().as_u16();
                let text = response.text().await?;
                create_failure(index, ignore_existing, status, &text)
            }

            SchemaWork::IndexExists { index } => {
                let response = es
                    .indices()
                    .exists(IndicesExistsParts::Index(&[index.as_str()]))
                    .send()
                    .await?;

                match exists_outcome(response.status_code().as_u16()) {
                    Some(exists) => Ok(WorkResult::Exists(exists)),
                    None => Err(failure(&index, "index_exists", response).await),
                }
            }

            SchemaWork::GetMapping { index, type_name } => {
                let response = es
                    .indices()
                    .get_mapping(IndicesGetMappingParts::Index(&[index.as_str()]))
                    .send()
                    .await?;

                let Some(document) = read_index_document(&index, "get_mapping", response).await?
                else {
                    return Ok(WorkResult::Mapping(None));
                };
                Ok(WorkResult::Mapping(Some(extract_mapping(
                    document,
                    type_name.as_deref(),
                )?)))
            }

            SchemaWork::GetSettings { index } => {
                let response = es
                    .indices()
                    .get_settings(IndicesGetSettingsParts::Index(&[index.as_str()]))
                    .send()
                    .await?;

                let Some(document) = read_index_document(&index, "get_settings", response).await?
                else {
                    return Ok(WorkResult::Settings(None));
                };
                Ok(WorkResult::Settings(Some(extract_settings(document)?)))
            }

            SchemaWork::PutMapping { index, body } => {
                let response = es
                    .indices()
                    .put_mapping(IndicesPutMappingParts::Index(&[index.as_str()]))
                    .body(body)
                    .send()
                    .await?;
                acknowledged(&index, "put_mapping", response).await
            }

            SchemaWork::PutSettings { index, body } => {
                let response = es
                    .indices()
                    .put_settings(IndicesPutSettingsParts::Index(&[index.as_str()]))
                    .body(body)
                    .send()
                    .await?;
                acknowledged(&index, "put_settings", response).await
            }

            SchemaWork::CloseIndex { index } => {
                let response = es
                    .indices()
                    .close(IndicesCloseParts::Index(&[index.as_str()]))
                    .send()
                    .await?;
                acknowledged(&index, "close_index", response).await
            }

            SchemaWork::OpenIndex { index } => {
                let response = es
                    .indices()
                    .open(IndicesOpenParts::Index(&[index.as_str()]))
                    .send()
                    .await?;
                acknowledged(&index, "open_index", response).await
            }

            SchemaWork::DropIndex {
                index,
                ignore_missing,
            } => {
                let response = es
                    .indices()
                    .delete(IndicesDeleteParts::Index(&[index.as_str()]))
                    .send()
                    .await?;

                match drop_outcome(ignore_missing, response.status_code().as_u16()) {
                    Some(result) => Ok(result),
                    None => Err(failure(&index, "drop_index", response).await),
                }
            }

            SchemaWork::WaitForStatus {
                index,
                status,
                timeout_ms,
            } => {
                let timeout = format!("{}ms", timeout_ms);
                let response = es
                    .cluster()
                    .health(ClusterHealthParts::Index(&[index.as_str()]))
                    .wait_for_status(wait_for(status))
                    .timeout(&timeout)
                    .send()
                    .await?;

                let code = response.status_code().as_u16();
                let body = response.json::<Value>().await?;
                health_outcome(index, status, timeout_ms, code, &body)
            }
        }
    }
}

#[async_trait]
impl WorkOrchestrator for EsWorkOrchestrator {
    async fn submit(&self, work: SchemaWork) -> Result<WorkResult> {
        let queue = self.queue_for(work.index());
        let _in_flight = queue.lock().await;

        debug!("Executing {} on index '{}'", work.kind(), work.index());
        self.execute(work).await
    }
}

fn wait_for(status: IndexStatus) -> WaitForStatus {
    match status {
        IndexStatus::Green => WaitForStatus::Green,
        IndexStatus::Yellow => WaitForStatus::Yellow,
        IndexStatus::Red => WaitForStatus::Red,
    }
}

/// Per-index document of a get-mapping/get-settings response, `None` on 404
async fn read_index_document(
    index: &str,
    operation: &'static str,
    response: Response,
) -> Result<Option<Value>> {
    match response.status_code().as_u16() {
        404 => Ok(None),
        code if (200..300).contains(&code) => {
            let body = response.json::<Value>().await?;
            Ok(Some(index_document(index, body)))
        }
        _ => Err(failure(index, operation, response).await),
    }
}

/// Pick the document of `index` out of a response keyed by index name
fn index_document(index: &str, mut body: Value) -> Value {
    if body.get(index).is_some() {
        return body[index].take();
    }
    // Keyed by concrete index name, which differs from `index` behind an alias
    body.as_object_mut()
        .and_then(|o| o.values_mut().next().map(Value::take))
        .unwrap_or(Value::Null)
}

fn extract_mapping(document: Value, type_name: Option<&str>) -> Result<RootTypeMapping> {
    let mut mapping = document["mappings"].clone();
    if let Some(type_name) = type_name {
        if mapping.get(type_name).is_some() {
            mapping = mapping[type_name].take();
        }
    }
    if mapping.is_null() {
        mapping = Value::Object(Default::default());
    }
    Ok(serde_json::from_value(mapping)?)
}

fn extract_settings(document: Value) -> Result<IndexSettings> {
    let mut settings = document["settings"]["index"].clone();
    if settings.is_null() {
        settings = Value::Object(Default::default());
    }
    Ok(serde_json::from_value(settings)?)
}

fn create_failure(
    index: String,
    ignore_existing: bool,
    status: u16,
    text: &str,
) -> Result<WorkResult> {
    let error_type = serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v["error"]["type"].as_str().map(str::to_string));
    if ignore_existing && error_type.as_deref() == Some(ALREADY_EXISTS) {
        return Ok(WorkResult::Created(false));
    }
    Err(SchemaError::IndexCreation {
        index,
        message: format!("{}: {}", status, text),
    })
}

fn exists_outcome(code: u16) -> Option<bool> {
    match code {
        200 => Some(true),
        404 => Some(false),
        _ => None,
    }
}

fn drop_outcome(ignore_missing: bool, code: u16) -> Option<WorkResult> {
    match code {
        404 if ignore_missing => Some(WorkResult::Dropped(false)),
        code if (200..300).contains(&code) => Some(WorkResult::Dropped(true)),
        _ => None,
    }
}

fn health_outcome(
    index: String,
    required: IndexStatus,
    timeout_ms: u64,
    code: u16,
    body: &Value,
) -> Result<WorkResult> {
    let actual = body["status"].as_str().unwrap_or("unknown");
    let timed_out = code == 408 || body["timed_out"].as_bool().unwrap_or(false);
    let satisfied = actual
        .parse::<IndexStatus>()
        .map(|a| required.is_satisfied_by(a))
        .unwrap_or(false);

    if timed_out || !satisfied {
        return Err(SchemaError::StatusWait {
            index,
            required_status: required.to_string(),
            timeout_ms,
            message: format!("current status is '{}'", actual),
        });
    }
    Ok(WorkResult::Acknowledged)
}

async fn acknowledged(
    index: &str,
    operation: &'static str,
    response: Response,
) -> Result<WorkResult> {
    if response.status_code().is_success() {
        Ok(WorkResult::Acknowledged)
    } else {
        Err(failure(index, operation, response).await)
    }
}

async fn failure(index: &str, operation: &'static str, response: Response) -> SchemaError {
    let status = response.status_code().as_u16();
    let message = match response.text().await {
        Ok(text) => format!("{}: {}", status, text),
        Err(e) => format!("{}: {}", status, e),
    };
    SchemaError::Request {
        index: index.to_string(),
        operation,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_queue_is_shared_per_index() {
        let client = EsClient::new("http://localhost:9200").await.unwrap();
        let orchestrator = EsWorkOrchestrator::new(client);

        let books = orchestrator.queue_for("books");
        assert!(Arc::ptr_eq(&books, &orchestrator.queue_for("books")));
        assert!(!Arc::ptr_eq(&books, &orchestrator.queue_for("authors")));

        // Holding one index's queue does not block another index
        let _held = books.lock().await;
        assert!(orchestrator.queue_for("authors").try_lock().is_ok());
        assert!(orchestrator.queue_for("books").try_lock().is_err());
    }

    #[test]
    fn test_already_existing_index_is_not_created() {
        let text = r#"{"error":{"type":"resource_already_exists_exception","reason":"index [books/abc] already exists"},"status":400}"#;

        let result = create_failure("books".to_string(), true, 400, text).unwrap();
        assert!(matches!(result, WorkResult::Created(false)));

        let err = create_failure("books".to_string(), false, 400, text).unwrap_err();
        assert!(matches!(err, SchemaError::IndexCreation { message, .. } if message.starts_with("400: ")));

        let other = r#"{"error":{"type":"illegal_argument_exception"},"status":400}"#;
        assert!(create_failure("books".to_string(), true, 400, other).is_err());
        assert!(create_failure("books".to_string(), true, 502, "Bad Gateway").is_err());
    }

    #[test]
    fn test_status_code_outcomes() {
        assert_eq!(exists_outcome(200), Some(true));
        assert_eq!(exists_outcome(404), Some(false));
        assert_eq!(exists_outcome(500), None);

        assert!(matches!(drop_outcome(true, 404), Some(WorkResult::Dropped(false))));
        assert!(drop_outcome(false, 404).is_none());
        assert!(matches!(drop_outcome(false, 200), Some(WorkResult::Dropped(true))));
        assert!(drop_outcome(true, 403).is_none());
    }

    #[test]
    fn test_index_document_follows_alias() {
        let body = json!({ "books_v2": { "mappings": { "properties": {} } } });
        assert_eq!(
            index_document("books", body.clone()),
            json!({ "mappings": { "properties": {} } })
        );

        let body = json!({ "books": { "a": 1 }, "authors": { "b": 2 } });
        assert_eq!(index_document("books", body), json!({ "a": 1 }));
        assert_eq!(index_document("books", json!({})), Value::Null);
    }

    #[test]
    fn test_extract_mapping_unwraps_type_name() {
        let document = json!({
            "mappings": {
                "_doc": { "properties": { "title": { "type": "text", "ignore_above": 10 } } }
            }
        });

        let mapping = extract_mapping(document.clone(), Some("_doc")).unwrap();
        assert_eq!(mapping.properties["title"].data_type.as_deref(), Some("text"));

        let typeless = json!({ "mappings": { "properties": { "price": { "type": "double" } } } });
        let mapping = extract_mapping(typeless, Some("_doc")).unwrap();
        assert!(mapping.properties.contains_key("price"));

        let mapping = extract_mapping(json!({}), None).unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_extract_settings_reads_index_section() {
        let document = json!({
            "settings": {
                "index": {
                    "number_of_shards": "1",
                    "max_result_window": "20000",
                    "refresh_interval": "30s",
                    "uuid": "abc",
                    "analysis": { "filter": { "stem": { "type": "stemmer" } } }
                }
            }
        });

        let settings = extract_settings(document).unwrap();
        assert_eq!(settings.number_of_shards, Some(1));
        assert_eq!(settings.max_result_window, Some(20_000));
        assert_eq!(settings.extra_settings["refresh_interval"], json!("30s"));
        assert!(settings.analysis.filter.contains_key("stem"));

        assert_eq!(extract_settings(json!({})).unwrap(), IndexSettings::default());
    }

    #[test]
    fn test_health_outcome() {
        let green = json!({ "status": "green", "timed_out": false });
        assert!(health_outcome("books".to_string(), IndexStatus::Yellow, 500, 200, &green).is_ok());

        let red = json!({ "status": "red", "timed_out": false });
        let err =
            health_outcome("books".to_string(), IndexStatus::Yellow, 500, 200, &red).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Index 'books' did not reach status 'yellow' within 500ms: current status is 'red'"
        );

        let timed_out = json!({ "status": "green", "timed_out": true });
        assert!(health_outcome("books".to_string(), IndexStatus::Green, 500, 200, &timed_out).is_err());

        let yellow = json!({ "status": "yellow", "timed_out": true });
        let err =
            health_outcome("books".to_string(), IndexStatus::Green, 500, 408, &yellow).unwrap_err();
        assert!(matches!(err, SchemaError::StatusWait { timeout_ms: 500, .. }));
    }

    #[test]
    fn test_wait_for_status_mapping() {
        assert!(matches!(wait_for(IndexStatus::Green), WaitForStatus::Green));
        assert!(matches!(wait_for(IndexStatus::Red), WaitForStatus::Red));
    }
}
