//! In-memory cluster used by unit tests.

use async_trait::async_trait;
use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;
use serde_json::Value;

use super::settings::is_static_setting;
use super::{IndexMetadata, IndexSettings, IndexStatus, PropertyMapping, RootTypeMapping};
use crate::elasticsearch::{SchemaWork, WorkOrchestrator, WorkResult};
use crate::error::{Result, SchemaError};

/// Index "books": `{title: text, price: double}`, no custom settings
pub(crate) fn books_metadata() -> IndexMetadata {
    IndexMetadata::new(
        "books",
        RootTypeMapping::default()
            .with_property("title", PropertyMapping::of_type("text"))
            .with_property("price", PropertyMapping::of_type("double")),
        IndexSettings::default(),
    )
}

#[derive(Debug, Clone)]
pub(crate) struct FakeIndex {
    pub mapping: RootTypeMapping,
    pub settings: IndexSettings,
    pub open: bool,
    pub status: IndexStatus,
    pub last_mapping_body: Option<Value>,
}

#[derive(Default)]
struct State {
    indexes: HashMap<String, FakeIndex>,
    calls: Vec<&'static str>,
    failing: HashSet<&'static str>,
}

/// Records every submitted work kind and applies it to in-memory indexes
#[derive(Default)]
pub(crate) struct FakeCluster {
    state: Mutex<State>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(self, metadata: IndexMetadata) -> Self {
        self.state.lock().indexes.insert(
            metadata.name.clone(),
            FakeIndex {
                mapping: metadata.mapping,
                settings: metadata.settings,
                open: true,
                status: IndexStatus::Green,
                last_mapping_body: None,
            },
        );
        self
    }

    /// Make every work unit of this kind fail with a remote error
    pub fn fail_on(&self, kind: &'static str) {
        self.state.lock().failing.insert(kind);
    }

    pub fn set_status(&self, index: &str, status: IndexStatus) {
        if let Some(fake) = self.state.lock().indexes.get_mut(index) {
            fake.status = status;
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == kind).count()
    }

    pub fn index(&self, name: &str) -> Option<FakeIndex> {
        self.state.lock().indexes.get(name).cloned()
    }

    pub fn last_mapping_body(&self, name: &str) -> Option<Value> {
        self.index(name).and_then(|i| i.last_mapping_body)
    }
}

fn missing(index: &str, operation: &'static str) -> SchemaError {
    SchemaError::Request {
        index: index.to_string(),
        operation,
        message: format!("404: no such index [{}]", index),
    }
}

#[async_trait]
impl WorkOrchestrator for FakeCluster {
    async fn submit(&self, work: SchemaWork) -> Result<WorkResult> {
        let mut state = self.state.lock();
        let kind = work.kind();
        state.calls.push(kind);

        if state.failing.contains(kind) {
            return Err(SchemaError::Request {
                index: work.index().to_string(),
                operation: kind,
                message: "400: injected failure".to_string(),
            });
        }

        match work {
            SchemaWork::CreateIndex {
                index,
                body,
                ignore_existing,
            } => {
                if state.indexes.contains_key(&index) {
                    if ignore_existing {
                        return Ok(WorkResult::Created(false));
                    }
                    return Err(SchemaError::IndexCreation {
                        index,
                        message: "400: resource_already_exists_exception".to_string(),
                    });
                }
                let fake = FakeIndex {
                    mapping: serde_json::from_value(body["mappings"].clone())?,
                    settings: serde_json::from_value(body["settings"].clone())?,
                    open: true,
                    status: IndexStatus::Green,
                    last_mapping_body: None,
                };
                state.indexes.insert(index, fake);
                Ok(WorkResult::Created(true))
            }
            SchemaWork::IndexExists { index } => {
                Ok(WorkResult::Exists(state.indexes.contains_key(&index)))
            }
            SchemaWork::GetMapping { index, .. } => Ok(WorkResult::Mapping(
                state.indexes.get(&index).map(|i| i.mapping.clone()),
            )),
            SchemaWork::GetSettings { index } => Ok(WorkResult::Settings(
                state.indexes.get(&index).map(|i| i.settings.clone()),
            )),
            SchemaWork::PutMapping { index, body } => {
                let fake = state
                    .indexes
                    .get_mut(&index)
                    .ok_or_else(|| missing(&index, "put_mapping"))?;
                let update: RootTypeMapping = serde_json::from_value(body.clone())?;
                fake.mapping.properties.extend(update.properties);
                fake.mapping.extra_attributes.extend(update.extra_attributes);
                fake.last_mapping_body = Some(body);
                Ok(WorkResult::Acknowledged)
            }
            SchemaWork::PutSettings { index, body } => {
                let fake = state
                    .indexes
                    .get_mut(&index)
                    .ok_or_else(|| missing(&index, "put_settings"))?;
                let touches_static = body
                    .as_object()
                    .is_some_and(|settings| settings.keys().any(|key| is_static_setting(key)));
                if fake.open && touches_static {
                    return Err(SchemaError::Request {
                        index,
                        operation: "put_settings",
                        message: "400: can't update non dynamic settings on open index"
                            .to_string(),
                    });
                }
                let update: IndexSettings = serde_json::from_value(body)?;
                fake.settings.extra_settings.extend(update.extra_settings);
                if update.max_result_window.is_some() {
                    fake.settings.max_result_window = update.max_result_window;
                }
                let analysis = &mut fake.settings.analysis;
                analysis.analyzer.extend(update.analysis.analyzer);
                analysis.normalizer.extend(update.analysis.normalizer);
                analysis.tokenizer.extend(update.analysis.tokenizer);
                analysis.char_filter.extend(update.analysis.char_filter);
                analysis.filter.extend(update.analysis.filter);
                Ok(WorkResult::Acknowledged)
            }
            SchemaWork::CloseIndex { index } | SchemaWork::OpenIndex { index } => {
                let fake = state
                    .indexes
                    .get_mut(&index)
                    .ok_or_else(|| missing(&index, kind))?;
                fake.open = kind == "open_index";
                Ok(WorkResult::Acknowledged)
            }
            SchemaWork::DropIndex {
                index,
                ignore_missing,
            } => match state.indexes.remove(&index) {
                Some(_) => Ok(WorkResult::Dropped(true)),
                None if ignore_missing => Ok(WorkResult::Dropped(false)),
                None => Err(missing(&index, "drop_index")),
            },
            SchemaWork::WaitForStatus {
                index,
                status,
                timeout_ms,
            } => {
                let actual = state
                    .indexes
                    .get(&index)
                    .ok_or_else(|| missing(&index, "wait_for_status"))?
                    .status;
                if !status.is_satisfied_by(actual) {
                    return Err(SchemaError::StatusWait {
                        index,
                        required_status: status.to_string(),
                        timeout_ms,
                        message: format!("current status is '{}'", actual),
                    });
                }
                Ok(WorkResult::Acknowledged)
            }
        }
    }
}
