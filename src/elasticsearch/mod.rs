//! Elasticsearch client and schema work execution.

mod client;
mod orchestrator;
mod work;

pub use client::EsClient;
pub use orchestrator::EsWorkOrchestrator;
pub use work::{SchemaWork, WorkOrchestrator, WorkResult};
