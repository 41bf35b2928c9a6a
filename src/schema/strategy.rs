//! What to do with an index schema when the application starts and stops.

use serde::Deserialize;
use std::str::FromStr;
use tracing::info;

use super::{ExecutionOptions, SchemaAdministrationClient, ValidationReport};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaManagementStrategy {
    None,
    Validate,
    Update,
    #[default]
    Create,
    DropAndCreate,
    DropAndCreateAndDrop,
}

impl SchemaManagementStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaManagementStrategy::None => "none",
            SchemaManagementStrategy::Validate => "validate",
            SchemaManagementStrategy::Update => "update",
            SchemaManagementStrategy::Create => "create",
            SchemaManagementStrategy::DropAndCreate => "drop-and-create",
            SchemaManagementStrategy::DropAndCreateAndDrop => "drop-and-create-and-drop",
        }
    }

    /// Apply the strategy when the application starts
    pub async fn on_start(
        &self,
        client: &SchemaAdministrationClient,
        options: &ExecutionOptions,
    ) -> Result<()> {
        info!(
            "Applying schema strategy '{}' to index '{}'",
            self.as_str(),
            client.index_name()
        );

        match self {
            SchemaManagementStrategy::None => Ok(()),
            SchemaManagementStrategy::Validate => {
                let mut report = ValidationReport::new();
                client.validate(options, &mut report).await?;
                report.into_result(client.index_name())
            }
            SchemaManagementStrategy::Update => client.update(options).await,
            SchemaManagementStrategy::Create => client.create_if_absent(options).await,
            SchemaManagementStrategy::DropAndCreate
            | SchemaManagementStrategy::DropAndCreateAndDrop => {
                client.drop_and_create(options).await
            }
        }
    }

    /// Apply the strategy when the application stops
    pub async fn on_stop(
        &self,
        client: &SchemaAdministrationClient,
        options: &ExecutionOptions,
    ) -> Result<()> {
        match self {
            SchemaManagementStrategy::DropAndCreateAndDrop => {
                client.drop_if_existing(options).await
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for SchemaManagementStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaManagementStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(SchemaManagementStrategy::None),
            "validate" => Ok(SchemaManagementStrategy::Validate),
            "update" => Ok(SchemaManagementStrategy::Update),
            "create" => Ok(SchemaManagementStrategy::Create),
            "drop-and-create" => Ok(SchemaManagementStrategy::DropAndCreate),
            "drop-and-create-and-drop" => Ok(SchemaManagementStrategy::DropAndCreateAndDrop),
            other => Err(format!("invalid schema management strategy '{}'", other)),
        }
    }
}
