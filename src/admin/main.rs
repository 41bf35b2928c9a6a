//! Index schema administration.
//!
//! Applies a lifecycle operation to every index declared in the configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use cedar::config::Config;
use cedar::elasticsearch::EsClient;
use cedar::schema::{ExecutionOptions, SchemaAdministrationClient, ValidationReport};

#[derive(Parser, Debug)]
#[command(name = "schema-admin")]
#[command(about = "Create, drop, migrate and validate Elasticsearch index schemas")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "cedar.toml")]
    config: PathBuf,

    /// Elasticsearch URL (overrides the configuration)
    #[arg(long)]
    es_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Create indexes that do not exist yet
    CreateIfAbsent,
    /// Drop indexes if they exist, then create them
    DropAndCreate,
    /// Drop indexes if they exist
    DropIfExisting,
    /// Create missing indexes and migrate existing ones
    Update,
    /// Compare the actual schema of each index with the expected one
    Validate,
    /// Apply the configured strategy as on application start
    Start,
    /// Apply the configured strategy as on application stop
    Stop,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load_from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    let es_url = args.es_url.as_deref().unwrap_or(&config.cluster.es_url);

    info!("Cedar Schema Administration");
    info!("Command: {:?}", args.command);

    let es_client = EsClient::new(es_url)
        .await
        .context("Failed to connect to Elasticsearch")?;

    if !es_client.health_check().await? {
        anyhow::bail!("Elasticsearch cluster is not healthy");
    }
    info!("Connected to Elasticsearch at {}", es_client.es_url);

    let orchestrator = es_client.schema_orchestrator();
    let options = config.lifecycle.execution_options();

    let clients: Vec<SchemaAdministrationClient> = config
        .load_expected_metadata()?
        .into_iter()
        .map(|expected| SchemaAdministrationClient::new(orchestrator.clone(), expected))
        .collect();

    if clients.is_empty() {
        info!("No indexes configured");
        return Ok(());
    }

    let outcomes = join_all(
        clients
            .iter()
            .map(|client| run(args.command, &config, client, &options)),
    )
    .await;

    let mut failed = Vec::new();
    for (client, outcome) in clients.iter().zip(outcomes) {
        match outcome {
            Ok(()) => info!("Index '{}': done", client.index_name()),
            Err(e) => {
                error!("Index '{}': {:#}", client.index_name(), e);
                failed.push(client.index_name().to_string());
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("Failed on indexes: {}", failed.join(", "));
    }

    Ok(())
}

async fn run(
    command: Command,
    config: &Config,
    client: &SchemaAdministrationClient,
    options: &ExecutionOptions,
) -> Result<()> {
    match command {
        Command::CreateIfAbsent => client.create_if_absent(options).await?,
        Command::DropAndCreate => client.drop_and_create(options).await?,
        Command::DropIfExisting => client.drop_if_existing(options).await?,
        Command::Update => client.update(options).await?,
        Command::Validate => {
            let mut report = ValidationReport::new();
            client.validate(options, &mut report).await?;
            for failure in report.failures() {
                println!("{}", failure);
            }
            report.into_result(client.index_name())?;
        }
        Command::Start => config.lifecycle.strategy.on_start(client, options).await?,
        Command::Stop => config.lifecycle.strategy.on_stop(client, options).await?,
    }
    Ok(())
}
