use crate::{
    commands::{Commands, TrinoArgs, resolve_brokers, resolve_topic},
    conn::{ConnectionKind, ConnectionPinger, KafkaConnectionPinger, TrinoConnectionPinger},
    env::EnvManager,
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use connectors::{
    executor::QueryExecutor,
    transport::{
        Transport,
        live::{KafkaConfig, KafkaTransport},
        null::NullTransport,
    },
    trino::client::TrinoClient,
};
use engine_runtime::{
    config::{IngestionConfig, RunMode},
    metrics::Metrics,
    scheduler::IngestionScheduler,
    tracker::OffsetTracker,
};
use model::{
    core::identifiers::QualifiedName,
    records::message::{SourceMessage, parse_iso8601},
};
use std::{str::FromStr, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod env;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "icestream",
    version = "0.1.0",
    about = "Kafka to Iceberg ingestion through Trino"
)]
struct Cli {
    #[arg(long, global = true, help = "Load KEY=VALUE settings from this file")]
    env_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.as_i32());
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let mut env = EnvManager::from_process();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }

    match cli.command {
        Commands::Ingest {
            trino,
            kafka_catalog,
            kafka_schema,
            kafka_topic,
            target_table,
            batch_size,
            continuous,
            interval,
            report,
        } => {
            let trino = trino.resolve(&env)?;
            info!(
                "Parameters: host={}, port={}, user={}",
                trino.host, trino.port, trino.user
            );

            let config = IngestionConfig::builder()
                .kafka_catalog(kafka_catalog)
                .kafka_schema(kafka_schema)
                .topic(resolve_topic(kafka_topic.as_deref(), &env))
                .destination(target_table)
                .batch_size(batch_size)
                .continuous(continuous)
                .interval_secs(interval)
                .target(trino.target())
                .build()?;
            info!(
                "Source: {}, Target: {}",
                config.source(),
                config.destination()
            );

            let shutdown = ShutdownCoordinator::new(CancellationToken::new());
            shutdown.register_handlers();

            let client = TrinoClient::new(trino)?;
            return ingest(config, Arc::new(client), &shutdown, report.as_deref()).await;
        }
        Commands::Publish {
            name,
            id,
            timestamp,
            topic,
            brokers,
            null_transport,
        } => {
            let timestamp = event_time(timestamp.as_deref())?;
            let message = SourceMessage::new(id, name, timestamp);
            let topic = resolve_topic(topic.as_deref(), &env);

            let transport = if null_transport {
                Transport::Null(NullTransport::default())
            } else {
                let brokers = resolve_brokers(brokers.as_deref(), &env);
                Transport::Live(KafkaTransport::new(&KafkaConfig::from_bootstrap(&brokers))?)
            };

            let delivery = transport.publish(&topic, &message).await?;
            info!(topic = %delivery.topic, id, "Message published");
            println!("{}", serde_json::to_string_pretty(&delivery)?);
        }
        Commands::Watermark {
            trino,
            target_table,
            json,
        } => {
            let table = QualifiedName::new(&target_table)?;
            let tracker = tracker(&trino, &env)?;
            let marks = tracker.try_watermarks(&table).await?;

            if json {
                println!("{}", output::watermark_json(&target_table, &marks)?);
            } else {
                output::print_watermark_table(&target_table, &marks);
            }
        }
        Commands::TestConn {
            target,
            trino,
            brokers,
        } => {
            let kind = ConnectionKind::from_str(&target)
                .map_err(|_| CliError::InvalidConnectionKind(target.clone()))?;
            match kind {
                ConnectionKind::Trino => {
                    let client = TrinoClient::new(trino.resolve(&env)?)?;
                    TrinoConnectionPinger { executor: &client }.ping().await?;
                }
                ConnectionKind::Kafka => {
                    let brokers = resolve_brokers(brokers.as_deref(), &env);
                    let transport = Transport::Live(KafkaTransport::new(
                        &KafkaConfig::from_bootstrap(&brokers),
                    )?);
                    KafkaConnectionPinger {
                        transport: &transport,
                        brokers,
                    }
                    .ping()
                    .await?;
                }
            }
        }
    }

    Ok(ExitCode::Success)
}

/// Pings the engine, then runs the scheduler until it completes or is
/// cancelled through `shutdown`.
async fn ingest(
    config: IngestionConfig,
    executor: Arc<dyn QueryExecutor>,
    shutdown: &ShutdownCoordinator,
    report: Option<&str>,
) -> Result<ExitCode, CliError> {
    let pinger = TrinoConnectionPinger {
        executor: executor.as_ref(),
    };
    if pinger.ping().await.is_err() {
        error!("Failed to connect to Trino. Exiting.");
        return Ok(ExitCode::GeneralError);
    }

    let one_shot = config.mode() == RunMode::OneShot;
    let scheduler = IngestionScheduler::new(config, executor);
    let summary = match scheduler.run(shutdown.cancel_token()).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Ingestion could not start");
            return Ok(ExitCode::GeneralError);
        }
    };
    if shutdown.is_shutdown_requested() {
        info!("Process interrupted by user");
    }

    match report {
        Some(path) => output::write_report(&summary, path).await?,
        None => output::print_summary(&summary),
    }

    if one_shot && summary.metrics.failed_cycles > 0 {
        return Ok(ExitCode::GeneralError);
    }
    Ok(ExitCode::Success)
}

fn tracker(trino: &TrinoArgs, env: &EnvManager) -> Result<OffsetTracker, CliError> {
    let client = TrinoClient::new(trino.resolve(env)?)?;
    Ok(OffsetTracker::new(Arc::new(client), Metrics::new()))
}

/// Event time for a published message: the given ISO-8601 value, or now.
fn event_time(raw: Option<&str>) -> Result<NaiveDateTime, CliError> {
    match raw {
        Some(raw) => parse_iso8601(raw.trim()).ok_or_else(|| CliError::InvalidTimestamp(raw.into())),
        None => Ok(Local::now().naive_local()),
    }
}
