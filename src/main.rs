use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcapp_reconciler::lifecycle::{DeleteOutcome, Orchestrator};
use mcapp_reconciler::management::{ClientConfig, ManagementClient};
use mcapp_reconciler::poll::{PollConfig, Timeouts};
use mcapp_reconciler::types::{AppRecord, MultiClusterAppId, MultiClusterAppSpec};

#[derive(Parser)]
#[command(name = "mcapp")]
#[command(about = "Create, read, update and delete multi-cluster apps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Management server URL
    #[arg(long, global = true, env = "RANCHER_URL")]
    url: Option<String>,

    /// API token (token-xxxxx:secret)
    #[arg(long, global = true, env = "RANCHER_TOKEN_KEY", hide_env_values = true)]
    token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true, env = "RANCHER_INSECURE")]
    insecure: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an app from a desired-state file and print the result
    Create {
        /// JSON desired state
        spec: PathBuf,
    },
    /// Print the current state of an app
    Read {
        id: String,

        /// Desired-state file whose target order the output follows
        #[arg(long)]
        spec: Option<PathBuf>,
    },
    /// Move an app from a previously printed state to a new desired state
    Update {
        /// JSON state printed by an earlier create, read or update
        state: PathBuf,

        /// JSON desired state
        spec: PathBuf,
    },
    /// Delete an app and wait for it and its child apps to be removed
    Delete { id: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcapp=info,mcapp_reconciler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let url = cli
        .url
        .context("no server URL: pass --url or set RANCHER_URL")?;
    let mut config = ClientConfig::new(url);
    if let Some(token) = cli.token {
        config = config.with_token(token);
    }
    config.insecure = cli.insecure;
    let client = ManagementClient::new(&config).context("failed to build management client")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let orchestrator = Orchestrator::new(client)
        .with_poll_config(PollConfig::from_env())
        .with_timeouts(Timeouts::from_env())
        .with_cancellation(cancel);

    match cli.command {
        Commands::Create { spec } => {
            let spec: MultiClusterAppSpec = load_json(&spec)?;
            let record = orchestrator.create(&spec).await?;
            print_record(&record)?;
        }
        Commands::Read { id, spec } => {
            let declared: Option<MultiClusterAppSpec> = spec.as_deref().map(load_json).transpose()?;
            let id = MultiClusterAppId::new(id);
            match orchestrator.read(&id, declared.as_ref()).await? {
                Some(record) => print_record(&record)?,
                None => println!("null"),
            }
        }
        Commands::Update { state, spec } => {
            let prior: AppRecord = load_json(&state)?;
            let desired: MultiClusterAppSpec = load_json(&spec)?;
            let record = orchestrator.update(&prior, &desired).await?;
            print_record(&record)?;
        }
        Commands::Delete { id } => {
            let id = MultiClusterAppId::new(id);
            match orchestrator.delete(&id).await? {
                DeleteOutcome::AlreadyAbsent => println!("{id} already absent"),
                DeleteOutcome::Removed {
                    children_confirmed,
                    children_unconfirmed,
                } => println!(
                    "{id} removed ({children_confirmed} child apps confirmed, {children_unconfirmed} unconfirmed)"
                ),
            }
        }
    }

    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_record(record: &AppRecord) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}
