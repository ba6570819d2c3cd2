//! DFDL store initializer
//!
//! Creates a Bigtable table with a `dfdl` column family, writes a sample DFDL
//! schema definition to it and reads the data back.
//!
//! # Usage
//!
//! ```bash
//! # Against Cloud Bigtable
//! dfdl-init --project lch-pso-project07 --instance sabre-dfdl --table dfdl-schemas
//!
//! # Against a local emulator
//! BIGTABLE_EMULATOR_HOST=localhost:8086 dfdl-init -p my-project -i my-instance -t dfdl-schemas
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dfdl_client::{MemoryStore, TableSession};

mod config;

use config::CliConfig;

/// DFDL store initializer
#[derive(Parser, Debug)]
#[command(
    name = "dfdl-init",
    author = "DFDL Store Team",
    version,
    about = "Initializes a Bigtable table with a sample DFDL schema",
    long_about = "Creates the table (with a `dfdl` column family) if it does not exist,\n\
                  writes a sample DFDL schema definition, then reads it back by key,\n\
                  by column and with a full table scan."
)]
struct Args {
    /// Google Cloud project id
    #[arg(short = 'p', long, env = "BIGTABLE_PROJECT_ID")]
    project: Option<String>,

    /// Bigtable instance id
    #[arg(short = 'i', long, env = "BIGTABLE_INSTANCE_ID")]
    instance: Option<String>,

    /// Table id
    #[arg(short = 't', long, env = "BIGTABLE_TABLE_ID")]
    table: Option<String>,

    /// Emulator host:port (plaintext, no credentials)
    #[arg(long, value_name = "HOST:PORT", env = "BIGTABLE_EMULATOR_HOST")]
    emulator_host: Option<String>,

    /// OAuth2 access token; overrides Application Default Credentials
    #[arg(long, env = "BIGTABLE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// App profile for data requests
    #[arg(long, env = "BIGTABLE_APP_PROFILE_ID")]
    app_profile: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Use mock mode (in-memory store, no service connection)
    #[arg(long, hide = true)]
    mock: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = load_config(&args)?;

    // Fail before any handle is created.
    let client_config = config.client_config()?;
    let table_id = config.table_id()?.to_string();
    debug!(?client_config, table = %table_id, "configuration loaded");

    let session = if config.mock_mode {
        info!("using in-memory store");
        TableSession::in_memory(&Arc::new(MemoryStore::new()), table_id)?
    } else {
        TableSession::connect(&client_config, table_id)
            .await
            .context("failed to connect to Bigtable")?
    };

    session.run().await?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("dfdl_cli=debug,dfdl_client=debug")
        } else {
            EnvFilter::new("dfdl_cli=warn,dfdl_client=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn load_config(args: &Args) -> Result<CliConfig> {
    let mut config = if let Some(path) = &args.config {
        CliConfig::from_file(path)?
    } else {
        CliConfig::load_default()?
    };

    // Command line and environment override the file.
    let mut overrides = CliConfig::builder();
    if let Some(project) = &args.project {
        overrides = overrides.project_id(project);
    }
    if let Some(instance) = &args.instance {
        overrides = overrides.instance_id(instance);
    }
    if let Some(table) = &args.table {
        overrides = overrides.table_id(table);
    }
    if let Some(host) = &args.emulator_host {
        overrides = overrides.emulator_host(host);
    }
    if let Some(token) = &args.access_token {
        overrides = overrides.access_token(token);
    }
    if let Some(profile) = &args.app_profile {
        overrides = overrides.app_profile_id(profile);
    }
    config.merge(overrides.build());

    config.mock_mode = args.mock;

    Ok(config)
}
