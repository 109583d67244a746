//! dato-site server.
//!
//! Config: `--conf <file>` (else `./dato.yaml` when present), then environment,
//! then flags. Logging: set `RUST_LOG=dato_site=debug` for request detail on stderr.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dato_notes::load_site_config;
use dato_site::run_http;

#[derive(Parser, Debug)]
#[command(name = "dato-site", about = "Serve the Dato notes API, feeds and admin authoring")]
struct Cli {
    /// Explicit config file.
    #[arg(long = "conf", short = 'c', value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Notes directory (overrides config and `DATO_NOTES_DIR`).
    #[arg(long, short = 'd', value_name = "DIR")]
    notes_dir: Option<PathBuf>,

    /// Listen address (overrides config and `DATO_BIND`).
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dato_site=info,dato_notes=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut config =
        load_site_config(cli.config_file.as_deref()).context("failed to load site config")?;
    if let Some(dir) = cli.notes_dir {
        config.notes_dir = dir;
    }
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    run_http(config).await
}
