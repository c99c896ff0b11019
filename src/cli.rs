// src/cli.rs
//
// Arguments and startup shared by both entry points.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use crate::catalog::{build_catalog, Catalog, Table};
use crate::config::DwhConfig;
use crate::runner::RunReport;
use crate::session::Session;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// YAML config file
    #[arg(short, long, env = "DWH_CONFIG", default_value = "dwh.yaml")]
    pub config: PathBuf,

    /// Print the statements instead of connecting to the warehouse
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Restrict the run to these tables (default: all)
    #[arg(value_name = "TABLE")]
    pub tables: Vec<String>,
}

impl RunArgs {
    /// Load config and build the (optionally filtered) catalog.
    pub fn prepare(&self) -> Result<(DwhConfig, Catalog)> {
        let config = DwhConfig::load(&self.config)?;
        let tables = parse_tables(&self.tables)?;
        let catalog = build_catalog(&config).filtered(&tables);
        Ok((config, catalog))
    }
}

pub fn parse_tables(names: &[String]) -> Result<Vec<Table>> {
    names
        .iter()
        .flat_map(|n| n.split(','))
        .filter(|n| !n.trim().is_empty())
        .map(|n| n.parse::<Table>().with_context(|| format!("bad table argument `{}`", n)))
        .collect()
}

/// Log the run summary, then disconnect. The summary is logged even when
/// closing the session fails.
pub async fn finish<S: Session>(session: S, report: &RunReport) -> Result<()> {
    report.log_summary();
    session.close().await
}

/// `info` by default, `RUST_LOG` overrides.
pub fn init_tracing() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();
}
