//! Load staging tables from S3, then fill the fact and dimension tables.
//!
//! Usage:
//!   etl --config dwh.yaml [--dry-run] [TABLE...]

use anyhow::Result;
use clap::Parser;
use songplay_dwh::{
    cli::{finish, init_tracing, RunArgs},
    run_etl, PgSession, RecordingSession,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Load the warehouse from S3 JSON logs", long_about = None)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let (config, catalog) = cli.run.prepare()?;

    if cli.run.dry_run {
        info!("dry run; no connection will be made");
        let mut session = RecordingSession::new();
        let report = run_etl(&mut session, &catalog).await;
        for sql in session.executed() {
            println!("{}\n", sql.trim());
        }
        finish(session, &report).await
    } else {
        let mut session = PgSession::connect(&config.cluster).await?;
        let report = run_etl(&mut session, &catalog).await;
        finish(session, &report).await
    }
}
