pub mod calendar;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod etl;
pub mod provision;
pub mod runner;
pub mod session;

pub use catalog::{build_catalog, Catalog, Statement, Table};
pub use config::DwhConfig;
pub use etl::run_etl;
pub use provision::provision;
pub use runner::{run_batch, BatchReport, Outcome, Phase, RunReport};
pub use session::{PgSession, RecordingSession, Session};
