//! Best-effort sequential execution of named statements.
//!
//! Every statement runs in its own transaction: it is committed right after
//! it succeeds and rolled back when it fails, and the batch always moves on
//! to the next statement. The outcome of each one is collected into a
//! [`BatchReport`] and logged as it happens.

use std::{fmt, time::Duration};
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::catalog::Statement;
use crate::session::Session;

/// The four statement sets, in the order a full refresh runs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Drop,
    Create,
    Copy,
    Insert,
}

impl Phase {
    pub fn heading(&self) -> &'static str {
        match self {
            Phase::Drop => "Dropping tables",
            Phase::Create => "Creating tables",
            Phase::Copy => "S3 -> Staging",
            Phase::Insert => "Staging -> Analytics",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Phase::Drop => "dropping",
            Phase::Create => "creating",
            Phase::Copy => "loading",
            Phase::Insert => "inserting",
        }
    }
}

/// Result of one statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success { elapsed: Duration },
    Failure { elapsed: Duration, error: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            Outcome::Success { elapsed } | Outcome::Failure { elapsed, .. } => *elapsed,
        }
    }
}

/// One progress line: position, name and outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatementReport {
    pub phase: Phase,
    pub position: usize,
    pub total: usize,
    pub name: &'static str,
    pub outcome: Outcome,
}

impl fmt::Display for StatementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}/{}) {} {}... ",
            self.position,
            self.total,
            self.phase.verb(),
            self.name
        )?;
        match &self.outcome {
            Outcome::Success { .. } => f.write_str("success")?,
            Outcome::Failure { error, .. } => f.write_str(error)?,
        }
        write!(f, " (elapsed: {})", format_elapsed(self.outcome.elapsed()))
    }
}

/// Ordered outcomes for one phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
    pub phase: Phase,
    pub entries: Vec<StatementReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StatementReport> {
        self.entries.iter().filter(|e| !e.outcome.is_success())
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    pub fn elapsed(&self) -> Duration {
        self.entries.iter().map(|e| e.outcome.elapsed()).sum()
    }
}

/// Reports for every phase a driver ran, in run order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub batches: Vec<BatchReport>,
}

impl RunReport {
    pub fn batch(&self, phase: Phase) -> Option<&BatchReport> {
        self.batches.iter().find(|b| b.phase == phase)
    }

    pub fn succeeded(&self) -> usize {
        self.batches.iter().map(BatchReport::succeeded).sum()
    }

    pub fn failed(&self) -> usize {
        self.batches.iter().map(BatchReport::failed).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StatementReport> {
        self.batches.iter().flat_map(BatchReport::failures)
    }

    pub fn is_clean(&self) -> bool {
        self.batches.iter().all(BatchReport::is_clean)
    }

    pub fn log_summary(&self) {
        let elapsed: Duration = self.batches.iter().map(BatchReport::elapsed).sum();
        if self.is_clean() {
            info!(
                succeeded = self.succeeded(),
                elapsed = %format_elapsed(elapsed),
                "all statements succeeded"
            );
        } else {
            for f in self.failures() {
                warn!(phase = ?f.phase, table = f.name, "failed statement");
            }
            warn!(
                succeeded = self.succeeded(),
                failed = self.failed(),
                elapsed = %format_elapsed(elapsed),
                "run finished with failures"
            );
        }
    }
}

/// `HH:MM:SS`; hours keep counting past 24.
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Run `statements` in order on `session`. Never aborts early.
pub async fn run_batch<S: Session>(
    session: &mut S,
    phase: Phase,
    statements: &[Statement],
) -> BatchReport {
    info!("{}", phase.heading());
    let total = statements.len();
    let mut entries = Vec::with_capacity(total);

    for (i, stmt) in statements.iter().enumerate() {
        let start = Instant::now();
        let result = match session.execute(&stmt.sql).await {
            Ok(()) => session.commit().await,
            Err(e) => {
                if let Err(rb) = session.rollback().await {
                    warn!(table = stmt.name(), error = %rb, "rollback after failure failed");
                }
                Err(e)
            }
        };
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(()) => Outcome::Success { elapsed },
            Err(e) => Outcome::Failure {
                elapsed,
                error: format!("{:#}", e),
            },
        };
        let report = StatementReport {
            phase,
            position: i + 1,
            total,
            name: stmt.name(),
            outcome,
        };
        if report.outcome.is_success() {
            info!("{}", report);
        } else {
            error!("{}", report);
        }
        entries.push(report);
    }

    BatchReport { phase, entries }
}
