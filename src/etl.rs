// src/etl.rs

use tracing::instrument;

use crate::catalog::Catalog;
use crate::runner::{run_batch, Phase, RunReport};
use crate::session::Session;

/// Bulk-load staging from object storage, then transform staging into the
/// fact and dimension tables. The insert phase starts only after every
/// copy has returned, whatever its outcome.
#[instrument(level = "info", skip_all)]
pub async fn run_etl<S: Session>(session: &mut S, catalog: &Catalog) -> RunReport {
    let mut report = RunReport::default();
    for phase in [Phase::Copy, Phase::Insert] {
        report
            .batches
            .push(run_batch(session, phase, catalog.statements(phase)).await);
    }
    report
}
