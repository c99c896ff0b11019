// src/provision.rs

use tracing::instrument;

use crate::catalog::Catalog;
use crate::runner::{run_batch, Phase, RunReport};
use crate::session::Session;

/// Drop every table, then create every table, each in catalog order.
#[instrument(level = "info", skip_all)]
pub async fn provision<S: Session>(session: &mut S, catalog: &Catalog) -> RunReport {
    let mut report = RunReport::default();
    for phase in [Phase::Drop, Phase::Create] {
        report
            .batches
            .push(run_batch(session, phase, catalog.statements(phase)).await);
    }
    report
}
