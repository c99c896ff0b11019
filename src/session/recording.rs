// src/session/recording.rs

use anyhow::Result;

use super::Session;

/// One invocation seen by a [`RecordingSession`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Execute(String),
    Commit,
    Rollback,
}

/// A session that logs invocations instead of running SQL.
///
/// Backs `--dry-run`. Statements containing any registered failure marker
/// are recorded and then rejected, which lets callers exercise failure paths.
#[derive(Debug, Default)]
pub struct RecordingSession {
    calls: Vec<Call>,
    fail_markers: Vec<String>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every statement whose text contains `marker`.
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_markers.push(marker.into());
        self
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Text of every executed statement, in order.
    pub fn executed(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Execute(sql) => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Session for RecordingSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.calls.push(Call::Execute(sql.to_string()));
        if let Some(marker) = self.fail_markers.iter().find(|m| sql.contains(m.as_str())) {
            anyhow::bail!("rejected statement matching `{}`", marker);
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.calls.push(Call::Commit);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.calls.push(Call::Rollback);
        Ok(())
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}
