//! The database session boundary the runner talks to.

pub mod pg;
pub mod recording;

use anyhow::Result;

pub use pg::PgSession;
pub use recording::{Call, RecordingSession};

/// A live connection that can run parameterless SQL inside explicit
/// transactions. Used by one caller at a time, one statement at a time.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Run `sql`, opening a transaction first if none is open.
    async fn execute(&mut self, sql: &str) -> Result<()>;

    /// Commit the open transaction, if any.
    async fn commit(&mut self) -> Result<()>;

    /// Abandon the open transaction, if any.
    async fn rollback(&mut self) -> Result<()>;

    /// Disconnect.
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}
