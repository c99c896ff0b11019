// src/session/pg.rs

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info, instrument};

use super::Session;
use crate::config::ClusterConfig;

/// Session over the Postgres wire protocol, which Redshift speaks.
pub struct PgSession {
    client: Client,
    connection: JoinHandle<()>,
    in_transaction: bool,
}

impl PgSession {
    /// Open a connection. Failure here is fatal to a run.
    #[instrument(level = "info", skip(cfg), fields(host = %cfg.host, db = %cfg.db_name))]
    pub async fn connect(cfg: &ClusterConfig) -> Result<Self> {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&cfg.host)
            .port(cfg.port)
            .dbname(&cfg.db_name)
            .user(&cfg.user)
            .password(&cfg.password)
            .application_name("songplay-dwh");
        if let Some(secs) = cfg.connect_timeout_secs {
            pg.connect_timeout(Duration::from_secs(secs));
        }

        Self::connect_with(&pg).await.with_context(|| {
            format!(
                "connecting to {}:{}/{} as {}",
                cfg.host, cfg.port, cfg.db_name, cfg.user
            )
        })
    }

    /// Open a connection from a prepared driver config.
    pub async fn connect_with(pg: &tokio_postgres::Config) -> Result<Self> {
        let (client, connection) = pg.connect(NoTls).await?;

        // the connection object drives the socket; it must run until the client drops
        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "warehouse connection ended with error");
            }
        });
        info!("connected");

        Ok(Self {
            client,
            connection,
            in_transaction: false,
        })
    }
}

impl Session for PgSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        if !self.in_transaction {
            self.client
                .batch_execute("BEGIN")
                .await
                .context("opening transaction")?;
            self.in_transaction = true;
        }
        debug!(sql, "executing");
        self.client.batch_execute(sql).await.map_err(describe)?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if self.in_transaction {
            self.in_transaction = false;
            self.client.batch_execute("COMMIT").await.map_err(describe)?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if self.in_transaction {
            self.in_transaction = false;
            self.client
                .batch_execute("ROLLBACK")
                .await
                .context("rolling back")?;
        }
        Ok(())
    }

    async fn close(mut self) -> Result<()> {
        if self.in_transaction {
            self.rollback().await?;
        }
        drop(self.client);
        self.connection
            .await
            .context("waiting for warehouse connection to close")?;
        info!("disconnected");
        Ok(())
    }
}

/// Prefer the server's message over the driver's generic `db error`.
fn describe(e: tokio_postgres::Error) -> anyhow::Error {
    match e.as_db_error() {
        Some(db) => match db.detail() {
            Some(detail) => anyhow::anyhow!("{}: {} ({})", db.code().code(), db.message(), detail),
            None => anyhow::anyhow!("{}: {}", db.code().code(), db.message()),
        },
        None => anyhow::Error::new(e),
    }
}
