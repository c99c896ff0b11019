//! Named SQL statements for every phase, keyed by logical table.
//!
//! A [`Catalog`] is built once from configuration and never changes after.
//! Statement order inside each phase is the order the runner executes in.

pub mod copy;
pub mod ddl;
pub mod transform;

use anyhow::Result;
use std::{fmt, str::FromStr};

use crate::config::DwhConfig;
use crate::runner::Phase;

pub use copy::CopySource;

/// The seven logical tables of the warehouse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    StagingEvents,
    StagingSongs,
    Songplay,
    Users,
    Songs,
    Artists,
    Times,
}

impl Table {
    /// Every table, in declaration order.
    pub const ALL: [Table; 7] = [
        Table::StagingEvents,
        Table::StagingSongs,
        Table::Songplay,
        Table::Users,
        Table::Songs,
        Table::Artists,
        Table::Times,
    ];

    /// Fact and dimension tables filled from staging.
    pub const ANALYTICS: [Table; 5] = [
        Table::Songplay,
        Table::Users,
        Table::Songs,
        Table::Artists,
        Table::Times,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::StagingEvents => "staging_events",
            Table::StagingSongs => "staging_songs",
            Table::Songplay => "songplay",
            Table::Users => "users",
            Table::Songs => "songs",
            Table::Artists => "artists",
            Table::Times => "times",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown table `{}`", s.trim()))
    }
}

/// One named SQL statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    pub table: Table,
    pub sql: String,
}

impl Statement {
    pub fn new(table: Table, sql: impl Into<String>) -> Self {
        Self {
            table,
            sql: sql.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.table.as_str()
    }
}

/// The four ordered statement sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    drop: Vec<Statement>,
    create: Vec<Statement>,
    copy: Vec<Statement>,
    insert: Vec<Statement>,
}

/// Build the catalog from configuration. No connection is needed.
pub fn build_catalog(config: &DwhConfig) -> Catalog {
    let events = CopySource::events(config);
    let songs = CopySource::songs(config);

    Catalog {
        drop: Table::ALL
            .iter()
            .map(|&t| Statement::new(t, ddl::drop_table(t)))
            .collect(),
        create: Table::ALL
            .iter()
            .map(|&t| Statement::new(t, ddl::create_table(t)))
            .collect(),
        copy: vec![
            Statement::new(Table::StagingEvents, events.render(Table::StagingEvents)),
            Statement::new(Table::StagingSongs, songs.render(Table::StagingSongs)),
        ],
        insert: Table::ANALYTICS
            .iter()
            .filter_map(|&t| transform::insert_select(t).map(|sql| Statement::new(t, sql)))
            .collect(),
    }
}

impl Catalog {
    pub fn drop_statements(&self) -> &[Statement] {
        &self.drop
    }

    pub fn create_statements(&self) -> &[Statement] {
        &self.create
    }

    pub fn copy_statements(&self) -> &[Statement] {
        &self.copy
    }

    pub fn insert_statements(&self) -> &[Statement] {
        &self.insert
    }

    /// Ordered statements for `phase`.
    pub fn statements(&self, phase: Phase) -> &[Statement] {
        match phase {
            Phase::Drop => &self.drop,
            Phase::Create => &self.create,
            Phase::Copy => &self.copy,
            Phase::Insert => &self.insert,
        }
    }

    /// Keep only statements for `tables`, preserving catalog order.
    /// An empty slice keeps everything.
    pub fn filtered(&self, tables: &[Table]) -> Catalog {
        if tables.is_empty() {
            return self.clone();
        }
        let keep = |set: &[Statement]| -> Vec<Statement> {
            set.iter()
                .filter(|s| tables.contains(&s.table))
                .cloned()
                .collect()
        };
        Catalog {
            drop: keep(&self.drop),
            create: keep(&self.create),
            copy: keep(&self.copy),
            insert: keep(&self.insert),
        }
    }
}
