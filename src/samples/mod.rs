//! The four curriculum databases and a session that keeps them open.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::executor::DEFAULT_MAX_RESULT_ROWS;
use crate::types::error::Error;
use crate::validate::{tabular::TabularResult, QueryExecutor};

const SALESMAN_SQL: &str = include_str!("salesman.sql");
const NOBEL_SQL: &str = include_str!("nobel.sql");
const TUTOR_SQL: &str = include_str!("tutor.sql");
const UNIVERSITY_SQL: &str = include_str!("university.sql");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseId {
    Salesman,
    Nobel,
    Tutor,
    University,
}

impl DatabaseId {
    pub const ALL: [DatabaseId; 4] = [
        DatabaseId::Salesman,
        DatabaseId::Nobel,
        DatabaseId::Tutor,
        DatabaseId::University,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatabaseId::Salesman => "salesman",
            DatabaseId::Nobel => "nobel",
            DatabaseId::Tutor => "tutor",
            DatabaseId::University => "university",
        }
    }

    /// Script that creates and fills the database.
    pub fn seed_sql(&self) -> &'static str {
        match self {
            DatabaseId::Salesman => SALESMAN_SQL,
            DatabaseId::Nobel => NOBEL_SQL,
            DatabaseId::Tutor => TUTOR_SQL,
            DatabaseId::University => UNIVERSITY_SQL,
        }
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DatabaseId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatabaseId::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown database '{}', expected one of: salesman, nobel, tutor, university",
                    s
                )
            })
    }
}

/// Creates a fresh database and runs the seed script for `id` on it.
pub fn open(id: DatabaseId, max_result_rows: usize) -> Result<Database, Error> {
    let mut db = Database::with_row_limit(max_result_rows)?;
    db.execute(id.seed_sql())?;
    info!("Loaded sample database {}", id);
    Ok(db)
}

/// Lazily opened sample databases, one connection per id for the lifetime
/// of the session. Statements that modify a database are visible to later
/// queries on it until it is closed.
pub struct SampleDatabases {
    databases: HashMap<DatabaseId, Database>,
    max_result_rows: usize,
}

impl Default for SampleDatabases {
    fn default() -> Self {
        SampleDatabases::new(DEFAULT_MAX_RESULT_ROWS)
    }
}

impl SampleDatabases {
    pub fn new(max_result_rows: usize) -> SampleDatabases {
        SampleDatabases {
            databases: HashMap::new(),
            max_result_rows,
        }
    }

    pub fn load(&mut self, id: DatabaseId) -> Result<&mut Database, Error> {
        if !self.databases.contains_key(&id) {
            let db = open(id, self.max_result_rows)?;
            self.databases.insert(id, db);
        }

        self.databases
            .get_mut(&id)
            .ok_or_else(|| Error::Storage(format!("database {} is not open", id)))
    }

    pub fn is_open(&self, id: DatabaseId) -> bool {
        self.databases.contains_key(&id)
    }

    pub fn close(&mut self, id: DatabaseId) {
        if self.databases.remove(&id).is_some() {
            debug!("Closed sample database {}", id);
        }
    }

    pub fn close_all(&mut self) {
        self.databases.clear();
    }
}

impl QueryExecutor for SampleDatabases {
    fn execute(&mut self, database: DatabaseId, sql: &str) -> Result<Option<TabularResult>, Error> {
        let db = self.load(database)?;
        let result_set = db.execute(sql)?;
        Ok(result_set.as_ref().map(TabularResult::from))
    }
}
