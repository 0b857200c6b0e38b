//! Answer validation: decides whether a learner's SQL query or ER diagram
//! is equivalent to the reference solution.

pub mod erd;
pub mod sql;
pub mod tabular;

use crate::samples::DatabaseId;
use crate::types::error::Error;

use self::tabular::TabularResult;

/// Runs SQL against a named sample database.
///
/// `Ok(None)` means the statement ran but produced no result set (DDL or
/// DML); `Err` carries the syntax or runtime failure.
pub trait QueryExecutor {
    fn execute(&mut self, database: DatabaseId, sql: &str) -> Result<Option<TabularResult>, Error>;
}
