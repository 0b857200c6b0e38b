use log::info;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::samples::DatabaseId;
use crate::types::error::Error;

use super::tabular::TabularResult;
use super::QueryExecutor;

/// Ways two successfully executed queries can disagree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Mismatch {
    #[error("Query returned different number of result sets")]
    ResultSetCount,
    #[error("Column count mismatch")]
    ColumnCount { expected: usize, actual: usize },
    #[error("Column names do not match")]
    ColumnNames,
    #[error("Row count mismatch: Expected {expected}, got {actual}")]
    RowCount { expected: usize, actual: usize },
    #[error("Result values do not match")]
    Values,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlFailure {
    /// One of the two queries could not run.
    Execution(Error),
    Mismatch(Mismatch),
}

impl std::fmt::Display for SqlFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlFailure::Execution(e) => write!(f, "{}", e),
            SqlFailure::Mismatch(m) => write!(f, "{}", m),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlVerdict {
    pub user_result: Option<TabularResult>,
    pub reference_result: Option<TabularResult>,
    pub failure: Option<SqlFailure>,
}

/// Plain-data form of a verdict handed to whatever renders it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlReport {
    pub is_correct: bool,
    pub user_result: Option<TabularResult>,
    pub reference_result: Option<TabularResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

impl SqlVerdict {
    pub fn is_correct(&self) -> bool {
        self.failure.is_none()
    }

    pub fn error_reason(&self) -> Option<String> {
        self.failure.as_ref().map(|f| f.to_string())
    }

    pub fn report(&self) -> SqlReport {
        SqlReport {
            is_correct: self.is_correct(),
            user_result: self.user_result.clone(),
            reference_result: self.reference_result.clone(),
            error_reason: self.error_reason(),
        }
    }
}

/// Decides whether the learner's result matches the reference result.
///
/// Columns are compared by count and then by name, position by position and
/// ignoring case. Rows are compared as multisets: each row is reduced to a
/// key of its normalized cells and both sorted key lists must be identical,
/// so row order never matters while column order always does.
pub fn compare_results(
    user: Option<&TabularResult>,
    reference: Option<&TabularResult>,
) -> Result<(), Mismatch> {
    let (user, reference) = match (user, reference) {
        (None, None) => return Ok(()),
        (Some(user), Some(reference)) => (user, reference),
        _ => return Err(Mismatch::ResultSetCount),
    };

    if user.columns.len() != reference.columns.len() {
        return Err(Mismatch::ColumnCount {
            expected: reference.columns.len(),
            actual: user.columns.len(),
        });
    }

    let columns_match = user
        .columns
        .iter()
        .zip(reference.columns.iter())
        .all(|(u, r)| u.to_lowercase() == r.to_lowercase());
    if !columns_match {
        return Err(Mismatch::ColumnNames);
    }

    if user.rows.len() != reference.rows.len() {
        return Err(Mismatch::RowCount {
            expected: reference.rows.len(),
            actual: user.rows.len(),
        });
    }

    if user.sorted_row_keys() != reference.sorted_row_keys() {
        return Err(Mismatch::Values);
    }

    Ok(())
}

/// Runs both queries against `database` and compares their results.
///
/// Never fails: execution errors become part of the verdict. The learner's
/// query runs first; if it fails the reference query is not run.
pub fn validate_sql<E: QueryExecutor + ?Sized>(
    executor: &mut E,
    user_query: &str,
    reference_query: &str,
    database: DatabaseId,
) -> SqlVerdict {
    let outcome = executor.execute(database, user_query).and_then(|user_result| {
        executor
            .execute(database, reference_query)
            .map(|reference_result| (user_result, reference_result))
    });

    let verdict = match outcome {
        Err(e) => SqlVerdict {
            user_result: None,
            reference_result: None,
            failure: Some(SqlFailure::Execution(e)),
        },
        Ok((user_result, reference_result)) => {
            let failure = compare_results(user_result.as_ref(), reference_result.as_ref())
                .err()
                .map(SqlFailure::Mismatch);
            SqlVerdict {
                user_result,
                reference_result,
                failure,
            }
        }
    };

    info!(
        "SQL verdict on {}: correct={} reason={:?}",
        database,
        verdict.is_correct(),
        verdict.error_reason()
    );
    verdict
}

struct SqlTextRules {
    whitespace: Regex,
    trailing_semicolon: Regex,
    before_open: Regex,
    before_close: Regex,
    comma: Regex,
}

impl SqlTextRules {
    fn compile() -> Result<SqlTextRules, regex::Error> {
        Ok(SqlTextRules {
            whitespace: Regex::new(r"\s+")?,
            trailing_semicolon: Regex::new(r";\s*$")?,
            before_open: Regex::new(r"\s*\(")?,
            before_close: Regex::new(r"\s*\)")?,
            comma: Regex::new(r"\s*,\s*")?,
        })
    }

    fn get() -> Result<&'static SqlTextRules, regex::Error> {
        static RULES: OnceCell<SqlTextRules> = OnceCell::new();
        RULES.get_or_try_init(SqlTextRules::compile)
    }
}

/// Normalizes SQL text for an exact textual comparison: case, runs of
/// whitespace, a trailing semicolon and spacing around parentheses and
/// commas are ignored.
pub fn normalize_sql(sql: &str) -> Result<String, regex::Error> {
    let rules = SqlTextRules::get()?;

    let sql = sql.trim().to_lowercase();
    let sql = rules.whitespace.replace_all(&sql, " ");
    let sql = rules.trailing_semicolon.replace_all(&sql, "");
    let sql = rules.before_open.replace_all(&sql, "(");
    let sql = rules.before_close.replace_all(&sql, ")");
    Ok(rules.comma.replace_all(&sql, ", ").into_owned())
}

pub fn sql_text_matches(user_query: &str, reference_query: &str) -> Result<bool, regex::Error> {
    Ok(normalize_sql(user_query)? == normalize_sql(reference_query)?)
}
