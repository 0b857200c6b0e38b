use std::fmt;

use parquet::record::Field;
use serde::{Deserialize, Serialize};

use crate::types::{ResultSet, TupleValue};

/// Delimiter joining a row's normalized cells into its comparison key.
pub const ROW_KEY_DELIMITER: &str = "|";

/// Token every NULL cell normalizes to.
pub const NULL_TOKEN: &str = "NULL";

/// One value of a query result as seen by the comparator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Lower-cased, trimmed textual form used for comparison.
    pub fn normalized(&self) -> String {
        match self {
            Cell::Null => NULL_TOKEN.to_string(),
            other => other.to_string().to_lowercase().trim().to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "{}", NULL_TOKEN),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&TupleValue> for Cell {
    fn from(value: &TupleValue) -> Self {
        match &value.value {
            Field::Null => Cell::Null,
            Field::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
            Field::Byte(i) => Cell::Number(*i as f64),
            Field::Short(i) => Cell::Number(*i as f64),
            Field::Int(i) => Cell::Number(*i as f64),
            Field::Long(l) => Cell::Number(*l as f64),
            Field::Float(x) => Cell::Number(*x as f64),
            Field::Double(d) => Cell::Number(*d),
            Field::Str(s) => Cell::Text(s.clone()),
            _ => Cell::Text(value.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

/// Column names and rows of one executed query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TabularResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> TabularResult {
        TabularResult { columns, rows }
    }

    /// Sorted comparison keys of all rows; equal key lists mean equal row
    /// multisets regardless of row order.
    pub fn sorted_row_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.rows.iter().map(|row| row_key(row)).collect();
        keys.sort();
        keys
    }
}

impl From<&ResultSet> for TabularResult {
    fn from(result_set: &ResultSet) -> Self {
        TabularResult {
            columns: result_set.column_names(),
            rows: result_set
                .rows()
                .map(|row| row.iter().map(Cell::from).collect())
                .collect(),
        }
    }
}

pub fn normalize_value(cell: &Cell) -> String {
    cell.normalized()
}

pub fn row_key(row: &[Cell]) -> String {
    row.iter()
        .map(normalize_value)
        .collect::<Vec<String>>()
        .join(ROW_KEY_DELIMITER)
}
