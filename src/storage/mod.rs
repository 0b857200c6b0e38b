use std::collections::HashMap;

use parquet::record::Field;

use crate::types::{error::Error, Chunk, Column, Row, TupleValue};

pub mod memory;

pub trait StorageReader {
    fn next_chunk(&mut self) -> Result<Chunk, Error>;
}

/// Type affinity of a column, derived from its declared type name the way
/// SQLite does it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Integer,
    Real,
    Text,
    Numeric,
    Blob,
}

impl Affinity {
    pub fn from_declared_type(declared: &str) -> Affinity {
        let declared = declared.to_uppercase();

        if declared.contains("INT") {
            Affinity::Integer
        } else if declared.contains("CHAR") || declared.contains("CLOB") || declared.contains("TEXT")
        {
            Affinity::Text
        } else if declared.is_empty() || declared.contains("BLOB") {
            Affinity::Blob
        } else if declared.contains("REAL") || declared.contains("FLOA") || declared.contains("DOUB")
        {
            Affinity::Real
        } else {
            Affinity::Numeric
        }
    }

    /// Converts a value about to be stored into the column's preferred
    /// representation. Values that do not convert cleanly are kept as-is.
    pub fn coerce(&self, field: Field) -> Field {
        match (self, field) {
            (_, Field::Null) => Field::Null,
            (Affinity::Text, Field::Str(s)) => Field::Str(s),
            (Affinity::Text, other) => Field::Str(TupleValue::from(other).to_string()),
            (Affinity::Integer | Affinity::Numeric, Field::Str(s)) => parse_numeric(&s)
                .map(integral_if_exact)
                .unwrap_or(Field::Str(s)),
            (Affinity::Integer | Affinity::Numeric, Field::Double(d)) => integral_if_exact(Field::Double(d)),
            (Affinity::Integer | Affinity::Numeric, Field::Int(i)) => Field::Long(i as i64),
            (Affinity::Real, Field::Str(s)) => match parse_numeric(&s) {
                Some(Field::Long(l)) => Field::Double(l as f64),
                Some(other) => other,
                None => Field::Str(s),
            },
            (Affinity::Real, Field::Int(i)) => Field::Double(i as f64),
            (Affinity::Real, Field::Long(l)) => Field::Double(l as f64),
            (Affinity::Real, Field::Float(f)) => Field::Double(f as f64),
            (_, other) => other,
        }
    }
}

fn parse_numeric(s: &str) -> Option<Field> {
    let trimmed = s.trim();
    if let Ok(l) = trimmed.parse::<i64>() {
        Some(Field::Long(l))
    } else {
        trimmed.parse::<f64>().ok().map(Field::Double)
    }
}

fn integral_if_exact(field: Field) -> Field {
    match field {
        Field::Double(d) if d.fract() == 0.0 && d.abs() < 9.0e15 => Field::Long(d as i64),
        other => other,
    }
}

#[derive(Debug, Clone)]
pub struct TableColumn {
    pub name: String,
    pub affinity: Affinity,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: String, columns: Vec<TableColumn>) -> Table {
        Table {
            name,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn schema(&self, qualifier: &str) -> Vec<Column> {
        self.columns
            .iter()
            .map(|c| Column::qualified(qualifier, c.name.clone()))
            .collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn insert(&mut self, values: Vec<Field>) -> Result<(), Error> {
        if values.len() != self.columns.len() {
            return Err(Error::Storage(format!(
                "table {} has {} columns but {} values were supplied",
                self.name,
                self.columns.len(),
                values.len()
            )));
        }

        let row = values
            .into_iter()
            .zip(self.columns.iter())
            .map(|(value, column)| TupleValue {
                value: column.affinity.coerce(value),
            })
            .collect();
        self.rows.push(row);
        Ok(())
    }
}

/// All tables of one database, keyed case-insensitively by name.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog::default()
    }

    pub fn create_table(&mut self, table: Table, if_not_exists: bool) -> Result<(), Error> {
        let key = table.name.to_lowercase();
        if self.tables.contains_key(&key) {
            if if_not_exists {
                return Ok(());
            }
            return Err(Error::Storage(format!(
                "table {} already exists",
                table.name
            )));
        }
        self.tables.insert(key, table);
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str, if_exists: bool) -> Result<(), Error> {
        match self.tables.remove(&name.to_lowercase()) {
            Some(_) => Ok(()),
            None if if_exists => Ok(()),
            None => Err(Error::Storage(format!("no such table: {}", name))),
        }
    }

    pub fn get_table(&self, name: &str) -> Result<&Table, Error> {
        self.tables
            .get(&name.to_lowercase())
            .ok_or_else(|| Error::Storage(format!("no such table: {}", name)))
    }

    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table, Error> {
        self.tables
            .get_mut(&name.to_lowercase())
            .ok_or_else(|| Error::Storage(format!("no such table: {}", name)))
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.values().map(|t| t.name.clone()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_from_declared_type() {
        assert_eq!(Affinity::from_declared_type("INTEGER"), Affinity::Integer);
        assert_eq!(Affinity::from_declared_type("BIGINT"), Affinity::Integer);
        assert_eq!(Affinity::from_declared_type("VARCHAR(20)"), Affinity::Text);
        assert_eq!(Affinity::from_declared_type("REAL"), Affinity::Real);
        assert_eq!(Affinity::from_declared_type("DOUBLE PRECISION"), Affinity::Real);
        assert_eq!(Affinity::from_declared_type("DECIMAL(5,2)"), Affinity::Numeric);
        assert_eq!(Affinity::from_declared_type(""), Affinity::Blob);
    }

    #[test]
    fn test_coerce() {
        assert_eq!(Affinity::Integer.coerce(Field::Str("42".to_string())), Field::Long(42));
        assert_eq!(Affinity::Integer.coerce(Field::Str("abc".to_string())), Field::Str("abc".to_string()));
        assert_eq!(Affinity::Real.coerce(Field::Long(7)), Field::Double(7.0));
        assert_eq!(Affinity::Text.coerce(Field::Long(7)), Field::Str("7".to_string()));
        assert_eq!(Affinity::Numeric.coerce(Field::Double(3.0)), Field::Long(3));
        assert_eq!(Affinity::Numeric.coerce(Field::Null), Field::Null);
    }

    #[test]
    fn test_catalog_is_case_insensitive() {
        let mut catalog = Catalog::new();
        let columns = vec![TableColumn {
            name: "id".to_string(),
            affinity: Affinity::Integer,
        }];
        catalog
            .create_table(Table::new("Tutor".to_string(), columns.clone()), false)
            .unwrap();

        assert!(catalog.get_table("TUTOR").is_ok());
        assert!(catalog
            .create_table(Table::new("tutor".to_string(), columns), false)
            .is_err());
        assert_eq!(catalog.table_names(), vec!["Tutor".to_string()]);

        catalog.drop_table("tutor", false).unwrap();
        assert!(catalog.get_table("Tutor").is_err());
    }
}
