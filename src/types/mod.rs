use std::fmt;

use parquet::record::Field;
use tabled::{builder::Builder, settings::Style};

use crate::planner::OutputSchema;

pub mod error;

#[derive(Debug, Clone, PartialEq)]
pub struct TupleValue {
    pub value: Field,
}

impl TupleValue {
    pub fn null() -> TupleValue {
        TupleValue { value: Field::Null }
    }
}

impl From<Field> for TupleValue {
    fn from(value: Field) -> Self {
        TupleValue { value }
    }
}

impl fmt::Display for TupleValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.value {
            Field::Bool(b) => write!(f, "{}", u8::from(*b)),
            Field::Int(i) => write!(f, "{}", i),
            Field::Long(l) => write!(f, "{}", l),
            Field::Float(x) => write!(f, "{}", x),
            Field::Double(d) => write!(f, "{}", d),
            Field::Str(s) => write!(f, "{}", s),
            Field::Null => write!(f, "NULL"),
            other => write!(f, "{}", other),
        }
    }
}

pub type Row = Vec<TupleValue>;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Table (or alias) the column was read from, used to resolve `t.col`.
    pub table: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Column {
        Column {
            name: name.into(),
            table: None,
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Column {
        Column {
            name: name.into(),
            table: Some(table.into()),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Chunk {
    pub data_chunks: Vec<Row>,
}

impl Chunk {
    pub fn is_empty(&self) -> bool {
        self.data_chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data_chunks.len()
    }
}

#[derive(Debug, Default)]
pub struct ResultSet {
    pub output_schema: OutputSchema,
    pub data_chunks: Vec<Chunk>,
}

impl ResultSet {
    pub fn column_names(&self) -> Vec<String> {
        self.output_schema
            .columns
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.data_chunks.iter().flat_map(|chunk| chunk.data_chunks.iter())
    }

    pub fn row_count(&self) -> usize {
        self.data_chunks.iter().map(Chunk::len).sum()
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut builder = Builder::default();
        builder.set_header(self.column_names());

        for row in self.rows() {
            builder.push_record(row.iter().map(|v| v.to_string()));
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        write!(f, "{}", table)
    }
}
