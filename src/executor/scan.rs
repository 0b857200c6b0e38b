use sqlparser::ast::Expr;

use crate::planner::OutputSchema;
use crate::storage::{memory::MemoryReader, StorageReader};
use crate::types::{error::Error, Chunk, Row};

use super::{expression::ExprEvaluator, Executor, VECTOR_SIZE_THRESHOLD};

pub struct Scan {
    filter: Option<Expr>,
    output_schema: OutputSchema,

    reader: Box<dyn StorageReader>,
}

impl Scan {
    pub fn new(
        rows: Vec<Row>,
        filter: Option<Expr>,
        output_schema: OutputSchema,
    ) -> Result<Box<Scan>, Error> {
        Ok(Box::new(Scan {
            reader: Box::new(MemoryReader::new(rows, VECTOR_SIZE_THRESHOLD)),
            filter,
            output_schema,
        }))
    }
}

impl Executor for Scan {
    fn next_chunk(&mut self) -> Result<Chunk, Error> {
        loop {
            let chunk = self.reader.next_chunk()?;

            let filter = match &self.filter {
                Some(filter) if !chunk.is_empty() => filter,
                _ => return Ok(chunk),
            };

            let mut data_chunks = Vec::new();
            for row in chunk.data_chunks {
                let field = ExprEvaluator::evaluate(filter, &row, &self.output_schema)?;
                if ExprEvaluator::to_boolean(&field) {
                    data_chunks.push(row);
                }
            }

            if !data_chunks.is_empty() {
                return Ok(Chunk { data_chunks });
            }
        }
    }

    fn get_output_schema(&self) -> OutputSchema {
        self.output_schema.clone()
    }
}
