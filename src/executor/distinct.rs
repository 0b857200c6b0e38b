use std::collections::HashSet;

use parquet::record::Field;

use crate::executor::Executor;
use crate::planner::OutputSchema;
use crate::types::{error::Error, Chunk};

use super::group_key;

pub struct Distinct {
    output_schema: OutputSchema,
    child: Box<dyn Executor>,

    seen: HashSet<Vec<String>>,
}

impl Distinct {
    pub fn new(child: Box<dyn Executor>, output_schema: OutputSchema) -> Result<Box<Distinct>, Error> {
        Ok(Box::new(Distinct {
            output_schema,
            child,
            seen: HashSet::new(),
        }))
    }
}

impl Executor for Distinct {
    fn next_chunk(&mut self) -> Result<Chunk, Error> {
        loop {
            let chunk = self.child.next_chunk()?;
            if chunk.is_empty() {
                return Ok(chunk);
            }

            let mut data_chunks = Vec::new();
            for row in chunk.data_chunks {
                let values: Vec<Field> = row.iter().map(|v| v.value.clone()).collect();
                if self.seen.insert(group_key(&values)) {
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
