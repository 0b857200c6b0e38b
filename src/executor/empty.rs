use std::mem::swap;

use crate::executor::Executor;
use crate::planner::OutputSchema;
use crate::types::{error::Error, Chunk};

/// Source for a SELECT without FROM: exactly one row with no columns.
pub struct Empty {
    buffer: Chunk,
}

impl Empty {
    pub fn new() -> Result<Box<Empty>, Error> {
        Ok(Box::new(Empty {
            buffer: Chunk {
                data_chunks: vec![vec![]],
            },
        }))
    }
}

impl Executor for Empty {
    fn next_chunk(&mut self) -> Result<Chunk, Error> {
        let mut res_chunks = Vec::new();
        swap(&mut res_chunks, &mut self.buffer.data_chunks);
        Ok(Chunk {
            data_chunks: res_chunks,
        })
    }

    fn get_output_schema(&self) -> OutputSchema {
        OutputSchema::default()
    }
}
