use crate::executor::Executor;
use crate::planner::OutputSchema;
use crate::types::error::Error;
use crate::types::Chunk;

use super::{Buffer, VECTOR_SIZE_THRESHOLD};

pub struct Limit {
    output_schema: OutputSchema,
    limit: Option<u64>,
    offset: u64,
    child: Box<dyn Executor>,

    buffer: Buffer,
}

impl Limit {
    pub fn new(
        child: Box<dyn Executor>,
        limit: Option<u64>,
        offset: u64,
        output_schema: OutputSchema,
    ) -> Result<Box<Limit>, Error> {
        Ok(Box::new(Limit {
            limit,
            offset,
            child,
            output_schema,
            buffer: Buffer::new(),
        }))
    }

    fn exhausted(&self) -> bool {
        self.limit == Some(0)
    }
}

impl Executor for Limit {
    fn next_chunk(&mut self) -> Result<Chunk, Error> {
        while !self.exhausted() && self.buffer.size() < VECTOR_SIZE_THRESHOLD {
            let next_chunk = self.child.next_chunk()?;

            if next_chunk.is_empty() {
                break;
            }

            for row in next_chunk.data_chunks {
                if self.offset > 0 {
                    self.offset -= 1;
                    continue;
                }

                self.buffer.add_row(row);
                if let Some(limit) = self.limit.as_mut() {
                    *limit -= 1;
                    if *limit == 0 {
                        break;
                    }
                }
            }
        }

        Ok(self.buffer.get_sized_chunk(VECTOR_SIZE_THRESHOLD))
    }

    fn get_output_schema(&self) -> OutputSchema {
        self.output_schema.clone()
    }
}
