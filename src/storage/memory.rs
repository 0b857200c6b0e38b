use crate::types::{error::Error, Chunk, Row};

use super::StorageReader;

/// Reads a snapshot of a table's rows in fixed size chunks.
pub struct MemoryReader {
    rows: std::vec::IntoIter<Row>,
    chunk_size: usize,
}

impl StorageReader for MemoryReader {
    fn next_chunk(&mut self) -> Result<Chunk, Error> {
        let mut chunk = Chunk::default();

        for row in self.rows.by_ref() {
            chunk.data_chunks.push(row);

            if chunk.data_chunks.len() >= self.chunk_size {
                break;
            }
        }

        Ok(chunk)
    }
}

impl MemoryReader {
    pub fn new(rows: Vec<Row>, chunk_size: usize) -> MemoryReader {
        MemoryReader {
            rows: rows.into_iter(),
            chunk_size,
        }
    }
}
