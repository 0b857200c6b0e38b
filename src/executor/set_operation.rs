use std::collections::HashSet;

use parquet::record::Field;

use crate::planner::{OutputSchema, SetOperation};
use crate::types::{error::Error, Chunk, Row};

use super::{group_key, Buffer, Executor, RowBudget, VECTOR_SIZE_THRESHOLD};

/// UNION [ALL], EXCEPT and INTERSECT. Both inputs are drained on the first
/// call; all but UNION ALL drop duplicate rows.
pub struct SetOperationExecutor {
    output_schema: OutputSchema,
    op: SetOperation,
    child_left: Box<dyn Executor>,
    child_right: Box<dyn Executor>,
    budget: RowBudget,

    buffer: Option<Buffer>,
}

impl SetOperationExecutor {
    pub fn new(
        op: SetOperation,
        child_left: Box<dyn Executor>,
        child_right: Box<dyn Executor>,
        budget: RowBudget,
        output_schema: OutputSchema,
    ) -> Result<Box<SetOperationExecutor>, Error> {
        Ok(Box::new(SetOperationExecutor {
            output_schema,
            op,
            child_left,
            child_right,
            budget,
            buffer: None,
        }))
    }

    fn drain(child: &mut Box<dyn Executor>, budget: &RowBudget) -> Result<Vec<Row>, Error> {
        let mut rows = Vec::new();
        loop {
            let chunk = child.next_chunk()?;
            if chunk.is_empty() {
                return Ok(rows);
            }
            budget.charge(chunk.len())?;
            rows.extend(chunk.data_chunks);
        }
    }

    fn key(row: &Row) -> Vec<String> {
        let values: Vec<Field> = row.iter().map(|v| v.value.clone()).collect();
        group_key(&values)
    }

    fn combine(&mut self) -> Result<Buffer, Error> {
        let left = Self::drain(&mut self.child_left, &self.budget)?;
        let right = Self::drain(&mut self.child_right, &self.budget)?;

        let mut buffer = Buffer::new();
        let mut seen = HashSet::new();

        match self.op {
            SetOperation::UnionAll => {
                left.into_iter()
                    .chain(right)
                    .for_each(|row| buffer.add_row(row));
            }
            SetOperation::Union => {
                for row in left.into_iter().chain(right) {
                    if seen.insert(Self::key(&row)) {
                        buffer.add_row(row);
                    }
                }
            }
            SetOperation::Except | SetOperation::Intersect => {
                let right_keys: HashSet<Vec<String>> = right.iter().map(Self::key).collect();
                let keep_matches = self.op == SetOperation::Intersect;
                for row in left {
                    let key = Self::key(&row);
                    if right_keys.contains(&key) == keep_matches && seen.insert(key) {
                        buffer.add_row(row);
                    }
                }
            }
        }

        Ok(buffer)
    }
}

impl Executor for SetOperationExecutor {
    fn next_chunk(&mut self) -> Result<Chunk, Error> {
        if self.buffer.is_none() {
            self.buffer = Some(self.combine()?);
        }

        match self.buffer.as_mut() {
            Some(buffer) => Ok(buffer.get_sized_chunk(VECTOR_SIZE_THRESHOLD)),
            None => Ok(Chunk::default()),
        }
    }

    fn get_output_schema(&self) -> OutputSchema {
        self.output_schema.clone()
    }
}
