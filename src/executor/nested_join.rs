use sqlparser::ast::Expr;

use crate::planner::{JoinKind, OutputSchema};
use crate::types::{error::Error, Chunk, Row, TupleValue};

use super::{expression::ExprEvaluator, Buffer, Executor, RowBudget, VECTOR_SIZE_THRESHOLD};

pub struct NestedLoopJoin {
    output_schema: OutputSchema,
    child_left: Box<dyn Executor>,
    child_right: Box<dyn Executor>,
    predicate: Option<Expr>,
    kind: JoinKind,
    budget: RowBudget,

    buffer: Buffer,
    right_rows: Option<Vec<Row>>,
}

impl NestedLoopJoin {
    pub fn new(
        child_left: Box<dyn Executor>,
        child_right: Box<dyn Executor>,
        predicate: Option<Expr>,
        kind: JoinKind,
        budget: RowBudget,
        output_schema: OutputSchema,
    ) -> Result<Box<NestedLoopJoin>, Error> {
        Ok(Box::new(NestedLoopJoin {
            buffer: Buffer::new(),
            right_rows: None,
            child_left,
            child_right,
            predicate,
            kind,
            budget,
            output_schema,
        }))
    }

    // TODO: spill the right side once tables outgrow the sample databases
    fn init_right(&mut self) -> Result<(), Error> {
        if self.right_rows.is_some() {
            return Ok(());
        }

        let mut rows = Vec::new();
        loop {
            let chunk = self.child_right.next_chunk()?;
            if chunk.is_empty() {
                break;
            }
            rows.extend(chunk.data_chunks);
        }

        self.right_rows = Some(rows);
        Ok(())
    }
}

impl Executor for NestedLoopJoin {
    fn next_chunk(&mut self) -> Result<Chunk, Error> {
        self.init_right()?;
        let right_rows = self.right_rows.as_deref().unwrap_or_default();
        let right_width = self.child_right.get_output_schema().len();

        while self.buffer.size() < VECTOR_SIZE_THRESHOLD {
            let next_chunk = self.child_left.next_chunk()?;

            if next_chunk.is_empty() {
                break;
            }

            for left_row in next_chunk.data_chunks {
                // every candidate pair counts, matched or not
                self.budget.charge(right_rows.len().max(1))?;
                let mut matched = false;

                for right_row in right_rows.iter() {
                    let mut new_row = left_row.clone();
                    new_row.extend(right_row.iter().cloned());

                    let keep = match &self.predicate {
                        Some(predicate) => ExprEvaluator::to_boolean(&ExprEvaluator::evaluate(
                            predicate,
                            &new_row,
                            &self.output_schema,
                        )?),
                        None => true,
                    };

                    if keep {
                        matched = true;
                        self.buffer.add_row(new_row);
                    }
                }

                if !matched && self.kind == JoinKind::LeftOuter {
                    let mut new_row = left_row;
                    new_row.extend((0..right_width).map(|_| TupleValue::null()));
                    self.buffer.add_row(new_row);
                }
            }
        }

        Ok(self.buffer.get_sized_chunk(VECTOR_SIZE_THRESHOLD))
    }

    fn get_output_schema(&self) -> OutputSchema {
        self.output_schema.clone()
    }
}
