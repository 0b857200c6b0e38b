use crate::executor::expression::ExprEvaluator;
use crate::planner::{OutputSchema, Projected};
use crate::types::{error::Error, Chunk, Row, TupleValue};

use super::Executor;

pub struct Projection {
    items: Vec<Projected>,
    child: Box<dyn Executor>,
    output_schema: OutputSchema,
}

impl Projection {
    pub fn new(
        child: Box<dyn Executor>,
        items: Vec<Projected>,
        output_schema: OutputSchema,
    ) -> Result<Box<Projection>, Error> {
        Ok(Box::new(Projection {
            items,
            child,
            output_schema,
        }))
    }
}

impl Executor for Projection {
    fn next_chunk(&mut self) -> Result<Chunk, Error> {
        let chunk = self.child.next_chunk()?;
        let input_schema = self.child.get_output_schema();

        let mut data_chunks = Vec::with_capacity(chunk.len());
        for row in chunk.data_chunks.iter() {
            let mut new_row = Row::with_capacity(self.items.len());
            for item in self.items.iter() {
                match item {
                    Projected::Index(index) => new_row.push(row[*index].clone()),
                    Projected::Expr(expr) => new_row.push(TupleValue {
                        value: ExprEvaluator::evaluate(expr, row, &input_schema)?,
                    }),
                }
            }
            data_chunks.push(new_row);
        }

        Ok(Chunk { data_chunks })
    }

    fn get_output_schema(&self) -> OutputSchema {
        self.output_schema.clone()
    }
}
