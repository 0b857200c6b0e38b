use sqlparser::ast::Expr;

use crate::executor::expression::ExprEvaluator;
use crate::executor::Executor;
use crate::planner::OutputSchema;
use crate::types::{error::Error, Chunk};

pub struct Filter {
    filter: Expr,
    child: Box<dyn Executor>,
    output_schema: OutputSchema,
}

impl Filter {
    pub fn new(
        child: Box<dyn Executor>,
        filter: Expr,
        output_schema: OutputSchema,
    ) -> Result<Box<Filter>, Error> {
        Ok(Box::new(Filter {
            filter,
            child,
            output_schema,
        }))
    }
}

impl Executor for Filter {
    fn next_chunk(&mut self) -> Result<Chunk, Error> {
        let input_schema = self.child.get_output_schema();

        loop {
            let chunk = self.child.next_chunk()?;
            if chunk.is_empty() {
                return Ok(chunk);
            }

            let mut data_chunks = Vec::new();
            for row in chunk.data_chunks {
                let field = ExprEvaluator::evaluate(&self.filter, &row, &input_schema)?;
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
