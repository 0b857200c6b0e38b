use std::cmp::Ordering;

use parquet::record::Field;

use crate::executor::expression::ExprEvaluator;
use crate::executor::Executor;
use crate::planner::{OutputSchema, Projected, SortKey};
use crate::types::{error::Error, Chunk, Row};

use super::{Buffer, RowBudget, VECTOR_SIZE_THRESHOLD};

pub struct Sort {
    output_schema: OutputSchema,
    keys: Vec<SortKey>,
    child: Box<dyn Executor>,
    budget: RowBudget,

    buffer: Option<Buffer>,
}

impl Sort {
    pub fn new(
        child: Box<dyn Executor>,
        keys: Vec<SortKey>,
        budget: RowBudget,
        output_schema: OutputSchema,
    ) -> Result<Box<Sort>, Error> {
        Ok(Box::new(Sort {
            output_schema,
            keys,
            child,
            budget,
            buffer: None,
        }))
    }

    fn sort_rows(&mut self) -> Result<Buffer, Error> {
        let input_schema = self.child.get_output_schema();
        let mut keyed: Vec<(Vec<Field>, Row)> = Vec::new();

        loop {
            let chunk = self.child.next_chunk()?;
            if chunk.is_empty() {
                break;
            }
            self.budget.charge(chunk.len())?;
            for row in chunk.data_chunks {
                let key = self
                    .keys
                    .iter()
                    .map(|k| match &k.key {
                        Projected::Index(index) => Ok(row[*index].value.clone()),
                        Projected::Expr(expr) => ExprEvaluator::evaluate(expr, &row, &input_schema),
                    })
                    .collect::<Result<Vec<Field>, Error>>()?;
                keyed.push((key, row));
            }
        }

        // stable, so ties keep their input order
        keyed.sort_by(|(a, _), (b, _)| {
            for (i, key) in self.keys.iter().enumerate() {
                let ordering = match (&a[i], &b[i]) {
                    (Field::Null, Field::Null) => Ordering::Equal,
                    (Field::Null, _) if key.nulls_first => Ordering::Less,
                    (Field::Null, _) => Ordering::Greater,
                    (_, Field::Null) if key.nulls_first => Ordering::Greater,
                    (_, Field::Null) => Ordering::Less,
                    (l, r) => {
                        let ordering = ExprEvaluator::sort_compare(l, r);
                        if key.asc {
                            ordering
                        } else {
                            ordering.reverse()
                        }
                    }
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        let mut buffer = Buffer::new();
        for (_, row) in keyed {
            buffer.add_row(row);
        }
        Ok(buffer)
    }
}

impl Executor for Sort {
    fn next_chunk(&mut self) -> Result<Chunk, Error> {
        if self.buffer.is_none() {
            self.buffer = Some(self.sort_rows()?);
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
