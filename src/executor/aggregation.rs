use std::cmp;
use std::collections::{HashMap, HashSet};

use parquet::record::Field;
use sqlparser::ast::{BinaryOperator, Expr, Function, FunctionArg, FunctionArgExpr, Value};

use crate::executor::Executor;
use crate::planner::OutputSchema;
use crate::types::error::Error;
use crate::types::{Chunk, Row, TupleValue};

use super::expression::ExprEvaluator;
use super::{group_key, RowBudget, VECTOR_SIZE_THRESHOLD};

type GroupByKey = Vec<String>;
type AggregationColumns = Vec<Box<dyn Accumulator>>;

pub trait Accumulator {
    fn accumulate(&mut self, field: &Field) -> Result<(), Error>;
    fn aggregate(&self) -> Result<Field, Error>;
}

/// Groups the child's rows and emits, per group, the group's first input
/// row followed by one value per aggregate. Bare columns in the select list
/// therefore read from the first row of their group.
pub struct Aggregation {
    output_schema: OutputSchema,
    child: Box<dyn Executor>,
    aggregates: Vec<Function>,
    group_by: Vec<Expr>,
    budget: RowBudget,

    rows: Option<Vec<Row>>,
}

impl Aggregation {
    pub fn new(
        child: Box<dyn Executor>,
        aggregates: Vec<Function>,
        group_by: Vec<Expr>,
        budget: RowBudget,
        output_schema: OutputSchema,
    ) -> Result<Box<Aggregation>, Error> {
        Ok(Box::new(Aggregation {
            child,
            output_schema,
            group_by,
            aggregates,
            budget,
            rows: None,
        }))
    }

    fn init_accumulators(&mut self) -> Result<(), Error> {
        if self.rows.is_some() {
            return Ok(());
        }

        let input_schema = self.child.get_output_schema();
        let arguments = self
            .aggregates
            .iter()
            .map(Self::get_expr)
            .collect::<Result<Vec<Expr>, Error>>()?;

        // insertion order of groups is kept so output is deterministic
        let mut order: Vec<GroupByKey> = Vec::new();
        let mut groups: HashMap<GroupByKey, (AggregationColumns, Row)> = HashMap::new();

        loop {
            let chunk = self.child.next_chunk()?;
            if chunk.is_empty() {
                break;
            }
            self.budget.charge(chunk.len())?;
            for row in chunk.data_chunks {
                let group_by_values = self
                    .group_by
                    .iter()
                    .map(|expr| ExprEvaluator::evaluate(expr, &row, &input_schema))
                    .collect::<Result<Vec<Field>, Error>>()?;
                let key = group_key(&group_by_values);

                if !groups.contains_key(&key) {
                    let accumulators = self
                        .aggregates
                        .iter()
                        .map(Self::new_accumulator)
                        .collect::<Result<AggregationColumns, Error>>()?;
                    order.push(key.clone());
                    groups.insert(key.clone(), (accumulators, row.clone()));
                }

                if let Some((accumulators, _)) = groups.get_mut(&key) {
                    for (accumulator, argument) in accumulators.iter_mut().zip(arguments.iter()) {
                        let field = ExprEvaluator::evaluate(argument, &row, &input_schema)?;
                        accumulator.accumulate(&field)?;
                    }
                }
            }
        }

        // without GROUP BY an empty input still produces one row
        if groups.is_empty() && self.group_by.is_empty() {
            let accumulators = self
                .aggregates
                .iter()
                .map(Self::new_accumulator)
                .collect::<Result<AggregationColumns, Error>>()?;
            let first_row = (0..input_schema.len()).map(|_| TupleValue::null()).collect();
            order.push(Vec::new());
            groups.insert(Vec::new(), (accumulators, first_row));
        }

        let mut rows = Vec::with_capacity(order.len());
        for key in order {
            if let Some((accumulators, first_row)) = groups.remove(&key) {
                let mut row = first_row;
                for accumulator in accumulators.iter() {
                    row.push(TupleValue {
                        value: accumulator.aggregate()?,
                    });
                }
                rows.push(row);
            }
        }

        self.rows = Some(rows);
        Ok(())
    }

    fn new_accumulator(function: &Function) -> Result<Box<dyn Accumulator>, Error> {
        let accumulator: Box<dyn Accumulator> =
            match function.name.to_string().to_lowercase().as_str() {
                "max" => Box::new(MaxAccumulator::new()),
                "min" => Box::new(MinAccumulator::new()),
                "sum" => Box::new(SumAccumulator::new(false)),
                "total" => Box::new(SumAccumulator::new(true)),
                "count" => Box::new(CountAccumulator::new()),
                "avg" => Box::new(AvgAccumulator::new()),
                _ => {
                    return Err(Error::Execution(format!(
                        "Unsupported function: {}",
                        function.name
                    )))
                }
            };

        if function.distinct {
            Ok(Box::new(DistinctAccumulator::new(accumulator)))
        } else {
            Ok(accumulator)
        }
    }

    fn get_expr(function: &Function) -> Result<Expr, Error> {
        if function.args.len() != 1 {
            return Err(Error::Expression(format!(
                "Unsupported number of parameteres: {}",
                function.args.len()
            )));
        }

        match &function.args[0] {
            FunctionArg::Unnamed(fa) => match fa {
                FunctionArgExpr::Expr(e) => Ok(e.clone()),
                FunctionArgExpr::Wildcard if function.name.to_string().eq_ignore_ascii_case("count") => {
                    Ok(Expr::Value(Value::Boolean(true)))
                }
                _ => Err(Error::Expression(format!(
                    "Unsupported argument {} for function {}",
                    function.args[0], function.name
                ))),
            },
            _ => Err(Error::Expression(format!(
                "Unsupported function : {}",
                function.args[0]
            ))),
        }
    }
}

impl Executor for Aggregation {
    fn next_chunk(&mut self) -> Result<Chunk, Error> {
        self.init_accumulators()?;

        let mut res = Chunk::default();

        if let Some(rows) = self.rows.as_mut() {
            let n = cmp::min(VECTOR_SIZE_THRESHOLD, rows.len());
            res.data_chunks.extend(rows.drain(0..n));
        }

        Ok(res)
    }

    fn get_output_schema(&self) -> OutputSchema {
        self.output_schema.clone()
    }
}

struct DistinctAccumulator {
    inner: Box<dyn Accumulator>,
    seen: HashSet<Vec<String>>,
}

impl DistinctAccumulator {
    fn new(inner: Box<dyn Accumulator>) -> DistinctAccumulator {
        DistinctAccumulator {
            inner,
            seen: HashSet::new(),
        }
    }
}

impl Accumulator for DistinctAccumulator {
    fn accumulate(&mut self, field: &Field) -> Result<(), Error> {
        if self.seen.insert(group_key(std::slice::from_ref(field))) {
            self.inner.accumulate(field)?;
        }
        Ok(())
    }

    fn aggregate(&self) -> Result<Field, Error> {
        self.inner.aggregate()
    }
}

struct MaxAccumulator {
    max: Option<Field>,
}

impl MaxAccumulator {
    fn new() -> MaxAccumulator {
        MaxAccumulator { max: None }
    }
}

impl Accumulator for MaxAccumulator {
    fn accumulate(&mut self, field: &Field) -> Result<(), Error> {
        if *field == Field::Null {
            return Ok(());
        }

        match self.max {
            Some(ref max) => {
                if ExprEvaluator::sort_compare(field, max) == cmp::Ordering::Greater {
                    self.max = Some(field.clone());
                }
            }
            None => {
                self.max = Some(field.clone());
            }
        }
        Ok(())
    }

    fn aggregate(&self) -> Result<Field, Error> {
        Ok(self.max.clone().unwrap_or(Field::Null))
    }
}

struct MinAccumulator {
    min: Option<Field>,
}

impl MinAccumulator {
    fn new() -> MinAccumulator {
        MinAccumulator { min: None }
    }
}

impl Accumulator for MinAccumulator {
    fn accumulate(&mut self, field: &Field) -> Result<(), Error> {
        if *field == Field::Null {
            return Ok(());
        }

        match self.min {
            Some(ref min) => {
                if ExprEvaluator::sort_compare(field, min) == cmp::Ordering::Less {
                    self.min = Some(field.clone());
                }
            }
            None => {
                self.min = Some(field.clone());
            }
        }
        Ok(())
    }

    fn aggregate(&self) -> Result<Field, Error> {
        Ok(self.min.clone().unwrap_or(Field::Null))
    }
}

struct SumAccumulator {
    sum: Option<Field>,
    /// TOTAL() is SUM() that yields 0.0 instead of NULL and is always real.
    total: bool,
}

impl SumAccumulator {
    fn new(total: bool) -> SumAccumulator {
        SumAccumulator { sum: None, total }
    }
}

impl Accumulator for SumAccumulator {
    fn accumulate(&mut self, field: &Field) -> Result<(), Error> {
        if *field == Field::Null {
            return Ok(());
        }

        let sum = match self.sum {
            Some(ref sum) => ExprEvaluator::evaluate_binary_op(sum, &BinaryOperator::Plus, field)?,
            None => ExprEvaluator::evaluate_binary_op(&Field::Long(0), &BinaryOperator::Plus, field)?,
        };
        self.sum = Some(sum);
        Ok(())
    }

    fn aggregate(&self) -> Result<Field, Error> {
        match (&self.sum, self.total) {
            (None, false) => Ok(Field::Null),
            (None, true) => Ok(Field::Double(0.0)),
            (Some(sum), true) => Ok(Field::Double(ExprEvaluator::to_f64(sum).unwrap_or(0.0))),
            (Some(sum), false) => Ok(sum.clone()),
        }
    }
}

struct CountAccumulator {
    count: i64,
}

impl CountAccumulator {
    fn new() -> CountAccumulator {
        CountAccumulator { count: 0 }
    }
}

impl Accumulator for CountAccumulator {
    fn accumulate(&mut self, field: &Field) -> Result<(), Error> {
        if *field == Field::Null {
            return Ok(());
        }
        self.count += 1;
        Ok(())
    }

    fn aggregate(&self) -> Result<Field, Error> {
        Ok(Field::Long(self.count))
    }
}

struct AvgAccumulator {
    count: i64,
    sum: f64,
}

impl AvgAccumulator {
    fn new() -> AvgAccumulator {
        AvgAccumulator { count: 0, sum: 0.0 }
    }
}

impl Accumulator for AvgAccumulator {
    fn accumulate(&mut self, field: &Field) -> Result<(), Error> {
        if *field == Field::Null {
            return Ok(());
        }
        self.count += 1;
        self.sum += ExprEvaluator::to_f64(field).unwrap_or(0.0);
        Ok(())
    }

    fn aggregate(&self) -> Result<Field, Error> {
        if self.count == 0 {
            return Ok(Field::Null);
        }
        Ok(Field::Double(self.sum / self.count as f64))
    }
}
