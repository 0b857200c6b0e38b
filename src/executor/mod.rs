pub mod expression;

mod aggregation;
mod distinct;
mod empty;
mod filter;
mod limit;
mod nested_join;
mod projection;
mod scan;
mod set_operation;
mod sort;
pub mod subquery;

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::debug;
use parquet::record::Field;
use sqlparser::ast::Expr;

use crate::{
    planner::{Node, OutputSchema, Plan, PlanNode},
    storage::{Catalog, Table},
    types::{error::Error, Chunk, ResultSet, Row, TupleValue},
};

use self::{
    aggregation::Aggregation, distinct::Distinct, empty::Empty, expression::ExprEvaluator,
    filter::Filter, limit::Limit, nested_join::NestedLoopJoin, projection::Projection, scan::Scan,
    set_operation::SetOperationExecutor, sort::Sort,
};

const VECTOR_SIZE_THRESHOLD: usize = 1024;

pub const DEFAULT_MAX_RESULT_ROWS: usize = 10_000;

pub trait Executor {
    fn get_output_schema(&self) -> OutputSchema;
    fn next_chunk(&mut self) -> Result<Chunk, Error>;
}

/// FIFO of rows handed out in chunks of bounded size.
#[derive(Default)]
pub struct Buffer {
    rows: VecDeque<Row>,
}

impl Buffer {
    pub fn new() -> Buffer {
        Buffer::default()
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn add_row(&mut self, row: Row) {
        self.rows.push_back(row);
    }

    pub fn get_sized_chunk(&mut self, size: usize) -> Chunk {
        let n = size.min(self.rows.len());
        Chunk {
            data_chunks: self.rows.drain(0..n).collect(),
        }
    }
}

/// Rows a single query may materialise across its joins, sorts,
/// aggregations, set operations and final result. Clones share one counter.
#[derive(Clone)]
pub struct RowBudget {
    limit: usize,
    used: Rc<Cell<usize>>,
}

impl RowBudget {
    pub fn new(limit: usize) -> RowBudget {
        RowBudget {
            limit,
            used: Rc::new(Cell::new(0)),
        }
    }

    pub fn charge(&self, rows: usize) -> Result<(), Error> {
        let used = self.used.get().saturating_add(rows);
        self.used.set(used);
        if used > self.limit {
            return Err(Error::Execution(format!(
                "query exceeds the limit of {} rows",
                self.limit
            )));
        }
        Ok(())
    }
}

/// Key identifying a tuple of values for grouping and DISTINCT: numbers
/// compare by value, text by content, NULLs with each other.
pub(crate) fn group_key(fields: &[Field]) -> Vec<String> {
    fields
        .iter()
        .map(|field| match field {
            Field::Null => "null".to_string(),
            Field::Str(s) => format!("s:{}", s),
            other => match ExprEvaluator::to_f64(other) {
                Some(n) => format!("n:{}", n),
                None => format!("o:{}", other),
            },
        })
        .collect()
}

struct ExecutorBuilder {}

impl ExecutorBuilder {
    fn build(
        plan_node: PlanNode,
        catalog: &Catalog,
        budget: &RowBudget,
    ) -> Result<Box<dyn Executor>, Error> {
        let output_schema = plan_node.output_schema;

        match plan_node.node {
            Node::Scan { table_name, filter } => {
                let table: &Table = catalog.get_table(&table_name)?;
                Ok(Scan::new(table.rows.clone(), filter, output_schema)?)
            }
            Node::NestedLoopJoin {
                child_left,
                child_right,
                predicate,
                kind,
            } => {
                let child_left = Self::build(*child_left, catalog, budget)?;
                let child_right = Self::build(*child_right, catalog, budget)?;
                Ok(NestedLoopJoin::new(
                    child_left,
                    child_right,
                    predicate,
                    kind,
                    budget.clone(),
                    output_schema,
                )?)
            }
            Node::Filter { filter, child } => {
                let child = Self::build(*child, catalog, budget)?;
                Ok(Filter::new(child, filter, output_schema)?)
            }
            Node::Aggregation {
                aggregates,
                group_by,
                child,
            } => {
                let child = Self::build(*child, catalog, budget)?;
                Ok(Aggregation::new(
                    child,
                    aggregates,
                    group_by,
                    budget.clone(),
                    output_schema,
                )?)
            }
            Node::Sort { keys, child } => {
                let child = Self::build(*child, catalog, budget)?;
                Ok(Sort::new(child, keys, budget.clone(), output_schema)?)
            }
            Node::Projection { items, child } => {
                let child = Self::build(*child, catalog, budget)?;
                Ok(Projection::new(child, items, output_schema)?)
            }
            Node::Distinct { child } => {
                let child = Self::build(*child, catalog, budget)?;
                Ok(Distinct::new(child, output_schema)?)
            }
            Node::SetOperation {
                op,
                child_left,
                child_right,
            } => {
                let child_left = Self::build(*child_left, catalog, budget)?;
                let child_right = Self::build(*child_right, catalog, budget)?;
                Ok(SetOperationExecutor::new(
                    op,
                    child_left,
                    child_right,
                    budget.clone(),
                    output_schema,
                )?)
            }
            Node::Limit {
                limit,
                offset,
                child,
            } => {
                let child = Self::build(*child, catalog, budget)?;
                Ok(Limit::new(child, limit, offset, output_schema)?)
            }
            Node::Empty {} => Ok(Empty::new()?),
        }
    }
}

pub struct ExecutionEngine {
    max_result_rows: usize,
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        ExecutionEngine::new(DEFAULT_MAX_RESULT_ROWS)
    }
}

impl ExecutionEngine {
    pub fn new(max_result_rows: usize) -> ExecutionEngine {
        ExecutionEngine { max_result_rows }
    }

    /// Runs a plan. Only queries produce a result set; DDL and DML mutate
    /// the catalog and return `None`.
    pub fn execute(&self, plan: Plan, catalog: &mut Catalog) -> Result<Option<ResultSet>, Error> {
        match plan {
            Plan::Query { root } => self.execute_query(root, catalog).map(Some),
            Plan::CreateTable {
                name,
                columns,
                if_not_exists,
            } => {
                debug!("Creating table {}", name);
                if columns.is_empty() {
                    return Err(Error::Execution(format!("table {} has no columns", name)));
                }
                catalog.create_table(Table::new(name, columns), if_not_exists)?;
                Ok(None)
            }
            Plan::Insert {
                table_name,
                columns,
                rows,
            } => {
                let table = catalog.get_table_mut(&table_name)?;
                let empty_schema = OutputSchema::default();

                let positions = columns
                    .iter()
                    .map(|c| {
                        table.column_index(c).ok_or_else(|| {
                            Error::Execution(format!("table {} has no column named {}", table_name, c))
                        })
                    })
                    .collect::<Result<Vec<usize>, Error>>()?;

                for exprs in rows {
                    let values = exprs
                        .iter()
                        .map(|e| ExprEvaluator::evaluate(e, &Vec::new(), &empty_schema))
                        .collect::<Result<Vec<Field>, Error>>()?;

                    let values = if positions.is_empty() {
                        values
                    } else {
                        if values.len() != positions.len() {
                            return Err(Error::Execution(format!(
                                "{} values for {} columns",
                                values.len(),
                                positions.len()
                            )));
                        }
                        let mut full = vec![Field::Null; table.columns.len()];
                        for (position, value) in positions.iter().zip(values) {
                            full[*position] = value;
                        }
                        full
                    };

                    table.insert(values)?;
                }
                Ok(None)
            }
            Plan::DropTable { names, if_exists } => {
                for name in names {
                    catalog.drop_table(&name, if_exists)?;
                }
                Ok(None)
            }
            Plan::Update {
                table_name,
                qualifier,
                assignments,
                filter,
            } => {
                let table = catalog.get_table_mut(&table_name)?;
                let schema = OutputSchema::new(table.schema(&qualifier));
                let targets = assignments
                    .iter()
                    .map(|(column, expr)| {
                        table
                            .column_index(column)
                            .map(|index| (index, expr))
                            .ok_or_else(|| Error::Execution(format!("no such column: {}", column)))
                    })
                    .collect::<Result<Vec<(usize, &Expr)>, Error>>()?;

                // every new value is computed from the old rows before any is written
                let mut updates = Vec::new();
                for (position, row) in table.rows.iter().enumerate() {
                    if !Self::row_matches(filter.as_ref(), row, &schema)? {
                        continue;
                    }
                    let values = targets
                        .iter()
                        .map(|(_, expr)| ExprEvaluator::evaluate(expr, row, &schema))
                        .collect::<Result<Vec<Field>, Error>>()?;
                    updates.push((position, values));
                }

                debug!("Updating {} row(s) of {}", updates.len(), table_name);
                for (position, values) in updates {
                    for ((index, _), value) in targets.iter().zip(values) {
                        let value = table.columns[*index].affinity.coerce(value);
                        table.rows[position][*index] = TupleValue { value };
                    }
                }
                Ok(None)
            }
            Plan::Delete {
                table_name,
                qualifier,
                filter,
            } => {
                let table = catalog.get_table_mut(&table_name)?;
                let schema = OutputSchema::new(table.schema(&qualifier));
                let doomed = table
                    .rows
                    .iter()
                    .map(|row| Self::row_matches(filter.as_ref(), row, &schema))
                    .collect::<Result<Vec<bool>, Error>>()?;

                let rows = std::mem::take(&mut table.rows);
                table.rows = rows
                    .into_iter()
                    .zip(doomed)
                    .filter_map(|(row, doomed)| if doomed { None } else { Some(row) })
                    .collect();
                debug!("{} row(s) left in {}", table.rows.len(), table_name);
                Ok(None)
            }
        }
    }

    fn row_matches(filter: Option<&Expr>, row: &Row, schema: &OutputSchema) -> Result<bool, Error> {
        match filter {
            Some(filter) => Ok(ExprEvaluator::to_boolean(&ExprEvaluator::evaluate(
                filter, row, schema,
            )?)),
            None => Ok(true),
        }
    }

    pub fn execute_query(&self, root: PlanNode, catalog: &Catalog) -> Result<ResultSet, Error> {
        debug!("Executing...");
        let budget = RowBudget::new(self.max_result_rows);
        let mut executor = ExecutorBuilder::build(root, catalog, &budget)?;
        let mut result = ResultSet {
            output_schema: executor.get_output_schema(),
            ..ResultSet::default()
        };

        loop {
            let chunk = executor.next_chunk()?;

            if chunk.is_empty() {
                break;
            }

            budget.charge(chunk.len())?;
            result.data_chunks.push(chunk);
        }

        Ok(result)
    }
}
