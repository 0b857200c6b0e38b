use log::debug;

use crate::executor;
use crate::executor::subquery::SubqueryResolver;
use crate::optimizer;
use crate::parser;
use crate::planner;
use crate::storage::Catalog;
use crate::types::{error::Error, ResultSet};

pub struct Database {
    parser: parser::SQLParser,
    planner: planner::Planner,
    optimizer: optimizer::Optimizer,
    executor: executor::ExecutionEngine,
    catalog: Catalog,
}

impl Database {
    pub fn new() -> Result<Database, Error> {
        Database::with_row_limit(executor::DEFAULT_MAX_RESULT_ROWS)
    }

    pub fn with_row_limit(max_result_rows: usize) -> Result<Database, Error> {
        Ok(Database {
            parser: parser::SQLParser::new(),
            planner: planner::Planner::new(),
            optimizer: optimizer::Optimizer::new(),
            executor: executor::ExecutionEngine::new(max_result_rows),
            catalog: Catalog::new(),
        })
    }

    /// Runs every statement in `sql` in order and returns the first result
    /// set produced, or `None` if no statement produced one.
    pub fn execute(&mut self, sql: &str) -> Result<Option<ResultSet>, Error> {
        let mut statements = self.parser.parse(sql)?;
        let mut first = None;

        for statement in statements.iter_mut() {
            SubqueryResolver {
                planner: &self.planner,
                optimizer: &self.optimizer,
                engine: &self.executor,
                catalog: &self.catalog,
            }
            .resolve(statement)?;

            let plan = self.planner.build_statement(statement, &self.catalog)?;
            let optimized_plan = self.optimizer.optimize(plan)?;
            let result_set = self.executor.execute(optimized_plan, &mut self.catalog)?;

            if first.is_none() {
                first = result_set;
            }
        }

        debug!(
            "Executed {} statement(s), result set: {}",
            statements.len(),
            first.is_some()
        );
        Ok(first)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
