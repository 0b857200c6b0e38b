use std::ops::ControlFlow;

use log::debug;
use parquet::record::Field;
use sqlparser::ast::{
    visit_expressions, Expr, Ident, Query, SelectItem, SetExpr, Statement, Value, VisitMut,
    VisitorMut,
};

use crate::optimizer::Optimizer;
use crate::planner::{Plan, Planner};
use crate::storage::Catalog;
use crate::types::{error::Error, ResultSet, TupleValue};

use super::ExecutionEngine;

/// Runs the uncorrelated subqueries of a statement (scalar, `IN (SELECT ..)`
/// and `EXISTS`) and splices their results into it as literals, innermost
/// first. A subquery that refers to an outer column fails to plan on its own
/// and surfaces as that error.
pub struct SubqueryResolver<'a> {
    pub planner: &'a Planner,
    pub optimizer: &'a Optimizer,
    pub engine: &'a ExecutionEngine,
    pub catalog: &'a Catalog,
}

impl<'a> SubqueryResolver<'a> {
    pub fn resolve(&mut self, statement: &mut Statement) -> Result<(), Error> {
        if let Statement::Query(query) = statement {
            label_subquery_columns(query);
        }

        match statement.visit(self) {
            ControlFlow::Break(e) => Err(e),
            ControlFlow::Continue(()) => Ok(()),
        }
    }

    fn run(&self, query: &Query) -> Result<ResultSet, Error> {
        debug!("Running subquery: {}", query);
        let root = self.planner.build_query(query, self.catalog)?;
        match self.optimizer.optimize(Plan::Query { root })? {
            Plan::Query { root } => self.engine.execute_query(root, self.catalog),
            _ => Err(Error::Planner(format!("not a query: {}", query))),
        }
    }

    fn single_column(&self, query: &Query) -> Result<Vec<Field>, Error> {
        let result_set = self.run(query)?;
        let width = result_set.output_schema.len();
        if width != 1 {
            return Err(Error::Execution(format!(
                "sub-select returns {} columns - expected 1",
                width
            )));
        }

        Ok(result_set
            .data_chunks
            .into_iter()
            .flat_map(|chunk| chunk.data_chunks)
            .filter_map(|row| row.into_iter().next().map(|v| v.value))
            .collect())
    }

    fn replacement(&self, expr: &Expr) -> Result<Option<Expr>, Error> {
        match expr {
            Expr::Subquery(query) => {
                let value = self
                    .single_column(query)?
                    .into_iter()
                    .next()
                    .unwrap_or(Field::Null);
                Ok(Some(Expr::Nested(Box::new(literal(value)))))
            }
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => Ok(Some(Expr::InList {
                expr: expr.clone(),
                list: self
                    .single_column(subquery)?
                    .into_iter()
                    .map(literal)
                    .collect(),
                negated: *negated,
            })),
            Expr::Exists { subquery, negated } => {
                let found = self.run(subquery)?.row_count() > 0;
                Ok(Some(Expr::Value(Value::Boolean(found != *negated))))
            }
            _ => Ok(None),
        }
    }
}

impl<'a> VisitorMut for SubqueryResolver<'a> {
    type Break = Error;

    fn post_visit_expr(&mut self, expr: &mut Expr) -> ControlFlow<Self::Break> {
        match self.replacement(expr) {
            Ok(Some(replacement)) => {
                *expr = replacement;
                ControlFlow::Continue(())
            }
            Ok(None) => ControlFlow::Continue(()),
            Err(e) => ControlFlow::Break(e),
        }
    }
}

fn literal(field: Field) -> Expr {
    let value = match field {
        Field::Null => Value::Null,
        Field::Bool(b) => Value::Number(i64::from(b).to_string(), false),
        Field::Int(i) => Value::Number(i.to_string(), false),
        Field::Long(l) => Value::Number(l.to_string(), false),
        // Debug keeps the fraction, so 2.0 stays a real
        Field::Float(f) => Value::Number(format!("{:?}", f as f64), false),
        Field::Double(d) => Value::Number(format!("{:?}", d), false),
        Field::Str(s) => Value::SingleQuotedString(s),
        other => Value::SingleQuotedString(TupleValue::from(other).to_string()),
    };
    Expr::Value(value)
}

fn contains_subquery(expr: &Expr) -> bool {
    visit_expressions(expr, |e| match e {
        Expr::Subquery(_) | Expr::InSubquery { .. } | Expr::Exists { .. } => ControlFlow::Break(()),
        _ => ControlFlow::Continue(()),
    })
    .is_break()
}

/// Result columns are named after the expression as written, so items that
/// are about to have subqueries replaced get that name as an alias first.
fn label_subquery_columns(query: &mut Query) {
    label_set_expr(&mut query.body);
}

fn label_set_expr(body: &mut SetExpr) {
    match body {
        SetExpr::Select(select) => {
            for item in select.projection.iter_mut() {
                let labelled = match item {
                    SelectItem::UnnamedExpr(expr) if contains_subquery(expr) => {
                        Some(SelectItem::ExprWithAlias {
                            alias: Ident::new(expr.to_string()),
                            expr: expr.clone(),
                        })
                    }
                    _ => None,
                };
                if let Some(labelled) = labelled {
                    *item = labelled;
                }
            }
        }
        SetExpr::Query(query) => label_set_expr(&mut query.body),
        SetExpr::SetOperation { left, .. } => label_set_expr(left),
        _ => {}
    }
}
