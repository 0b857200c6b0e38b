use log::debug;
use sqlparser::ast::{
    Assignment, Distinct, Expr, FunctionArg, FunctionArgExpr, Function, Ident, JoinConstraint,
    JoinOperator, ObjectName, ObjectType, Offset, OrderByExpr, Query, Select, SelectItem, SetExpr,
    SetOperator, SetQuantifier, Statement, TableFactor, TableWithJoins, Value,
};

use crate::{
    executor::expression::ExprEvaluator,
    storage::{Affinity, Catalog, TableColumn},
    types::{error::Error, Column},
};

const AGGREGATE_FUNCTIONS: [&str; 6] = ["count", "sum", "avg", "min", "max", "total"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSchema {
    pub columns: Vec<Column>,
}

impl OutputSchema {
    pub fn new(columns: Vec<Column>) -> OutputSchema {
        OutputSchema { columns }
    }

    /// Index of the column called `name`, optionally restricted to columns
    /// of `table`. Names compare ignoring ASCII case.
    pub fn resolve_qualified(&self, table: Option<&str>, name: &str) -> Result<usize, Error> {
        let mut matches = self.columns.iter().enumerate().filter(|(_, c)| {
            c.name.eq_ignore_ascii_case(name)
                && match (table, &c.table) {
                    (None, _) => true,
                    (Some(t), Some(ct)) => ct.eq_ignore_ascii_case(t),
                    (Some(_), None) => false,
                }
        });

        let display = match table {
            Some(t) => format!("{}.{}", t, name),
            None => name.to_string(),
        };

        match (matches.next(), matches.next()) {
            (Some((index, _)), None) => Ok(index),
            (Some(_), Some(_)) => Err(Error::Expression(format!(
                "ambiguous column name: {}",
                display
            ))),
            (None, _) => Err(Error::Expression(format!("no such column: {}", display))),
        }
    }

    pub fn join(&self, other: &OutputSchema) -> OutputSchema {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        OutputSchema { columns }
    }

    pub fn requalify(&self, table: &str) -> OutputSchema {
        OutputSchema {
            columns: self
                .columns
                .iter()
                .map(|c| Column::qualified(table, c.name.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperation {
    Union,
    UnionAll,
    Except,
    Intersect,
}

/// A single output column of a projection: either a column copied from the
/// child by position (wildcards) or an expression evaluated per row.
#[derive(Debug, Clone)]
pub enum Projected {
    Index(usize),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct SortKey {
    pub key: Projected,
    pub asc: bool,
    pub nulls_first: bool,
}

#[derive(Debug)]
pub struct PlanNode {
    pub output_schema: OutputSchema,
    pub node: Node,
}

#[derive(Debug)]
pub enum Node {
    Scan {
        table_name: String,
        filter: Option<Expr>,
    },
    NestedLoopJoin {
        child_left: Box<PlanNode>,
        child_right: Box<PlanNode>,
        predicate: Option<Expr>,
        kind: JoinKind,
    },
    Filter {
        filter: Expr,
        child: Box<PlanNode>,
    },
    Aggregation {
        aggregates: Vec<Function>,
        group_by: Vec<Expr>,
        child: Box<PlanNode>,
    },
    Sort {
        keys: Vec<SortKey>,
        child: Box<PlanNode>,
    },
    Projection {
        items: Vec<Projected>,
        child: Box<PlanNode>,
    },
    Distinct {
        child: Box<PlanNode>,
    },
    SetOperation {
        op: SetOperation,
        child_left: Box<PlanNode>,
        child_right: Box<PlanNode>,
    },
    Limit {
        limit: Option<u64>,
        offset: u64,
        child: Box<PlanNode>,
    },
    Empty {},
}

#[derive(Debug)]
pub enum Plan {
    Query {
        root: PlanNode,
    },
    CreateTable {
        name: String,
        columns: Vec<TableColumn>,
        if_not_exists: bool,
    },
    Insert {
        table_name: String,
        columns: Vec<String>,
        rows: Vec<Vec<Expr>>,
    },
    DropTable {
        names: Vec<String>,
        if_exists: bool,
    },
    /// `qualifier` is the name rows are addressed by in `filter` and the
    /// assigned expressions: the alias if one was given.
    Update {
        table_name: String,
        qualifier: String,
        assignments: Vec<(String, Expr)>,
        filter: Option<Expr>,
    },
    Delete {
        table_name: String,
        qualifier: String,
        filter: Option<Expr>,
    },
}

#[derive(Default)]
pub struct Planner {}

impl Planner {
    pub fn new() -> Planner {
        Planner {}
    }

    pub fn build_statement(&self, statement: &Statement, catalog: &Catalog) -> Result<Plan, Error> {
        debug!("Planning: {}", statement);

        match statement {
            Statement::Query(query) => Ok(Plan::Query {
                root: self.build_query(query, catalog)?,
            }),
            Statement::CreateTable {
                name,
                columns,
                if_not_exists,
                ..
            } => Ok(Plan::CreateTable {
                name: object_name(name),
                columns: columns
                    .iter()
                    .map(|c| TableColumn {
                        name: c.name.value.clone(),
                        affinity: Affinity::from_declared_type(&c.data_type.to_string()),
                    })
                    .collect(),
                if_not_exists: *if_not_exists,
            }),
            Statement::Insert {
                table_name,
                columns,
                source,
                ..
            } => match &*source.body {
                SetExpr::Values(values) => Ok(Plan::Insert {
                    table_name: object_name(table_name),
                    columns: columns.iter().map(|c| c.value.clone()).collect(),
                    rows: values.rows.clone(),
                }),
                _ => Err(Error::Planner(
                    "Only INSERT ... VALUES is supported".to_string(),
                )),
            },
            Statement::Drop {
                object_type: ObjectType::Table,
                if_exists,
                names,
                ..
            } => Ok(Plan::DropTable {
                names: names.iter().map(object_name).collect(),
                if_exists: *if_exists,
            }),
            Statement::Update {
                table,
                assignments,
                from: None,
                selection,
                ..
            } if table.joins.is_empty() => {
                let (table_name, qualifier) = target_table(&table.relation, catalog)?;
                Ok(Plan::Update {
                    assignments: self.build_assignments(assignments, &table_name, catalog)?,
                    table_name,
                    qualifier,
                    filter: selection.clone(),
                })
            }
            Statement::Delete {
                tables,
                from,
                using: None,
                selection,
                ..
            } if tables.is_empty() && from.len() == 1 && from[0].joins.is_empty() => {
                let (table_name, qualifier) = target_table(&from[0].relation, catalog)?;
                Ok(Plan::Delete {
                    table_name,
                    qualifier,
                    filter: selection.clone(),
                })
            }
            _ => Err(Error::Planner(format!(
                "Unsupported statement: {}",
                statement
            ))),
        }
    }

    fn build_assignments(
        &self,
        assignments: &[Assignment],
        table_name: &str,
        catalog: &Catalog,
    ) -> Result<Vec<(String, Expr)>, Error> {
        let table = catalog.get_table(table_name)?;
        assignments
            .iter()
            .map(|assignment| {
                let column = assignment
                    .id
                    .last()
                    .map(|ident| ident.value.clone())
                    .unwrap_or_default();
                match table.column_index(&column) {
                    Some(_) => Ok((column, assignment.value.clone())),
                    None => Err(Error::Planner(format!("no such column: {}", column))),
                }
            })
            .collect()
    }

    pub fn build_query(&self, query: &Query, catalog: &Catalog) -> Result<PlanNode, Error> {
        if query.with.is_some() {
            return Err(Error::Planner("WITH is not supported".to_string()));
        }

        let node = match &*query.body {
            SetExpr::Select(select) => self.build_select(select, &query.order_by, catalog)?,
            body => {
                let node = self.build_set_expr(body, catalog)?;
                self.build_compound_order_by(node, &query.order_by)?
            }
        };

        self.build_limit(node, &query.limit, &query.offset)
    }

    fn build_set_expr(&self, body: &SetExpr, catalog: &Catalog) -> Result<PlanNode, Error> {
        match body {
            SetExpr::Select(select) => self.build_select(select, &[], catalog),
            SetExpr::Query(query) => self.build_query(query, catalog),
            SetExpr::SetOperation {
                op,
                set_quantifier,
                left,
                right,
            } => {
                let all = matches!(set_quantifier, SetQuantifier::All);
                let op = match op {
                    SetOperator::Union if all => SetOperation::UnionAll,
                    SetOperator::Union => SetOperation::Union,
                    SetOperator::Except if !all => SetOperation::Except,
                    SetOperator::Intersect if !all => SetOperation::Intersect,
                    _ => {
                        return Err(Error::Planner(format!(
                            "{} {} is not supported",
                            op, set_quantifier
                        )))
                    }
                };

                let left = self.build_set_expr(left, catalog)?;
                let right = self.build_set_expr(right, catalog)?;
                if left.output_schema.len() != right.output_schema.len() {
                    return Err(Error::Planner(format!(
                        "SELECTs to the left and right of {} do not have the same number of result columns",
                        op_keyword(op)
                    )));
                }

                let columns = left
                    .output_schema
                    .columns
                    .iter()
                    .map(|c| Column::new(c.name.clone()))
                    .collect();

                Ok(PlanNode {
                    output_schema: OutputSchema::new(columns),
                    node: Node::SetOperation {
                        op,
                        child_left: Box::new(left),
                        child_right: Box::new(right),
                    },
                })
            }
            _ => Err(Error::Planner(
                "Only SELECT, UNION, EXCEPT and INTERSECT are supported".to_string(),
            )),
        }
    }

    /// ORDER BY of a compound SELECT can only name result columns, by name
    /// or by 1-based position.
    fn build_compound_order_by(
        &self,
        node: PlanNode,
        order_by: &[OrderByExpr],
    ) -> Result<PlanNode, Error> {
        if order_by.is_empty() {
            return Ok(node);
        }

        let columns = &node.output_schema.columns;
        let mut keys = Vec::with_capacity(order_by.len());
        for (i, term) in order_by.iter().enumerate() {
            let name = match &term.expr {
                Expr::Identifier(ident) => Some(&ident.value),
                Expr::CompoundIdentifier(idents) => idents.last().map(|ident| &ident.value),
                _ => None,
            };
            let index = match (&term.expr, name) {
                (Expr::Value(Value::Number(n, _)), _) => n
                    .parse::<usize>()
                    .ok()
                    .filter(|position| *position >= 1 && *position <= columns.len())
                    .map(|position| position - 1),
                (_, Some(name)) => columns.iter().position(|c| c.name.eq_ignore_ascii_case(name)),
                _ => None,
            };
            let index = index.ok_or_else(|| {
                Error::Planner(format!(
                    "{} ORDER BY term does not match any column in the result set",
                    ordinal(i + 1)
                ))
            })?;

            let asc = term.asc.unwrap_or(true);
            keys.push(SortKey {
                key: Projected::Index(index),
                asc,
                nulls_first: term.nulls_first.unwrap_or(asc),
            });
        }

        Ok(PlanNode {
            output_schema: node.output_schema.clone(),
            node: Node::Sort {
                keys,
                child: Box::new(node),
            },
        })
    }

    fn build_limit(
        &self,
        node: PlanNode,
        limit: &Option<Expr>,
        offset: &Option<Offset>,
    ) -> Result<PlanNode, Error> {
        let limit = match limit {
            Some(expr) => {
                let value = constant_integer(expr)?;
                if value < 0 {
                    None
                } else {
                    Some(value as u64)
                }
            }
            None => None,
        };
        let offset = match offset {
            Some(offset) => constant_integer(&offset.value)?.max(0) as u64,
            None => 0,
        };

        if limit.is_none() && offset == 0 {
            return Ok(node);
        }

        Ok(PlanNode {
            output_schema: node.output_schema.clone(),
            node: Node::Limit {
                limit,
                offset,
                child: Box::new(node),
            },
        })
    }

    fn build_select(
        &self,
        select: &Select,
        order_by: &[OrderByExpr],
        catalog: &Catalog,
    ) -> Result<PlanNode, Error> {
        let Select {
            distinct,
            from,
            projection,
            selection,
            group_by,
            having,
            ..
        } = select;

        if let Some(Distinct::On(_)) = distinct {
            return Err(Error::Planner("DISTINCT ON is not supported".to_string()));
        }

        // Build FROM
        let node = self.build_from_clause(from, catalog)?;
        let source_schema = node.output_schema.clone();

        // Build WHERE
        let node = match selection {
            Some(filter) => PlanNode {
                output_schema: node.output_schema.clone(),
                node: Node::Filter {
                    filter: filter.clone(),
                    child: Box::new(node),
                },
            },
            None => node,
        };

        let (items, headers) = self.build_projection_items(projection, &source_schema)?;
        let sort_exprs = self.resolve_order_by(order_by, projection, &items)?;
        let group_by = self.resolve_group_by(group_by, projection, &items, &source_schema)?;

        // Build GROUP BY and aggregates
        let mut aggregates: Vec<Function> = Vec::new();
        for item in items.iter() {
            if let Projected::Expr(expr) = item {
                collect_aggregates(expr, &mut aggregates);
            }
        }
        if let Some(having) = having {
            collect_aggregates(having, &mut aggregates);
        }
        for key in sort_exprs.iter() {
            if let Projected::Expr(expr) = &key.key {
                collect_aggregates(expr, &mut aggregates);
            }
        }

        let node = if !aggregates.is_empty() || !group_by.is_empty() {
            let mut columns = node.output_schema.columns.clone();
            columns.extend(aggregates.iter().map(|f| Column::new(f.to_string())));

            PlanNode {
                output_schema: OutputSchema::new(columns),
                node: Node::Aggregation {
                    aggregates,
                    group_by,
                    child: Box::new(node),
                },
            }
        } else {
            node
        };

        // Build HAVING
        let node = match having {
            Some(filter) => PlanNode {
                output_schema: node.output_schema.clone(),
                node: Node::Filter {
                    filter: filter.clone(),
                    child: Box::new(node),
                },
            },
            None => node,
        };

        // Build ORDER BY
        let node = if !sort_exprs.is_empty() {
            PlanNode {
                output_schema: node.output_schema.clone(),
                node: Node::Sort {
                    keys: sort_exprs,
                    child: Box::new(node),
                },
            }
        } else {
            node
        };

        // Build PROJECTION
        let node = PlanNode {
            output_schema: OutputSchema::new(headers),
            node: Node::Projection {
                items,
                child: Box::new(node),
            },
        };

        // Build DISTINCT
        let node = if distinct.is_some() {
            PlanNode {
                output_schema: node.output_schema.clone(),
                node: Node::Distinct {
                    child: Box::new(node),
                },
            }
        } else {
            node
        };

        Ok(node)
    }

    fn build_projection_items(
        &self,
        projection: &[SelectItem],
        source_schema: &OutputSchema,
    ) -> Result<(Vec<Projected>, Vec<Column>), Error> {
        let mut items = Vec::new();
        let mut headers = Vec::new();

        for item in projection {
            match item {
                SelectItem::UnnamedExpr(expr) => {
                    headers.push(Column::new(header_for_expr(expr)));
                    items.push(Projected::Expr(expr.clone()));
                }
                SelectItem::ExprWithAlias { expr, alias } => {
                    headers.push(Column::new(alias.value.clone()));
                    items.push(Projected::Expr(expr.clone()));
                }
                SelectItem::Wildcard(_) => {
                    if source_schema.is_empty() {
                        return Err(Error::Planner("no tables specified".to_string()));
                    }
                    for (index, column) in source_schema.columns.iter().enumerate() {
                        headers.push(Column::new(column.name.clone()));
                        items.push(Projected::Index(index));
                    }
                }
                SelectItem::QualifiedWildcard(name, _) => {
                    let table = object_name(name);
                    let before = items.len();
                    for (index, column) in source_schema.columns.iter().enumerate() {
                        let matches = column
                            .table
                            .as_ref()
                            .map(|t| t.eq_ignore_ascii_case(&table))
                            .unwrap_or(false);
                        if matches {
                            headers.push(Column::new(column.name.clone()));
                            items.push(Projected::Index(index));
                        }
                    }
                    if items.len() == before {
                        return Err(Error::Planner(format!("no such table: {}", table)));
                    }
                }
            }
        }

        Ok((items, headers))
    }

    /// ORDER BY terms may name a result column by alias or by 1-based
    /// position; both are replaced by the projected item they refer to.
    fn resolve_order_by(
        &self,
        order_by: &[OrderByExpr],
        projection: &[SelectItem],
        items: &[Projected],
    ) -> Result<Vec<SortKey>, Error> {
        let mut keys = Vec::new();

        for term in order_by {
            let asc = term.asc.unwrap_or(true);
            // NULL sorts lowest
            let nulls_first = term.nulls_first.unwrap_or(asc);

            let key = match &term.expr {
                Expr::Value(Value::Number(n, _)) => {
                    let position = n.parse::<usize>().map_err(|_| {
                        Error::Planner(format!("invalid ORDER BY term: {}", n))
                    })?;
                    if position == 0 || position > items.len() {
                        return Err(Error::Planner(format!(
                            "ORDER BY term out of range - should be between 1 and {}",
                            items.len()
                        )));
                    }
                    items[position - 1].clone()
                }
                Expr::Identifier(ident) => {
                    match find_alias(projection, ident) {
                        Some(expr) => Projected::Expr(expr.clone()),
                        None => Projected::Expr(term.expr.clone()),
                    }
                }
                expr => Projected::Expr(expr.clone()),
            };

            keys.push(SortKey {
                key,
                asc,
                nulls_first,
            });
        }

        Ok(keys)
    }

    /// GROUP BY terms may be a 1-based result column position, or a result
    /// column alias when no source column has that name.
    fn resolve_group_by(
        &self,
        group_by: &[Expr],
        projection: &[SelectItem],
        items: &[Projected],
        source_schema: &OutputSchema,
    ) -> Result<Vec<Expr>, Error> {
        let mut terms = Vec::with_capacity(group_by.len());

        for (i, term) in group_by.iter().enumerate() {
            let position = match term {
                Expr::Value(Value::Number(n, _)) => n.parse::<i64>().ok(),
                _ => None,
            };

            let resolved = match (term, position) {
                (_, Some(position)) => {
                    if position < 1 || position as usize > items.len() {
                        return Err(Error::Planner(format!(
                            "{} GROUP BY term out of range - should be between 1 and {}",
                            ordinal(i + 1),
                            items.len()
                        )));
                    }
                    match &items[position as usize - 1] {
                        Projected::Expr(expr) => expr.clone(),
                        Projected::Index(index) => column_reference(&source_schema.columns[*index]),
                    }
                }
                (Expr::Identifier(ident), None)
                    if source_schema.resolve_qualified(None, &ident.value).is_err() =>
                {
                    find_alias(projection, ident)
                        .cloned()
                        .unwrap_or_else(|| term.clone())
                }
                (other, None) => other.clone(),
            };
            terms.push(resolved);
        }

        Ok(terms)
    }

    fn build_from_clause(
        &self,
        from: &Vec<TableWithJoins>,
        catalog: &Catalog,
    ) -> Result<PlanNode, Error> {
        if from.is_empty() {
            return Ok(PlanNode {
                output_schema: OutputSchema::default(),
                node: Node::Empty {},
            });
        }

        let mut node = self.build_table_with_joins(&from[0], catalog)?;

        for table in &from[1..] {
            let right = self.build_table_with_joins(table, catalog)?;

            node = PlanNode {
                output_schema: node.output_schema.join(&right.output_schema),
                node: Node::NestedLoopJoin {
                    child_left: Box::new(node),
                    child_right: Box::new(right),
                    predicate: None,
                    kind: JoinKind::Inner,
                },
            };
        }

        Ok(node)
    }

    fn build_table_with_joins(
        &self,
        table: &TableWithJoins,
        catalog: &Catalog,
    ) -> Result<PlanNode, Error> {
        let mut node = self.build_table_factor(&table.relation, catalog)?;

        for join in &table.joins {
            let right = self.build_table_factor(&join.relation, catalog)?;
            let output_schema = node.output_schema.join(&right.output_schema);

            let (kind, constraint) = match &join.join_operator {
                JoinOperator::Inner(constraint) => (JoinKind::Inner, Some(constraint)),
                JoinOperator::LeftOuter(constraint) => (JoinKind::LeftOuter, Some(constraint)),
                JoinOperator::CrossJoin => (JoinKind::Inner, None),
                _ => {
                    return Err(Error::Planner(
                        "Only INNER, LEFT and CROSS JOIN are supported".to_string(),
                    ))
                }
            };

            let predicate = match constraint {
                Some(JoinConstraint::On(expr)) => Some(expr.clone()),
                Some(JoinConstraint::None) | None => None,
                _ => return Err(Error::Planner("Only ON supported".to_string())),
            };

            node = PlanNode {
                output_schema,
                node: Node::NestedLoopJoin {
                    child_left: Box::new(node),
                    child_right: Box::new(right),
                    predicate,
                    kind,
                },
            };
        }

        Ok(node)
    }

    fn build_table_factor(&self, table: &TableFactor, catalog: &Catalog) -> Result<PlanNode, Error> {
        match table {
            TableFactor::Table { name, alias, .. } => {
                let table_name = object_name(name);
                let table = catalog.get_table(&table_name)?;
                let qualifier = match alias {
                    Some(alias) => alias.name.value.clone(),
                    None => table.name.clone(),
                };

                Ok(PlanNode {
                    output_schema: OutputSchema::new(table.schema(&qualifier)),
                    node: Node::Scan {
                        table_name,
                        filter: None,
                    },
                })
            }
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                let mut node = self.build_query(subquery, catalog)?;
                if let Some(alias) = alias {
                    node.output_schema = node.output_schema.requalify(&alias.name.value);
                }
                Ok(node)
            }
            _ => Err(Error::Planner(format!("Unsupported table: {}", table))),
        }
    }
}

fn object_name(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|ident| ident.value.clone())
        .unwrap_or_default()
}

/// Column name the way SQLite reports it: the identifier as written, or the
/// expression text.
fn header_for_expr(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(ident) => ident.value.clone(),
        Expr::CompoundIdentifier(idents) => idents
            .last()
            .map(|ident| ident.value.clone())
            .unwrap_or_default(),
        _ => expr.to_string(),
    }
}

fn column_reference(column: &Column) -> Expr {
    match &column.table {
        Some(table) => Expr::CompoundIdentifier(vec![
            Ident::new(table.clone()),
            Ident::new(column.name.clone()),
        ]),
        None => Expr::Identifier(Ident::new(column.name.clone())),
    }
}

/// Table addressed by UPDATE and DELETE, and the name its columns are
/// qualified with.
fn target_table(relation: &TableFactor, catalog: &Catalog) -> Result<(String, String), Error> {
    match relation {
        TableFactor::Table { name, alias, .. } => {
            let table = catalog.get_table(&object_name(name))?;
            let qualifier = match alias {
                Some(alias) => alias.name.value.clone(),
                None => table.name.clone(),
            };
            Ok((table.name.clone(), qualifier))
        }
        _ => Err(Error::Planner(format!("Unsupported table: {}", relation))),
    }
}

fn op_keyword(op: SetOperation) -> &'static str {
    match op {
        SetOperation::Union => "UNION",
        SetOperation::UnionAll => "UNION ALL",
        SetOperation::Except => "EXCEPT",
        SetOperation::Intersect => "INTERSECT",
    }
}

fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

fn find_alias<'a>(projection: &'a [SelectItem], ident: &Ident) -> Option<&'a Expr> {
    projection.iter().find_map(|item| match item {
        SelectItem::ExprWithAlias { expr, alias } if alias.value.eq_ignore_ascii_case(&ident.value) => {
            Some(expr)
        }
        _ => None,
    })
}

fn constant_integer(expr: &Expr) -> Result<i64, Error> {
    let field = ExprEvaluator::evaluate(expr, &Vec::new(), &OutputSchema::default())?;
    ExprEvaluator::to_integer(&field)
        .ok_or_else(|| Error::Planner(format!("datatype mismatch: {}", expr)))
}

pub fn is_aggregate(function: &Function) -> bool {
    let name = function.name.to_string().to_lowercase();
    let single_argument = function.args.len() == 1;
    AGGREGATE_FUNCTIONS.contains(&name.as_str()) && (single_argument || name == "count")
}

fn collect_aggregates(expr: &Expr, out: &mut Vec<Function>) {
    match expr {
        Expr::Function(function) if is_aggregate(function) => {
            let key = function.to_string();
            if !out.iter().any(|f| f.to_string() == key) {
                out.push(function.clone());
            }
        }
        Expr::Function(function) => {
            for arg in function.args.iter() {
                if let FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) = arg {
                    collect_aggregates(e, out);
                }
            }
        }
        Expr::BinaryOp { left, right, .. } => {
            collect_aggregates(left, out);
            collect_aggregates(right, out);
        }
        Expr::UnaryOp { expr, .. }
        | Expr::Nested(expr)
        | Expr::IsNull(expr)
        | Expr::IsNotNull(expr)
        | Expr::Cast { expr, .. } => collect_aggregates(expr, out),
        Expr::Between {
            expr, low, high, ..
        } => {
            collect_aggregates(expr, out);
            collect_aggregates(low, out);
            collect_aggregates(high, out);
        }
        Expr::InList { expr, list, .. } => {
            collect_aggregates(expr, out);
            for e in list {
                collect_aggregates(e, out);
            }
        }
        Expr::Like { expr, pattern, .. } | Expr::ILike { expr, pattern, .. } => {
            collect_aggregates(expr, out);
            collect_aggregates(pattern, out);
        }
        Expr::Case {
            operand,
            conditions,
            results,
            else_result,
        } => {
            for e in operand.iter().chain(else_result.iter()) {
                collect_aggregates(e, out);
            }
            for e in conditions.iter().chain(results.iter()) {
                collect_aggregates(e, out);
            }
        }
        Expr::Substring {
            expr,
            substring_from,
            substring_for,
            ..
        } => {
            collect_aggregates(expr, out);
            for e in substring_from.iter().chain(substring_for.iter()) {
                collect_aggregates(e, out);
            }
        }
        Expr::Trim { expr, trim_what, .. } => {
            collect_aggregates(expr, out);
            for e in trim_what.iter() {
                collect_aggregates(e, out);
            }
        }
        _ => {}
    }
}
