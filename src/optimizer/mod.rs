use log::debug;

use crate::planner::{Node, Plan, PlanNode};
use crate::types::error::Error;

#[derive(Default)]
pub struct Optimizer {}

impl Optimizer {
    pub fn new() -> Optimizer {
        Optimizer {}
    }

    pub fn optimize(&self, plan: Plan) -> Result<Plan, Error> {
        debug!("Optimizing...");
        match plan {
            Plan::Query { root } => Ok(Plan::Query {
                root: Self::push_down_filters(root),
            }),
            other => Ok(other),
        }
    }

    /// Folds a WHERE filter that sits directly on a table scan into the scan.
    fn push_down_filters(plan_node: PlanNode) -> PlanNode {
        let PlanNode {
            output_schema,
            node,
        } = plan_node;

        let node = match node {
            Node::Filter { filter, child } => match *child {
                PlanNode {
                    output_schema: scan_schema,
                    node:
                        Node::Scan {
                            table_name,
                            filter: None,
                        },
                } => {
                    debug!("Pushing filter into scan of {}", table_name);
                    return PlanNode {
                        output_schema: scan_schema,
                        node: Node::Scan {
                            table_name,
                            filter: Some(filter),
                        },
                    };
                }
                child => Node::Filter {
                    filter,
                    child: Box::new(Self::push_down_filters(child)),
                },
            },
            Node::NestedLoopJoin {
                child_left,
                child_right,
                predicate,
                kind,
            } => Node::NestedLoopJoin {
                child_left: Box::new(Self::push_down_filters(*child_left)),
                child_right: Box::new(Self::push_down_filters(*child_right)),
                predicate,
                kind,
            },
            Node::Aggregation {
                aggregates,
                group_by,
                child,
            } => Node::Aggregation {
                aggregates,
                group_by,
                child: Box::new(Self::push_down_filters(*child)),
            },
            Node::Sort { keys, child } => Node::Sort {
                keys,
                child: Box::new(Self::push_down_filters(*child)),
            },
            Node::Projection { items, child } => Node::Projection {
                items,
                child: Box::new(Self::push_down_filters(*child)),
            },
            Node::Distinct { child } => Node::Distinct {
                child: Box::new(Self::push_down_filters(*child)),
            },
            Node::SetOperation {
                op,
                child_left,
                child_right,
            } => Node::SetOperation {
                op,
                child_left: Box::new(Self::push_down_filters(*child_left)),
                child_right: Box::new(Self::push_down_filters(*child_right)),
            },
            Node::Limit {
                limit,
                offset,
                child,
            } => Node::Limit {
                limit,
                offset,
                child: Box::new(Self::push_down_filters(*child)),
            },
            leaf => leaf,
        };

        PlanNode {
            output_schema,
            node,
        }
    }
}
