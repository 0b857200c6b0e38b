use thiserror::Error;

/// Failure raised while parsing, planning or running a statement.
///
/// The rendered message is what a learner sees when their query cannot run.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("Parser Error: {0}")]
    Parser(String),
    #[error("Planner Error: {0}")]
    Planner(String),
    #[error("Execution Error: {0}")]
    Execution(String),
    #[error("Expression Error: {0}")]
    Expression(String),
    #[error("Storage Error: {0}")]
    Storage(String),
}
