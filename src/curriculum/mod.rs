//! Instructor-authored problems bundled with the crate.

use serde::{Deserialize, Serialize};

use crate::erd::ErdModel;
use crate::samples::DatabaseId;

const SQL_PROBLEMS_JSON: &str = include_str!("sql_problems.json");
const ERD_PROBLEMS_JSON: &str = include_str!("erd_problems.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlProblemPart {
    pub id: String,
    pub question: String,
    /// Reference query the learner's result is compared against.
    pub solution: String,
    pub explanation: String,
    #[serde(default)]
    pub hints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlProblem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub database: DatabaseId,
    pub parts: Vec<SqlProblemPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErdProblem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub solution: ErdModel,
}

#[derive(Debug, Clone, Default)]
pub struct Curriculum {
    pub sql: Vec<SqlProblem>,
    pub erd: Vec<ErdProblem>,
}

impl Curriculum {
    pub fn bundled() -> Result<Curriculum, serde_json::Error> {
        Ok(Curriculum {
            sql: serde_json::from_str(SQL_PROBLEMS_JSON)?,
            erd: serde_json::from_str(ERD_PROBLEMS_JSON)?,
        })
    }

    /// Finds a SQL problem part by its id, with the problem it belongs to.
    pub fn sql_part(&self, id: &str) -> Option<(&SqlProblem, &SqlProblemPart)> {
        self.sql.iter().find_map(|problem| {
            problem
                .parts
                .iter()
                .find(|part| part.id == id)
                .map(|part| (problem, part))
        })
    }

    pub fn erd_problem(&self, id: &str) -> Option<&ErdProblem> {
        self.erd.iter().find(|problem| problem.id == id)
    }
}
