use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::types::error::Error;

pub struct SQLParser {
    dialect: GenericDialect,
}

impl Default for SQLParser {
    fn default() -> Self {
        SQLParser::new()
    }
}

impl SQLParser {
    pub fn new() -> SQLParser {
        SQLParser {
            dialect: GenericDialect {},
        }
    }

    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>, Error> {
        let statements =
            Parser::parse_sql(&self.dialect, sql).map_err(|e| Error::Parser(e.to_string()))?;

        if statements.is_empty() {
            return Err(Error::Parser("no statement to execute".to_string()));
        }

        Ok(statements)
    }
}
