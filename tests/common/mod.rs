use dbtutor::{database::Database, types::error::Error};
use sqllogictest::{self, DBOutput, DefaultColumnType};

pub struct DatabaseTestHelper(pub Database);

impl sqllogictest::DB for DatabaseTestHelper {
    type Error = Error;
    type ColumnType = DefaultColumnType;
    fn run(&mut self, sql: &str) -> Result<sqllogictest::DBOutput<Self::ColumnType>, Self::Error> {
        let result_set = match self.0.execute(sql)? {
            Some(result_set) => result_set,
            None => return Ok(DBOutput::StatementComplete(0)),
        };
        let types = vec![DefaultColumnType::Any; result_set.output_schema.columns.len()];
        let rows = result_set
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        Ok(DBOutput::Rows { types, rows })
    }
}

#[allow(dead_code)]
pub fn run_slt(db: Database, path: &str) {
    let mut tester = sqllogictest::Runner::new(DatabaseTestHelper(db));
    tester.run_file(path).unwrap();
}
