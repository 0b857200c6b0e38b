use std::collections::HashMap;

use pretty_assertions::assert_eq;

use dbtutor::samples::{DatabaseId, SampleDatabases};
use dbtutor::types::error::Error;
use dbtutor::validate::sql::{
    compare_results, normalize_sql, sql_text_matches, validate_sql, Mismatch, SqlFailure,
};
use dbtutor::validate::tabular::{normalize_value, row_key, Cell, TabularResult};
use dbtutor::validate::QueryExecutor;

/// Answers queries from a fixed table of canned outcomes.
struct CannedExecutor {
    outcomes: HashMap<String, Result<Option<TabularResult>, Error>>,
    executed: Vec<String>,
}

impl CannedExecutor {
    fn new(outcomes: Vec<(&str, Result<Option<TabularResult>, Error>)>) -> CannedExecutor {
        CannedExecutor {
            outcomes: outcomes
                .into_iter()
                .map(|(sql, outcome)| (sql.to_string(), outcome))
                .collect(),
            executed: Vec::new(),
        }
    }
}

impl QueryExecutor for CannedExecutor {
    fn execute(&mut self, _database: DatabaseId, sql: &str) -> Result<Option<TabularResult>, Error> {
        self.executed.push(sql.to_string());
        self.outcomes
            .get(sql)
            .cloned()
            .unwrap_or_else(|| Err(Error::Parser(format!("unexpected query {}", sql))))
    }
}

fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> TabularResult {
    TabularResult::new(columns.iter().map(|c| c.to_string()).collect(), rows)
}

fn salesmen() -> TabularResult {
    table(
        &["name", "commission"],
        vec![
            vec!["James".into(), 0.13.into()],
            vec!["Pit Alex".into(), 0.14.into()],
        ],
    )
}

#[test]
fn test_identical_results_are_correct() {
    assert_eq!(compare_results(Some(&salesmen()), Some(&salesmen())), Ok(()));
}

#[test]
fn test_row_order_is_ignored() {
    let mut reversed = salesmen();
    reversed.rows.reverse();

    assert_eq!(compare_results(Some(&reversed), Some(&salesmen())), Ok(()));
}

#[test]
fn test_column_names_ignore_case() {
    let shouting = table(
        &["NAME", "Commission"],
        vec![
            vec!["James".into(), 0.13.into()],
            vec!["Pit Alex".into(), 0.14.into()],
        ],
    );

    assert_eq!(compare_results(Some(&shouting), Some(&salesmen())), Ok(()));
}

#[test]
fn test_values_ignore_case_and_padding() {
    let user = table(&["city"], vec![vec!["  PARIS ".into()]]);
    let reference = table(&["city"], vec![vec!["Paris".into()]]);

    assert_eq!(compare_results(Some(&user), Some(&reference)), Ok(()));
}

#[test]
fn test_column_order_matters() {
    let swapped = table(
        &["commission", "name"],
        vec![
            vec![0.13.into(), "James".into()],
            vec![0.14.into(), "Pit Alex".into()],
        ],
    );

    assert_eq!(
        compare_results(Some(&swapped), Some(&salesmen())),
        Err(Mismatch::ColumnNames)
    );
}

#[test]
fn test_column_count_mismatch() {
    let names_only = table(
        &["name"],
        vec![vec!["James".into()], vec!["Pit Alex".into()]],
    );

    let mismatch = compare_results(Some(&names_only), Some(&salesmen())).unwrap_err();
    assert_eq!(
        mismatch,
        Mismatch::ColumnCount {
            expected: 2,
            actual: 1
        }
    );
    assert_eq!(mismatch.to_string(), "Column count mismatch");
}

#[test]
fn test_row_count_mismatch_message() {
    let one_row = table(&["name", "commission"], vec![vec!["James".into(), 0.13.into()]]);

    let mismatch = compare_results(Some(&one_row), Some(&salesmen())).unwrap_err();
    assert_eq!(mismatch.to_string(), "Row count mismatch: Expected 2, got 1");
}

#[test]
fn test_duplicate_rows_count() {
    let user = table(&["a"], vec![vec![1i64.into()], vec![1i64.into()], vec![2i64.into()]]);
    let reference = table(&["a"], vec![vec![1i64.into()], vec![2i64.into()], vec![2i64.into()]]);

    assert_eq!(
        compare_results(Some(&user), Some(&reference)),
        Err(Mismatch::Values)
    );
}

#[test]
fn test_null_is_distinct_from_text_null() {
    assert_eq!(normalize_value(&Cell::Null), "NULL");
    assert_eq!(normalize_value(&Cell::from("null")), "null");

    let user = table(&["a"], vec![vec![Cell::Null]]);
    let reference = table(&["a"], vec![vec!["null".into()]]);
    assert_eq!(
        compare_results(Some(&user), Some(&reference)),
        Err(Mismatch::Values)
    );
}

#[test]
fn test_row_key_joins_normalized_cells() {
    let row = vec![Cell::from("Mc Lyon"), Cell::Null, Cell::from(5001i64)];
    assert_eq!(row_key(&row), "mc lyon|NULL|5001");
}

#[test]
fn test_missing_result_sets() {
    assert_eq!(compare_results(None, None), Ok(()));
    assert_eq!(
        compare_results(None, Some(&salesmen())),
        Err(Mismatch::ResultSetCount)
    );
    assert_eq!(
        compare_results(Some(&salesmen()), None),
        Err(Mismatch::ResultSetCount)
    );
}

#[test]
fn test_user_error_skips_reference() {
    let mut executor = CannedExecutor::new(vec![
        ("SELEC name", Err(Error::Parser("syntax error".to_string()))),
        ("SELECT name FROM salesman", Ok(Some(salesmen()))),
    ]);

    let verdict = validate_sql(
        &mut executor,
        "SELEC name",
        "SELECT name FROM salesman",
        DatabaseId::Salesman,
    );

    assert!(!verdict.is_correct());
    assert_eq!(verdict.user_result, None);
    assert_eq!(verdict.reference_result, None);
    assert_eq!(
        verdict.failure,
        Some(SqlFailure::Execution(Error::Parser("syntax error".to_string())))
    );
    assert_eq!(executor.executed, vec!["SELEC name".to_string()]);
}

#[test]
fn test_reference_error_discards_user_result() {
    let mut executor = CannedExecutor::new(vec![
        ("SELECT name FROM salesman", Ok(Some(salesmen()))),
        ("broken", Err(Error::Planner("no such table: x".to_string()))),
    ]);

    let verdict = validate_sql(
        &mut executor,
        "SELECT name FROM salesman",
        "broken",
        DatabaseId::Salesman,
    );

    assert_eq!(verdict.user_result, None);
    assert_eq!(verdict.reference_result, None);
    assert_eq!(
        verdict.error_reason(),
        Some("Planner Error: no such table: x".to_string())
    );
}

#[test]
fn test_statements_without_result_sets_match() {
    let mut executor = CannedExecutor::new(vec![
        ("CREATE TABLE a (x INTEGER)", Ok(None)),
        ("CREATE TABLE b (x INTEGER)", Ok(None)),
    ]);

    let verdict = validate_sql(
        &mut executor,
        "CREATE TABLE a (x INTEGER)",
        "CREATE TABLE b (x INTEGER)",
        DatabaseId::Tutor,
    );

    assert!(verdict.is_correct());
    assert_eq!(verdict.error_reason(), None);
}

#[test]
fn test_validate_against_sample_database() {
    let mut databases = SampleDatabases::default();

    let verdict = validate_sql(
        &mut databases,
        "select NAME, city from salesman where city = 'Paris' order by name desc",
        "SELECT name, city FROM salesman WHERE city = 'Paris';",
        DatabaseId::Salesman,
    );
    assert!(verdict.is_correct(), "{:?}", verdict.error_reason());

    let verdict = validate_sql(
        &mut databases,
        "SELECT name FROM salesman WHERE commission >= 0.13",
        "SELECT name FROM salesman WHERE commission > 0.13",
        DatabaseId::Salesman,
    );
    assert_eq!(
        verdict.error_reason(),
        Some("Row count mismatch: Expected 1, got 2".to_string())
    );
    assert_eq!(verdict.user_result.map(|r| r.rows.len()), Some(2));
    assert_eq!(verdict.reference_result.map(|r| r.rows.len()), Some(1));
}

#[test]
fn test_aliased_column_is_a_name_mismatch() {
    let mut databases = SampleDatabases::default();

    let verdict = validate_sql(
        &mut databases,
        "SELECT COUNT(*) AS total FROM Tutor WHERE Status = 'Temp Stop'",
        "SELECT COUNT(*) FROM Tutor WHERE Status = 'Temp Stop';",
        DatabaseId::Tutor,
    );

    assert_eq!(
        verdict.error_reason(),
        Some("Column names do not match".to_string())
    );
}

#[test]
fn test_report_shape() {
    let mut databases = SampleDatabases::default();
    let verdict = validate_sql(
        &mut databases,
        "SELECT TutorID FROM Tutor WHERE TutorID = 100",
        "SELECT TutorID FROM Tutor WHERE TutorID = 100",
        DatabaseId::Tutor,
    );

    let json = serde_json::to_value(verdict.report()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "isCorrect": true,
            "userResult": { "columns": ["TutorID"], "rows": [[100.0]] },
            "referenceResult": { "columns": ["TutorID"], "rows": [[100.0]] }
        })
    );
}

#[test]
fn test_sql_text_normalization() {
    assert_eq!(
        normalize_sql("  SELECT name,commission\n FROM   salesman; ").unwrap(),
        "select name, commission from salesman"
    );
    assert!(sql_text_matches("select COUNT (*)  from tutor;", "SELECT COUNT(*) FROM Tutor").unwrap());
    assert!(!sql_text_matches("SELECT name FROM salesman", "SELECT city FROM salesman").unwrap());
    // rules are compiled once and reused
    assert_eq!(
        normalize_sql("SELECT 1").unwrap(),
        normalize_sql("select   1;").unwrap()
    );
}
