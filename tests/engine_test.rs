use common::run_slt;
use dbtutor::database::Database;

mod common;

#[test]
fn test_ddl() {
    run_slt(Database::new().unwrap(), "tests/resources/sql/ddl.slt");
}

#[test]
fn test_select() {
    run_slt(Database::new().unwrap(), "tests/resources/sql/select.slt");
}

#[test]
fn test_expressions() {
    run_slt(Database::new().unwrap(), "tests/resources/sql/expressions.slt");
}

#[test]
fn test_aggregates() {
    run_slt(Database::new().unwrap(), "tests/resources/sql/aggregates.slt");
}

#[test]
fn test_having() {
    run_slt(Database::new().unwrap(), "tests/resources/sql/having.slt");
}

#[test]
fn test_joins() {
    run_slt(Database::new().unwrap(), "tests/resources/sql/joins.slt");
}

#[test]
fn test_dml() {
    run_slt(Database::new().unwrap(), "tests/resources/sql/dml.slt");
}

#[test]
fn test_set_operations() {
    run_slt(Database::new().unwrap(), "tests/resources/sql/set_operations.slt");
}

#[test]
fn test_subqueries() {
    run_slt(Database::new().unwrap(), "tests/resources/sql/subqueries.slt");
}

#[test]
fn test_row_limit() {
    let mut db = Database::with_row_limit(2).unwrap();
    db.execute("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1), (2), (3);")
        .unwrap();

    assert!(db.execute("SELECT a FROM t LIMIT 2").is_ok());
    assert!(db.execute("SELECT a FROM t").is_err());
}

#[test]
fn test_first_result_set_is_returned() {
    let mut db = Database::new().unwrap();
    let result = db
        .execute("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (7); SELECT a FROM t; SELECT 1;")
        .unwrap()
        .unwrap();

    assert_eq!(result.column_names(), vec!["a".to_string()]);
    assert_eq!(result.row_count(), 1);
}

#[test]
fn test_empty_select_keeps_columns() {
    let mut db = Database::new().unwrap();
    db.execute("CREATE TABLE t (a INTEGER, b TEXT)").unwrap();
    let result = db.execute("SELECT a, b FROM t").unwrap().unwrap();

    assert_eq!(result.column_names(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(result.row_count(), 0);
}

#[test]
fn test_row_limit_counts_intermediate_rows() {
    let mut db = Database::with_row_limit(10).unwrap();
    db.execute("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1), (2), (3), (4);")
        .unwrap();

    assert!(db.execute("SELECT COUNT(*) FROM t").is_ok());
    let err = db
        .execute("SELECT COUNT(*) FROM t x, t y")
        .unwrap_err()
        .to_string();
    assert!(err.contains("limit of 10 rows"), "{}", err);
    assert!(db.execute("SELECT a FROM t ORDER BY a").is_ok());
}

#[test]
fn test_subquery_column_keeps_its_text() {
    let mut db = Database::new().unwrap();
    db.execute("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (3), (5);")
        .unwrap();
    let result = db
        .execute("SELECT a, (SELECT MAX(a) FROM t) FROM t")
        .unwrap()
        .unwrap();

    assert_eq!(
        result.column_names(),
        vec!["a".to_string(), "(SELECT MAX(a) FROM t)".to_string()]
    );
    assert_eq!(result.row_count(), 2);
}
