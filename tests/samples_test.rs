use common::run_slt;
use dbtutor::executor::DEFAULT_MAX_RESULT_ROWS;
use dbtutor::samples::{self, DatabaseId, SampleDatabases};
use dbtutor::validate::QueryExecutor;

mod common;

#[test]
fn test_salesman() {
    let db = samples::open(DatabaseId::Salesman, DEFAULT_MAX_RESULT_ROWS).unwrap();
    run_slt(db, "tests/resources/sql/salesman.slt");
}

#[test]
fn test_nobel() {
    let db = samples::open(DatabaseId::Nobel, DEFAULT_MAX_RESULT_ROWS).unwrap();
    run_slt(db, "tests/resources/sql/nobel.slt");
}

#[test]
fn test_tutor() {
    let db = samples::open(DatabaseId::Tutor, DEFAULT_MAX_RESULT_ROWS).unwrap();
    run_slt(db, "tests/resources/sql/tutor.slt");
}

#[test]
fn test_university() {
    let db = samples::open(DatabaseId::University, DEFAULT_MAX_RESULT_ROWS).unwrap();
    run_slt(db, "tests/resources/sql/university.slt");
}

#[test]
fn test_database_id_parsing() {
    assert_eq!("Nobel".parse::<DatabaseId>(), Ok(DatabaseId::Nobel));
    assert_eq!(" tutor ".parse::<DatabaseId>(), Ok(DatabaseId::Tutor));
    assert!("northwind".parse::<DatabaseId>().is_err());
    assert_eq!(DatabaseId::University.to_string(), "university");
}

#[test]
fn test_session_keeps_changes_until_closed() {
    let mut databases = SampleDatabases::default();
    assert!(!databases.is_open(DatabaseId::Salesman));

    databases
        .execute(
            DatabaseId::Salesman,
            "INSERT INTO salesman VALUES (5005, 'Nail Knite', 'Paris', 0.13)",
        )
        .unwrap();
    assert!(databases.is_open(DatabaseId::Salesman));

    let count = |databases: &mut SampleDatabases| {
        databases
            .execute(DatabaseId::Salesman, "SELECT COUNT(*) FROM salesman")
            .unwrap()
            .unwrap()
            .rows[0][0]
            .normalized()
    };
    assert_eq!(count(&mut databases), "5");

    databases.close(DatabaseId::Salesman);
    assert!(!databases.is_open(DatabaseId::Salesman));
    assert_eq!(count(&mut databases), "4");
}

#[test]
fn test_close_all() {
    let mut databases = SampleDatabases::default();
    for id in DatabaseId::ALL {
        databases.load(id).unwrap();
    }
    databases.close_all();

    assert!(DatabaseId::ALL.iter().all(|id| !databases.is_open(*id)));
}

#[test]
fn test_row_limit_stops_cross_joins() {
    let mut db = samples::open(DatabaseId::Nobel, 100).unwrap();

    assert!(db.execute("SELECT COUNT(*) FROM nobel_win").is_ok());
    let err = db
        .execute("SELECT COUNT(*) FROM nobel_win a, nobel_win b, nobel_win c, nobel_win d")
        .unwrap_err()
        .to_string();
    assert!(err.contains("limit of 100 rows"), "{}", err);
}

#[test]
fn test_session_keeps_updates_and_deletes() {
    let mut databases = SampleDatabases::default();
    databases
        .execute(
            DatabaseId::Salesman,
            "UPDATE salesman SET city = 'Lyon' WHERE city = 'Paris'",
        )
        .unwrap();
    databases
        .execute(DatabaseId::Salesman, "DELETE FROM salesman WHERE city = 'Rome'")
        .unwrap();

    let result = databases
        .execute(
            DatabaseId::Salesman,
            "SELECT city, COUNT(*) FROM salesman GROUP BY 1 ORDER BY 1",
        )
        .unwrap()
        .unwrap();
    let rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.normalized()).collect())
        .collect();
    assert_eq!(
        rows,
        vec![
            vec!["London".to_string(), "1".to_string()],
            vec!["Lyon".to_string(), "2".to_string()],
        ]
    );
}
