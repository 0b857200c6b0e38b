use pretty_assertions::assert_eq;

use dbtutor::curriculum::Curriculum;
use dbtutor::samples::{DatabaseId, SampleDatabases};
use dbtutor::validate::sql::validate_sql;
use dbtutor::validate::QueryExecutor;

#[test]
fn test_bundled_problems() {
    let curriculum = Curriculum::bundled().unwrap();

    let ids: Vec<&str> = curriculum.sql.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["sql-q1", "sql-q2", "sql-q4"]);
    assert_eq!(curriculum.sql.iter().map(|p| p.parts.len()).sum::<usize>(), 11);
    assert_eq!(curriculum.erd.len(), 1);
}

#[test]
fn test_lookup() {
    let curriculum = Curriculum::bundled().unwrap();

    let (problem, part) = curriculum.sql_part("sql-q2-d").unwrap();
    assert_eq!(problem.database, DatabaseId::Nobel);
    assert!(part.solution.contains("LIKE 'Louis%'"));

    assert!(curriculum.sql_part("sql-q9-1").is_none());
    assert!(curriculum.erd_problem("erd-1").is_some());
    assert!(curriculum.erd_problem("erd-9").is_none());
}

#[test]
fn test_every_solution_runs() {
    let curriculum = Curriculum::bundled().unwrap();
    let mut databases = SampleDatabases::default();

    for problem in &curriculum.sql {
        for part in &problem.parts {
            let result = databases.execute(problem.database, &part.solution);
            assert!(
                matches!(result, Ok(Some(_))),
                "{} failed: {:?}",
                part.id,
                result
            );
        }
    }
}

#[test]
fn test_every_solution_accepts_itself() {
    let curriculum = Curriculum::bundled().unwrap();
    let mut databases = SampleDatabases::default();

    for problem in &curriculum.sql {
        for part in &problem.parts {
            let verdict = validate_sql(
                &mut databases,
                &part.solution,
                &part.solution,
                problem.database,
            );
            assert!(verdict.is_correct(), "{}: {:?}", part.id, verdict.error_reason());
        }
    }
}

#[test]
fn test_erd_solution_has_no_dangling_references() {
    let curriculum = Curriculum::bundled().unwrap();
    for problem in &curriculum.erd {
        assert!(problem.solution.dangling_references().is_empty());
    }
}
