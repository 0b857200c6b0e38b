use pretty_assertions::assert_eq;

use dbtutor::curriculum::Curriculum;
use dbtutor::erd::{
    normalize_name, Cardinality, EntityKind, ErdModel, Participation,
};
use dbtutor::validate::erd::{compare_entities, validate_erd, ErdFinding};

fn reference() -> ErdModel {
    Curriculum::bundled()
        .unwrap()
        .erd_problem("erd-1")
        .unwrap()
        .solution
        .clone()
}

/// Same diagram as the reference, built with different ids, element order
/// and name spelling.
fn submission() -> ErdModel {
    ErdModel::from_json(
        r#"{
            "entities": [
                {
                    "id": "e2", "name": "course", "type": "strong",
                    "attributes": [
                        { "id": "a4", "name": "Title", "type": "simple", "isKey": false },
                        { "id": "a3", "name": "CourseID", "type": "simple", "isKey": true }
                    ],
                    "position": { "x": 120.0, "y": 40.0 }
                },
                {
                    "id": "e1", "name": "  STUDENT ", "type": "strong",
                    "attributes": [
                        { "id": "a1", "name": "studentid", "type": "simple", "isKey": true },
                        { "id": "a2", "name": "name", "type": "simple", "isKey": false },
                        { "id": "a5", "name": "EMAIL", "type": "simple", "isKey": false }
                    ]
                }
            ],
            "relationships": [
                {
                    "id": "r1", "name": "enrolled in", "type": "binary",
                    "entities": ["e2", "e1"], "cardinality": "M:N",
                    "participation": { "e1": "optional", "e2": "optional" }
                }
            ]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_normalize_name() {
    assert_eq!(normalize_name("  Enrolled   In "), "enrolled_in");
    assert_eq!(normalize_name("Enrolled_In"), "enrolled_in");
    assert_eq!(normalize_name("Student"), "student");
}

#[test]
fn test_reference_matches_itself() {
    let verdict = validate_erd(&reference(), &reference());
    assert!(verdict.is_correct());
    assert_eq!(verdict.errors(), Vec::<String>::new());
}

#[test]
fn test_ids_order_case_and_participation_are_ignored() {
    let verdict = validate_erd(&submission(), &reference());
    assert_eq!(verdict.errors(), Vec::<String>::new());
    assert!(verdict.is_correct());
}

#[test]
fn test_empty_submission() {
    let verdict = validate_erd(&ErdModel::default(), &reference());

    assert_eq!(
        verdict.errors(),
        vec![
            "Entity count mismatch: Expected 2, got 0".to_string(),
            "Relationship count mismatch: Expected 1, got 0".to_string(),
            "Missing entity: Student".to_string(),
            "Missing entity: Course".to_string(),
            "Missing or misconfigured relationship: Enrolled_In between Student and Course"
                .to_string(),
        ]
    );
    assert_eq!(verdict.reference, reference());
}

#[test]
fn test_wrong_cardinality() {
    let mut user = submission();
    user.relationships[0].cardinality = Cardinality::OneToMany;

    let verdict = validate_erd(&user, &reference());
    assert_eq!(
        verdict.findings,
        vec![ErdFinding::RelationshipStructure {
            name: "Enrolled_In".to_string()
        }]
    );
    assert_eq!(
        verdict.errors(),
        vec![
            "Relationship \"Enrolled_In\" does not match expected structure (cardinality or type)"
                .to_string()
        ]
    );
}

#[test]
fn test_missing_key_flag() {
    let mut user = submission();
    user.entities[1].attributes[0].is_key = false;

    let verdict = validate_erd(&user, &reference());
    assert_eq!(
        verdict.errors(),
        vec!["Entity \"Student\" does not match expected structure".to_string()]
    );
}

#[test]
fn test_weak_entity_is_a_structure_mismatch() {
    let mut user = submission();
    user.entities[0].kind = EntityKind::Weak;

    let verdict = validate_erd(&user, &reference());
    assert_eq!(
        verdict.findings,
        vec![ErdFinding::EntityStructure {
            name: "Course".to_string()
        }]
    );
}

#[test]
fn test_renamed_entity_is_missing_and_unexpected() {
    let mut user = submission();
    user.entities[0].name = "Class".to_string();

    let verdict = validate_erd(&user, &reference());
    assert_eq!(
        verdict.errors(),
        vec![
            "Missing entity: Course".to_string(),
            "Unexpected entity: Class".to_string(),
            "Missing or misconfigured relationship: Enrolled_In between Student and Course"
                .to_string(),
            "Unexpected relationship: enrolled in".to_string(),
        ]
    );
}

#[test]
fn test_extra_relationship() {
    let mut user = submission();
    let mut advises = user.relationships[0].clone();
    advises.id = "r2".to_string();
    advises.name = "Advises".to_string();
    user.relationships.push(advises);

    let verdict = validate_erd(&user, &reference());
    assert_eq!(
        verdict.errors(),
        vec![
            "Relationship count mismatch: Expected 1, got 2".to_string(),
            "Unexpected relationship: Advises".to_string(),
        ]
    );
}

#[test]
fn test_participation_changes_do_not_matter() {
    let mut user = reference();
    for value in user.relationships[0].participation.values_mut() {
        *value = Participation::Optional;
    }

    assert!(validate_erd(&user, &reference()).is_correct());
}

#[test]
fn test_attribute_multiset_comparison() {
    let reference = reference();
    let student = reference.entity("ent-student").unwrap();

    let mut reordered = student.clone();
    reordered.attributes.reverse();
    assert!(compare_entities(&reordered, student));

    let mut fewer = student.clone();
    fewer.attributes.pop();
    assert!(!compare_entities(&fewer, student));
}

#[test]
fn test_dangling_participant_falls_back_to_id() {
    let mut user = submission();
    user.relationships[0].participants[0] = "ghost".to_string();

    assert_eq!(user.dangling_references(), vec!["ghost"]);

    let verdict = validate_erd(&user, &reference());
    assert_eq!(
        verdict.errors(),
        vec![
            "Missing or misconfigured relationship: Enrolled_In between Student and Course"
                .to_string(),
            "Unexpected relationship: enrolled in".to_string(),
        ]
    );
}

#[test]
fn test_report_shape() {
    let verdict = validate_erd(&ErdModel::default(), &reference());
    let json = serde_json::to_value(verdict.report()).unwrap();

    assert_eq!(json["isCorrect"], serde_json::json!(false));
    assert_eq!(json["errors"].as_array().map(Vec::len), Some(5));
    assert_eq!(json["referenceModel"]["relationships"][0]["cardinality"], "M:N");
    assert_eq!(json["referenceModel"]["entities"][0]["attributes"][0]["isKey"], true);
}
