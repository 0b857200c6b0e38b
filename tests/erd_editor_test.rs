use pretty_assertions::assert_eq;

use dbtutor::erd::editor::{
    ErdEditor, DEFAULT_ATTRIBUTE_NAME, DEFAULT_ENTITY_NAME, DEFAULT_RELATIONSHIP_NAME,
};
use dbtutor::erd::{Arity, AttributeKind, Cardinality, EntityKind, ErdModel, Participation};
use dbtutor::validate::erd::validate_erd;

#[test]
fn test_new_elements_have_defaults() {
    let mut editor = ErdEditor::new();
    let student = editor.create_entity();
    let course = editor.create_entity();
    let attribute = editor.add_attribute(&student).unwrap();
    let enrolled = editor.create_relationship(&student, &course).unwrap();

    let entity = editor.entity(&student).unwrap();
    assert_eq!(entity.name, DEFAULT_ENTITY_NAME);
    assert_eq!(entity.kind, EntityKind::Strong);
    assert_eq!(entity.attributes[0].id, attribute);
    assert_eq!(entity.attributes[0].name, DEFAULT_ATTRIBUTE_NAME);
    assert_eq!(entity.attributes[0].kind, AttributeKind::Simple);
    assert!(!entity.attributes[0].is_key);

    let relationship = editor.relationship(&enrolled).unwrap();
    assert_eq!(relationship.name, DEFAULT_RELATIONSHIP_NAME);
    assert_eq!(relationship.arity, Arity::Binary);
    assert_eq!(relationship.cardinality, Cardinality::OneToMany);
    assert_eq!(relationship.participants, vec![student.clone(), course.clone()]);
    assert_eq!(relationship.participation.get(&student), Some(&Participation::Mandatory));
    assert_eq!(relationship.participation.get(&course), Some(&Participation::Mandatory));
}

#[test]
fn test_ids_are_unique() {
    let mut editor = ErdEditor::new();
    let a = editor.create_entity();
    let b = editor.create_entity();
    let attribute = editor.add_attribute(&a).unwrap();
    let relationship = editor.create_relationship(&a, &b).unwrap();

    let mut ids = vec![a, b, attribute, relationship];
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_ids_do_not_collide_with_loaded_model() {
    let mut editor = ErdEditor::from_model(
        ErdModel::from_json(
            r#"{ "entities": [ { "id": "entity-1", "name": "A", "type": "strong", "attributes": [] } ] }"#,
        )
        .unwrap(),
    );

    let id = editor.create_entity();
    assert_ne!(id, "entity-1");
    assert_eq!(editor.snapshot().entities.len(), 2);
}

#[test]
fn test_self_relationship_is_unary() {
    let mut editor = ErdEditor::new();
    let employee = editor.create_entity();
    let manages = editor.create_relationship(&employee, &employee).unwrap();

    assert_eq!(editor.relationship(&manages).unwrap().arity, Arity::Unary);
}

#[test]
fn test_third_participant_makes_ternary() {
    let mut editor = ErdEditor::new();
    let a = editor.create_entity();
    let b = editor.create_entity();
    let c = editor.create_entity();
    let r = editor.create_relationship(&a, &b).unwrap();

    editor.add_participant(&r, &c);
    editor.add_participant(&r, &c);

    let relationship = editor.relationship(&r).unwrap();
    assert_eq!(relationship.arity, Arity::Ternary);
    assert_eq!(relationship.participants.len(), 3);
}

#[test]
fn test_cardinality_cycles() {
    let mut editor = ErdEditor::new();
    let a = editor.create_entity();
    let b = editor.create_entity();
    let r = editor.create_relationship(&a, &b).unwrap();

    let mut seen = Vec::new();
    for _ in 0..3 {
        editor.cycle_cardinality(&r);
        seen.push(editor.relationship(&r).unwrap().cardinality);
    }

    assert_eq!(
        seen,
        vec![
            Cardinality::ManyToMany,
            Cardinality::OneToOne,
            Cardinality::OneToMany
        ]
    );
}

#[test]
fn test_deleting_entity_cascades() {
    let mut editor = ErdEditor::new();
    let a = editor.create_entity();
    let b = editor.create_entity();
    let c = editor.create_entity();
    let ab = editor.create_relationship(&a, &b).unwrap();
    let bc = editor.create_relationship(&b, &c).unwrap();
    let ca = editor.create_relationship(&c, &a).unwrap();

    editor.delete_entity(&a);

    assert!(editor.entity(&a).is_none());
    assert!(editor.relationship(&ab).is_none());
    assert!(editor.relationship(&ca).is_none());
    assert!(editor.relationship(&bc).is_some());
    assert!(editor.entity(&b).is_some());
    assert!(editor.entity(&c).is_some());

    let model = editor.snapshot();
    assert!(model.dangling_references().is_empty());
}

#[test]
fn test_unknown_ids_are_ignored() {
    let mut editor = ErdEditor::new();
    let a = editor.create_entity();

    assert_eq!(editor.add_attribute("nope"), None);
    assert_eq!(editor.create_relationship(&a, "nope"), None);
    editor.rename_entity("nope", "X");
    editor.delete_entity("nope");
    editor.cycle_cardinality("nope");
    editor.toggle_key(&a, "nope");

    let model = editor.snapshot();
    assert_eq!(model.entities.len(), 1);
    assert!(model.relationships.is_empty());
}

#[test]
fn test_attribute_edits() {
    let mut editor = ErdEditor::new();
    let e = editor.create_entity();
    let id = editor.add_attribute(&e).unwrap();
    let phones = editor.add_attribute(&e).unwrap();

    editor.rename_attribute(&e, &id, "StudentID");
    editor.toggle_key(&e, &id);
    editor.set_attribute_kind(&e, &phones, AttributeKind::Multivalued);
    editor.delete_attribute(&e, &phones);

    let attributes = &editor.entity(&e).unwrap().attributes;
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes[0].name, "StudentID");
    assert!(attributes[0].is_key);

    editor.toggle_key(&e, &id);
    assert!(!editor.entity(&e).unwrap().attributes[0].is_key);
}

#[test]
fn test_participation_only_for_participants() {
    let mut editor = ErdEditor::new();
    let a = editor.create_entity();
    let b = editor.create_entity();
    let outsider = editor.create_entity();
    let r = editor.create_relationship(&a, &b).unwrap();

    editor.set_participation(&r, &a, Participation::Optional);
    editor.set_participation(&r, &outsider, Participation::Optional);

    let participation = &editor.relationship(&r).unwrap().participation;
    assert_eq!(participation.get(&a), Some(&Participation::Optional));
    assert_eq!(participation.get(&outsider), None);
}

#[test]
fn test_from_model_drops_dangling_relationships() {
    let model = ErdModel::from_json(
        r#"{
            "entities": [ { "id": "a", "name": "A", "type": "strong", "attributes": [] } ],
            "relationships": [
                { "id": "r", "name": "R", "type": "binary", "entities": ["a", "gone"], "cardinality": "1:1", "participation": {} }
            ]
        }"#,
    )
    .unwrap();

    let editor = ErdEditor::from_model(model);
    assert!(editor.snapshot().relationships.is_empty());
}

#[test]
fn test_build_solution_in_editor() {
    let mut editor = ErdEditor::new();

    let student = editor.create_entity();
    editor.rename_entity(&student, "Student");
    for (name, key) in [("StudentID", true), ("Name", false), ("Email", false)] {
        let attribute = editor.add_attribute(&student).unwrap();
        editor.rename_attribute(&student, &attribute, name);
        if key {
            editor.toggle_key(&student, &attribute);
        }
    }

    let course = editor.create_entity();
    editor.rename_entity(&course, "Course");
    for (name, key) in [("CourseID", true), ("Title", false)] {
        let attribute = editor.add_attribute(&course).unwrap();
        editor.rename_attribute(&course, &attribute, name);
        if key {
            editor.toggle_key(&course, &attribute);
        }
    }

    let enrolled = editor.create_relationship(&student, &course).unwrap();
    editor.rename_relationship(&enrolled, "Enrolled In");
    editor.cycle_cardinality(&enrolled);

    let reference = dbtutor::curriculum::Curriculum::bundled()
        .unwrap()
        .erd_problem("erd-1")
        .unwrap()
        .solution
        .clone();
    let verdict = validate_erd(&editor.snapshot(), &reference);
    assert_eq!(verdict.errors(), Vec::<String>::new());

    editor.delete_relationship(&enrolled);
    let verdict = validate_erd(&editor.snapshot(), &reference);
    assert!(!verdict.is_correct());
}

#[test]
fn test_json_round_trip_keeps_wire_names() {
    let mut editor = ErdEditor::new();
    let a = editor.create_entity();
    editor.set_entity_kind(&a, EntityKind::Associative);
    let json = editor.snapshot().to_json().unwrap();

    assert!(json.contains("\"type\": \"associative\""));
    assert_eq!(ErdModel::from_json(&json).unwrap(), editor.snapshot());
}
