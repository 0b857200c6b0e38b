use std::collections::HashMap;

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::erd::{normalize_name, Entity, ErdModel, Relationship};

/// One difference between a submitted diagram and the reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErdFinding {
    #[error("Entity count mismatch: Expected {expected}, got {actual}")]
    EntityCount { expected: usize, actual: usize },
    #[error("Relationship count mismatch: Expected {expected}, got {actual}")]
    RelationshipCount { expected: usize, actual: usize },
    #[error("Missing entity: {name}")]
    MissingEntity { name: String },
    #[error("Entity \"{name}\" does not match expected structure")]
    EntityStructure { name: String },
    #[error("Unexpected entity: {name}")]
    UnexpectedEntity { name: String },
    #[error("Missing or misconfigured relationship: {name} between {}", .participants.join(" and "))]
    MissingRelationship {
        name: String,
        participants: Vec<String>,
    },
    #[error("Relationship \"{name}\" does not match expected structure (cardinality or type)")]
    RelationshipStructure { name: String },
    #[error("Unexpected relationship: {name}")]
    UnexpectedRelationship { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErdVerdict {
    pub findings: Vec<ErdFinding>,
    pub reference: ErdModel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErdReport {
    pub is_correct: bool,
    pub errors: Vec<String>,
    pub reference_model: ErdModel,
}

impl ErdVerdict {
    pub fn is_correct(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn errors(&self) -> Vec<String> {
        self.findings.iter().map(ToString::to_string).collect()
    }

    pub fn report(&self) -> ErdReport {
        ErdReport {
            is_correct: self.is_correct(),
            errors: self.errors(),
            reference_model: self.reference.clone(),
        }
    }
}

/// Normalized names of a relationship's participants, sorted. An id that
/// names no entity stands in for the missing entity's name.
fn participant_names(relationship: &Relationship, entities: &HashMap<&str, &Entity>) -> Vec<String> {
    let mut names: Vec<String> = relationship
        .participants
        .iter()
        .map(|id| match entities.get(id.as_str()) {
            Some(entity) => normalize_name(&entity.name),
            None => {
                warn!(
                    "relationship {} references unknown entity {}",
                    relationship.name, id
                );
                normalize_name(id)
            }
        })
        .collect();
    names.sort();
    names
}

fn relationship_key(relationship: &Relationship, entities: &HashMap<&str, &Entity>) -> String {
    format!(
        "{}_{}",
        normalize_name(&relationship.name),
        participant_names(relationship, entities).join("_")
    )
}

/// Orders items by key, first occurrence deciding the position and the last
/// occurrence the value.
fn keyed<'a, T>(items: impl Iterator<Item = (String, &'a T)>) -> Vec<(String, &'a T)> {
    let mut out: Vec<(String, &'a T)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (key, item) in items {
        match positions.get(&key) {
            Some(&i) => out[i].1 = item,
            None => {
                positions.insert(key.clone(), out.len());
                out.push((key, item));
            }
        }
    }
    out
}

/// Two entities match when their normalized names and kinds agree and
/// their attributes agree pairwise, in name order, on normalized name,
/// kind and key flag.
pub fn compare_entities(user: &Entity, reference: &Entity) -> bool {
    if normalize_name(&user.name) != normalize_name(&reference.name) {
        return false;
    }

    if user.kind != reference.kind || user.attributes.len() != reference.attributes.len() {
        return false;
    }

    let signature = |entity: &Entity| {
        let mut attributes: Vec<_> = entity
            .attributes
            .iter()
            .map(|a| (normalize_name(&a.name), a.kind, a.is_key))
            .collect();
        attributes.sort();
        attributes
    };

    signature(user) == signature(reference)
}

/// Two relationships match when name, arity, cardinality and the set of
/// participant names agree.
///
/// NOTE: participation (mandatory/optional) is not compared. This is a
/// deliberately partial check.
pub fn compare_relationships(
    user: &Relationship,
    reference: &Relationship,
    user_entities: &HashMap<&str, &Entity>,
    reference_entities: &HashMap<&str, &Entity>,
) -> bool {
    normalize_name(&user.name) == normalize_name(&reference.name)
        && user.arity == reference.arity
        && user.cardinality == reference.cardinality
        && user.participants.len() == reference.participants.len()
        && participant_names(user, user_entities) == participant_names(reference, reference_entities)
}

/// Compares a submitted diagram with the reference solution.
///
/// Entities are matched by normalized name and relationships by normalized
/// name plus their participants' names; element ids are never compared.
/// Never fails: every difference is recorded as an [`ErdFinding`].
pub fn validate_erd(user: &ErdModel, reference: &ErdModel) -> ErdVerdict {
    let mut findings = Vec::new();

    if user.entities.len() != reference.entities.len() {
        findings.push(ErdFinding::EntityCount {
            expected: reference.entities.len(),
            actual: user.entities.len(),
        });
    }

    if user.relationships.len() != reference.relationships.len() {
        findings.push(ErdFinding::RelationshipCount {
            expected: reference.relationships.len(),
            actual: user.relationships.len(),
        });
    }

    // entities
    let user_entities = keyed(user.entities.iter().map(|e| (normalize_name(&e.name), e)));
    let reference_entities =
        keyed(reference.entities.iter().map(|e| (normalize_name(&e.name), e)));
    let user_by_name: HashMap<&str, &Entity> =
        user_entities.iter().map(|(k, e)| (k.as_str(), *e)).collect();
    let reference_by_name: HashMap<&str, &Entity> = reference_entities
        .iter()
        .map(|(k, e)| (k.as_str(), *e))
        .collect();

    for (name, reference_entity) in reference_entities.iter() {
        match user_by_name.get(name.as_str()) {
            None => findings.push(ErdFinding::MissingEntity {
                name: reference_entity.name.clone(),
            }),
            Some(user_entity) if !compare_entities(user_entity, reference_entity) => {
                findings.push(ErdFinding::EntityStructure {
                    name: reference_entity.name.clone(),
                })
            }
            Some(_) => {}
        }
    }

    for (name, user_entity) in user_entities.iter() {
        if !reference_by_name.contains_key(name.as_str()) {
            findings.push(ErdFinding::UnexpectedEntity {
                name: user_entity.name.clone(),
            });
        }
    }

    // relationships
    let user_index = user.entity_index();
    let reference_index = reference.entity_index();

    let user_relationships = keyed(
        user.relationships
            .iter()
            .map(|r| (relationship_key(r, &user_index), r)),
    );
    let reference_relationships = keyed(
        reference
            .relationships
            .iter()
            .map(|r| (relationship_key(r, &reference_index), r)),
    );
    let user_by_key: HashMap<&str, &Relationship> = user_relationships
        .iter()
        .map(|(k, r)| (k.as_str(), *r))
        .collect();

    for (key, reference_relationship) in reference_relationships.iter() {
        match user_by_key.get(key.as_str()) {
            None => findings.push(ErdFinding::MissingRelationship {
                name: reference_relationship.name.clone(),
                participants: reference_relationship
                    .participants
                    .iter()
                    .map(|id| match reference_index.get(id.as_str()) {
                        Some(entity) => entity.name.clone(),
                        None => id.clone(),
                    })
                    .collect(),
            }),
            Some(user_relationship)
                if !compare_relationships(
                    user_relationship,
                    reference_relationship,
                    &user_index,
                    &reference_index,
                ) =>
            {
                findings.push(ErdFinding::RelationshipStructure {
                    name: reference_relationship.name.clone(),
                })
            }
            Some(_) => {}
        }
    }

    for (key, user_relationship) in user_relationships.iter() {
        if !reference_relationships.iter().any(|(k, _)| k == key) {
            findings.push(ErdFinding::UnexpectedRelationship {
                name: user_relationship.name.clone(),
            });
        }
    }

    info!(
        "ERD verdict: correct={} findings={}",
        findings.is_empty(),
        findings.len()
    );

    ErdVerdict {
        findings,
        reference: reference.clone(),
    }
}
