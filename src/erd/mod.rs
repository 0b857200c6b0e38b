//! Entity-relationship diagram model.
//!
//! Ids are assigned by the editor and only identify elements within one
//! model; comparisons between models go through [`normalize_name`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod editor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Simple,
    Composite,
    Multivalued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Strong,
    Weak,
    Associative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    Unary,
    Binary,
    Ternary,
}

impl Arity {
    pub fn for_participants(count: usize) -> Arity {
        match count {
            0 | 1 => Arity::Unary,
            2 => Arity::Binary,
            _ => Arity::Ternary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "1:M")]
    OneToMany,
    #[serde(rename = "M:N")]
    ManyToMany,
}

impl Cardinality {
    /// Next value in the editor's cycle `1:1 -> 1:M -> M:N -> 1:1`.
    pub fn next(self) -> Cardinality {
        match self {
            Cardinality::OneToOne => Cardinality::OneToMany,
            Cardinality::OneToMany => Cardinality::ManyToMany,
            Cardinality::ManyToMany => Cardinality::OneToOne,
        }
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::OneToMany
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::OneToOne => write!(f, "1:1"),
            Cardinality::OneToMany => write!(f, "1:M"),
            Cardinality::ManyToMany => write!(f, "M:N"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Participation {
    Mandatory,
    Optional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    #[serde(rename = "isKey")]
    pub is_key: bool,
    #[serde(
        rename = "isPartialKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_partial_key: Option<bool>,
}

/// Canvas coordinate; display only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub arity: Arity,
    /// Ids of the participating entities. The relationship does not own them.
    #[serde(rename = "entities")]
    pub participants: Vec<String>,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub participation: BTreeMap<String, Participation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErdModel {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl ErdModel {
    pub fn from_json(json: &str) -> Result<ErdModel, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_index(&self) -> HashMap<&str, &Entity> {
        self.entities.iter().map(|e| (e.id.as_str(), e)).collect()
    }

    /// Participant ids of relationships that point at no entity.
    pub fn dangling_references(&self) -> Vec<&str> {
        let index = self.entity_index();
        self.relationships
            .iter()
            .flat_map(|r| r.participants.iter())
            .filter(|id| !index.contains_key(id.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Comparison form of an element name: trimmed, lower-cased, inner
/// whitespace runs collapsed to `_`.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<String>>()
        .join("_")
}
