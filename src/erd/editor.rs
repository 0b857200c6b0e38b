use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;

use super::{
    Arity, Attribute, AttributeKind, Cardinality, Entity, EntityKind, ErdModel, Participation,
    Relationship,
};

pub const DEFAULT_ENTITY_NAME: &str = "NEW_ENTITY";
pub const DEFAULT_ATTRIBUTE_NAME: &str = "NEW_ATTR";
pub const DEFAULT_RELATIONSHIP_NAME: &str = "Relationship";

/// Mutable working copy of a diagram.
///
/// Entities live in an arena indexed by id. Every operation is total: ids
/// that do not exist make the call a no-op. Deleting an entity also deletes
/// every relationship that references it, so a model taken with
/// [`ErdEditor::snapshot`] never holds a dangling participant.
#[derive(Debug, Default)]
pub struct ErdEditor {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
    relationships: Vec<Relationship>,
    next_id: u64,
}

impl ErdEditor {
    pub fn new() -> ErdEditor {
        ErdEditor::default()
    }

    /// Starts editing from an existing model. Relationships pointing at
    /// unknown entities are dropped.
    pub fn from_model(model: ErdModel) -> ErdEditor {
        let mut editor = ErdEditor {
            entities: model.entities,
            ..ErdEditor::default()
        };
        editor.reindex();

        let index = &editor.index;
        editor.relationships = model
            .relationships
            .into_iter()
            .filter(|r| r.participants.iter().all(|id| index.contains_key(id)))
            .collect();
        editor
    }

    pub fn snapshot(&self) -> ErdModel {
        ErdModel {
            entities: self.entities.clone(),
            relationships: self.relationships.clone(),
        }
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).map(|&i| &self.entities[i])
    }

    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    fn reindex(&mut self) {
        self.index = self
            .entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        let taken: HashSet<&str> = self
            .entities
            .iter()
            .flat_map(|e| {
                std::iter::once(e.id.as_str()).chain(e.attributes.iter().map(|a| a.id.as_str()))
            })
            .chain(self.relationships.iter().map(|r| r.id.as_str()))
            .collect();

        loop {
            self.next_id += 1;
            let id = format!("{}-{}", prefix, self.next_id);
            if !taken.contains(id.as_str()) {
                return id;
            }
        }
    }

    fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        match self.index.get(id) {
            Some(&i) => self.entities.get_mut(i),
            None => None,
        }
    }

    fn attribute_mut(&mut self, entity_id: &str, attribute_id: &str) -> Option<&mut Attribute> {
        self.entity_mut(entity_id)?
            .attributes
            .iter_mut()
            .find(|a| a.id == attribute_id)
    }

    fn relationship_mut(&mut self, id: &str) -> Option<&mut Relationship> {
        self.relationships.iter_mut().find(|r| r.id == id)
    }

    pub fn create_entity(&mut self) -> String {
        let id = self.fresh_id("entity");
        self.entities.push(Entity {
            id: id.clone(),
            name: DEFAULT_ENTITY_NAME.to_string(),
            kind: EntityKind::Strong,
            attributes: Vec::new(),
            position: None,
        });
        self.index.insert(id.clone(), self.entities.len() - 1);
        debug!("created entity {}", id);
        id
    }

    pub fn rename_entity(&mut self, id: &str, name: &str) {
        if let Some(entity) = self.entity_mut(id) {
            entity.name = name.to_string();
        }
    }

    pub fn set_entity_kind(&mut self, id: &str, kind: EntityKind) {
        if let Some(entity) = self.entity_mut(id) {
            entity.kind = kind;
        }
    }

    /// Deletes the entity together with every relationship it takes part in.
    pub fn delete_entity(&mut self, id: &str) {
        let Some(position) = self.index.get(id).copied() else {
            return;
        };

        self.entities.remove(position);
        self.reindex();

        let before = self.relationships.len();
        self.relationships
            .retain(|r| !r.participants.iter().any(|p| p == id));
        debug!(
            "deleted entity {} and {} relationship(s)",
            id,
            before - self.relationships.len()
        );
    }

    pub fn add_attribute(&mut self, entity_id: &str) -> Option<String> {
        if !self.index.contains_key(entity_id) {
            return None;
        }

        let id = self.fresh_id("attr");
        let entity = self.entity_mut(entity_id)?;
        entity.attributes.push(Attribute {
            id: id.clone(),
            name: DEFAULT_ATTRIBUTE_NAME.to_string(),
            kind: AttributeKind::Simple,
            is_key: false,
            is_partial_key: None,
        });
        Some(id)
    }

    pub fn rename_attribute(&mut self, entity_id: &str, attribute_id: &str, name: &str) {
        if let Some(attribute) = self.attribute_mut(entity_id, attribute_id) {
            attribute.name = name.to_string();
        }
    }

    pub fn set_attribute_kind(&mut self, entity_id: &str, attribute_id: &str, kind: AttributeKind) {
        if let Some(attribute) = self.attribute_mut(entity_id, attribute_id) {
            attribute.kind = kind;
        }
    }

    pub fn toggle_key(&mut self, entity_id: &str, attribute_id: &str) {
        if let Some(attribute) = self.attribute_mut(entity_id, attribute_id) {
            attribute.is_key = !attribute.is_key;
        }
    }

    pub fn delete_attribute(&mut self, entity_id: &str, attribute_id: &str) {
        if let Some(entity) = self.entity_mut(entity_id) {
            entity.attributes.retain(|a| a.id != attribute_id);
        }
    }

    /// Connects two entities with a `1:M` relationship where both sides are
    /// mandatory. Connecting an entity to itself makes a unary relationship.
    pub fn create_relationship(&mut self, from: &str, to: &str) -> Option<String> {
        if !self.index.contains_key(from) || !self.index.contains_key(to) {
            return None;
        }

        let id = self.fresh_id("rel");
        let participation = BTreeMap::from([
            (from.to_string(), Participation::Mandatory),
            (to.to_string(), Participation::Mandatory),
        ]);

        self.relationships.push(Relationship {
            id: id.clone(),
            name: DEFAULT_RELATIONSHIP_NAME.to_string(),
            arity: if from == to { Arity::Unary } else { Arity::Binary },
            participants: vec![from.to_string(), to.to_string()],
            cardinality: Cardinality::default(),
            participation,
        });
        Some(id)
    }

    /// Adds a further participant, e.g. to turn a binary relationship into
    /// a ternary one.
    pub fn add_participant(&mut self, relationship_id: &str, entity_id: &str) {
        if !self.index.contains_key(entity_id) {
            return;
        }

        if let Some(relationship) = self.relationship_mut(relationship_id) {
            if relationship.participants.iter().any(|p| p == entity_id) {
                return;
            }
            relationship.participants.push(entity_id.to_string());
            relationship
                .participation
                .insert(entity_id.to_string(), Participation::Mandatory);

            let distinct: HashSet<&String> = relationship.participants.iter().collect();
            relationship.arity = Arity::for_participants(distinct.len());
        }
    }

    pub fn rename_relationship(&mut self, id: &str, name: &str) {
        if let Some(relationship) = self.relationship_mut(id) {
            relationship.name = name.to_string();
        }
    }

    pub fn cycle_cardinality(&mut self, id: &str) {
        if let Some(relationship) = self.relationship_mut(id) {
            relationship.cardinality = relationship.cardinality.next();
        }
    }

    pub fn set_participation(
        &mut self,
        relationship_id: &str,
        entity_id: &str,
        participation: Participation,
    ) {
        if let Some(relationship) = self.relationship_mut(relationship_id) {
            if relationship.participants.iter().any(|p| p == entity_id) {
                relationship
                    .participation
                    .insert(entity_id.to_string(), participation);
            }
        }
    }

    pub fn delete_relationship(&mut self, id: &str) {
        self.relationships.retain(|r| r.id != id);
    }
}
