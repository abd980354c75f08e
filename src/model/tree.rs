//! Arena-backed configuration model.
//!
//! Nodes are stored in a flat `Vec` indexed by [`NodeId`]; parent links give
//! the containment tree, while [`Slot::Ref`] and [`Slot::List`] entries turn
//! it into a graph (converging and cyclic references are allowed).
//!
//! ```text
//! pipeline "PriorityPip"        (Pipeline)
//! +-- src                       (Source)   sources -> [src]
//! |     output -> [f1]
//! +-- f1                        (Flow)     destination -> fam
//! +-- fam                       (FamilyElement)
//!       family -> Family.members -> [algA, algB]
//! ```

use crate::error::ModelError;
use crate::model::id::NodeId;
use crate::model::node::{ModelNode, Slot};
use crate::model::value::Value;
use std::collections::HashMap;

/// Flat-storage configuration model.
///
/// - `NodeId` is a direct index into `nodes`.
/// - Declaration-name lookups are O(1) via HashMap.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationModel {
    nodes: Vec<ModelNode>,
    decl_index: HashMap<String, NodeId>,
}

impl ConfigurationModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes in the model.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node. Declaration names must be unique.
    pub fn add_node(
        &mut self,
        type_name: impl Into<String>,
        decl_name: impl Into<String>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, ModelError> {
        let decl_name = decl_name.into();
        if self.decl_index.contains_key(&decl_name) {
            return Err(ModelError::DuplicateDeclaration(decl_name));
        }
        if let Some(parent) = parent {
            self.get(parent).ok_or(ModelError::UnknownNode(parent))?;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.decl_index.insert(decl_name.clone(), id);
        self.nodes
            .push(ModelNode::new(id, type_name.into(), decl_name, parent));
        Ok(id)
    }

    /// Get a node by id (O(1) array index).
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&ModelNode> {
        if id.is_valid() {
            self.nodes.get(id.index())
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ModelNode> {
        if id.is_valid() {
            self.nodes.get_mut(id.index())
        } else {
            None
        }
    }

    /// Look up by declaration name (O(1) HashMap).
    pub fn find_by_decl(&self, decl_name: &str) -> Option<NodeId> {
        self.decl_index.get(decl_name).copied()
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = &ModelNode> {
        self.nodes.iter()
    }

    /// Iterate over nodes declared with `type_name`.
    pub fn of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a ModelNode> {
        self.nodes.iter().filter(move |n| n.type_name == type_name)
    }

    /// Climb parent links to the node owned by the namespace root.
    pub fn top_level_owner(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id)?;
        // Parent links always point at earlier arena slots, so this terminates.
        while let Some(parent) = current.parent {
            current = self.get(parent)?;
        }
        Some(current.id)
    }

    pub fn logical_name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(ModelNode::logical_name)
    }

    pub fn set_slot(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        slot: Slot,
    ) -> Result<(), ModelError> {
        self.get_mut(id)
            .ok_or(ModelError::UnknownNode(id))?
            .set_slot(name, slot);
        Ok(())
    }

    /// Current value of a scalar slot.
    pub fn value(&self, id: NodeId, slot: &str) -> Option<&Value> {
        self.get(id)?.slot(slot)?.scalar()
    }

    /// Overwrite the value of an existing scalar slot. The caller is
    /// responsible for the value matching the slot type.
    pub fn assign(&mut self, id: NodeId, slot: &str, value: Value) -> Result<(), ModelError> {
        let node = self.get_mut(id).ok_or(ModelError::UnknownNode(id))?;
        match node.slot_mut(slot) {
            Some(Slot::Scalar { value: current, .. }) => {
                *current = Some(value);
                Ok(())
            }
            Some(_) => Err(ModelError::NotScalar {
                node: id,
                slot: slot.to_string(),
            }),
            None => Err(ModelError::MissingSlot {
                node: id,
                slot: slot.to_string(),
            }),
        }
    }
}
