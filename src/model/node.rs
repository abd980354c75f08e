//! Model nodes and their named slots.

use crate::model::id::NodeId;
use crate::model::value::{Value, ValueType};

/// Conventional slot holding an element's logical display name.
pub const NAME_SLOT: &str = "name";

/// Content of one named slot on a [`ModelNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Typed scalar; `None` while unset.
    Scalar { ty: ValueType, value: Option<Value> },
    /// Reference to a node elsewhere in the model.
    Ref(NodeId),
    /// Compound node contained in this slot.
    Child(NodeId),
    /// Collection of references.
    List(Vec<NodeId>),
}

impl Slot {
    /// A scalar slot holding `value`.
    pub fn value(value: Value) -> Self {
        Slot::Scalar {
            ty: value.value_type(),
            value: Some(value),
        }
    }

    /// An unset scalar slot of type `ty`.
    pub fn unset(ty: ValueType) -> Self {
        Slot::Scalar { ty, value: None }
    }

    /// Referenced nodes, treating a single reference as a one-element
    /// collection. Scalars yield nothing.
    pub fn refs(&self) -> Vec<NodeId> {
        match self {
            Slot::Ref(id) | Slot::Child(id) => vec![*id],
            Slot::List(ids) => ids.clone(),
            Slot::Scalar { .. } => Vec::new(),
        }
    }

    /// The node one path step into this slot leads to.
    pub fn step(&self) -> Option<NodeId> {
        match self {
            Slot::Ref(id) | Slot::Child(id) => Some(*id),
            _ => None,
        }
    }

    pub fn scalar(&self) -> Option<&Value> {
        match self {
            Slot::Scalar { value, .. } => value.as_ref(),
            _ => None,
        }
    }
}

/// A typed, named element of the configuration model.
#[derive(Debug, Clone)]
pub struct ModelNode {
    pub id: NodeId,
    /// Declared type name, e.g. `"FamilyElement"`.
    pub type_name: String,
    /// Raw declaration name, unique within the model.
    pub decl_name: String,
    /// Owning node (`None` for the model namespace root).
    pub parent: Option<NodeId>,
    slots: Vec<(String, Slot)>,
}

impl ModelNode {
    pub(crate) fn new(
        id: NodeId,
        type_name: String,
        decl_name: String,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            id,
            type_name,
            decl_name,
            parent,
            slots: Vec::new(),
        }
    }

    /// Logical name: the `name` slot when set, else the declaration name.
    pub fn logical_name(&self) -> &str {
        self.slot(NAME_SLOT)
            .and_then(Slot::scalar)
            .and_then(Value::as_str)
            .unwrap_or(&self.decl_name)
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Insert or replace a slot, keeping declaration order.
    pub fn set_slot(&mut self, name: impl Into<String>, slot: Slot) {
        let name = name.into();
        match self.slot_mut(&name) {
            Some(existing) => *existing = slot,
            None => self.slots.push((name, slot)),
        }
    }

    /// References held by a slot; empty when the slot is absent.
    pub fn refs(&self, name: &str) -> Vec<NodeId> {
        self.slot(name).map(Slot::refs).unwrap_or_default()
    }
}
