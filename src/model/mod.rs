//! Configuration model: typed, named nodes in a flat arena.
//!
//! The model describes data-processing pipelines (sources, processing stages,
//! sinks) together with their runtime-cloned counterparts. Nodes reference
//! each other through slots, so the model is a graph rather than a tree.

pub mod configuration;
pub mod document;
pub mod id;
pub mod node;
pub mod tree;
pub mod value;

pub use configuration::Configuration;
pub use document::{MappingDocument, ModelDocument, NodeDocument, SlotDocument};
pub use id::{ConfigurationId, NodeId};
pub use node::{ModelNode, Slot, NAME_SLOT};
pub use tree::ConfigurationModel;
pub use value::{RawValue, Value, ValueType};
