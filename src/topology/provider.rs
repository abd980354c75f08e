//! Runtime mapping: design-time nodes to their per-phase runtime clones.

use crate::model::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which runtime-mapped model generation to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Monitoring,
    Adaptation,
}

impl Phase {
    /// Default lookup order: adaptation first, then monitoring.
    pub fn default_order() -> Vec<Phase> {
        vec![Phase::Adaptation, Phase::Monitoring]
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Monitoring => write!(f, "monitoring"),
            Phase::Adaptation => write!(f, "adaptation"),
        }
    }
}

/// Source of runtime counterparts for design-time nodes.
#[cfg_attr(test, mockall::automock)]
pub trait RuntimeMappingProvider: Send + Sync {
    /// Runtime clones derived from `original` in `phase`, or `None` when that
    /// phase's model has not been built yet.
    fn mapped_nodes(&self, original: NodeId, phase: Phase) -> Option<Vec<NodeId>>;
}

/// Table-backed provider filled by whoever builds the runtime models.
#[derive(Debug, Clone, Default)]
pub struct StaticMappingProvider {
    table: HashMap<(NodeId, Phase), Vec<NodeId>>,
}

impl StaticMappingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, original: NodeId, phase: Phase, runtime: Vec<NodeId>) {
        self.table.insert((original, phase), runtime);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, original: NodeId, phase: Phase, runtime: Vec<NodeId>) -> Self {
        self.insert(original, phase, runtime);
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl RuntimeMappingProvider for StaticMappingProvider {
    fn mapped_nodes(&self, original: NodeId, phase: Phase) -> Option<Vec<NodeId>> {
        self.table.get(&(original, phase)).cloned()
    }
}
