//! Per-pipeline structural inventory.

use super::kind::NodeKind;
use crate::model::NodeId;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Logical name → runtime node.
pub type NameMap = HashMap<String, NodeId>;

/// Runtime descriptor maps gathered by one correlating traversal.
#[derive(Debug, Default)]
pub(crate) struct CounterpartMaps {
    pub sources: NameMap,
    pub sinks: NameMap,
}

/// Everything one traversal of a pipeline found, plus lazily-built
/// original → runtime name maps.
///
/// Snapshots are handed out as `Arc`s by the
/// [`TopologyMapper`](super::TopologyMapper) and never change after their
/// maps are initialized.
#[derive(Debug)]
pub struct PipelineSnapshot {
    pub pipeline: NodeId,
    pub name: String,
    pub sources: Vec<NodeId>,
    pub family_elements: Vec<NodeId>,
    pub data_management_elements: Vec<NodeId>,
    pub sinks: Vec<NodeId>,
    pub replay_sinks: Vec<NodeId>,
    pub(crate) algorithms: OnceLock<NameMap>,
    pub(crate) counterparts: OnceLock<CounterpartMaps>,
}

impl PipelineSnapshot {
    pub(crate) fn new(pipeline: NodeId, name: String) -> Self {
        Self {
            pipeline,
            name,
            sources: Vec::new(),
            family_elements: Vec::new(),
            data_management_elements: Vec::new(),
            sinks: Vec::new(),
            replay_sinks: Vec::new(),
            algorithms: OnceLock::new(),
            counterparts: OnceLock::new(),
        }
    }

    /// Append `id` to the list for `kind`; unrecorded kinds are ignored.
    pub(crate) fn record(&mut self, kind: NodeKind, id: NodeId) {
        let list = match kind {
            NodeKind::Source => &mut self.sources,
            NodeKind::FamilyElement => &mut self.family_elements,
            NodeKind::DataManagementElement => &mut self.data_management_elements,
            NodeKind::Sink => &mut self.sinks,
            NodeKind::ReplaySink => &mut self.replay_sinks,
            NodeKind::Flow | NodeKind::Other => return,
        };
        list.push(id);
    }

    /// All recorded elements, in category order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.sources
            .iter()
            .chain(&self.family_elements)
            .chain(&self.data_management_elements)
            .chain(&self.sinks)
            .chain(&self.replay_sinks)
            .copied()
    }

    /// Whether `node` was recorded by the traversal.
    pub fn contains(&self, node: NodeId) -> bool {
        self.elements().any(|e| e == node)
    }
}
