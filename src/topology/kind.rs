//! Structural categories of pipeline nodes.
//!
//! The traversal dispatches on the declared type name once, via
//! [`NodeKind::of`], and then matches on the variant.

/// Declared type of pipeline roots.
pub const PIPELINE_TYPE: &str = "Pipeline";

/// Slot names the topology walk relies on.
pub mod slots {
    pub const SOURCES: &str = "sources";
    pub const OUTPUT: &str = "output";
    /// Older fixtures chain sources with `next` instead of `output`.
    pub const NEXT: &str = "next";
    pub const DESTINATION: &str = "destination";
    pub const SOURCE: &str = "source";
    pub const SINK: &str = "sink";
    pub const FAMILY: &str = "family";
    pub const MEMBERS: &str = "members";
    pub const AVAILABLE: &str = "available";
}

/// Node categories forming pipeline topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Source,
    /// Pass-through edge with a single destination.
    Flow,
    /// Processing node selecting among the algorithms of a family.
    FamilyElement,
    DataManagementElement,
    Sink,
    ReplaySink,
    /// Any other processing node; only its `output` is followed.
    Other,
}

impl NodeKind {
    /// Classify a declared type name.
    pub fn of(type_name: &str) -> Self {
        match type_name {
            "Source" => NodeKind::Source,
            "Flow" => NodeKind::Flow,
            "FamilyElement" => NodeKind::FamilyElement,
            "DataManagementElement" => NodeKind::DataManagementElement,
            "Sink" => NodeKind::Sink,
            "ReplaySink" => NodeKind::ReplaySink,
            _ => NodeKind::Other,
        }
    }

    /// Terminal nodes are not traversed past.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeKind::Sink | NodeKind::ReplaySink)
    }

    /// Whether a traversal records nodes of this kind in the snapshot.
    pub fn is_recorded(&self) -> bool {
        !matches!(self, NodeKind::Flow | NodeKind::Other)
    }
}
