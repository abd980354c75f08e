//! Identity types for the configuration model.
//!
//! IDs are newtypes over `u32` that serve as direct array indices into the
//! model arena, providing O(1) lookup and a stable identity for visited-sets.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Index into `ConfigurationModel::nodes`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "NodeId(INVALID)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

static NEXT_CONFIGURATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one configuration-model instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigurationId(pub u64);

impl ConfigurationId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_CONFIGURATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigurationId({})", self.0)
    }
}

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId(42);
        assert!(id.is_valid());
        assert_eq!(id.index(), 42);
        assert!(!NodeId::INVALID.is_valid());
        assert_eq!(format!("{:?}", NodeId::INVALID), "NodeId(INVALID)");
    }

    #[test]
    fn test_configuration_ids_are_unique() {
        let a = ConfigurationId::next();
        let b = ConfigurationId::next();
        assert_ne!(a, b);
    }
}
