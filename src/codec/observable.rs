//! Observables and the channel-spelling → slot-name normalization table.

use std::borrow::Cow;
use std::collections::HashMap;

/// A named measurable quantity reported over telemetry, spelled the way the
/// monitoring channel spells it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Observable {
    name: Cow<'static, str>,
}

impl Observable {
    pub const USED_MEMORY: Observable = Observable::from_static("USED_MEMORY");
    pub const AVAILABLE_MEMORY: Observable = Observable::from_static("AVAILABLE_MEMORY");
    pub const CAPACITY: Observable = Observable::from_static("CAPACITY");
    pub const LATENCY: Observable = Observable::from_static("LATENCY");
    pub const THROUGHPUT_ITEMS: Observable = Observable::from_static("THROUGHPUT_ITEMS");
    pub const THROUGHPUT_VOLUME: Observable = Observable::from_static("THROUGHPUT_VOLUME");
    pub const PING: Observable = Observable::from_static("PING");
    pub const LOAD: Observable = Observable::from_static("LOAD");
    pub const BANDWIDTH: Observable = Observable::from_static("BANDWIDTH");
    pub const EXECUTORS: Observable = Observable::from_static("EXECUTORS");
    pub const TASKS: Observable = Observable::from_static("TASKS");
    pub const USED_HOSTS: Observable = Observable::from_static("USED_HOSTS");
    pub const AVAILABLE_HOSTS: Observable = Observable::from_static("AVAILABLE_HOSTS");
    pub const IS_VALID: Observable = Observable::from_static("IS_VALID");
    pub const IS_ENACTING: Observable = Observable::from_static("IS_ENACTING");
    pub const ITEMS: Observable = Observable::from_static("ITEMS");
    pub const ACCURACY_CONFIDENCE: Observable = Observable::from_static("ACCURACY_CONFIDENCE");
    pub const ACCURACY_ERROR_RATE: Observable = Observable::from_static("ACCURACY_ERROR_RATE");

    pub const fn from_static(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
        }
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All built-in observables.
    pub fn all() -> &'static [Observable] {
        &BUILTIN_OBSERVABLES
    }
}

static BUILTIN_OBSERVABLES: [Observable; 18] = [
    Observable::USED_MEMORY,
    Observable::AVAILABLE_MEMORY,
    Observable::CAPACITY,
    Observable::LATENCY,
    Observable::THROUGHPUT_ITEMS,
    Observable::THROUGHPUT_VOLUME,
    Observable::PING,
    Observable::LOAD,
    Observable::BANDWIDTH,
    Observable::EXECUTORS,
    Observable::TASKS,
    Observable::USED_HOSTS,
    Observable::AVAILABLE_HOSTS,
    Observable::IS_VALID,
    Observable::IS_ENACTING,
    Observable::ITEMS,
    Observable::ACCURACY_CONFIDENCE,
    Observable::ACCURACY_ERROR_RATE,
];

impl std::fmt::Display for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

const BUILTIN_SLOT_NAMES: &[(&str, &str)] = &[
    ("USED_MEMORY", "usedMemory"),
    ("AVAILABLE_MEMORY", "availableMemory"),
    ("CAPACITY", "capacity"),
    ("LATENCY", "latency"),
    ("THROUGHPUT_ITEMS", "throughputItems"),
    ("THROUGHPUT_VOLUME", "throughputVolume"),
    ("PING", "ping"),
    ("LOAD", "load"),
    ("BANDWIDTH", "bandwidth"),
    ("EXECUTORS", "executors"),
    ("TASKS", "tasks"),
    ("USED_HOSTS", "usedHosts"),
    ("AVAILABLE_HOSTS", "availableHosts"),
    ("IS_VALID", "isValid"),
    ("IS_ENACTING", "isEnacting"),
    ("ITEMS", "items"),
    ("ACCURACY_CONFIDENCE", "accuracyConfidence"),
    ("ACCURACY_ERROR_RATE", "accuracyErrorRate"),
];

/// Maps channel observable tokens to model slot names.
#[derive(Debug, Clone)]
pub struct ObservableTable {
    slot_names: HashMap<String, String>,
}

impl Default for ObservableTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ObservableTable {
    pub fn builtin() -> Self {
        Self {
            slot_names: BUILTIN_SLOT_NAMES
                .iter()
                .map(|(token, slot)| (token.to_string(), slot.to_string()))
                .collect(),
        }
    }

    /// Add extra aliases. Built-in entries win over conflicting aliases.
    pub fn with_aliases<'a>(mut self, aliases: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        for (token, slot) in aliases {
            if BUILTIN_SLOT_NAMES.iter().any(|(t, _)| t == token) {
                tracing::warn!("Ignoring alias for built-in observable '{}'", token);
                continue;
            }
            self.slot_names.insert(token.clone(), slot.clone());
        }
        self
    }

    /// Model slot name for a channel token; unknown tokens pass through.
    pub fn normalize<'t>(&'t self, token: &'t str) -> &'t str {
        self.slot_names.get(token).map(String::as_str).unwrap_or(token)
    }

    pub fn len(&self) -> usize {
        self.slot_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_builtin() {
        let table = ObservableTable::builtin();
        assert_eq!(table.normalize("USED_MEMORY"), "usedMemory");
        assert_eq!(table.normalize("IS_ENACTING"), "isEnacting");
        assert_eq!(table.normalize("customSlot"), "customSlot");
    }

    #[test]
    fn test_every_builtin_observable_has_slot_name() {
        let table = ObservableTable::builtin();
        for observable in Observable::all() {
            assert_ne!(table.normalize(observable.name()), observable.name());
        }
    }

    #[test]
    fn test_aliases_do_not_override_builtins() {
        let aliases = [
            ("QUEUE_LENGTH".to_string(), "queueLength".to_string()),
            ("LATENCY".to_string(), "lag".to_string()),
        ];
        let table = ObservableTable::builtin().with_aliases(aliases.iter().map(|(a, b)| (a, b)));
        assert_eq!(table.normalize("QUEUE_LENGTH"), "queueLength");
        assert_eq!(table.normalize("LATENCY"), "latency");
    }
}
