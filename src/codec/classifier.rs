//! Type classifiers: which model types are telemetry-addressable, and how.

use crate::model::{ConfigurationModel, NodeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Category prefix of pipeline roots.
pub const PIPELINE_PREFIX: &str = "Pipeline";
/// Category prefix shared by all pipeline elements.
pub const PIPELINE_ELEMENT_PREFIX: &str = "PipelineElement";
/// Category prefix of algorithms; identifiers with it are rewritten on decode.
pub const ALGORITHM_PREFIX: &str = "Algorithm";

/// What a classifier may consult when computing a key.
pub struct KeyContext<'a> {
    pub model: &'a ConfigurationModel,
    /// Logical name of the enclosing pipeline, when one was found.
    pub pipeline: Option<&'a str>,
    pub separator: &'a str,
}

/// Computes the category prefix and the instance key for one declared type.
///
/// Both must be pure functions of static model metadata.
pub trait TypeClassifier: Send + Sync {
    fn prefix(&self, type_name: &str) -> String;

    fn key(&self, ctx: &KeyContext<'_>, node: NodeId) -> String;
}

/// Fixed prefix; key is the logical name, qualified by the enclosing
/// pipeline when there is one.
#[derive(Debug, Clone)]
pub struct QualifiedNameClassifier {
    prefix: String,
}

impl QualifiedNameClassifier {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl TypeClassifier for QualifiedNameClassifier {
    fn prefix(&self, _type_name: &str) -> String {
        self.prefix.clone()
    }

    fn key(&self, ctx: &KeyContext<'_>, node: NodeId) -> String {
        let name = ctx.model.logical_name(node).unwrap_or_default();
        match ctx.pipeline {
            Some(pipeline) => format!("{}{}{}", pipeline, ctx.separator, name),
            None => name.to_string(),
        }
    }
}

/// Declared type name → classifier.
#[derive(Clone, Default)]
pub struct ClassifierRegistry {
    classifiers: HashMap<String, Arc<dyn TypeClassifier>>,
}

impl ClassifierRegistry {
    /// An empty registry; nothing is addressable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry covering pipelines, their elements, algorithms and the
    /// infrastructure types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (type_name, prefix) in Self::default_prefixes() {
            registry.register_prefix(*type_name, *prefix);
        }
        registry
    }

    /// Built-in type → prefix table.
    pub fn default_prefixes() -> &'static [(&'static str, &'static str)] {
        &[
            ("Pipeline", PIPELINE_PREFIX),
            ("Source", PIPELINE_ELEMENT_PREFIX),
            ("FamilyElement", PIPELINE_ELEMENT_PREFIX),
            ("DataManagementElement", PIPELINE_ELEMENT_PREFIX),
            ("Sink", PIPELINE_ELEMENT_PREFIX),
            ("ReplaySink", PIPELINE_ELEMENT_PREFIX),
            ("Algorithm", ALGORITHM_PREFIX),
            ("Machine", "Machine"),
            ("HwNode", "HwNode"),
            ("Cloud", "Cloud"),
        ]
    }

    pub fn register(&mut self, type_name: impl Into<String>, classifier: Arc<dyn TypeClassifier>) {
        self.classifiers.insert(type_name.into(), classifier);
    }

    /// Register a [`QualifiedNameClassifier`] with `prefix` for `type_name`.
    pub fn register_prefix(&mut self, type_name: impl Into<String>, prefix: impl Into<String>) {
        self.register(type_name, Arc::new(QualifiedNameClassifier::new(prefix)));
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn TypeClassifier>> {
        self.classifiers.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }
}

impl std::fmt::Debug for ClassifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.classifiers.keys().collect();
        types.sort();
        f.debug_struct("ClassifierRegistry").field("types", &types).finish()
    }
}
