//! JSON model documents.
//!
//! A flat, serde-friendly rendition of a [`ConfigurationModel`] plus its
//! runtime phase mappings. Used by the `telebind` binary and by test
//! fixtures; it is a snapshot format, not a pipeline description language.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "decl": "pip", "type": "Pipeline",
//!       "slots": { "name": { "text": "PriorityPip" }, "sources": { "list": ["src"] } } },
//!     { "decl": "src", "type": "Source", "parent": "pip",
//!       "slots": { "latency": { "unset": "integer" } } }
//!   ],
//!   "mappings": [ { "original": "fam", "phase": "monitoring", "runtime": ["fam_rt"] } ]
//! }
//! ```

use crate::error::{ModelError, Result, ResultExt};
use crate::model::node::Slot;
use crate::model::tree::ConfigurationModel;
use crate::model::value::{Value, ValueType};
use crate::model::NodeId;
use crate::topology::{Phase, StaticMappingProvider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One slot as written in a document. References use declaration names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotDocument {
    Ref(String),
    Child(String),
    List(Vec<String>),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
    Unset(ValueType),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDocument {
    pub decl: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub slots: BTreeMap<String, SlotDocument>,
}

/// Runtime counterparts of one design-time node for one phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingDocument {
    pub original: String,
    pub phase: Phase,
    pub runtime: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDocument {
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub mappings: Vec<MappingDocument>,
}

impl ModelDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model document {:?}", path))?;
        Self::from_json(&content).with_context(|| format!("Invalid model document {:?}", path))
    }

    /// Build the model arena and the phase mapping table.
    ///
    /// Parents must be declared before their children; slot references may
    /// point anywhere in the document.
    pub fn into_model(self) -> std::result::Result<(ConfigurationModel, StaticMappingProvider), ModelError> {
        let mut model = ConfigurationModel::new();

        for node in &self.nodes {
            let parent = match &node.parent {
                Some(parent) => Some(resolve(&model, &node.decl, "parent", parent)?),
                None => None,
            };
            model.add_node(node.type_name.clone(), node.decl.clone(), parent)?;
        }

        for node in self.nodes {
            let id = resolve(&model, &node.decl, "decl", &node.decl)?;
            for (name, slot) in node.slots {
                let slot = match slot {
                    SlotDocument::Ref(target) => Slot::Ref(resolve(&model, &node.decl, &name, &target)?),
                    SlotDocument::Child(target) => {
                        Slot::Child(resolve(&model, &node.decl, &name, &target)?)
                    }
                    SlotDocument::List(targets) => Slot::List(
                        targets
                            .iter()
                            .map(|t| resolve(&model, &node.decl, &name, t))
                            .collect::<std::result::Result<_, _>>()?,
                    ),
                    SlotDocument::Integer(v) => Slot::value(Value::Integer(v)),
                    SlotDocument::Real(v) => Slot::value(Value::Real(v)),
                    SlotDocument::Boolean(v) => Slot::value(Value::Boolean(v)),
                    SlotDocument::Text(v) => Slot::value(Value::Text(v)),
                    SlotDocument::Unset(ty) => Slot::unset(ty),
                };
                model.set_slot(id, name, slot)?;
            }
        }

        let mut provider = StaticMappingProvider::new();
        for mapping in self.mappings {
            let original = resolve(&model, &mapping.original, "original", &mapping.original)?;
            let runtime = mapping
                .runtime
                .iter()
                .map(|r| resolve(&model, &mapping.original, "runtime", r))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            provider.insert(original, mapping.phase, runtime);
        }

        Ok((model, provider))
    }
}

fn resolve(
    model: &ConfigurationModel,
    node: &str,
    slot: &str,
    reference: &str,
) -> std::result::Result<NodeId, ModelError> {
    model
        .find_by_decl(reference)
        .ok_or_else(|| ModelError::UnresolvedReference {
            node: node.to_string(),
            slot: slot.to_string(),
            reference: reference.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::RuntimeMappingProvider;

    const DOC: &str = r#"{
        "nodes": [
            { "decl": "pip", "type": "Pipeline",
              "slots": { "name": { "text": "PriorityPip" }, "sources": { "list": ["src"] } } },
            { "decl": "src", "type": "Source", "parent": "pip",
              "slots": { "latency": { "unset": "integer" }, "output": { "list": [] } } },
            { "decl": "src_rt", "type": "Source" }
        ],
        "mappings": [ { "original": "src", "phase": "adaptation", "runtime": ["src_rt"] } ]
    }"#;

    #[test]
    fn test_document_into_model() {
        let (model, provider) = ModelDocument::from_json(DOC).unwrap().into_model().unwrap();
        let pip = model.find_by_decl("pip").unwrap();
        let src = model.find_by_decl("src").unwrap();

        assert_eq!(model.logical_name(pip), Some("PriorityPip"));
        assert_eq!(model.get(pip).unwrap().refs("sources"), vec![src]);
        assert_eq!(model.get(src).unwrap().parent, Some(pip));
        assert_eq!(
            provider.mapped_nodes(src, Phase::Adaptation),
            Some(vec![model.find_by_decl("src_rt").unwrap()])
        );
        assert_eq!(provider.mapped_nodes(src, Phase::Monitoring), None);
    }

    #[test]
    fn test_unresolved_reference() {
        let doc = r#"{ "nodes": [ { "decl": "f", "type": "Flow",
            "slots": { "destination": { "ref": "nowhere" } } } ] }"#;
        let err = ModelDocument::from_json(doc).unwrap().into_model().unwrap_err();
        assert!(matches!(err, ModelError::UnresolvedReference { ref reference, .. } if reference == "nowhere"));
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = ModelDocument::from_json("{ not json").unwrap_err();
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
