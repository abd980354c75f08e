//! Value binding: applying telemetry readings into a configuration model.
//!
//! A [`ValueBinder`] owns an [`IdentifierCodec`] built against one
//! [`Configuration`] and collects `(identifier, raw value)` pairs until they
//! are committed. Committing decodes each identifier to a scalar slot,
//! coerces the raw value to the slot type and assigns it on the live model.
//! Failing entries are reported and never stop the rest of the batch.
//!
//! [`TelemetryService`] keeps one binder per configuration and drops them all
//! when the model is reloaded.

pub mod service;

pub use service::{reload_channel, ModelReloadNotifier, ReloadReceiver, TelemetryService};

use crate::codec::{CodecSettings, IdentifierCodec, PathToken};
use crate::error::BindingError;
use crate::model::{Configuration, ConfigurationModel, NodeId, RawValue, Slot, Value};
use crate::topology::RuntimeMappingProvider;
use std::collections::HashMap;
use std::sync::Arc;

/// One value written into the model by a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    pub identifier: String,
    pub node: NodeId,
    pub slot: String,
    pub value: Value,
}

/// Outcome of committing a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingReport {
    pub applied: Vec<BoundValue>,
    pub errors: Vec<BindingError>,
}

impl BindingReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of entries processed, applied or not.
    pub fn len(&self) -> usize {
        self.applied.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Applies pending telemetry values into one configuration.
pub struct ValueBinder {
    configuration: Configuration,
    codec: IdentifierCodec,
    pending: Vec<(String, RawValue)>,
    positions: HashMap<String, usize>,
}

impl ValueBinder {
    /// Build a binder and its codec against the current model state.
    pub fn new(
        configuration: Configuration,
        settings: CodecSettings,
        provider: Arc<dyn RuntimeMappingProvider>,
    ) -> Self {
        let codec = IdentifierCodec::new(&configuration.read(), settings, provider);
        Self {
            configuration,
            codec,
            pending: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn codec(&self) -> &IdentifierCodec {
        &self.codec
    }

    /// Queue a value. A later value for the same identifier replaces the
    /// earlier one.
    pub fn add(&mut self, identifier: impl Into<String>, raw: RawValue) {
        let identifier = identifier.into();
        match self.positions.get(&identifier) {
            Some(&pos) => self.pending[pos].1 = raw,
            None => {
                self.positions.insert(identifier.clone(), self.pending.len());
                self.pending.push((identifier, raw));
            }
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Apply every pending value and clear the pending set.
    pub fn commit(&mut self) -> BindingReport {
        let mut report = BindingReport::default();
        if self.pending.is_empty() {
            return report;
        }

        self.positions.clear();
        let pending = std::mem::take(&mut self.pending);
        let mut model = self.configuration.write();

        for (identifier, raw) in pending {
            match self.apply(&mut model, &identifier, &raw) {
                Ok((node, slot, value)) => {
                    tracing::trace!("{} <- {}", identifier, value);
                    report.applied.push(BoundValue {
                        identifier,
                        node,
                        slot,
                        value,
                    });
                }
                Err(err) => {
                    tracing::warn!("Skipping telemetry value: {}", err);
                    report.errors.push(err);
                }
            }
        }

        tracing::debug!(
            "Committed {} values into configuration {} ({} failed)",
            report.applied.len(),
            self.configuration.id(),
            report.errors.len()
        );
        report
    }

    fn apply(
        &self,
        model: &mut ConfigurationModel,
        identifier: &str,
        raw: &RawValue,
    ) -> Result<(NodeId, String, Value), BindingError> {
        let (node, slot) = self.resolve(model, identifier)?;

        let ty = match model.get(node).and_then(|n| n.slot(&slot)) {
            Some(Slot::Scalar { ty, .. }) => *ty,
            Some(_) => {
                return Err(BindingError::NotAssignable {
                    identifier: identifier.to_string(),
                    slot,
                })
            }
            None => {
                return Err(BindingError::UnknownSlot {
                    identifier: identifier.to_string(),
                    element: model.logical_name(node).unwrap_or_default().to_string(),
                    slot,
                })
            }
        };

        let value = ty.coerce(raw).ok_or_else(|| BindingError::TypeMismatch {
            identifier: identifier.to_string(),
            expected: ty,
            found: raw.kind(),
        })?;

        model
            .assign(node, &slot, value.clone())
            .map_err(|_| BindingError::NotAssignable {
                identifier: identifier.to_string(),
                slot: slot.clone(),
            })?;
        Ok((node, slot, value))
    }

    /// Walk the decoded path to the target node and observable slot.
    fn resolve(
        &self,
        model: &ConfigurationModel,
        identifier: &str,
    ) -> Result<(NodeId, String), BindingError> {
        let unresolved = || BindingError::Unresolved {
            identifier: identifier.to_string(),
        };

        let mut path = self.codec.decode(model, identifier);
        let mut node = match path.next() {
            Some(PathToken::Element(key)) => self.codec.resolve_element(&key).ok_or_else(unresolved)?,
            _ => return Err(unresolved()),
        };

        for token in path {
            match token {
                PathToken::Slot(slot) => {
                    node = model
                        .get(node)
                        .and_then(|n| n.slot(&slot))
                        .and_then(Slot::step)
                        .ok_or_else(|| BindingError::UnknownSlot {
                            identifier: identifier.to_string(),
                            element: model.logical_name(node).unwrap_or_default().to_string(),
                            slot,
                        })?;
                }
                PathToken::Observable(slot) => return Ok((node, slot)),
                PathToken::Element(_) => return Err(unresolved()),
            }
        }

        Err(BindingError::NotAssignable {
            identifier: identifier.to_string(),
            slot: self.codec.settings().format.null_marker.clone(),
        })
    }
}

impl std::fmt::Debug for ValueBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueBinder")
            .field("configuration", &self.configuration.id())
            .field("pending", &self.pending.len())
            .field("codec", &self.codec)
            .finish()
    }
}
