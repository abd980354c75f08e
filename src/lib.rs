//! # telebind-rs: Telemetry Binding for Pipeline Configuration Models
//!
//! Translates between a graph-shaped pipeline configuration model and the flat,
//! string-keyed identifiers of an external monitoring channel, and applies
//! the values that channel reports back into the model.
//!
//! ## Architecture
//!
//! - **Model**: arena-backed configuration model with typed scalar slots
//! - **Topology**: pipeline traversal and design-time → runtime correlation
//! - **Codec**: identifier encode/decode with observable-name normalization
//! - **Binder**: batch value application with coercion, per configuration
//! - **Reload**: crossbeam channel signal that drops every cached binder
//!
//! ## Configuration
//!
//! Identifier format settings live in `telemetry.toml` under the platform
//! config directory (`dev.telebind`); see [`config`].
//!
//! ## Example
//!
//! ```ignore
//! use telebind_rs::{
//!     binder::{reload_channel, TelemetryService},
//!     config::TelemetryConfig,
//!     model::{Configuration, ModelDocument, RawValue},
//! };
//! use std::sync::Arc;
//!
//! let (model, provider) = ModelDocument::load("pipeline.json")?.into_model()?;
//! let configuration = Configuration::new(model);
//!
//! let service = Arc::new(TelemetryService::new(
//!     &TelemetryConfig::load_or_default(),
//!     Arc::new(provider),
//! ));
//! let (notifier, receiver) = reload_channel();
//! service.spawn_reload_listener(receiver)?;
//!
//! let report = service.store_value_binding(
//!     &configuration,
//!     [("PipelineElement:PriorityPip:Spring:LATENCY", RawValue::Real(12.5))],
//! );
//! assert!(report.is_clean());
//!
//! // After swapping in a new model:
//! notifier.notify();
//! ```

pub mod binder;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod topology;

// Re-export commonly used types
pub use binder::{BindingReport, ModelReloadNotifier, TelemetryService, ValueBinder};
pub use codec::{IdentifierCodec, Observable, PathToken};
pub use config::TelemetryConfig;
pub use error::{BindingError, Result, TelemetryError};
pub use model::{Configuration, ConfigurationModel, NodeId, RawValue, Value, ValueType};
pub use topology::{Phase, RuntimeMappingProvider, TopologyMapper};
