//! Telemetry identifier codec.
//!
//! Translates between model nodes and the flat, separator-joined identifiers
//! used by the monitoring channel:
//!
//! ```text
//! encode:  (node, observable) ──► "PipelineElement:PriorityPip:Spring:LATENCY"
//! decode:  "Algorithm:PriorityPip:A:LATENCY"
//!            ──► Element("Algorithm:algA_rt") ─► Observable("latency")
//! ```
//!
//! Only node types with a registered [`TypeClassifier`] are addressable.
//! Algorithm identifiers name the design-time algorithm and are redirected
//! on decode to the runtime counterpart found by the topology mapper.

pub mod classifier;
pub mod identifier;
pub mod identifier_codec;
pub mod observable;
pub mod path;

pub use classifier::{
    ClassifierRegistry, KeyContext, QualifiedNameClassifier, TypeClassifier, ALGORITHM_PREFIX,
    PIPELINE_ELEMENT_PREFIX, PIPELINE_PREFIX,
};
pub use identifier::{Identifier, IdentifierFormat, DEFAULT_NULL_MARKER, DEFAULT_SEPARATOR};
pub use identifier_codec::{CodecSettings, IdentifierCodec};
pub use observable::{Observable, ObservableTable};
pub use path::{DecodedPath, PathToken};
