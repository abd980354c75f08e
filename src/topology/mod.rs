//! Pipeline topology mapping.
//!
//! Walks a pipeline graph once, inventories its structural categories and
//! correlates design-time elements with the runtime clones deployed for the
//! current execution phase.
//!
//! # Architecture
//!
//! ```text
//! Pipeline.sources ──► [Source] ──output──► [Flow] ──destination──► [FamilyElement]
//!                                                                      │ output
//!                                                                      ▼
//!                                    [Sink] ◄──destination── [Flow] ◄──┘
//! ```
//!
//! # Design
//!
//! - **Visited-set on `NodeId`**: converging and cyclic references terminate.
//! - **Lazy name maps**: algorithm/source/sink maps are built on first access
//!   and cached inside the [`PipelineSnapshot`].
//! - **Consuming match**: a runtime algorithm is matched to at most one
//!   design-time algorithm; ties go to encounter order.

pub mod kind;
pub mod mapper;
pub mod provider;
pub mod snapshot;

pub use kind::{slots, NodeKind, PIPELINE_TYPE};
pub use mapper::{Counterpart, TopologyMapper};
pub use provider::{Phase, RuntimeMappingProvider, StaticMappingProvider};
pub use snapshot::{NameMap, PipelineSnapshot};
