#![forbid(unsafe_code)]

//! Routers and the coordinator hierarchy for rudder.
//!
//! A [`Router`] owns one coordinator's push stack and modal stack; a
//! [`CoordinatorTree`] owns the hierarchy of flow controllers, their
//! parent/child bookkeeping, and cross-flow presentation (forced
//! presentation, tab coordinators, renderer-confirmed teardown).
//!
//! Most applications depend on the `rudder` facade rather than this crate
//! directly.

pub mod coordinator;
pub mod error;
pub mod router;
pub mod tabs;

pub use coordinator::{CoordinatorId, CoordinatorTree, Flow, FlowPhase, FlowScope};
pub use error::HierarchyError;
pub use router::Router;
