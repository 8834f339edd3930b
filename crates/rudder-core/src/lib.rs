#![forbid(unsafe_code)]

//! Core vocabulary and the modal-stack engine for rudder.
//!
//! This crate holds the leaf pieces of the navigation core: the [`Route`]
//! seam to the host UI framework, [`TransitionStyle`] variants,
//! [`PresentationItem`] modal-stack entries, the serialized
//! [`TransitionSequencer`], and the [`ModalStackCoordinator`] that keeps an
//! ordered, race-free stack of overlay layers across animation-gated
//! mutations.
//!
//! Routers and the coordinator hierarchy live in `rudder-flow`; most
//! applications depend on the `rudder` facade instead of this crate
//! directly.

pub mod item;
pub mod modal;
pub mod route;
pub mod sequencer;
pub mod transition;

pub use item::{ContentFn, LifecycleFn, PresentationItem};
pub use modal::ModalStackCoordinator;
pub use route::{Route, comparison_key};
pub use sequencer::TransitionSequencer;
pub use transition::{CustomTransition, Detent, TransitionStyle};
