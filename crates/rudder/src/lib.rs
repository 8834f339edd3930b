#![forbid(unsafe_code)]

//! rudder: coordinator-pattern navigation for declarative UI frameworks.
//!
//! rudder tracks *what should be visible, in what order, and how
//! transitions between states are sequenced* — flows (coordinators) built
//! from push navigation and modal presentation — while the rendering of
//! every screen stays with the host UI framework. The host consumes the
//! router and modal-stack state, draws it, and confirms transitions back
//! through the feedback hooks.
//!
//! # Quick tour
//!
//! ```ignore
//! use rudder::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! enum AppRoute {
//!     Home,
//!     Detail { id: u32 },
//! }
//!
//! impl Route for AppRoute {
//!     type Body = AppView;
//!     // id / style / body / content_description elided
//! }
//!
//! struct HomeFlow;
//!
//! impl Flow<AppRoute> for HomeFlow {
//!     fn start(&mut self, mut scope: FlowScope<'_, AppRoute>, animated: bool)
//!         -> Result<(), HierarchyError>
//!     {
//!         scope.start_flow(AppRoute::Home, None, animated)
//!     }
//!
//!     fn root_body(&self) -> AppView {
//!         AppView::home()
//!     }
//! }
//!
//! let mut tree = CoordinatorTree::new();
//! let home = tree.spawn(HomeFlow);
//! tree.start(home, true)?;
//! tree.router_mut(home).unwrap().navigate(AppRoute::Detail { id: 7 }, None, true);
//! ```

pub use rudder_core::{
    ContentFn, CustomTransition, Detent, LifecycleFn, ModalStackCoordinator, PresentationItem,
    Route, TransitionSequencer, TransitionStyle, comparison_key,
};
pub use rudder_flow::{
    CoordinatorId, CoordinatorTree, Flow, FlowPhase, FlowScope, HierarchyError, Router,
};

/// Commonly used items, glob-importable.
pub mod prelude {
    pub use rudder_core::{
        CustomTransition, Detent, ModalStackCoordinator, PresentationItem, Route, TransitionStyle,
    };
    pub use rudder_flow::{
        CoordinatorId, CoordinatorTree, Flow, FlowPhase, FlowScope, HierarchyError, Router,
    };
}
