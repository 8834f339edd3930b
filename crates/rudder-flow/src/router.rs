#![forbid(unsafe_code)]

//! Per-coordinator router: one push stack, one modal stack.
//!
//! A `Router` owns a coordinator's root route, its push-navigation stack,
//! and its [`ModalStackCoordinator`]. Every operation that changes visible
//! order runs through one of two serialized paths: push-stack mutations go
//! through the router's own transition sequencer, modal mutations through
//! the modal stack coordinator's. Within each path, submission order is
//! completion order; nothing is dropped or superseded.
//!
//! # Invariants
//!
//! 1. `stack` insertion order is presentation order: push appends, pop
//!    removes from the end, pop-to-root empties, pop-to-route removes the
//!    suffix after the matched entry.
//! 2. A route whose effective style is `Push` reaches the push stack no
//!    matter whether it entered through `navigate` or `present`, and a
//!    modal style reaches the modal stack either way (the equivalence
//!    rule, not a special case).
//! 3. The push stack and modal stack are exclusively owned; no other
//!    component mutates them directly.
//!
//! # Failure Modes
//!
//! - `pop` on an empty stack, `dismiss` with nothing presented, and
//!   `pop_to_route` without a match (returns `false`) are benign no-ops.

use rudder_core::{
    ModalStackCoordinator, PresentationItem, Route, TransitionSequencer, TransitionStyle,
    comparison_key,
};
use tracing::{debug, trace};

/// Queued push-stack mutation; the sequencer carries it alongside the
/// animated flag snapshotted at submit time.
enum StackOp<R> {
    Push(R),
    Pop,
    Clear,
    TruncateTo(usize),
}

/// Push-stack and modal-stack owner for a single coordinator.
pub struct Router<R: Route> {
    root: Option<R>,
    stack: Vec<R>,
    modal: ModalStackCoordinator<R::Body>,
    sequencer: TransitionSequencer<(StackOp<R>, bool)>,
    tabbed: bool,
}

impl<R: Route + 'static> Default for Router<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Route> std::fmt::Debug for Router<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("root", &self.root.is_some())
            .field("stack_len", &self.stack.len())
            .field("modal", &self.modal)
            .field("tabbed", &self.tabbed)
            .finish()
    }
}

impl<R: Route + 'static> Router<R> {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: None,
            stack: Vec::new(),
            modal: ModalStackCoordinator::new(),
            sequencer: TransitionSequencer::new(),
            tabbed: false,
        }
    }

    // --- Navigation ---

    /// Navigate to a route. The effective style is the explicit override
    /// when given, else the route's declared default; `Push` appends to
    /// the push stack, anything else delegates to [`present`](Self::present).
    pub fn navigate(&mut self, route: R, style: Option<TransitionStyle>, animated: bool) {
        let effective = style.unwrap_or_else(|| route.style());
        if effective.is_push() {
            debug!(id = %route.id(), animated, "push navigation");
            self.run_transition(animated, StackOp::Push(route));
        } else {
            self.present(route, Some(effective), animated);
        }
    }

    /// Present a route modally. A route whose effective style resolves to
    /// `Push` is redirected to [`navigate`](Self::navigate) — the
    /// equivalence rule.
    pub fn present(&mut self, route: R, style: Option<TransitionStyle>, animated: bool) {
        let effective = style.unwrap_or_else(|| route.style());
        if effective.is_push() {
            self.navigate(route, Some(effective), animated);
            return;
        }
        let id = PresentationItem::<R::Body>::compose_id(&route.id(), &effective);
        let content_route = route.clone();
        let item = PresentationItem::new(id, effective, move || Some(content_route.body()))
            .animated(animated);
        self.modal.present(item);
    }

    /// Present a prebuilt item (a child coordinator's root, typically).
    pub fn present_item(&mut self, item: PresentationItem<R::Body>) {
        self.modal.present(item);
    }

    /// Remove the last pushed route. No-op on an empty stack.
    pub fn pop(&mut self, animated: bool) {
        self.run_transition(animated, StackOp::Pop);
    }

    /// Empty the push stack.
    pub fn pop_to_root(&mut self, animated: bool) {
        self.run_transition(animated, StackOp::Clear);
    }

    /// Pop to the first stack entry whose content matches `target`, and
    /// remove every entry strictly after it. Returns whether a match was
    /// found; a missing match leaves the stack unchanged.
    ///
    /// Matching is structural and string-based: each entry's
    /// [`content_description`](Route::content_description) is reduced by
    /// [`comparison_key`] (quoted `id: "…"` token if present, else
    /// parenthesized groups stripped) and compared, case-sensitively, to
    /// `target` verbatim. Deliberately behavior-compatible and fragile;
    /// see the repository design notes.
    pub fn pop_to_route(&mut self, target: &str, animated: bool) -> bool {
        let matched = self
            .stack
            .iter()
            .position(|route| comparison_key(&route.content_description()) == target);
        let Some(index) = matched else {
            trace!(target, "pop-to-route: no match");
            return false;
        };
        let keep = index + 1;
        if keep >= self.stack.len() {
            // Already the deepest entry: idempotent success.
            return true;
        }
        debug!(target, keep, "pop-to-route");
        self.run_transition(animated, StackOp::TruncateTo(keep));
        true
    }

    /// Dismiss the visible modal layer.
    pub fn dismiss(&mut self, animated: bool) {
        self.modal.remove_last_presented(animated);
    }

    /// Close the nearest closeable thing: dismiss when a modal layer is
    /// presented, else pop when the push stack is non-empty, else no-op.
    ///
    /// `finish_flow` is carried for coordinator-level close handling; the
    /// router itself does not consume it.
    pub fn close(&mut self, animated: bool, finish_flow: bool) {
        let _ = finish_flow;
        if !self.modal.is_empty() {
            self.dismiss(animated);
        } else if !self.stack.is_empty() {
            self.pop(animated);
        }
    }

    /// Tear down this router: empty the push stack, run the modal stack's
    /// top-down clean to completion (each layer's dismiss callback fires
    /// in order), and replace the modal coordinator with a fresh instance.
    /// Unless `keep_root`, the root route is cleared too.
    ///
    /// Total from any depth, including zero. Pending and in-flight
    /// transitions are discarded — this is the one recovery path for a
    /// queue blocked by a confirmation that never arrived.
    pub fn clean(&mut self, animated: bool, keep_root: bool) {
        // The push side never animates during teardown, as with restart's
        // unanimated pop; the parameter is accepted for call-site symmetry.
        let _ = animated;
        debug!(keep_root, "router clean");
        self.sequencer.reset();
        self.stack.clear();
        self.modal.clean();
        while self.modal.is_transition_in_flight() {
            self.modal.settle_transition();
        }
        self.modal = ModalStackCoordinator::new();
        if !keep_root {
            self.root = None;
        }
    }

    /// Restart the flow: with modal layers presented, pop the push stack
    /// (unanimated) and clean the modal stack; otherwise pop to root.
    pub fn restart(&mut self, animated: bool) {
        if !self.modal.is_empty() {
            debug!("router restart: clearing modal layers");
            self.pop(false);
            self.modal.clean();
        } else {
            debug!("router restart: pop to root");
            self.pop_to_root(animated);
        }
    }

    // --- Render-surface feedback ---

    /// The renderer popped `count` entries itself (back gestures); bring
    /// the push stack back in line.
    pub fn confirm_popped(&mut self, count: usize) {
        let len = self.stack.len().saturating_sub(count);
        self.stack.truncate(len);
    }

    /// Renderer confirmation that the modal layer at `index` tore down.
    pub fn confirm_dismissed(&mut self, index: usize) {
        self.modal.confirm_dismissed(index);
    }

    /// Renderer confirmation that the modal layer at `index` appeared.
    pub fn confirm_loaded(&mut self, index: usize) {
        self.modal.confirm_loaded(index);
    }

    /// The render surface confirmed the in-flight push-stack transition
    /// finished. Returns whether anything was in flight.
    pub fn settle_transition(&mut self) -> bool {
        if !self.sequencer.settle() {
            return false;
        }
        self.pump();
        true
    }

    // --- State ---

    /// The flow's first screen.
    #[must_use]
    pub fn root(&self) -> Option<&R> {
        self.root.as_ref()
    }

    /// Assign or clear the flow's first screen.
    pub fn set_root(&mut self, root: Option<R>) {
        self.root = root;
    }

    /// The push stack, in presentation order.
    #[must_use]
    pub fn stack(&self) -> &[R] {
        &self.stack
    }

    /// The modal stack coordinator.
    #[must_use]
    pub fn modal(&self) -> &ModalStackCoordinator<R::Body> {
        &self.modal
    }

    /// Mutable access to the modal stack coordinator.
    pub fn modal_mut(&mut self) -> &mut ModalStackCoordinator<R::Body> {
        &mut self.modal
    }

    /// Whether the owning coordinator renders parallel tabs instead of a
    /// push container.
    #[must_use]
    pub fn is_tabbed(&self) -> bool {
        self.tabbed
    }

    /// Mark this router as tab-rendered.
    pub fn set_tabbed(&mut self, tabbed: bool) {
        self.tabbed = tabbed;
    }

    /// Whether an animated push-stack mutation has applied but not yet
    /// settled.
    #[must_use]
    pub fn is_transition_in_flight(&self) -> bool {
        self.sequencer.is_in_flight()
    }

    /// Push-stack mutations still queued behind the in-flight one.
    #[must_use]
    pub fn pending_transitions(&self) -> usize {
        self.sequencer.pending_len()
    }

    // --- Internals ---

    /// The single animation-gating helper: snapshot the animated flag,
    /// queue the mutation, drain what is ready.
    fn run_transition(&mut self, animated: bool, op: StackOp<R>) {
        self.sequencer.submit((op, animated));
        self.pump();
    }

    fn pump(&mut self) {
        while let Some((op, animated)) = self.sequencer.take_ready() {
            self.apply(op);
            if animated {
                self.sequencer.hold();
                break;
            }
        }
    }

    fn apply(&mut self, op: StackOp<R>) {
        match op {
            StackOp::Push(route) => self.stack.push(route),
            StackOp::Pop => {
                let _ = self.stack.pop();
            }
            StackOp::Clear => self.stack.clear(),
            StackOp::TruncateTo(len) => {
                if len <= self.stack.len() {
                    self.stack.truncate(len);
                }
            }
        }
    }
}
