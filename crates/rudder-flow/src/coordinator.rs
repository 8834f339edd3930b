#![forbid(unsafe_code)]

//! The coordinator hierarchy: an arena of flow-controller nodes.
//!
//! Coordinators form a tree. Each node exclusively owns its [`Router`] and
//! an ordered list of child ids; the parent link is a plain id used only
//! for upward traversal, never an owning reference, so no retention cycles
//! can form. Flow behavior lives behind the [`Flow`] trait, held as
//! `Rc<RefCell<dyn Flow>>` so presentation items can capture it weakly: a
//! layer whose flow has been torn down resolves to no content while its
//! teardown animation plays out.
//!
//! # Invariants
//!
//! 1. A coordinator appears in exactly one parent's children list at a
//!    time.
//! 2. Finishing a flow detaches it exactly once; repeated finish requests
//!    are benign no-ops.
//! 3. A finished coordinator leaves the arena and cannot be started or
//!    navigated to again; restarting a flow means constructing a new one.
//! 4. Cross-flow manipulation goes through the tree's public operations;
//!    children never mutate sibling lists directly.
//!
//! # Failure Modes
//!
//! - Lookup/traversal failures ([`HierarchyError`]) surface to the caller.
//! - A cycle while resolving the top coordinator is a programming error
//!   and panics; a well-formed tree cannot contain one.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use rudder_core::{PresentationItem, Route, TransitionStyle};
use tracing::{debug, trace, warn};

use crate::error::HierarchyError;
use crate::router::Router;

/// Identity of a coordinator inside its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinatorId(u64);

impl CoordinatorId {
    /// Raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CoordinatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a coordinator.
///
/// `Created -> Started -> Active -> Finishing -> Finished`, no transitions
/// backwards. `Active` means at least one child has been presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    /// Constructed, not yet started.
    Created,
    /// `start` ran; the flow owns its first screen.
    Started,
    /// At least one child flow has been presented.
    Active,
    /// Teardown in progress.
    Finishing,
    /// Detached; the node is about to leave (or has left) the arena.
    Finished,
}

/// Behavior of one flow: how it starts, and the renderable root it
/// contributes when presented by a parent.
///
/// `root_body` is the same capability a [`Route`] has — one interface, two
/// providers. Concrete flows implement `start` to push or present their
/// initial route; there is no base implementation to misuse.
pub trait Flow<R: Route> {
    /// Called when the coordinator starts. Push or present the initial
    /// route through the scope.
    fn start(&mut self, scope: FlowScope<'_, R>, animated: bool) -> Result<(), HierarchyError>;

    /// The renderable root of this flow, wrapped into a presentation item
    /// when a parent presents it.
    fn root_body(&self) -> R::Body;

    /// Label used to compose the coordinator's identity string.
    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// How a node arranges its children.
///
/// Tab pages live in `children` like any owned child, and additionally in
/// `pages`, which fixes their order and carries the active index. Children
/// outside `pages` are presented overlays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// Push/modal flow (the default).
    Stack,
    /// Parallel tab pages with one active index.
    Tabs {
        active: usize,
        pages: Vec<CoordinatorId>,
    },
}

pub(crate) struct CoordinatorNode<R: Route> {
    pub(crate) uuid: String,
    pub(crate) tag: Option<String>,
    pub(crate) parent: Option<CoordinatorId>,
    pub(crate) children: Vec<CoordinatorId>,
    pub(crate) router: Router<R>,
    pub(crate) flow: Rc<RefCell<dyn Flow<R>>>,
    pub(crate) phase: FlowPhase,
    pub(crate) kind: NodeKind,
}

impl<R: Route> CoordinatorNode<R> {
    /// Remove a child from the owned list and, for tab coordinators, from
    /// the page list, clamping the active index.
    pub(crate) fn detach_child(&mut self, id: CoordinatorId) {
        self.children.retain(|c| *c != id);
        if let NodeKind::Tabs { active, pages } = &mut self.kind {
            pages.retain(|c| *c != id);
            if *active >= pages.len() {
                *active = pages.len().saturating_sub(1);
            }
        }
    }
}

/// Arena of coordinator nodes.
///
/// All hierarchy operations go through the tree; nodes are addressed by
/// [`CoordinatorId`]. The tree may hold several disconnected subtrees
/// (spawned flows not yet attached anywhere).
pub struct CoordinatorTree<R: Route> {
    nodes: AHashMap<u64, CoordinatorNode<R>>,
    next_id: u64,
}

impl<R: Route + 'static> Default for CoordinatorTree<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Route> std::fmt::Debug for CoordinatorTree<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorTree")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl<R: Route + 'static> CoordinatorTree<R> {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: AHashMap::new(),
            next_id: 0,
        }
    }

    // --- Construction ---

    /// Add a flow to the arena, unattached, in the `Created` phase.
    pub fn spawn(&mut self, flow: impl Flow<R> + 'static) -> CoordinatorId {
        self.insert_node(Rc::new(RefCell::new(flow)), NodeKind::Stack)
    }

    /// Add a tab coordinator: its children are parallel pages rather than
    /// a presentation stack, and its router renders tabbed.
    pub fn spawn_tabs(&mut self, flow: impl Flow<R> + 'static) -> CoordinatorId {
        self.insert_node(
            Rc::new(RefCell::new(flow)),
            NodeKind::Tabs {
                active: 0,
                pages: Vec::new(),
            },
        )
    }

    fn insert_node(
        &mut self,
        flow: Rc<RefCell<dyn Flow<R>>>,
        kind: NodeKind,
    ) -> CoordinatorId {
        self.next_id += 1;
        let id = CoordinatorId(self.next_id);
        let uuid = format!("{} - {}", flow.borrow().type_label(), self.next_id);
        let mut router = Router::new();
        router.set_tabbed(matches!(kind, NodeKind::Tabs { .. }));
        debug!(id = %id, uuid = %uuid, "coordinator spawned");
        self.nodes.insert(
            id.0,
            CoordinatorNode {
                uuid,
                tag: None,
                parent: None,
                children: Vec::new(),
                router,
                flow,
                phase: FlowPhase::Created,
                kind,
            },
        );
        id
    }

    /// Assign an application tag for out-of-band lookup.
    pub fn set_tag(
        &mut self,
        id: CoordinatorId,
        tag: impl Into<String>,
    ) -> Result<(), HierarchyError> {
        let node = self.node_mut(id)?;
        node.tag = Some(tag.into());
        Ok(())
    }

    /// Find the coordinator tagged `tag`, anywhere in the arena.
    ///
    /// Deterministic order: roots by spawn order, then depth-first in
    /// child order.
    #[must_use]
    pub fn find_tagged(&self, tag: &str) -> Option<CoordinatorId> {
        let mut roots: Vec<u64> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(raw, _)| *raw)
            .collect();
        roots.sort_unstable();
        roots
            .into_iter()
            .find_map(|raw| self.find_tagged_from(CoordinatorId(raw), tag))
    }

    fn find_tagged_from(&self, id: CoordinatorId, tag: &str) -> Option<CoordinatorId> {
        let node = self.nodes.get(&id.0)?;
        if node.tag.as_deref() == Some(tag) {
            return Some(id);
        }
        node.children
            .iter()
            .find_map(|child| self.find_tagged_from(*child, tag))
    }

    // --- Flow lifecycle ---

    /// Start a coordinator: runs its flow's `start`, which pushes or
    /// presents the initial route.
    pub fn start(&mut self, id: CoordinatorId, animated: bool) -> Result<(), HierarchyError> {
        let node = self.node_mut(id)?;
        if matches!(node.phase, FlowPhase::Finishing | FlowPhase::Finished) {
            return Err(HierarchyError::FlowFinished(id));
        }
        if node.phase == FlowPhase::Created {
            node.phase = FlowPhase::Started;
        }
        let flow = Rc::clone(&node.flow);
        debug!(id = %id, "coordinator start");
        flow.borrow_mut().start(FlowScope { tree: self, id }, animated)
    }

    /// Set the coordinator's first screen.
    ///
    /// The transition style is accepted but not yet differentiated — the
    /// root is always rendered as the flow's base layer (inherited
    /// limitation).
    pub fn start_flow(
        &mut self,
        id: CoordinatorId,
        route: R,
        style: Option<TransitionStyle>,
        animated: bool,
    ) -> Result<(), HierarchyError> {
        let _ = (style, animated);
        let node = self.node_mut(id)?;
        trace!(id = %id, route = %route.id(), "start flow");
        node.router.set_root(Some(route));
        Ok(())
    }

    /// Register `child` under `parent` and present its root.
    ///
    /// Any already-finished children of the presenting coordinator are
    /// swept away first, so the children list only ever holds live flows.
    /// A `Push` style is coerced to `Sheet`: child coordinators are always
    /// presented as modal layers. When `parent` is a tab page, the layer
    /// itself goes to the owning tab coordinator's modal stack (overlays
    /// are never tab-scoped) while ownership stays with `parent`.
    pub fn navigate_to_coordinator(
        &mut self,
        parent: CoordinatorId,
        child: CoordinatorId,
        style: TransitionStyle,
        animated: bool,
    ) -> Result<(), HierarchyError> {
        self.ensure_exists(parent)?;
        let child_node = self.node(child)?;
        if matches!(child_node.phase, FlowPhase::Finishing | FlowPhase::Finished) {
            return Err(HierarchyError::FlowFinished(child));
        }
        if parent == child {
            // A flow cannot host its own presentation.
            return Err(HierarchyError::NoPresentationHost);
        }

        self.sweep_finished_children(parent);

        // Exactly one parent at a time: detach from any previous one.
        let previous = self.node(child)?.parent;
        if let Some(old) = previous
            && let Ok(old_node) = self.node_mut(old)
        {
            old_node.detach_child(child);
        }

        let (child_uuid, child_flow) = {
            let node = self.node_mut(child)?;
            node.parent = Some(parent);
            (node.uuid.clone(), Rc::clone(&node.flow))
        };

        let effective = if style.is_push() {
            TransitionStyle::Sheet
        } else {
            style
        };
        let item_id = PresentationItem::<R::Body>::compose_id(&child_uuid, &effective);
        let weak = Rc::downgrade(&child_flow);
        let item = PresentationItem::new(item_id, effective, move || {
            weak.upgrade().map(|flow| flow.borrow().root_body())
        })
        .animated(animated);

        let parent_node = self.node_mut(parent)?;
        parent_node.children.push(child);
        if parent_node.phase == FlowPhase::Started {
            parent_node.phase = FlowPhase::Active;
        }

        let host = self.modal_host(parent);
        debug!(parent = %parent, host = %host, child = %child, "navigate to coordinator");
        self.node_mut(host)?.router.present_item(item);
        Ok(())
    }

    /// Present a route from within a coordinator's flow, with tab-page
    /// overlays escalated to the owning tab coordinator's modal stack.
    pub fn present(
        &mut self,
        id: CoordinatorId,
        route: R,
        style: Option<TransitionStyle>,
        animated: bool,
    ) -> Result<(), HierarchyError> {
        self.ensure_exists(id)?;
        let host = self.modal_host(id);
        let node = self.node_mut(host)?;
        node.router.present(route, style, animated);
        Ok(())
    }

    /// Finish this coordinator's flow: tear down its subtree, dismiss the
    /// layer that presented it, detach it from its parent, and clear its
    /// router. Equivalent to `finish(id, animated, true)`.
    pub fn finish_flow(
        &mut self,
        id: CoordinatorId,
        animated: bool,
    ) -> Result<(), HierarchyError> {
        self.finish(id, animated, true)
    }

    /// Finish with explicit control over the parent-side dismissal.
    ///
    /// Finishing twice is a benign no-op: the second request finds the
    /// flow already finishing (or gone) and returns without detaching
    /// anything again.
    pub fn finish(
        &mut self,
        id: CoordinatorId,
        animated: bool,
        with_dismiss: bool,
    ) -> Result<(), HierarchyError> {
        let Some(node) = self.nodes.get_mut(&id.0) else {
            return Ok(());
        };
        if matches!(node.phase, FlowPhase::Finishing | FlowPhase::Finished) {
            return Ok(());
        }
        node.phase = FlowPhase::Finishing;
        let parent = node.parent;
        let uuid = node.uuid.clone();
        let children = node.children.clone();

        // Descendants go first so the whole subtree is released.
        for child in children {
            self.teardown_subtree(child);
        }

        if let Some(pid) = parent {
            if with_dismiss {
                // The presenting layer may sit on a tab coordinator's
                // stack when this flow was presented from a tab page.
                let host = self.modal_host(pid);
                if let Some(host_node) = self.nodes.get_mut(&host.0) {
                    let prefix = format!("{uuid} - ");
                    let presented = host_node
                        .router
                        .modal()
                        .presented_items()
                        .map(|item| item.id().to_string())
                        .find(|item_id| item_id.starts_with(&prefix));
                    if let Some(item_id) = presented {
                        host_node
                            .router
                            .modal_mut()
                            .remove_presented(item_id, animated);
                    }
                }
            }
            if let Some(parent_node) = self.nodes.get_mut(&pid.0) {
                parent_node.detach_child(id);
            }
        }

        if let Some(mut node) = self.nodes.remove(&id.0) {
            node.router.clean(animated, false);
        }
        debug!(id = %id, "flow finished");
        Ok(())
    }

    /// Present this coordinator from the top of the visible stack,
    /// regardless of who invoked it.
    ///
    /// Resolves the top-most active coordinator of `from`'s chain (of this
    /// coordinator's own chain when `from` is `None`) and navigates to
    /// `self` from there.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::NoPresentationHost`] when the hierarchy offers no
    /// coordinator other than this one to present from.
    pub fn force_presentation(
        &mut self,
        id: CoordinatorId,
        style: TransitionStyle,
        animated: bool,
        from: Option<CoordinatorId>,
    ) -> Result<(), HierarchyError> {
        self.ensure_exists(id)?;
        let base = from.unwrap_or(id);
        let top = self.top_coordinator(base)?;
        if top == id {
            warn!(id = %id, "force presentation found no host");
            return Err(HierarchyError::NoPresentationHost);
        }
        self.navigate_to_coordinator(top, id, style, animated)
    }

    /// The deepest currently-active coordinator reachable from `from`:
    /// follow the last child (the active page for tab coordinators) until
    /// a leaf.
    ///
    /// # Panics
    ///
    /// Panics if the hierarchy contains a cycle; a well-formed tree cannot,
    /// so this is a programming error rather than a recoverable failure.
    pub fn top_coordinator(
        &self,
        from: CoordinatorId,
    ) -> Result<CoordinatorId, HierarchyError> {
        let mut current = from;
        let mut steps = 0usize;
        loop {
            let node = self.node(current)?;
            let next = match &node.kind {
                NodeKind::Tabs { active, pages } => match node.children.last() {
                    // A presented overlay sits above the pages.
                    Some(last) if !pages.contains(last) => Some(*last),
                    _ => pages.get(*active).copied(),
                },
                NodeKind::Stack => node.children.last().copied(),
            };
            let Some(next) = next else {
                return Ok(current);
            };
            steps += 1;
            assert!(
                steps <= self.nodes.len(),
                "coordinator hierarchy contains a cycle"
            );
            current = next;
        }
    }

    /// Restart the coordinator's flow (its router's restart).
    pub fn restart(&mut self, id: CoordinatorId, animated: bool) -> Result<(), HierarchyError> {
        let node = self.node_mut(id)?;
        node.router.restart(animated);
        Ok(())
    }

    // --- Render-surface feedback ---

    /// Renderer confirmation that the modal layer at `index` of this
    /// coordinator's router tore down.
    ///
    /// When the layer presented a child coordinator, the child's flow has
    /// ended without `finish_flow` being called (a user gesture); it is
    /// marked `Finished` and evicted by the next presentation's sweep.
    pub fn confirm_dismissed(
        &mut self,
        id: CoordinatorId,
        index: usize,
    ) -> Result<(), HierarchyError> {
        let node = self.node_mut(id)?;
        let dismissed = node.router.modal().slot_id(index).map(str::to_string);
        node.router.confirm_dismissed(index);
        if let Some(item_id) = dismissed {
            // Identity strings are arena-unique, so the layer's owner — if
            // it was a coordinator rather than a plain route — is the one
            // node whose identity prefixes the item id.
            let owner = self
                .nodes
                .values_mut()
                .find(|node| item_id.starts_with(&format!("{} - ", node.uuid)));
            if let Some(owner) = owner
                && !matches!(owner.phase, FlowPhase::Finishing | FlowPhase::Finished)
            {
                debug!(uuid = %owner.uuid, "presented child swept away by renderer");
                owner.phase = FlowPhase::Finished;
            }
        }
        Ok(())
    }

    /// Renderer confirmation that the modal layer at `index` appeared.
    pub fn confirm_loaded(
        &mut self,
        id: CoordinatorId,
        index: usize,
    ) -> Result<(), HierarchyError> {
        let node = self.node_mut(id)?;
        node.router.confirm_loaded(index);
        Ok(())
    }

    // --- Queries ---

    /// Whether the id is currently in the arena.
    #[must_use]
    pub fn contains(&self, id: CoordinatorId) -> bool {
        self.nodes.contains_key(&id.0)
    }

    /// Number of live coordinators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// No live coordinators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The coordinator's router.
    #[must_use]
    pub fn router(&self, id: CoordinatorId) -> Option<&Router<R>> {
        self.nodes.get(&id.0).map(|node| &node.router)
    }

    /// Mutable access to the coordinator's router.
    pub fn router_mut(&mut self, id: CoordinatorId) -> Option<&mut Router<R>> {
        self.nodes.get_mut(&id.0).map(|node| &mut node.router)
    }

    /// The coordinator's lifecycle phase.
    #[must_use]
    pub fn phase(&self, id: CoordinatorId) -> Option<FlowPhase> {
        self.nodes.get(&id.0).map(|node| node.phase)
    }

    /// The coordinator's parent, if attached.
    #[must_use]
    pub fn parent(&self, id: CoordinatorId) -> Option<CoordinatorId> {
        self.nodes.get(&id.0).and_then(|node| node.parent)
    }

    /// The coordinator's children, in registration order.
    #[must_use]
    pub fn children(&self, id: CoordinatorId) -> &[CoordinatorId] {
        self.nodes
            .get(&id.0)
            .map_or(&[], |node| node.children.as_slice())
    }

    /// The coordinator's identity string (label + serial).
    #[must_use]
    pub fn identity(&self, id: CoordinatorId) -> Option<&str> {
        self.nodes.get(&id.0).map(|node| node.uuid.as_str())
    }

    /// The coordinator's application tag.
    #[must_use]
    pub fn tag(&self, id: CoordinatorId) -> Option<&str> {
        self.nodes.get(&id.0).and_then(|node| node.tag.as_deref())
    }

    // --- Internals ---

    pub(crate) fn node(
        &self,
        id: CoordinatorId,
    ) -> Result<&CoordinatorNode<R>, HierarchyError> {
        self.nodes
            .get(&id.0)
            .ok_or(HierarchyError::UnknownCoordinator(id))
    }

    pub(crate) fn node_mut(
        &mut self,
        id: CoordinatorId,
    ) -> Result<&mut CoordinatorNode<R>, HierarchyError> {
        self.nodes
            .get_mut(&id.0)
            .ok_or(HierarchyError::UnknownCoordinator(id))
    }

    fn ensure_exists(&self, id: CoordinatorId) -> Result<(), HierarchyError> {
        self.node(id).map(|_| ())
    }

    /// Overlays requested from a tab page belong to the owning tab
    /// coordinator's modal stack, never a per-tab one.
    pub(crate) fn modal_host(&self, id: CoordinatorId) -> CoordinatorId {
        if let Some(node) = self.nodes.get(&id.0)
            && let Some(pid) = node.parent
            && let Some(parent) = self.nodes.get(&pid.0)
            && let NodeKind::Tabs { pages, .. } = &parent.kind
            && pages.contains(&id)
        {
            pid
        } else {
            id
        }
    }

    /// Evict children whose flows already ended (renderer-dismissed or
    /// otherwise finished without detaching).
    fn sweep_finished_children(&mut self, parent: CoordinatorId) {
        let Some(node) = self.nodes.get(&parent.0) else {
            return;
        };
        let finished: Vec<CoordinatorId> = node
            .children
            .iter()
            .copied()
            .filter(|child| match self.nodes.get(&child.0) {
                None => true,
                Some(child_node) => child_node.phase == FlowPhase::Finished,
            })
            .collect();
        for child in finished {
            trace!(parent = %parent, child = %child, "sweeping finished child");
            self.teardown_subtree(child);
            if let Some(parent_node) = self.nodes.get_mut(&parent.0) {
                parent_node.detach_child(child);
            }
        }
    }

    /// Remove a subtree from the arena, cleaning each router bottom-up.
    fn teardown_subtree(&mut self, id: CoordinatorId) {
        let children = self
            .nodes
            .get(&id.0)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in children {
            self.teardown_subtree(child);
        }
        if let Some(mut node) = self.nodes.remove(&id.0) {
            node.router.clean(false, false);
            trace!(id = %id, "subtree node released");
        }
    }
}

/// Mutable view a flow receives while it starts: its own id plus the tree
/// operations it may drive.
pub struct FlowScope<'a, R: Route> {
    tree: &'a mut CoordinatorTree<R>,
    id: CoordinatorId,
}

impl<'a, R: Route + 'static> FlowScope<'a, R> {
    /// The starting coordinator's id.
    #[must_use]
    pub fn id(&self) -> CoordinatorId {
        self.id
    }

    /// Set the flow's first screen.
    pub fn start_flow(
        &mut self,
        route: R,
        style: Option<TransitionStyle>,
        animated: bool,
    ) -> Result<(), HierarchyError> {
        self.tree.start_flow(self.id, route, style, animated)
    }

    /// Present a route from this flow (tab-page overlays escalate).
    pub fn present(
        &mut self,
        route: R,
        style: Option<TransitionStyle>,
        animated: bool,
    ) -> Result<(), HierarchyError> {
        self.tree.present(self.id, route, style, animated)
    }

    /// Register and present a child coordinator from this flow.
    pub fn navigate_to_coordinator(
        &mut self,
        child: CoordinatorId,
        style: TransitionStyle,
        animated: bool,
    ) -> Result<(), HierarchyError> {
        self.tree.navigate_to_coordinator(self.id, child, style, animated)
    }

    /// This coordinator's router.
    pub fn router(&mut self) -> &mut Router<R> {
        self.tree
            .router_mut(self.id)
            .expect("a starting flow's coordinator is live")
    }

    /// The whole tree, for flows that need broader orchestration.
    pub fn tree(&mut self) -> &mut CoordinatorTree<R> {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum TestRoute {
        Home,
        Step(u32),
    }

    impl Route for TestRoute {
        type Body = String;

        fn id(&self) -> String {
            match self {
                Self::Home => "home".into(),
                Self::Step(n) => format!("step-{n}"),
            }
        }

        fn style(&self) -> TransitionStyle {
            TransitionStyle::Push
        }

        fn body(&self) -> String {
            format!("{self:?}")
        }

        fn content_description(&self) -> String {
            format!("{self:?}View")
        }
    }

    struct StubFlow {
        label: &'static str,
    }

    impl StubFlow {
        fn new(label: &'static str) -> Self {
            Self { label }
        }
    }

    impl Flow<TestRoute> for StubFlow {
        fn start(
            &mut self,
            mut scope: FlowScope<'_, TestRoute>,
            animated: bool,
        ) -> Result<(), HierarchyError> {
            scope.start_flow(TestRoute::Home, None, animated)
        }

        fn root_body(&self) -> String {
            self.label.to_string()
        }

        fn type_label(&self) -> &'static str {
            self.label
        }
    }

    fn tree() -> CoordinatorTree<TestRoute> {
        CoordinatorTree::new()
    }

    #[test]
    fn spawn_then_start_sets_phase_and_root() {
        let mut tree = tree();
        let id = tree.spawn(StubFlow::new("Home"));
        assert_eq!(tree.phase(id), Some(FlowPhase::Created));

        tree.start(id, false).unwrap();
        assert_eq!(tree.phase(id), Some(FlowPhase::Started));
        assert_eq!(tree.router(id).unwrap().root(), Some(&TestRoute::Home));
    }

    #[test]
    fn identity_composes_label_and_serial() {
        let mut tree = tree();
        let a = tree.spawn(StubFlow::new("Home"));
        let b = tree.spawn(StubFlow::new("Home"));
        assert_eq!(tree.identity(a), Some("Home - 1"));
        assert_eq!(tree.identity(b), Some("Home - 2"));
    }

    #[test]
    fn navigate_registers_child_and_presents_root() {
        let mut tree = tree();
        let x = tree.spawn(StubFlow::new("X"));
        let y = tree.spawn(StubFlow::new("Y"));
        tree.start(x, false).unwrap();

        tree.navigate_to_coordinator(x, y, TransitionStyle::FullScreenCover, false)
            .unwrap();
        assert_eq!(tree.children(x), &[y]);
        assert_eq!(tree.parent(y), Some(x));
        assert_eq!(tree.phase(x), Some(FlowPhase::Active));

        let router = tree.router(x).unwrap();
        let item = router.modal().last_presented().unwrap();
        assert_eq!(item.id(), "Y - 2 - fullScreenCover");
        assert_eq!(item.resolve_content().as_deref(), Some("Y"));
    }

    #[test]
    fn push_style_child_presentation_is_coerced_to_sheet() {
        let mut tree = tree();
        let x = tree.spawn(StubFlow::new("X"));
        let y = tree.spawn(StubFlow::new("Y"));

        tree.navigate_to_coordinator(x, y, TransitionStyle::Push, false)
            .unwrap();
        let router = tree.router(x).unwrap();
        assert_eq!(
            router.modal().last_presented().unwrap().id(),
            "Y - 2 - sheet"
        );
    }

    #[test]
    fn finish_flow_detaches_exactly_once() {
        let mut tree = tree();
        let x = tree.spawn(StubFlow::new("X"));
        let y = tree.spawn(StubFlow::new("Y"));
        tree.navigate_to_coordinator(x, y, TransitionStyle::FullScreenCover, false)
            .unwrap();

        tree.finish_flow(y, false).unwrap();
        assert!(tree.children(x).is_empty());
        assert!(!tree.contains(y));
        assert!(tree.router(x).unwrap().modal().is_empty());

        // Second finish: benign no-op, no duplicate removal, no error.
        tree.finish_flow(y, false).unwrap();
        assert!(tree.children(x).is_empty());
    }

    #[test]
    fn finish_releases_the_whole_subtree() {
        let mut tree = tree();
        let x = tree.spawn(StubFlow::new("X"));
        let y = tree.spawn(StubFlow::new("Y"));
        let z = tree.spawn(StubFlow::new("Z"));
        tree.navigate_to_coordinator(x, y, TransitionStyle::Sheet, false)
            .unwrap();
        tree.navigate_to_coordinator(y, z, TransitionStyle::Sheet, false)
            .unwrap();

        tree.finish_flow(y, false).unwrap();
        assert!(!tree.contains(y));
        assert!(!tree.contains(z));
        assert!(tree.children(x).is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn finished_flows_layer_resolves_to_no_content_while_tearing_down() {
        let mut tree = tree();
        let x = tree.spawn(StubFlow::new("X"));
        let y = tree.spawn(StubFlow::new("Y"));
        tree.navigate_to_coordinator(x, y, TransitionStyle::Sheet, false)
            .unwrap();

        // Animated finish: the layer stays in its slot until the renderer
        // confirms teardown, but its flow is already gone.
        tree.finish_flow(y, true).unwrap();
        let router = tree.router(x).unwrap();
        let item = router.modal().last_presented().unwrap();
        assert!(item.resolve_content().is_none());

        tree.router_mut(x).unwrap().modal_mut().settle_transition();
        assert!(tree.router(x).unwrap().modal().is_empty());
    }

    #[test]
    fn navigating_to_a_finished_coordinator_fails() {
        let mut tree = tree();
        let x = tree.spawn(StubFlow::new("X"));
        let y = tree.spawn(StubFlow::new("Y"));
        tree.navigate_to_coordinator(x, y, TransitionStyle::Sheet, false)
            .unwrap();
        tree.finish_flow(y, false).unwrap();

        let err = tree
            .navigate_to_coordinator(x, y, TransitionStyle::Sheet, false)
            .unwrap_err();
        assert_eq!(err, HierarchyError::UnknownCoordinator(y));
        let err = tree.start(y, false).unwrap_err();
        assert_eq!(err, HierarchyError::UnknownCoordinator(y));
    }

    #[test]
    fn top_coordinator_follows_last_children() {
        let mut tree = tree();
        let root = tree.spawn(StubFlow::new("Root"));
        let a = tree.spawn(StubFlow::new("A"));
        let b = tree.spawn(StubFlow::new("B"));
        let leaf = tree.spawn(StubFlow::new("Leaf"));
        tree.navigate_to_coordinator(root, a, TransitionStyle::Sheet, false)
            .unwrap();
        tree.navigate_to_coordinator(root, b, TransitionStyle::Sheet, false)
            .unwrap();
        tree.navigate_to_coordinator(b, leaf, TransitionStyle::Sheet, false)
            .unwrap();

        assert_eq!(tree.top_coordinator(root).unwrap(), leaf);
        assert_eq!(tree.top_coordinator(leaf).unwrap(), leaf);
    }

    #[test]
    fn top_coordinator_of_unknown_id_fails() {
        let mut tree = tree();
        let only = tree.spawn(StubFlow::new("Only"));
        tree.finish_flow(only, false).unwrap();
        assert_eq!(
            tree.top_coordinator(only).unwrap_err(),
            HierarchyError::UnknownCoordinator(only)
        );
    }

    #[test]
    fn force_presentation_lands_on_the_visible_leaf() {
        let mut tree = tree();
        let root = tree.spawn(StubFlow::new("Root"));
        let mid = tree.spawn(StubFlow::new("Mid"));
        tree.navigate_to_coordinator(root, mid, TransitionStyle::Sheet, false)
            .unwrap();

        let promo = tree.spawn(StubFlow::new("Promo"));
        tree.force_presentation(promo, TransitionStyle::FullScreenCover, false, Some(root))
            .unwrap();

        assert_eq!(tree.parent(promo), Some(mid));
        assert_eq!(tree.children(mid), &[promo]);
        let item_id = tree
            .router(mid)
            .unwrap()
            .modal()
            .last_presented()
            .unwrap()
            .id()
            .to_string();
        assert!(item_id.ends_with("- fullScreenCover"));
    }

    #[test]
    fn force_presentation_without_host_reports_failure() {
        let mut tree = tree();
        let lone = tree.spawn(StubFlow::new("Lone"));
        let err = tree
            .force_presentation(lone, TransitionStyle::Sheet, false, None)
            .unwrap_err();
        assert_eq!(err, HierarchyError::NoPresentationHost);
    }

    #[test]
    fn find_tagged_searches_the_whole_arena() {
        let mut tree = tree();
        let root = tree.spawn(StubFlow::new("Root"));
        let child = tree.spawn(StubFlow::new("Child"));
        tree.navigate_to_coordinator(root, child, TransitionStyle::Sheet, false)
            .unwrap();
        tree.set_tag(child, "payments").unwrap();

        assert_eq!(tree.find_tagged("payments"), Some(child));
        assert_eq!(tree.find_tagged("missing"), None);
        assert_eq!(tree.tag(child), Some("payments"));
    }

    #[test]
    fn renderer_dismissed_child_is_swept_on_next_presentation() {
        let mut tree = tree();
        let x = tree.spawn(StubFlow::new("X"));
        let y = tree.spawn(StubFlow::new("Y"));
        tree.navigate_to_coordinator(x, y, TransitionStyle::Sheet, false)
            .unwrap();

        // The user swiped Y's sheet away; only the renderer knows.
        tree.confirm_dismissed(x, 0).unwrap();
        assert_eq!(tree.phase(y), Some(FlowPhase::Finished));
        assert_eq!(tree.children(x), &[y]);

        let z = tree.spawn(StubFlow::new("Z"));
        tree.navigate_to_coordinator(x, z, TransitionStyle::Sheet, false)
            .unwrap();
        assert_eq!(tree.children(x), &[z]);
        assert!(!tree.contains(y));
    }

    #[test]
    fn restart_reaches_the_router() {
        let mut tree = tree();
        let id = tree.spawn(StubFlow::new("Home"));
        tree.start(id, false).unwrap();
        let router = tree.router_mut(id).unwrap();
        router.navigate(TestRoute::Step(1), None, false);
        router.navigate(TestRoute::Step(2), None, false);

        tree.restart(id, false).unwrap();
        assert!(tree.router(id).unwrap().stack().is_empty());
        assert_eq!(tree.router(id).unwrap().root(), Some(&TestRoute::Home));
    }

    #[test]
    fn reattaching_a_child_moves_it() {
        let mut tree = tree();
        let a = tree.spawn(StubFlow::new("A"));
        let b = tree.spawn(StubFlow::new("B"));
        let c = tree.spawn(StubFlow::new("C"));
        tree.navigate_to_coordinator(a, c, TransitionStyle::Sheet, false)
            .unwrap();
        tree.navigate_to_coordinator(b, c, TransitionStyle::Sheet, false)
            .unwrap();

        // Exactly one parent at a time.
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[c]);
        assert_eq!(tree.parent(c), Some(b));
    }
}
