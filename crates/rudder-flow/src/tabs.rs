#![forbid(unsafe_code)]

//! Tab-coordinator operations.
//!
//! A tab coordinator (spawned with
//! [`CoordinatorTree::spawn_tabs`](crate::CoordinatorTree::spawn_tabs))
//! arranges coordinators as parallel pages instead of a presentation
//! stack: all pages stay alive concurrently, one is active, and switching
//! never finishes or detaches the others. Its router carries the tabbed
//! flag so the render surface draws pages instead of a push container.
//!
//! Overlay scoping is handled in the tree's presentation paths: modal
//! layers requested from within a tab page resolve to the tab
//! coordinator's own modal stack, never a per-tab one.

use rudder_core::Route;
use tracing::debug;

use crate::coordinator::{CoordinatorId, CoordinatorTree, FlowPhase, NodeKind};
use crate::error::HierarchyError;

impl<R: Route + 'static> CoordinatorTree<R> {
    /// Attach `page` as the next tab of `tabs`.
    ///
    /// Pages are registered, not presented: they render side by side under
    /// the tab coordinator rather than layering above it.
    pub fn add_tab(
        &mut self,
        tabs: CoordinatorId,
        page: CoordinatorId,
    ) -> Result<(), HierarchyError> {
        self.ensure_tabs(tabs)?;
        let page_node = self.node(page)?;
        if matches!(page_node.phase, FlowPhase::Finishing | FlowPhase::Finished) {
            return Err(HierarchyError::FlowFinished(page));
        }
        if let Some(old) = page_node.parent {
            let old_node = self.node_mut(old)?;
            old_node.detach_child(page);
        }
        self.node_mut(page)?.parent = Some(tabs);
        let tabs_node = self.node_mut(tabs)?;
        tabs_node.children.push(page);
        if let NodeKind::Tabs { pages, .. } = &mut tabs_node.kind {
            pages.push(page);
        }
        if tabs_node.phase == FlowPhase::Started {
            tabs_node.phase = FlowPhase::Active;
        }
        debug!(tabs = %tabs, page = %page, "tab page added");
        Ok(())
    }

    /// Switch the active tab. The previously active page stays alive and
    /// attached; nothing is finished.
    pub fn select_tab(
        &mut self,
        tabs: CoordinatorId,
        index: usize,
    ) -> Result<(), HierarchyError> {
        let count = self.ensure_tabs(tabs)?;
        if index >= count {
            return Err(HierarchyError::TabIndexOutOfBounds { index, count });
        }
        let node = self.node_mut(tabs)?;
        if let NodeKind::Tabs { active, .. } = &mut node.kind {
            *active = index;
        }
        debug!(tabs = %tabs, index, "tab selected");
        Ok(())
    }

    /// Index of the active tab.
    pub fn active_tab(&self, tabs: CoordinatorId) -> Result<usize, HierarchyError> {
        match &self.node(tabs)?.kind {
            NodeKind::Tabs { active, .. } => Ok(*active),
            NodeKind::Stack => Err(HierarchyError::NotATabCoordinator(tabs)),
        }
    }

    /// Coordinator of the active tab page, if any pages exist.
    pub fn active_tab_coordinator(
        &self,
        tabs: CoordinatorId,
    ) -> Result<Option<CoordinatorId>, HierarchyError> {
        match &self.node(tabs)?.kind {
            NodeKind::Tabs { active, pages } => Ok(pages.get(*active).copied()),
            NodeKind::Stack => Err(HierarchyError::NotATabCoordinator(tabs)),
        }
    }

    /// The tab pages in order.
    pub fn tab_pages(&self, tabs: CoordinatorId) -> Result<Vec<CoordinatorId>, HierarchyError> {
        match &self.node(tabs)?.kind {
            NodeKind::Tabs { pages, .. } => Ok(pages.clone()),
            NodeKind::Stack => Err(HierarchyError::NotATabCoordinator(tabs)),
        }
    }

    /// Number of tab pages.
    pub fn tab_count(&self, tabs: CoordinatorId) -> Result<usize, HierarchyError> {
        self.ensure_tabs(tabs)
    }

    /// Validate the id names a tab coordinator; returns its page count.
    fn ensure_tabs(&self, tabs: CoordinatorId) -> Result<usize, HierarchyError> {
        match &self.node(tabs)?.kind {
            NodeKind::Tabs { pages, .. } => Ok(pages.len()),
            NodeKind::Stack => Err(HierarchyError::NotATabCoordinator(tabs)),
        }
    }
}
