#![forbid(unsafe_code)]

//! Modal stack coordinator: ordered overlay layers with serialized,
//! animation-gated mutations.
//!
//! The stack is a sequence of *nullable* slots. A `Some` slot at position
//! `i` is a currently-or-formerly-presented layer; `None` slots exist
//! transiently between "dismissed" and "garbage-collected" and must never
//! be read as "nothing presented here" — all queries filter them. The last
//! `Some` slot is the visible layer; earlier slots are occluded but
//! retained so dismiss-to-index and ordered re-presentation stay correct.
//!
//! # Invariants
//!
//! 1. At most one structural mutation (`present`, `remove_last_presented`,
//!    `remove_presented`, one `clean` step) is in flight per coordinator;
//!    concurrent callers queue behind it rather than interleave.
//! 2. Mutations apply strictly in submission order.
//! 3. A dismissed slot is nulled, not removed: indices held by in-flight
//!    renderer callbacks stay valid until compaction.
//! 4. Compaction (`remove_item`, `remove_nil_items`) preserves the
//!    relative order of surviving layers.
//!
//! # Failure Modes
//!
//! - Removing from an empty stack is a no-op (benign double-dismiss).
//! - A teardown the renderer never confirms leaves a tombstoned `None`
//!   slot and a blocked queue; only `clean`/owner teardown recovers
//!   (known leak, inherited behavior).

use tracing::{debug, trace};

use crate::item::PresentationItem;
use crate::sequencer::TransitionSequencer;

/// Queued structural mutation.
enum ModalOp<V> {
    Present(PresentationItem<V>),
    RemoveLast { animated: bool },
    Remove { id: String, animated: bool },
    CleanStep,
}

/// Work deferred to the settle point of an animated mutation.
///
/// Slots are addressed by item id, not index: compaction may shift indices
/// while a removal animation is still playing out.
enum SettleAction {
    ClearSlot { id: String },
    CleanAdvance { id: String },
}

/// What applying one operation asked of the sequencer.
enum Applied {
    Done,
    DoneWith(SettleAction),
    Gated(Option<SettleAction>),
}

/// Owner of an ordered collection of presentation layers.
///
/// See the module docs for the slot and serialization invariants.
pub struct ModalStackCoordinator<V> {
    slots: Vec<Option<PresentationItem<V>>>,
    sequencer: TransitionSequencer<ModalOp<V>>,
    pending_settle: Option<SettleAction>,
}

impl<V> Default for ModalStackCoordinator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for ModalStackCoordinator<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalStackCoordinator")
            .field("slots", &self.slots.len())
            .field("presented", &self.presented_count())
            .field("in_flight", &self.sequencer.is_in_flight())
            .field("pending", &self.sequencer.pending_len())
            .finish()
    }
}

impl<V> ModalStackCoordinator<V> {
    /// Create an empty coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            sequencer: TransitionSequencer::new(),
            pending_settle: None,
        }
    }

    // --- Structural mutations (serialized) ---

    /// Present a layer above everything currently shown.
    ///
    /// The item lands in the first trailing null slot if one exists
    /// (restart reuse), else appends. Gated on the item's animated flag.
    pub fn present(&mut self, item: PresentationItem<V>) {
        debug!(id = %item.id(), animated = item.is_animated(), "modal present submitted");
        self.sequencer.submit(ModalOp::Present(item));
        self.pump();
    }

    /// Dismiss the visible (last non-null) layer. No-op when nothing is
    /// presented.
    pub fn remove_last_presented(&mut self, animated: bool) {
        trace!(animated, "modal remove-last submitted");
        self.sequencer.submit(ModalOp::RemoveLast { animated });
        self.pump();
    }

    /// Dismiss the layer with the given item id, wherever it sits in the
    /// stack. Breaks strict LIFO ordering, which flow teardown sometimes
    /// needs. No-op when no layer carries the id.
    pub fn remove_presented(&mut self, id: impl Into<String>, animated: bool) {
        let id = id.into();
        trace!(id = %id, animated, "modal remove-by-id submitted");
        self.sequencer.submit(ModalOp::Remove { id, animated });
        self.pump();
    }

    /// Remove every presented layer from the top down, each step gated on
    /// that item's own animated flag, until the stack is fully empty.
    pub fn clean(&mut self) {
        debug!("modal clean submitted");
        self.sequencer.submit(ModalOp::CleanStep);
        self.pump();
    }

    // --- Compaction (immediate, renderer-confirmation driven) ---

    /// Physically remove the slot at `index`. Out-of-bounds is a no-op.
    pub fn remove_item(&mut self, index: usize) {
        if index < self.slots.len() {
            self.slots.remove(index);
        }
    }

    /// Physically remove every null slot, preserving the order of the
    /// surviving layers.
    pub fn remove_nil_items(&mut self) {
        self.slots.retain(Option::is_some);
    }

    // --- Render-surface feedback ---

    /// The renderer confirmed the layer at `index` finished tearing down.
    ///
    /// Settles a matching in-flight removal (the confirmation *is* the
    /// animation bound), fires the item's dismiss callback when the
    /// removal was renderer-initiated (user gesture) rather than queued by
    /// this coordinator, then compacts.
    pub fn confirm_dismissed(&mut self, index: usize) {
        let confirms_in_flight = match (self.pending_settle_id(), self.slot_id(index)) {
            (Some(pending), Some(slot)) => pending == slot,
            _ => false,
        };
        if confirms_in_flight {
            self.settle_transition();
        }
        if let Some(Some(item)) = self.slots.get_mut(index) {
            item.notify_dismiss(index);
        }
        trace!(index, "modal dismissal confirmed");
        self.remove_item(index);
        self.remove_nil_items();
    }

    /// The renderer confirmed the layer at `index` appeared. Fires the
    /// item's did-load callback and compacts stale null slots.
    pub fn confirm_loaded(&mut self, index: usize) {
        if let Some(Some(item)) = self.slots.get_mut(index) {
            item.notify_did_load(index);
        }
        trace!(index, "modal layer loaded");
        self.remove_nil_items();
    }

    /// The render surface confirmed the in-flight mutation's transition
    /// finished. Returns whether anything was actually in flight.
    pub fn settle_transition(&mut self) -> bool {
        if !self.sequencer.settle() {
            return false;
        }
        if let Some(action) = self.pending_settle.take() {
            self.run_settle_action(action);
        }
        self.pump();
        true
    }

    // --- Queries ---

    /// Currently presented layers, bottom to top, nulls filtered.
    pub fn presented_items(&self) -> impl Iterator<Item = &PresentationItem<V>> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// The visible layer: the last non-null slot.
    #[must_use]
    pub fn last_presented(&self) -> Option<&PresentationItem<V>> {
        self.slots.iter().rev().find_map(Option::as_ref)
    }

    /// Number of presented (non-null) layers.
    #[must_use]
    pub fn presented_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// No layer is presented. Tombstoned null slots may still exist; use
    /// [`slot_count`](Self::slot_count) for the raw sequence length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presented_count() == 0
    }

    /// Raw slot-sequence length, nulls included.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The item at a slot index; `None` for nulled or out-of-bounds slots.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&PresentationItem<V>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// The item id at a slot index.
    #[must_use]
    pub fn slot_id(&self, index: usize) -> Option<&str> {
        self.slot(index).map(PresentationItem::id)
    }

    /// Whether an animated mutation has applied but not yet settled.
    #[must_use]
    pub fn is_transition_in_flight(&self) -> bool {
        self.sequencer.is_in_flight()
    }

    /// Number of mutations still queued behind the in-flight one.
    #[must_use]
    pub fn pending_transitions(&self) -> usize {
        self.sequencer.pending_len()
    }

    // --- Internals ---

    fn pending_settle_id(&self) -> Option<&str> {
        match self.pending_settle.as_ref()? {
            SettleAction::ClearSlot { id } | SettleAction::CleanAdvance { id } => Some(id),
        }
    }

    fn pump(&mut self) {
        while let Some(op) = self.sequencer.take_ready() {
            match self.apply(op) {
                Applied::Done => {}
                Applied::DoneWith(action) => self.run_settle_action(action),
                Applied::Gated(action) => {
                    self.sequencer.hold();
                    self.pending_settle = action;
                    break;
                }
            }
        }
    }

    fn apply(&mut self, op: ModalOp<V>) -> Applied {
        match op {
            ModalOp::Present(item) => {
                let gated = item.is_animated();
                let insert_at = self
                    .slots
                    .iter()
                    .rposition(Option::is_some)
                    .map_or(0, |i| i + 1);
                debug!(id = %item.id(), slot = insert_at, "modal present applied");
                if insert_at < self.slots.len() {
                    self.slots[insert_at] = Some(item);
                } else {
                    self.slots.push(Some(item));
                }
                if gated {
                    Applied::Gated(None)
                } else {
                    Applied::Done
                }
            }
            ModalOp::RemoveLast { animated } => {
                let Some(index) = self.slots.iter().rposition(Option::is_some) else {
                    return Applied::Done;
                };
                self.begin_removal(index, animated)
            }
            ModalOp::Remove { id, animated } => {
                let found = self
                    .slots
                    .iter()
                    .position(|s| s.as_ref().is_some_and(|item| item.id() == id));
                let Some(index) = found else {
                    return Applied::Done;
                };
                self.begin_removal(index, animated)
            }
            ModalOp::CleanStep => {
                let Some(index) = self.slots.iter().rposition(Option::is_some) else {
                    // Nothing presented: drop any leftover tombstones.
                    self.slots.clear();
                    return Applied::Done;
                };
                let item = self.slots[index]
                    .as_mut()
                    .expect("rposition returned a non-null slot");
                let animated = item.is_animated();
                let id = item.id().to_string();
                item.notify_dismiss(index);
                debug!(id = %id, slot = index, animated, "modal clean step");
                let action = SettleAction::CleanAdvance { id };
                if animated {
                    Applied::Gated(Some(action))
                } else {
                    Applied::DoneWith(action)
                }
            }
        }
    }

    /// Shared apply path of the two removal operations: fire the dismiss
    /// callback now, clear the slot at settle time.
    fn begin_removal(&mut self, index: usize, animated: bool) -> Applied {
        let item = self.slots[index]
            .as_mut()
            .expect("removal targets a non-null slot");
        let id = item.id().to_string();
        item.notify_dismiss(index);
        debug!(id = %id, slot = index, animated, "modal removal applied");
        let action = SettleAction::ClearSlot { id };
        if animated {
            Applied::Gated(Some(action))
        } else {
            Applied::DoneWith(action)
        }
    }

    fn run_settle_action(&mut self, action: SettleAction) {
        match action {
            SettleAction::ClearSlot { id } => self.clear_slot(&id),
            SettleAction::CleanAdvance { id } => {
                self.clear_slot(&id);
                if self.slots.iter().any(Option::is_some) {
                    self.sequencer.submit(ModalOp::CleanStep);
                } else {
                    self.slots.clear();
                }
            }
        }
    }

    fn clear_slot(&mut self, id: &str) {
        if let Some(slot) = self
            .slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|item| item.id() == id))
        {
            *slot = None;
        }
    }
}
