#![forbid(unsafe_code)]

//! Reorder engine: tracks one in-flight drag and commits drop order.
//!
//! [`ReorderEngine`] is a stateful processor. Hosts bind it to one or more
//! containers, then feed it drag interaction events; on drop it repositions
//! the dragged item relative to the drop target inside the host tree.
//!
//! # State Machine
//!
//! Two states, keyed off the single session slot:
//!
//! - **Idle** → `Start` on a registered item → **Dragging** (session
//!   created, item flagged `DRAGGING`, payload staged).
//! - **Dragging** → `End` on the dragged item → **Idle** (flag cleared,
//!   placeholder destroyed, session torn down, `reordered` published for
//!   announcing containers).
//!
//! `Enter`/`Over`/`Leave`/`Drop` only observe and mutate within
//! **Dragging**; `End` is the sole teardown path and runs the same cleanup
//! whether or not a drop happened.
//!
//! # Invariants
//!
//! 1. At most one drag session exists at any time. `Start` while a session
//!    exists produces no state change.
//! 2. At most one placeholder is created per session, and none survives
//!    past `End`.
//! 3. A drop where target and dragged item coincide leaves the container
//!    order untouched.
//! 4. Container children in the host tree always reflect the committed
//!    order; there is no deferred commit.
//!
//! # Failure Modes
//!
//! - Binding a container/selector pair that matches nothing registers zero
//!   items. That is the expected non-event, not an error.
//! - A drop whose anchors can no longer be resolved in the container (the
//!   target was removed mid-drag, say) is a no-op. Nothing is retried and
//!   nothing throws.

use ahash::AHashMap;
use bitflags::bitflags;

use dragkit_core::event::{DragData, DragEvent, DragEventKind, DropEffect, EventOutcome};
use dragkit_core::tree::{Extent, NodeId, NodeTree, Selector};

use crate::bus::{EventBus, ReorderSignal};
use crate::notify::{Notifier, NullNotifier};

/// Message delivered on a committed reorder.
const REORDERED_MESSAGE: &str = "Item reordered";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Per-binding configuration.
#[derive(Debug, Clone)]
pub struct BindConfig {
    /// Publish a `reordered` signal when a gesture on this container ends.
    pub announce: bool,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self { announce: true }
    }
}

impl BindConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether gesture ends publish on the event bus.
    #[must_use]
    pub fn announce(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

bitflags! {
    /// Transient per-item state owned by the engine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u8 {
        /// The item is the one being dragged.
        const DRAGGING    = 0b01;
        /// The item is the current candidate insertion anchor.
        const DROP_TARGET = 0b10;
    }
}

impl Default for ItemFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Transient spacer sized to the dragged item's rendered extent.
///
/// Created lazily on the first drag-enter of a non-self target, destroyed
/// unconditionally when the session is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placeholder {
    extent: Extent,
}

/// The record of the in-flight drag, if any.
#[derive(Debug, Clone)]
struct DragSession {
    item: NodeId,
    placeholder: Option<Placeholder>,
}

/// One bound container: the scope within which reordering is legal.
#[derive(Debug, Clone)]
struct Binding {
    container: NodeId,
    selector: Selector,
    items: Vec<NodeId>,
    announce: bool,
}

/// Whether a drag is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No session exists.
    Idle,
    /// Exactly one session exists.
    Dragging,
}

/// Engine counters for monitoring and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Sessions created.
    pub drags_started: u64,
    /// Sessions torn down.
    pub drags_ended: u64,
    /// Drops that committed a new order.
    pub drops_committed: u64,
    /// Drops ignored (self-drop, no session, unresolvable anchors).
    pub drops_ignored: u64,
    /// Placeholders created.
    pub placeholders_created: u64,
}

// ---------------------------------------------------------------------------
// ReorderEngine
// ---------------------------------------------------------------------------

/// Stateful drag-and-drop reordering engine.
///
/// Bind containers with [`bind`](ReorderEngine::bind), then feed events
/// either through the per-kind handlers or through
/// [`handle`](ReorderEngine::handle). The engine queries and mutates the
/// host tree but does not own it; it owns only the transient drag state.
pub struct ReorderEngine {
    bindings: Vec<Binding>,
    session: Option<DragSession>,
    flags: AHashMap<NodeId, ItemFlags>,
    notifier: Box<dyn Notifier>,
    bus: EventBus,
    stats: EngineStats,
}

impl std::fmt::Debug for ReorderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReorderEngine")
            .field("phase", &self.phase())
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

impl Default for ReorderEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReorderEngine {
    /// Create an engine that discards notifications.
    #[must_use]
    pub fn new() -> Self {
        Self::with_notifier(Box::new(NullNotifier))
    }

    /// Create an engine delivering success feedback to `notifier`.
    #[must_use]
    pub fn with_notifier(notifier: Box<dyn Notifier>) -> Self {
        Self {
            bindings: Vec::new(),
            session: None,
            flags: AHashMap::new(),
            notifier,
            bus: EventBus::new(),
            stats: EngineStats::default(),
        }
    }

    /// Bind a container with the default configuration.
    ///
    /// Scans `container` for descendants matching `selector` and registers
    /// each as a draggable item. Zero matches yields a no-op binding.
    /// Re-binding the same container re-scans and replaces the previous
    /// registration; callers must not double-feed events for a container
    /// they bound twice without an intervening rebind.
    pub fn bind(&mut self, tree: &NodeTree, container: NodeId, selector: Selector) {
        self.bind_with(tree, container, selector, BindConfig::default());
    }

    /// Bind a container with an explicit configuration.
    pub fn bind_with(
        &mut self,
        tree: &NodeTree,
        container: NodeId,
        selector: Selector,
        config: BindConfig,
    ) {
        let items = if tree.contains(container) {
            selector.query(tree, container)
        } else {
            Vec::new()
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            container = container.raw(),
            items = items.len(),
            "bind container"
        );

        if let Some(index) = self.bindings.iter().position(|b| b.container == container) {
            // Re-scan: drop transient state attached to the old registration.
            let stale = std::mem::take(&mut self.bindings[index].items);
            for item in stale {
                self.flags.remove(&item);
            }
            let binding = &mut self.bindings[index];
            binding.selector = selector;
            binding.items = items;
            binding.announce = config.announce;
        } else {
            self.bindings.push(Binding {
                container,
                selector,
                items,
                announce: config.announce,
            });
        }
    }

    /// Dispatch one event to the matching handler.
    pub fn handle(
        &mut self,
        tree: &mut NodeTree,
        event: &DragEvent,
        data: &mut DragData,
    ) -> EventOutcome {
        match event.kind {
            DragEventKind::Start => self.on_drag_start(tree, data, event.target),
            DragEventKind::Enter => self.on_drag_enter(tree, event.target),
            DragEventKind::Over => self.on_drag_over(data, event.target),
            DragEventKind::Leave { origin } => self.on_drag_leave(event.target, origin),
            DragEventKind::Drop => self.on_drop(tree, event.target),
            DragEventKind::End => self.on_drag_end(event.target),
        }
    }

    /// Native drag gesture started on `item`.
    pub fn on_drag_start(
        &mut self,
        tree: &NodeTree,
        data: &mut DragData,
        item: NodeId,
    ) -> EventOutcome {
        if self.session.is_some() {
            // One session at a time; a second start is not a defined input.
            #[cfg(feature = "tracing")]
            tracing::debug!(item = item.raw(), "drag start ignored: session active");
            return EventOutcome::NONE;
        }
        if !self.is_registered(item) {
            return EventOutcome::NONE;
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("reorder.drag_start", item = item.raw()).entered();

        self.set_flag(item, ItemFlags::DRAGGING);
        data.effect = DropEffect::Move;
        // Snapshot for native cross-window visuals; never read back here.
        data.text = Some(tree.text_content(item));
        self.session = Some(DragSession {
            item,
            placeholder: None,
        });
        self.stats.drags_started += 1;
        EventOutcome::NONE
    }

    /// Pointer is hovering over `target` mid-drag.
    ///
    /// Fires continuously; suppressing default handling here is what makes
    /// the platform deliver a drop at all.
    pub fn on_drag_over(&mut self, data: &mut DragData, _target: NodeId) -> EventOutcome {
        data.effect = DropEffect::Move;
        EventOutcome::PREVENT_DEFAULT
    }

    /// Pointer entered candidate `target`.
    pub fn on_drag_enter(&mut self, tree: &NodeTree, target: NodeId) -> EventOutcome {
        let Some(dragged) = self.dragged_item() else {
            return EventOutcome::NONE;
        };
        if target == dragged || !self.is_registered(target) {
            return EventOutcome::NONE;
        }

        self.set_flag(target, ItemFlags::DROP_TARGET);
        let extent = tree.extent_of(dragged);
        if let Some(session) = self.session.as_mut()
            && session.placeholder.is_none()
        {
            session.placeholder = Some(Placeholder { extent });
            self.stats.placeholders_created += 1;
        }
        EventOutcome::NONE
    }

    /// Pointer left `target`; `origin` is the node the leave fired on.
    ///
    /// Only a leave originating on the target itself clears its flag; a
    /// leave bubbling out of a descendant would otherwise flicker the
    /// highlight while the pointer crosses child content.
    pub fn on_drag_leave(&mut self, target: NodeId, origin: NodeId) -> EventOutcome {
        if origin == target {
            self.clear_flag(target, ItemFlags::DROP_TARGET);
        }
        EventOutcome::NONE
    }

    /// Dragged item released on `target`.
    pub fn on_drop(&mut self, tree: &mut NodeTree, target: NodeId) -> EventOutcome {
        // Always fully suppress native handling, and keep ancestor
        // containers from treating the same drop as theirs.
        let outcome = EventOutcome::consumed();

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("reorder.drop", target = target.raw()).entered();

        let Some(dragged) = self.dragged_item() else {
            self.stats.drops_ignored += 1;
            return outcome;
        };
        if dragged == target {
            self.stats.drops_ignored += 1;
            return outcome;
        }
        let Some(container) = self.binding_of(dragged).map(|b| b.container) else {
            self.stats.drops_ignored += 1;
            return outcome;
        };

        let (Some(from), Some(to)) = (
            tree.position_of(container, dragged),
            tree.position_of(container, target),
        ) else {
            // Anchor fell out of the container mid-drag: fail closed.
            self.stats.drops_ignored += 1;
            return outcome;
        };

        // Dropping on the item below inserts after it, dropping on the item
        // above inserts before it. The before-branch also absorbs any
        // unexpected position relationship.
        let moved = if from < to {
            tree.insert_after(container, dragged, target)
        } else {
            tree.insert_before(container, dragged, target)
        };
        if !moved {
            self.stats.drops_ignored += 1;
            return outcome;
        }

        self.stats.drops_committed += 1;
        self.clear_flag(target, ItemFlags::DROP_TARGET);
        self.notifier.notify_success(REORDERED_MESSAGE);
        outcome
    }

    /// Gesture concluded on the dragged `item`, drop or no drop.
    ///
    /// The sole teardown path: clears the drag flag, destroys the
    /// placeholder, drops the session, and publishes `reordered` when the
    /// container announces.
    pub fn on_drag_end(&mut self, item: NodeId) -> EventOutcome {
        self.clear_flag(item, ItemFlags::DRAGGING);

        if self.session.as_ref().is_some_and(|s| s.item == item)
            && let Some(session) = self.session.take()
        {
            // Placeholder is destroyed with the session.
            self.stats.drags_ended += 1;

            #[cfg(feature = "tracing")]
            tracing::debug!(item = session.item.raw(), "drag session torn down");

            let announced = self
                .binding_of(session.item)
                .filter(|b| b.announce)
                .map(|b| b.container);
            if let Some(container) = announced {
                self.bus.publish(&ReorderSignal { container });
            }
        }
        EventOutcome::NONE
    }

    // -- Accessors ----------------------------------------------------------

    /// Current phase of the drag state machine.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        if self.session.is_some() {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }

    /// Whether a drag is currently in progress.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// The item being dragged, if any.
    #[must_use]
    pub fn dragged_item(&self) -> Option<NodeId> {
        self.session.as_ref().map(|s| s.item)
    }

    /// Extent of the live placeholder, if one has been created.
    #[must_use]
    pub fn placeholder_extent(&self) -> Option<Extent> {
        self.session
            .as_ref()
            .and_then(|s| s.placeholder.map(|p| p.extent))
    }

    /// Transient flags attached to an item.
    #[must_use]
    pub fn item_flags(&self, item: NodeId) -> ItemFlags {
        self.flags.get(&item).copied().unwrap_or_default()
    }

    /// Items registered for a bound container, in scan order.
    #[must_use]
    pub fn registered_items(&self, container: NodeId) -> &[NodeId] {
        self.bindings
            .iter()
            .find(|b| b.container == container)
            .map_or(&[], |b| b.items.as_slice())
    }

    /// The event bus reorder signals are published on.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Mutable access to the bus, for subscribing.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Engine counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    // -- Internals ----------------------------------------------------------

    fn is_registered(&self, item: NodeId) -> bool {
        self.binding_of(item).is_some()
    }

    fn binding_of(&self, item: NodeId) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.items.contains(&item))
    }

    fn set_flag(&mut self, item: NodeId, flag: ItemFlags) {
        *self.flags.entry(item).or_default() |= flag;
    }

    fn clear_flag(&mut self, item: NodeId, flag: ItemFlags) {
        if let Some(flags) = self.flags.get_mut(&item) {
            flags.remove(flag);
            if flags.is_empty() {
                self.flags.remove(&item);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
