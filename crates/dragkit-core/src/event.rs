#![forbid(unsafe_code)]

//! Canonical drag interaction events.
//!
//! This module defines the event vocabulary the reorder engine consumes.
//! All events derive `Clone`, `PartialEq`, and `Eq` for use in tests and
//! pattern matching.
//!
//! # Design Notes
//!
//! - Events for a single gesture arrive in a fixed causal order: one
//!   `Start`, zero or more `Enter`/`Over`/`Leave`, at most one `Drop`,
//!   then exactly one `End`. Consumers may assume this ordering.
//! - `Leave` carries the node the leave originated on, so handlers can
//!   tell a real leave apart from one bubbling out of a descendant.
//! - `EventOutcome` uses bitflags: handlers report which pieces of native
//!   handling the host shell must suppress.

use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tree::NodeId;

/// A drag interaction event delivered to one target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DragEvent {
    /// The node whose handler fires.
    pub target: NodeId,

    /// What happened.
    pub kind: DragEventKind,
}

impl DragEvent {
    /// Create a new drag event.
    #[must_use]
    pub const fn new(target: NodeId, kind: DragEventKind) -> Self {
        Self { target, kind }
    }

    /// A drag gesture started on `item`.
    #[must_use]
    pub const fn start(item: NodeId) -> Self {
        Self::new(item, DragEventKind::Start)
    }

    /// The pointer entered `target` mid-drag.
    #[must_use]
    pub const fn enter(target: NodeId) -> Self {
        Self::new(target, DragEventKind::Enter)
    }

    /// The pointer is hovering over `target` mid-drag.
    #[must_use]
    pub const fn over(target: NodeId) -> Self {
        Self::new(target, DragEventKind::Over)
    }

    /// The pointer left `target`; `origin` is where the leave fired.
    #[must_use]
    pub const fn leave(target: NodeId, origin: NodeId) -> Self {
        Self::new(target, DragEventKind::Leave { origin })
    }

    /// The dragged item was released on `target`.
    #[must_use]
    pub const fn drop_on(target: NodeId) -> Self {
        Self::new(target, DragEventKind::Drop)
    }

    /// The gesture concluded on the dragged `item`, drop or no drop.
    #[must_use]
    pub const fn end(item: NodeId) -> Self {
        Self::new(item, DragEventKind::End)
    }
}

/// The kind of drag interaction event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DragEventKind {
    /// Native drag gesture started on the target item.
    Start,

    /// Pointer entered a candidate drop target.
    Enter,

    /// Pointer is hovering over a candidate drop target. Fires
    /// continuously while hovering.
    Over,

    /// Pointer left a candidate drop target.
    Leave {
        /// The node the leave event originated on. Equal to the target
        /// for a real leave; a descendant when the leave bubbled up.
        origin: NodeId,
    },

    /// Dragged item released on a candidate drop target.
    Drop,

    /// Gesture concluded on the dragged item, regardless of outcome.
    End,
}

/// The platform drag-effect hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DropEffect {
    /// No effect set.
    #[default]
    None,

    /// The drag moves the item.
    Move,

    /// The drag copies the item.
    Copy,
}

/// The platform drag payload.
///
/// The engine writes the effect hint and a textual snapshot of the dragged
/// item here; the host shell forwards it to the native drag machinery for
/// cross-window visuals. The engine never reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DragData {
    /// Effect hint for the platform.
    pub effect: DropEffect,

    /// Textual snapshot of the dragged item's content.
    pub text: Option<String>,
}

impl DragData {
    /// Create an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the payload between gestures.
    pub fn clear(&mut self) {
        self.effect = DropEffect::None;
        self.text = None;
    }
}

bitflags! {
    /// Native handling a handler asks the host shell to suppress.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventOutcome: u8 {
        /// Nothing to suppress.
        const NONE             = 0b00;
        /// Suppress the platform's default handling.
        const PREVENT_DEFAULT  = 0b01;
        /// Stop the event from propagating to ancestor containers.
        const STOP_PROPAGATION = 0b10;
    }
}

impl Default for EventOutcome {
    fn default() -> Self {
        Self::NONE
    }
}

impl EventOutcome {
    /// Full suppression: the source platform's `return false` contract.
    #[must_use]
    pub const fn consumed() -> Self {
        Self::PREVENT_DEFAULT.union(Self::STOP_PROPAGATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeTree;

    fn two_ids() -> (NodeId, NodeId) {
        let mut tree = NodeTree::new();
        (tree.create(), tree.create())
    }

    #[test]
    fn constructors_set_kind() {
        let (a, b) = two_ids();
        assert_eq!(DragEvent::start(a).kind, DragEventKind::Start);
        assert_eq!(DragEvent::enter(a).kind, DragEventKind::Enter);
        assert_eq!(DragEvent::over(a).kind, DragEventKind::Over);
        assert_eq!(DragEvent::drop_on(a).kind, DragEventKind::Drop);
        assert_eq!(DragEvent::end(a).kind, DragEventKind::End);
        assert_eq!(
            DragEvent::leave(a, b).kind,
            DragEventKind::Leave { origin: b }
        );
    }

    #[test]
    fn leave_distinguishes_origin() {
        let (target, child) = two_ids();
        let direct = DragEvent::leave(target, target);
        let bubbled = DragEvent::leave(target, child);
        assert_ne!(direct, bubbled);
        assert_eq!(direct.target, bubbled.target);
    }

    #[test]
    fn drag_data_clear() {
        let mut data = DragData::new();
        data.effect = DropEffect::Move;
        data.text = Some("Senior Engineer".to_string());
        data.clear();
        assert_eq!(data, DragData::default());
    }

    #[test]
    fn drop_effect_default_is_none() {
        assert_eq!(DropEffect::default(), DropEffect::None);
    }

    #[test]
    fn outcome_consumed_covers_both() {
        let consumed = EventOutcome::consumed();
        assert!(consumed.contains(EventOutcome::PREVENT_DEFAULT));
        assert!(consumed.contains(EventOutcome::STOP_PROPAGATION));
        assert_eq!(EventOutcome::default(), EventOutcome::NONE);
    }

    #[test]
    fn events_are_clone_and_eq() {
        let (a, _) = two_ids();
        let event = DragEvent::start(a);
        assert_eq!(event, event.clone());
    }
}
