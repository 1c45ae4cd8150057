#![forbid(unsafe_code)]

//! Event bus: process-wide announcement of completed reorders.
//!
//! The engine publishes a [`ReorderSignal`] when a drag gesture on an
//! announcing container concludes; consumers (an auto-save module, say)
//! subscribe independently instead of being called directly.
//!
//! Delivery is synchronous and single-threaded: `publish` invokes live
//! subscribers in subscription order before returning. There is no
//! queueing and no background machinery.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use dragkit_core::tree::NodeId;

/// A unique identifier for a subscription.
///
/// Used to drop a subscription later; ids are never reused within a bus.
pub type SubId = u64;

/// A reorder occurred in this container. No further payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReorderSignal {
    /// The container whose order changed.
    pub container: NodeId,
}

type Callback = Box<dyn FnMut(&ReorderSignal)>;

/// Synchronous publish/subscribe bus for reorder signals.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubId, Callback)>,
    next_id: SubId,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Returns the id to unsubscribe with.
    pub fn subscribe(&mut self, callback: impl FnMut(&ReorderSignal) + 'static) -> SubId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Drop a subscription. Returns `false` if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver a signal to every live subscriber, in subscription order.
    pub fn publish(&mut self, signal: &ReorderSignal) {
        for (_, callback) in &mut self.subscribers {
            callback(signal);
        }
    }
}
