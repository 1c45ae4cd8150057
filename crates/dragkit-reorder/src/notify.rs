#![forbid(unsafe_code)]

//! Notification sink: fire-and-forget user feedback.
//!
//! The engine reports positive-path outcomes ("Item reordered") through
//! the [`Notifier`] trait and never waits on or inspects the result. The
//! sink must not fail; delivery problems are the sink's own business.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A sink for success notifications.
///
/// Implementations must be non-blocking and infallible from the caller's
/// point of view.
pub trait Notifier {
    /// Deliver a success message.
    fn notify_success(&self, message: &str);
}

/// A notifier that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify_success(&self, _message: &str) {}
}

impl<N: Notifier + ?Sized> Notifier for Rc<N> {
    fn notify_success(&self, message: &str) {
        (**self).notify_success(message);
    }
}

/// Delivery statistics for monitoring and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyStats {
    /// Messages accepted into the log.
    pub delivered: u64,
    /// Messages evicted because the log was full.
    pub evicted: u64,
}

#[derive(Debug, Default)]
struct LogInner {
    messages: VecDeque<String>,
    stats: NotifyStats,
}

/// A bounded FIFO of recent notifications.
///
/// Hosts drain it to render toasts; tests read it to assert on the
/// positive path. When full, the oldest message is evicted.
#[derive(Debug)]
pub struct NotificationLog {
    inner: RefCell<LogInner>,
    capacity: usize,
}

impl NotificationLog {
    /// Default capacity for [`NotificationLog::new`].
    pub const DEFAULT_CAPACITY: usize = 8;

    /// Create a log with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a log holding at most `capacity` messages.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RefCell::new(LogInner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Number of messages currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().messages.len()
    }

    /// Check if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().messages.is_empty()
    }

    /// Snapshot of the held messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.inner.borrow().messages.iter().cloned().collect()
    }

    /// Remove and return all held messages, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.inner.borrow_mut().messages.drain(..).collect()
    }

    /// Delivery statistics.
    #[must_use]
    pub fn stats(&self) -> NotifyStats {
        self.inner.borrow().stats
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for NotificationLog {
    fn notify_success(&self, message: &str) {
        let mut inner = self.inner.borrow_mut();
        if inner.messages.len() == self.capacity {
            inner.messages.pop_front();
            inner.stats.evicted += 1;
        }
        inner.messages.push_back(message.to_string());
        inner.stats.delivered += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_keeps_fifo_order() {
        let log = NotificationLog::new();
        log.notify_success("first");
        log.notify_success("second");
        assert_eq!(log.messages(), vec!["first", "second"]);
        assert_eq!(log.stats().delivered, 2);
    }

    #[test]
    fn full_log_evicts_oldest() {
        let log = NotificationLog::with_capacity(2);
        log.notify_success("a");
        log.notify_success("b");
        log.notify_success("c");
        assert_eq!(log.messages(), vec!["b", "c"]);
        assert_eq!(log.stats().evicted, 1);
        assert_eq!(log.stats().delivered, 3);
    }

    #[test]
    fn drain_empties_the_log() {
        let log = NotificationLog::new();
        log.notify_success("a");
        assert_eq!(log.drain(), vec!["a"]);
        assert!(log.is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let log = NotificationLog::with_capacity(0);
        log.notify_success("a");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn shared_handle_delivers() {
        let log = Rc::new(NotificationLog::new());
        let handle = Rc::clone(&log);
        handle.notify_success("shared");
        assert_eq!(log.messages(), vec!["shared"]);
    }

    #[test]
    fn null_notifier_discards() {
        NullNotifier.notify_success("ignored");
    }
}
