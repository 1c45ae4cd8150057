#![forbid(unsafe_code)]

//! Core: host tree and canonical drag event types.
//!
//! # Role in dragkit
//! `dragkit-core` is the model layer. It owns the ordered host tree the
//! reorder engine queries and mutates, plus the normalized drag event
//! vocabulary the engine consumes.
//!
//! # Primary responsibilities
//! - **NodeTree**: ordered, mutable node structure with move operations.
//! - **Selector**: class-token matching over tree descendants.
//! - **DragEvent**: canonical drag interaction events (start, enter, over,
//!   leave, drop, end).
//! - **DragData / EventOutcome**: the platform drag payload and the
//!   default-suppression contract handlers report back to the host shell.
//!
//! # How it fits in the system
//! The reorder engine (`dragkit-reorder`) consumes `dragkit-core` events
//! and drives order mutations through `NodeTree`. The rendering layer is
//! independent of input; it draws whatever order the tree currently holds.

pub mod event;
pub mod tree;
