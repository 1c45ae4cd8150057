#![forbid(unsafe_code)]

//! Drag-and-drop list-reordering engine.
//!
//! # Role in dragkit
//! `dragkit-reorder` owns the drag state machine: it binds to containers
//! in a `dragkit-core` host tree, tracks exactly one in-flight drag
//! session, disambiguates drop targets, and commits the new order to the
//! tree the moment a drop resolves.
//!
//! # Primary responsibilities
//! - **ReorderEngine**: bind, drag-state tracking, drop resolution.
//! - **Notifier**: fire-and-forget success feedback seam.
//! - **EventBus**: `reordered` announcements for decoupled consumers.
//! - **ContainerKind**: the conventional list roles hosts bind at startup.
//!
//! # How it fits in the system
//! The host shell translates native drag events into
//! `dragkit_core::event::DragEvent` values and feeds them to the engine;
//! the rendering layer draws whatever order the tree holds. Persisting
//! that order is some other module's job (subscribe to the bus for it).

pub mod bus;
pub mod engine;
pub mod notify;
pub mod roles;
