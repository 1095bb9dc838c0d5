//! Start page domain model.
//!
//! # Responsibility
//! - Define the records persisted through the storage adapter.
//! - Hold the pure derivations views render (todo status, background CSS,
//!   search targets, bookmark panel entries).
//!
//! # Invariants
//! - Nothing in this module performs I/O.

pub mod background;
pub mod bookmark;
pub mod browser_bookmarks;
pub mod search;
pub mod todo;
