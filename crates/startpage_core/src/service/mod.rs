//! Start page use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the operations a view triggers.
//! - Keep views decoupled from storage keys and JSON shapes.

pub mod bookmark_service;
pub mod confirm;
pub mod settings_service;
pub mod start_page;
pub mod todo_service;
