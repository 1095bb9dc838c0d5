//! Repository layer over the storage adapter.
//!
//! # Responsibility
//! - Map typed domain values to storage keys and back.
//! - Keep JSON shape and key names out of services.
//!
//! # Invariants
//! - Collections are always read and written whole.
//! - Storage failures are propagated, never replaced with defaults.

pub mod list_repo;
pub mod settings_repo;

pub use list_repo::ListRepository;
pub use settings_repo::SettingsRepository;
