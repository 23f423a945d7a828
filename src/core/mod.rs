//! In-memory authoritative store and index helpers.

/// Helper index aliases.
pub mod indices;
/// Authoritative results store and undo/redo engine.
pub mod store;
