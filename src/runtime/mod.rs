//! Single-writer runtime over the store.

/// Runtime event stream payloads.
pub mod events;
/// Runtime handle, config, and command loop.
pub mod handle;
