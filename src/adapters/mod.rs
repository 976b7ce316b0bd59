//! Adapters layer: Concrete implementations of ports.
//!
//! - `memory`: process-local history store
//! - `sanitize`: patient identifier filtering for logs

pub mod memory;
pub mod sanitize;

// Re-export storage error for lib.rs
pub use memory::StorageError;
