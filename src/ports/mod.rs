//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the engine and systems it does not own (history persistence).

mod history;

pub use history::HistoryStore;
