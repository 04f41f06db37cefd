//! Unified error types for the tabcursor library.
//!
//! Every reader (delimited text, in-memory tables) reports failures through the
//! same [`Error`] enum so callers can stay format-agnostic.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, ParseErrorInfo, Result};
