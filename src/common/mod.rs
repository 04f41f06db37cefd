//! Common types and utilities shared across tabular sources.
//!
//! This module provides the unified error type and the encoding helpers used
//! by the text reader, ensuring a consistent API for users.

// Submodule declarations
pub mod encoding;
pub mod error;

// Re-exports for convenience
pub use error::{Error, ParseErrorInfo, Result};
