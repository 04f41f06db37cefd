//! Delimited text support (CSV, TSV, PRN, etc.)
//!
//! This module provides a streaming, forward-only reader for delimited text.
//! The input is decoded into a fixed-size character buffer, fields are
//! tokenized on demand, and malformed or short records are resolved by
//! configurable recovery policies.
//!
//! # Features
//!
//! - **Configurable dialect**: delimiter, quote, escape and comment characters
//! - **Lazy fields**: a field is scanned only when it is first requested
//! - **Multi-line quoted fields**: optional, per configuration
//! - **Recovery policies**: substitute missing fields, skip malformed lines,
//!   or let a handler decide case by case
//!
//! # Example
//!
//! ```rust
//! use tabcursor::sheet::text::{DelimitedReader, MissingFieldAction, TextConfig};
//! use tabcursor::sheet::RecordExt;
//!
//! let config = TextConfig::new()
//!     .with_delimiter(';')
//!     .with_missing_field_action(MissingFieldAction::ReplaceByEmpty);
//! let mut reader = DelimitedReader::from_bytes("id;label\n1;\"a;b\"\n2\n", config)?;
//!
//! assert_eq!(reader.headers()?, &["id", "label"]);
//! while reader.advance()? {
//!     let id = reader.get_i32(0)?;
//!     let label = reader.field_by_name("label")?.unwrap_or_default();
//!     println!("{id}: {label}");
//! }
//! # Ok::<(), tabcursor::common::Error>(())
//! ```

pub(crate) mod buffer;
pub mod config;
pub mod headers;
pub(crate) mod parser;
pub mod reader;
pub mod recovery;

pub use config::{
    DEFAULT_BUFFER_SIZE, MissingFieldAction, ParseErrorAction, PrecountMode, TextConfig,
    ValueTrimming,
};
pub use headers::HeaderMap;
pub use reader::DelimitedReader;
pub use recovery::{ParseErrorEvent, ParseErrorHandler, ParseErrorKind};

#[cfg(test)]
mod tests;
