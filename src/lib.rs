//! Tabcursor - forward-only record/field cursor over tabular data
//!
//! This library reads delimited text (CSV, TSV, PRN and custom dialects)
//! through a streaming tokenizer and exposes it, together with other tabular
//! sources, behind one format-agnostic cursor.
//!
//! # Features
//!
//! - **Streaming parser**: fixed-size buffer, fields scanned lazily on demand
//! - **Quoting**: configurable quote and escape characters, multi-line fields
//! - **Headers**: case-insensitive lookup, synthesized names for blank cells
//! - **Recovery policies**: missing and malformed fields resolved by policy or
//!   by a handler
//! - **Typed access**: integers, floats, booleans and dates from field text
//!
//! # Example - Reading a CSV file
//!
//! ```no_run
//! use tabcursor::sheet::text::DelimitedReader;
//! use tabcursor::sheet::RecordExt;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reader = DelimitedReader::open("inventory.csv")?;
//! println!("{} records", reader.total_record_count()?);
//!
//! while reader.advance()? {
//!     let sku = reader.field_by_name("sku")?.unwrap_or_default().to_string();
//!     let qty = reader.get_i32(1)?;
//!     println!("{sku}: {qty}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Recovering from bad input
//!
//! ```
//! use tabcursor::sheet::text::{DelimitedReader, ParseErrorAction, TextConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = "a,b\n\"broken\"x,1\nok,2\n";
//! let mut reader = DelimitedReader::with_parse_error_handler(
//!     std::io::Cursor::new(data.as_bytes().to_vec()),
//!     TextConfig::default(),
//!     |event| event.action = ParseErrorAction::AdvanceToNextLine,
//! )?;
//!
//! assert!(reader.advance()?);
//! assert_eq!(reader.field(0)?, None);
//! assert!(reader.parse_error_flag());
//! assert!(reader.advance()?);
//! assert_eq!(reader.field(0)?, Some("ok"));
//! # Ok(())
//! # }
//! ```

/// Shared error type and encoding helpers
pub mod common;

/// Tabular sources and the delimited text reader
pub mod sheet;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use sheet::text::{DelimitedReader, TextConfig};
pub use sheet::{RecordExt, TabularSource};
