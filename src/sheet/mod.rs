//! Unified tabular API.
//!
//! Every format implements the [`TabularSource`] cursor: advance to the next
//! record, read fields by position or header name, list headers and report
//! the record count. [`RecordExt`] layers typed getters, bulk copies, schema
//! description and seeking on top of it, so callers stay format-agnostic.
//!
//! # Quick Start
//!
//! ```rust
//! use std::io::Cursor;
//! use tabcursor::sheet::{open_reader, FileType, RecordExt, TabularSource};
//!
//! let data = Cursor::new(b"city,pop\nOslo,709000\nBergen,291000\n".to_vec());
//! let mut reader = open_reader(data, FileType::Csv, true)?;
//!
//! for column in reader.schema()? {
//!     println!("{} at {}", column.name, column.ordinal);
//! }
//! while reader.advance()? {
//!     let population = reader.get_i64(1)?;
//!     let city = reader.field(0)?.unwrap_or_default();
//!     println!("{city}: {population}");
//! }
//! # Ok::<(), tabcursor::common::Error>(())
//! ```

// Submodule declarations
pub mod iterators;
pub mod memory;
pub mod record;
pub mod schema;
pub mod source;
pub mod text;
pub mod traits;
pub mod types;

// Re-exports
pub use iterators::{RecordCursor, Records};
pub use memory::MemoryTable;
pub use record::RecordExt;
pub use schema::{ColumnSchema, DeclaredType};
pub use source::{FileType, TabularReader, open_reader};
pub use traits::TabularSource;
pub use types::CellValue;
