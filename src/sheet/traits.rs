//! Traits for tabular source abstraction.

use crate::common::{Error, Result};

/// Minimal forward-only record/field cursor shared by every tabular format.
///
/// Callers written against this trait do not care whether the records come
/// from delimited text or an already-decoded table.
pub trait TabularSource {
    /// Move to the next record. Returns `false` once the source is exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// Index of the current record, `None` before the first advance and after the last.
    fn current_record_index(&self) -> Option<u64>;

    /// Total number of data records.
    fn total_record_count(&self) -> Result<u64>;

    /// Number of fields in each record.
    fn field_count(&mut self) -> Result<usize>;

    /// Field of the current record by position.
    fn field(&mut self, index: usize) -> Result<Option<&str>>;

    /// Header names in column order.
    ///
    /// Fails with [`Error::NoHeaders`] when the source has no header row.
    fn headers(&mut self) -> Result<&[String]>;

    /// Column index of a header name, ignoring case.
    fn field_index(&mut self, name: &str) -> Result<usize>;

    /// Go back to before the first record.
    fn rewind(&mut self) -> Result<()>;

    /// Stamp that changes whenever the current record changes.
    fn version(&self) -> u64;

    /// Column name, or `Column<index>` when the source has no header row.
    fn column_name(&mut self, index: usize) -> Result<String> {
        let count = self.field_count()?;
        if index >= count {
            return Err(Error::FieldIndexOutOfRange { index, count });
        }
        match self.headers() {
            Ok(names) => Ok(names
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("Column{}", index))),
            Err(Error::NoHeaders) => Ok(format!("Column{}", index)),
            Err(e) => Err(e),
        }
    }

    /// Whether a missing field was substituted in the current record.
    fn missing_field_flag(&self) -> bool {
        false
    }

    /// Whether the current record was cut short by a malformed field.
    fn parse_error_flag(&self) -> bool {
        false
    }
}
