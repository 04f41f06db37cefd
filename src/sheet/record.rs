//! Record-level accessors shared by every [`TabularSource`].
//!
//! Everything here is built on the minimal cursor surface, so typed getters,
//! bulk copies and seeking behave identically for every format.

use super::iterators::Records;
use super::schema::{ColumnSchema, DeclaredType};
use super::traits::TabularSource;
use super::types::CellValue;
use crate::common::{Error, Result};

/// Convenience accessors on the current record.
///
/// Implemented for every [`TabularSource`]. Absent fields read as empty text,
/// so numeric getters fail on them with [`Error::Conversion`].
pub trait RecordExt: TabularSource {
    /// Field of the current record looked up by header name.
    fn field_by_name(&mut self, name: &str) -> Result<Option<&str>> {
        let index = self.field_index(name)?;
        self.field(index)
    }

    /// All fields of the current record.
    fn record(&mut self) -> Result<Vec<Option<String>>> {
        let count = self.field_count()?;
        (0..count)
            .map(|i| self.field(i).map(|value| value.map(str::to_string)))
            .collect()
    }

    /// Copy the current record into `dest`.
    ///
    /// Every slot is `None` when the record was cut short by a malformed field.
    fn copy_record_to(&mut self, dest: &mut [Option<String>]) -> Result<()> {
        self.copy_record_to_at(dest, 0)
    }

    /// Copy the current record into `dest`, starting at slot `offset`.
    fn copy_record_to_at(&mut self, dest: &mut [Option<String>], offset: usize) -> Result<()> {
        let count = self.field_count()?;
        let needed = offset.saturating_add(count);
        if dest.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                available: dest.len(),
            });
        }
        let target = &mut dest[offset..needed];
        for (i, slot) in target.iter_mut().enumerate() {
            *slot = self.field(i)?.map(str::to_string);
        }
        if self.parse_error_flag() {
            target.fill(None);
        }
        Ok(())
    }

    /// Fill `dest` with as many values as fit; returns how many were written.
    fn get_values(&mut self, dest: &mut [CellValue]) -> Result<usize> {
        let count = self.field_count()?.min(dest.len());
        for (i, slot) in dest.iter_mut().take(count).enumerate() {
            *slot = CellValue::from_text(self.field(i)?);
        }
        Ok(count)
    }

    /// Field as a [`CellValue::String`], or [`CellValue::Empty`] when absent or empty.
    fn get_value(&mut self, index: usize) -> Result<CellValue> {
        Ok(CellValue::from_text(self.field(index)?))
    }

    /// Field with its type guessed from the text.
    fn infer_value(&mut self, index: usize) -> Result<CellValue> {
        Ok(CellValue::infer(self.field(index)?))
    }

    /// Whether the field is absent or empty.
    fn is_null(&mut self, index: usize) -> Result<bool> {
        Ok(self.field(index)?.is_none_or(str::is_empty))
    }

    fn get_str(&mut self, index: usize) -> Result<&str> {
        text(self, index)
    }

    /// Integer fields are true when non-zero; otherwise `true` or `false`, ignoring case.
    fn get_bool(&mut self, index: usize) -> Result<bool> {
        let raw = text(self, index)?;
        let value = raw.trim();
        if let Ok(number) = atoi_simd::parse::<i64, true, true>(value.as_bytes()) {
            return Ok(number != 0);
        }
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(conversion(index, "bool", raw))
        }
    }

    fn get_u8(&mut self, index: usize) -> Result<u8> {
        let raw = text(self, index)?;
        atoi_simd::parse::<u8, true, true>(raw.trim().as_bytes()).map_err(|_| conversion(index, "u8", raw))
    }

    fn get_i16(&mut self, index: usize) -> Result<i16> {
        let raw = text(self, index)?;
        atoi_simd::parse::<i16, true, true>(raw.trim().as_bytes()).map_err(|_| conversion(index, "i16", raw))
    }

    fn get_i32(&mut self, index: usize) -> Result<i32> {
        let raw = text(self, index)?;
        atoi_simd::parse::<i32, true, true>(raw.trim().as_bytes()).map_err(|_| conversion(index, "i32", raw))
    }

    fn get_i64(&mut self, index: usize) -> Result<i64> {
        let raw = text(self, index)?;
        atoi_simd::parse::<i64, true, true>(raw.trim().as_bytes()).map_err(|_| conversion(index, "i64", raw))
    }

    fn get_f32(&mut self, index: usize) -> Result<f32> {
        let raw = text(self, index)?;
        fast_float2::parse::<f32, _>(raw.trim()).map_err(|_| conversion(index, "f32", raw))
    }

    fn get_f64(&mut self, index: usize) -> Result<f64> {
        let raw = text(self, index)?;
        fast_float2::parse::<f64, _>(raw.trim()).map_err(|_| conversion(index, "f64", raw))
    }

    /// First character of the field.
    fn get_char(&mut self, index: usize) -> Result<char> {
        let raw = text(self, index)?;
        raw.chars().next().ok_or_else(|| conversion(index, "char", raw))
    }

    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]`, `YYYY-MM-DDTHH:MM:SS[.f]`
    /// and plain `YYYY-MM-DD` (midnight).
    #[cfg(feature = "datetime")]
    fn get_datetime(&mut self, index: usize) -> Result<chrono::NaiveDateTime> {
        use chrono::{DateTime, NaiveDate, NaiveDateTime};

        let raw = text(self, index)?;
        let value = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
            return Ok(parsed.naive_utc());
        }
        for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(parsed);
            }
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| conversion(index, "datetime", raw))
    }

    /// Field parsed as a UUID, in any of the hyphenated, simple, braced or URN forms.
    #[cfg(feature = "guid")]
    fn get_guid(&mut self, index: usize) -> Result<uuid::Uuid> {
        let raw = text(self, index)?;
        uuid::Uuid::parse_str(raw.trim()).map_err(|_| conversion(index, "guid", raw))
    }

    /// Length of the field in characters.
    fn field_len(&mut self, index: usize) -> Result<usize> {
        Ok(text(self, index)?.chars().count())
    }

    /// Copy characters of a field, starting at `offset`, into `dest`.
    /// Returns the number of characters copied.
    fn read_chars(&mut self, index: usize, offset: usize, dest: &mut [char]) -> Result<usize> {
        let raw = text(self, index)?;
        let mut copied = 0;
        for (slot, ch) in dest.iter_mut().zip(raw.chars().skip(offset)) {
            *slot = ch;
            copied += 1;
        }
        Ok(copied)
    }

    /// Copy characters of a field as single bytes, starting at `offset`.
    ///
    /// Characters above U+00FF cannot be represented and fail the copy.
    fn read_bytes(&mut self, index: usize, offset: usize, dest: &mut [u8]) -> Result<usize> {
        let raw = text(self, index)?;
        let mut copied = 0;
        for (slot, ch) in dest.iter_mut().zip(raw.chars().skip(offset)) {
            *slot = u8::try_from(ch).map_err(|_| conversion(index, "byte", raw))?;
            copied += 1;
        }
        Ok(copied)
    }

    /// Declared type of a column, text for every column.
    fn column_type(&mut self, index: usize) -> Result<DeclaredType> {
        let count = self.field_count()?;
        if index >= count {
            return Err(Error::FieldIndexOutOfRange { index, count });
        }
        Ok(DeclaredType::Text)
    }

    /// Name, position and declared type of every column.
    fn schema(&mut self) -> Result<Vec<ColumnSchema>> {
        let count = self.field_count()?;
        (0..count)
            .map(|i| Ok(ColumnSchema::text(self.column_name(i)?, i)))
            .collect()
    }

    /// Advance until `record` is current.
    ///
    /// Returns `false` when the record is behind the cursor or past the end.
    fn move_to(&mut self, record: u64) -> Result<bool> {
        if matches!(self.current_record_index(), Some(current) if record < current) {
            return Ok(false);
        }
        loop {
            if self.current_record_index() == Some(record) {
                return Ok(true);
            }
            if !self.advance()? {
                return Ok(false);
            }
        }
    }

    /// Seek forward to `record` and read one of its fields.
    fn field_at(&mut self, record: u64, index: usize) -> Result<Option<&str>> {
        match self.current_record_index() {
            Some(current) if record < current => {
                return Err(Error::CannotSeekBackward {
                    current,
                    target: record,
                });
            },
            _ => {},
        }
        if !self.move_to(record)? {
            return Err(Error::RecordNotFound(record));
        }
        self.field(index)
    }

    /// Seek forward to `record` and read a field by header name.
    fn field_at_named(&mut self, record: u64, name: &str) -> Result<Option<&str>> {
        let index = self.field_index(name)?;
        self.field_at(record, index)
    }

    /// Iterate over the remaining records.
    fn records(&mut self) -> Records<'_, Self>
    where
        Self: Sized,
    {
        Records::new(self)
    }
}

impl<T: TabularSource + ?Sized> RecordExt for T {}

fn text<S: TabularSource + ?Sized>(source: &mut S, index: usize) -> Result<&str> {
    Ok(source.field(index)?.unwrap_or(""))
}

fn conversion(field: usize, target: &'static str, value: &str) -> Error {
    Error::Conversion {
        field,
        target,
        value: value.to_string(),
    }
}
