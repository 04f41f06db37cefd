//! In-memory table implementing [`TabularSource`].
//!
//! Holds records that were already decoded elsewhere, for example by a
//! spreadsheet decoder, or snapshots another source with [`MemoryTable::load`].

use log::debug;

use super::record::RecordExt;
use super::text::HeaderMap;
use super::traits::TabularSource;
use crate::common::{Error, Result};

/// Fully materialized table with an optional header row.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    headers: Option<HeaderMap>,
    rows: Vec<Vec<Option<String>>>,
    field_count: usize,
    position: Option<usize>,
    version: u64,
}

impl MemoryTable {
    /// Build a table from rows and an optional header row.
    ///
    /// The field count comes from the header row, or from the first row when
    /// there is none. Short rows read as absent fields; extra cells are ignored.
    pub fn from_rows(headers: Option<Vec<String>>, rows: Vec<Vec<Option<String>>>) -> Result<Self> {
        let headers = headers
            .map(|names| {
                let cells: Vec<Option<String>> = names.into_iter().map(Some).collect();
                HeaderMap::from_row(&cells, "Column")
            })
            .transpose()?;
        let field_count = match &headers {
            Some(headers) => headers.len(),
            None => rows.first().map_or(0, Vec::len),
        };
        Ok(MemoryTable {
            headers,
            rows,
            field_count,
            position: None,
            version: 0,
        })
    }

    /// Read every remaining record of `source` into memory.
    pub fn load<S: TabularSource + ?Sized>(source: &mut S) -> Result<Self> {
        let headers = match source.headers() {
            Ok(names) => Some(names.to_vec()),
            Err(Error::NoHeaders) => None,
            Err(e) => return Err(e),
        };
        let mut rows = Vec::new();
        while source.advance()? {
            rows.push(source.record()?);
        }
        debug!("loaded {} records into memory", rows.len());

        let mut table = Self::from_rows(headers, rows)?;
        if table.headers.is_none() {
            table.field_count = source.field_count()?;
        }
        Ok(table)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TabularSource for MemoryTable {
    fn advance(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        if next > self.rows.len() {
            return Ok(false);
        }
        self.position = Some(next);
        if next == self.rows.len() {
            return Ok(false);
        }
        self.version += 1;
        Ok(true)
    }

    fn current_record_index(&self) -> Option<u64> {
        self.position
            .filter(|&p| p < self.rows.len())
            .map(|p| p as u64)
    }

    fn total_record_count(&self) -> Result<u64> {
        Ok(self.rows.len() as u64)
    }

    fn field_count(&mut self) -> Result<usize> {
        Ok(self.field_count)
    }

    fn field(&mut self, index: usize) -> Result<Option<&str>> {
        let row = self
            .position
            .and_then(|p| self.rows.get(p))
            .ok_or(Error::NoCurrentRecord)?;
        if index >= self.field_count {
            return Err(Error::FieldIndexOutOfRange {
                index,
                count: self.field_count,
            });
        }
        Ok(row.get(index).and_then(Option::as_deref))
    }

    fn headers(&mut self) -> Result<&[String]> {
        self.headers
            .as_ref()
            .map(HeaderMap::names)
            .ok_or(Error::NoHeaders)
    }

    fn field_index(&mut self, name: &str) -> Result<usize> {
        let headers = self.headers.as_ref().ok_or(Error::NoHeaders)?;
        headers
            .index_of(name)
            .ok_or_else(|| Error::HeaderNotFound(name.to_string()))
    }

    fn rewind(&mut self) -> Result<()> {
        self.position = None;
        self.version += 1;
        Ok(())
    }

    fn version(&self) -> u64 {
        self.version
    }
}
