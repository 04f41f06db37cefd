//! Header row resolution

use std::collections::HashMap;

use log::debug;

use crate::common::{Error, Result};

/// Column names taken from the header row, with case-insensitive lookup.
///
/// Built once when the reader initializes and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    names: Vec<String>,
    indexes: HashMap<String, usize>,
}

impl HeaderMap {
    /// Build the map from the scanned header cells.
    ///
    /// Empty or blank cells are named `<prefix><index>`. Two names that are
    /// equal ignoring case are rejected.
    pub fn from_row(cells: &[Option<String>], prefix: &str) -> Result<Self> {
        let mut names = Vec::with_capacity(cells.len());
        let mut indexes = HashMap::with_capacity(cells.len());

        for (i, cell) in cells.iter().enumerate() {
            let name = match cell.as_deref() {
                Some(text) if !text.trim().is_empty() => text.to_string(),
                _ => format!("{}{}", prefix, i),
            };
            if let Some(&first) = indexes.get(&fold(&name)) {
                return Err(Error::DuplicateHeader {
                    name,
                    first,
                    second: i,
                });
            }
            indexes.insert(fold(&name), i);
            names.push(name);
        }

        debug!("resolved {} header columns", names.len());
        Ok(HeaderMap { names, indexes })
    }

    /// Header names in column order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Header name of a column
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Column index of a header, ignoring case
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indexes.get(&fold(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[inline]
fn fold(name: &str) -> String {
    name.to_lowercase()
}
