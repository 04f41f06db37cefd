//! Format dispatch for tabular sources.

use std::io::{Read, Seek};
use std::path::Path;

use super::memory::MemoryTable;
use super::text::{DelimitedReader, TextConfig};
use super::traits::TabularSource;
use crate::common::{Error, Result};

/// Declared format of a tabular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Comma-separated values (.csv)
    Csv,
    /// Tab-separated values (.tsv, .tab)
    Tsv,
    /// Semicolon-separated values (.prn)
    Prn,
    /// Legacy Excel Binary Format (.xls)
    Excel,
    /// Office Open XML Workbook (.xlsx)
    ExcelX,
}

impl FileType {
    /// Map a file extension, without the dot and ignoring case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(FileType::Csv),
            "tsv" | "tab" => Some(FileType::Tsv),
            "prn" => Some(FileType::Prn),
            "xls" => Some(FileType::Excel),
            "xlsx" => Some(FileType::ExcelX),
            _ => None,
        }
    }

    /// Map the extension of a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether the format is delimited text.
    pub fn is_text(self) -> bool {
        matches!(self, FileType::Csv | FileType::Tsv | FileType::Prn)
    }

    /// Parser configuration for a text format, `None` for spreadsheet formats.
    pub fn default_config(self) -> Option<TextConfig> {
        match self {
            FileType::Csv => Some(TextConfig::csv()),
            FileType::Tsv => Some(TextConfig::tsv()),
            FileType::Prn => Some(TextConfig::prn()),
            FileType::Excel | FileType::ExcelX => None,
        }
    }
}

/// A tabular source of any supported format.
///
/// Selected once by [`open_reader`]; every operation dispatches with a
/// single `match`.
#[allow(clippy::large_enum_variant)]
pub enum TabularReader<R> {
    /// Delimited text parsed on the fly
    Delimited(DelimitedReader<R>),
    /// Records decoded up front
    Memory(MemoryTable),
}

impl<R> From<DelimitedReader<R>> for TabularReader<R> {
    fn from(reader: DelimitedReader<R>) -> Self {
        TabularReader::Delimited(reader)
    }
}

impl<R> From<MemoryTable> for TabularReader<R> {
    fn from(table: MemoryTable) -> Self {
        TabularReader::Memory(table)
    }
}

/// Open a reader for a stream of the declared type.
///
/// Spreadsheet types are decoded by a separate component and are reported as
/// [`Error::Unsupported`] here.
pub fn open_reader<R: Read + Seek>(
    reader: R,
    file_type: FileType,
    has_headers: bool,
) -> Result<TabularReader<R>> {
    let Some(config) = file_type.default_config() else {
        return Err(Error::Unsupported(format!(
            "{:?} files need a spreadsheet decoder",
            file_type
        )));
    };
    let reader = DelimitedReader::new(reader, config.with_headers(has_headers))?;
    Ok(TabularReader::Delimited(reader))
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            TabularReader::Delimited($inner) => $body,
            TabularReader::Memory($inner) => $body,
        }
    };
}

impl<R: Read + Seek> TabularSource for TabularReader<R> {
    fn advance(&mut self) -> Result<bool> {
        dispatch!(self, inner => inner.advance())
    }

    fn current_record_index(&self) -> Option<u64> {
        dispatch!(self, inner => TabularSource::current_record_index(inner))
    }

    fn total_record_count(&self) -> Result<u64> {
        dispatch!(self, inner => TabularSource::total_record_count(inner))
    }

    fn field_count(&mut self) -> Result<usize> {
        dispatch!(self, inner => TabularSource::field_count(inner))
    }

    fn field(&mut self, index: usize) -> Result<Option<&str>> {
        dispatch!(self, inner => TabularSource::field(inner, index))
    }

    fn headers(&mut self) -> Result<&[String]> {
        dispatch!(self, inner => TabularSource::headers(inner))
    }

    fn field_index(&mut self, name: &str) -> Result<usize> {
        dispatch!(self, inner => TabularSource::field_index(inner, name))
    }

    fn column_name(&mut self, index: usize) -> Result<String> {
        dispatch!(self, inner => TabularSource::column_name(inner, index))
    }

    fn rewind(&mut self) -> Result<()> {
        dispatch!(self, inner => TabularSource::rewind(inner))
    }

    fn version(&self) -> u64 {
        dispatch!(self, inner => TabularSource::version(inner))
    }

    fn missing_field_flag(&self) -> bool {
        dispatch!(self, inner => TabularSource::missing_field_flag(inner))
    }

    fn parse_error_flag(&self) -> bool {
        dispatch!(self, inner => TabularSource::parse_error_flag(inner))
    }
}
