//! Forward-only record cursor over a delimited text stream

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use log::{debug, warn};

use super::config::{MissingFieldAction, PrecountMode, TextConfig};
use super::headers::HeaderMap;
use super::parser::{FieldEnd, Tokenizer};
use super::recovery::{ParseErrorEvent, ParseErrorHandler, ParseErrorKind, RecoveryPolicy};
use crate::common::{Error, ParseErrorInfo, Result};
use crate::sheet::traits::TabularSource;

/// Streaming reader for delimited text.
///
/// Records are produced one at a time by [`advance`](Self::advance). Fields of
/// the current record are scanned lazily, left to right, the first time they
/// are requested and cached until the next advance.
///
/// The field count is fixed by the first line of the stream (the header row
/// when one is configured). Shorter records go through the missing-field
/// policy; surplus fields are discarded.
///
/// # Example
///
/// ```rust
/// use tabcursor::sheet::text::{DelimitedReader, TextConfig};
///
/// let mut reader = DelimitedReader::from_bytes("name,qty\nbolt,4\nnut,10\n", TextConfig::csv())?;
/// assert_eq!(reader.total_record_count()?, 2);
///
/// while reader.advance()? {
///     let qty = reader.field(1)?.unwrap_or_default();
///     println!("{qty}");
/// }
/// # Ok::<(), tabcursor::common::Error>(())
/// ```
pub struct DelimitedReader<R> {
    config: TextConfig,
    tokenizer: Tokenizer<R>,
    recovery: RecoveryPolicy,
    headers: Option<HeaderMap>,
    /// Materialized fields of the current record, `next_field` of them
    fields: Vec<Option<String>>,
    field_count: usize,
    next_field: usize,
    record_index: Option<u64>,
    version: u64,
    total_records: Option<u64>,
    initialized: bool,
    /// Without a header row the first line is scanned during initialization
    /// and served as record 0 by the next advance.
    first_record_cached: bool,
    eol: bool,
    exhausted: bool,
    missing_field_flag: bool,
    parse_error_flag: bool,
    disposed: bool,
}

impl<R: Read + Seek> DelimitedReader<R> {
    /// Create a reader over an open, seekable stream.
    ///
    /// With [`PrecountMode::Eager`] the whole stream is scanned once to count
    /// the records, then rewound.
    pub fn new(reader: R, config: TextConfig) -> Result<Self> {
        Self::build(reader, config, None)
    }

    /// Same as [`new`](Self::new), with the handler subscribed before the
    /// precount runs.
    pub fn with_parse_error_handler<F>(reader: R, config: TextConfig, handler: F) -> Result<Self>
    where
        F: FnMut(&mut ParseErrorEvent) + Send + 'static,
    {
        Self::build(reader, config, Some(Box::new(handler)))
    }

    fn build(reader: R, config: TextConfig, handler: Option<ParseErrorHandler>) -> Result<Self> {
        config.validate()?;
        let tokenizer = Tokenizer::new(reader, &config)?;
        debug!(
            "delimited reader created: delimiter {:?}, quote {:?}, buffer {} chars, headers {}",
            config.delimiter,
            config.quote,
            tokenizer.buffer().capacity(),
            config.has_headers
        );

        let mut reader = DelimitedReader {
            recovery: RecoveryPolicy::new(config.parse_error_action, handler),
            config,
            tokenizer,
            headers: None,
            fields: Vec::new(),
            field_count: 0,
            next_field: 0,
            record_index: None,
            version: 0,
            total_records: None,
            initialized: false,
            first_record_cached: false,
            eol: false,
            exhausted: false,
            missing_field_flag: false,
            parse_error_flag: false,
            disposed: false,
        };
        if reader.config.precount == PrecountMode::Eager {
            reader.count_records()?;
        }
        Ok(reader)
    }

    /// Configuration the reader was created with
    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    /// Subscribe a handler to parse error notifications, replacing any previous one.
    pub fn set_parse_error_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut ParseErrorEvent) + Send + 'static,
    {
        self.recovery.set_handler(Some(Box::new(handler)));
    }

    /// Drop the parse error handler.
    pub fn clear_parse_error_handler(&mut self) {
        self.recovery.set_handler(None);
    }

    /// Move to the next record. Returns `false` at end of stream.
    pub fn advance(&mut self) -> Result<bool> {
        self.check_disposed()?;
        self.ensure_initialized()?;
        if self.exhausted {
            return Ok(false);
        }
        if self.first_record_cached {
            self.first_record_cached = false;
            self.record_index = Some(0);
            self.version += 1;
            return Ok(true);
        }

        if self.record_index.is_some() {
            self.finish_record()?;
        }
        if !self.tokenizer.skip_empty_and_comment_lines()? {
            self.exhausted = true;
            self.fields.clear();
            return Ok(false);
        }

        self.fields.clear();
        self.next_field = 0;
        self.eol = false;
        self.missing_field_flag = false;
        self.parse_error_flag = false;
        self.record_index = Some(self.record_index.map_or(0, |i| i + 1));
        self.version += 1;
        Ok(true)
    }

    /// Field of the current record, `None` when the value is absent.
    pub fn field(&mut self, index: usize) -> Result<Option<&str>> {
        self.materialize(index)?;
        Ok(self.fields[index].as_deref())
    }

    /// Number of fields in every record.
    pub fn field_count(&mut self) -> Result<usize> {
        self.check_disposed()?;
        self.ensure_initialized()?;
        Ok(self.field_count)
    }

    /// Header names, in column order.
    pub fn headers(&mut self) -> Result<&[String]> {
        self.check_disposed()?;
        if !self.config.has_headers {
            return Err(Error::NoHeaders);
        }
        self.ensure_initialized()?;
        Ok(self.headers.as_ref().map_or(&[][..], HeaderMap::names))
    }

    /// Column index of a header name, ignoring case.
    pub fn field_index(&mut self, name: &str) -> Result<usize> {
        self.check_disposed()?;
        if !self.config.has_headers {
            return Err(Error::NoHeaders);
        }
        self.ensure_initialized()?;
        self.headers
            .as_ref()
            .and_then(|headers| headers.index_of(name))
            .ok_or_else(|| Error::HeaderNotFound(name.to_string()))
    }

    /// Column name: the header when present, otherwise the synthesized default.
    pub fn column_name(&mut self, index: usize) -> Result<String> {
        let count = self.field_count()?;
        if index >= count {
            return Err(Error::FieldIndexOutOfRange { index, count });
        }
        Ok(match self.headers.as_ref().and_then(|h| h.name(index)) {
            Some(name) => name.to_string(),
            None => format!("{}{}", self.config.default_header_name, index),
        })
    }

    /// Index of the current record, `None` before the first advance and after the last.
    pub fn current_record_index(&self) -> Option<u64> {
        if self.exhausted { None } else { self.record_index }
    }

    /// Total number of data records.
    ///
    /// Fails with [`Error::CountUnavailable`] in deferred mode until
    /// [`count_records`](Self::count_records) has run.
    pub fn total_record_count(&self) -> Result<u64> {
        self.check_disposed()?;
        self.total_records.ok_or(Error::CountUnavailable)
    }

    /// Scan the whole stream to count the records, then rewind.
    ///
    /// The cursor is reset to before the first record.
    pub fn count_records(&mut self) -> Result<u64> {
        self.rewind()?;
        let mut count = 0;
        while self.advance()? {
            count += 1;
        }
        self.rewind()?;
        self.total_records = Some(count);
        debug!("precount found {} records", count);
        Ok(count)
    }

    /// Seek the stream back to its origin and reset the cursor state.
    ///
    /// The origin is the stream position when the reader was created, which
    /// is offset 0 only if the stream was handed over unread. The header row
    /// is read again on the next access.
    pub fn rewind(&mut self) -> Result<()> {
        self.check_disposed()?;
        self.tokenizer.buffer_mut().rewind()?;
        self.headers = None;
        self.fields.clear();
        self.field_count = 0;
        self.next_field = 0;
        self.record_index = None;
        self.initialized = false;
        self.first_record_cached = false;
        self.eol = false;
        self.exhausted = false;
        self.missing_field_flag = false;
        self.parse_error_flag = false;
        self.version += 1;
        Ok(())
    }

    /// Whether a substitution happened in the current record
    pub fn missing_field_flag(&self) -> bool {
        self.missing_field_flag
    }

    /// Whether the current record was cut short by a malformed field
    pub fn parse_error_flag(&self) -> bool {
        self.parse_error_flag
    }

    /// Whether the underlying stream has been read to the end.
    pub fn end_of_stream(&self) -> bool {
        self.tokenizer.buffer().is_eof()
    }

    /// Raw text currently held in the buffer.
    pub fn raw_buffer(&self) -> String {
        self.tokenizer.buffer().raw_text()
    }

    /// Mutation stamp, bumped whenever the current record changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn ensure_initialized(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let mut cells = Vec::new();
        loop {
            cells.clear();
            if !self.tokenizer.skip_empty_and_comment_lines()? {
                break;
            }
            if self.scan_first_line(&mut cells)? {
                break;
            }
            self.parse_error_flag = false;
        }
        self.field_count = cells.len();

        if self.config.has_headers {
            self.headers = Some(HeaderMap::from_row(&cells, &self.config.default_header_name)?);
        } else if cells.is_empty() {
            self.exhausted = true;
        } else {
            self.next_field = cells.len();
            self.fields = cells;
            self.eol = true;
            self.first_record_cached = true;
        }
        self.initialized = true;
        Ok(())
    }

    /// Scan every field of the first line. Returns `false` if the line was
    /// dropped by the malformed-field policy.
    fn scan_first_line(&mut self, cells: &mut Vec<Option<String>>) -> Result<bool> {
        loop {
            let field = self.tokenizer.read_field(false)?;
            match field.end {
                FieldEnd::Delimiter => cells.push(field.value),
                FieldEnd::LineEnd | FieldEnd::EndOfStream => {
                    cells.push(field.value);
                    return Ok(true);
                },
                FieldEnd::Malformed => {
                    self.resolve_malformed(cells.len())?;
                    return Ok(false);
                },
            }
        }
    }

    /// Position the tokenizer at the start of the next line.
    fn finish_record(&mut self) -> Result<()> {
        if self.eol {
            return Ok(());
        }
        if !self.config.multiline {
            self.tokenizer.skip_to_next_line()?;
        } else {
            let mut index = self.next_field;
            loop {
                let field = self.tokenizer.read_field(true)?;
                match field.end {
                    FieldEnd::Delimiter => index += 1,
                    FieldEnd::LineEnd | FieldEnd::EndOfStream => break,
                    FieldEnd::Malformed => {
                        self.eol = true;
                        return self.resolve_malformed(index);
                    },
                }
            }
            if index >= self.field_count {
                warn!(
                    "record {} has {} fields, {} expected; surplus discarded",
                    self.record_index.unwrap_or(0),
                    index + 1,
                    self.field_count
                );
            }
        }
        self.eol = true;
        Ok(())
    }

    fn materialize(&mut self, index: usize) -> Result<()> {
        self.check_disposed()?;
        if self.current_record_index().is_none() {
            return Err(Error::NoCurrentRecord);
        }
        if index >= self.field_count {
            return Err(Error::FieldIndexOutOfRange {
                index,
                count: self.field_count,
            });
        }

        while self.next_field <= index {
            let position = self.next_field;
            let value = if self.parse_error_flag {
                None
            } else if self.eol {
                self.handle_missing_field(position)?
            } else {
                let field = self.tokenizer.read_field(false)?;
                match field.end {
                    FieldEnd::Delimiter => field.value,
                    FieldEnd::LineEnd | FieldEnd::EndOfStream => {
                        self.eol = true;
                        field.value
                    },
                    FieldEnd::Malformed => {
                        self.eol = true;
                        self.resolve_malformed(position)?;
                        None
                    },
                }
            };
            self.fields.push(value);
            self.next_field += 1;
        }
        Ok(())
    }

    fn handle_missing_field(&mut self, index: usize) -> Result<Option<String>> {
        self.missing_field_flag = true;
        match self.config.missing_field_action {
            MissingFieldAction::ReplaceByEmpty => Ok(Some(String::new())),
            MissingFieldAction::ReplaceByNull => Ok(None),
            MissingFieldAction::ParseError => {
                let info = self.error_info(index);
                self.recovery.resolve(ParseErrorKind::MissingField, info)?;
                Ok(None)
            },
        }
    }

    /// Flag the record, let the policy decide, and leave the tokenizer on the next line.
    fn resolve_malformed(&mut self, index: usize) -> Result<()> {
        self.parse_error_flag = true;
        let info = self.error_info(index);
        let outcome = self.recovery.resolve(ParseErrorKind::MalformedField, info);
        self.tokenizer.skip_to_next_line()?;
        outcome
    }

    fn error_info(&self, field_index: usize) -> ParseErrorInfo {
        let buffer = self.tokenizer.buffer();
        ParseErrorInfo::new(
            buffer.raw_text(),
            buffer.position(),
            self.record_index.unwrap_or(0),
            field_index,
        )
    }
}

impl<R> DelimitedReader<R> {
    /// Release the stream. Every later operation fails with [`Error::Disposed`].
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.tokenizer.buffer_mut().release();
        self.fields = Vec::new();
        self.headers = None;
        debug!("delimited reader closed");
    }

    /// Whether [`close`](Self::close) has run
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn check_disposed(&self) -> Result<()> {
        if self.disposed || self.tokenizer.buffer().is_released() {
            return Err(Error::Disposed);
        }
        Ok(())
    }
}

impl<R> Drop for DelimitedReader<R> {
    fn drop(&mut self) {
        self.close();
    }
}

impl DelimitedReader<Cursor<Vec<u8>>> {
    /// Create a reader over an in-memory buffer
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, config: TextConfig) -> Result<Self> {
        Self::new(Cursor::new(bytes.into()), config)
    }
}

impl DelimitedReader<BufReader<File>> {
    /// Open a CSV file with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_path_with_config(path, TextConfig::default())
    }

    /// Open a file with a custom configuration
    pub fn from_path_with_config<P: AsRef<Path>>(path: P, config: TextConfig) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), config)
    }
}

impl<R: Read + Seek> TabularSource for DelimitedReader<R> {
    fn advance(&mut self) -> Result<bool> {
        DelimitedReader::advance(self)
    }

    fn current_record_index(&self) -> Option<u64> {
        DelimitedReader::current_record_index(self)
    }

    fn total_record_count(&self) -> Result<u64> {
        DelimitedReader::total_record_count(self)
    }

    fn field_count(&mut self) -> Result<usize> {
        DelimitedReader::field_count(self)
    }

    fn field(&mut self, index: usize) -> Result<Option<&str>> {
        DelimitedReader::field(self, index)
    }

    fn headers(&mut self) -> Result<&[String]> {
        DelimitedReader::headers(self)
    }

    fn field_index(&mut self, name: &str) -> Result<usize> {
        DelimitedReader::field_index(self, name)
    }

    fn column_name(&mut self, index: usize) -> Result<String> {
        DelimitedReader::column_name(self, index)
    }

    fn rewind(&mut self) -> Result<()> {
        DelimitedReader::rewind(self)
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn missing_field_flag(&self) -> bool {
        self.missing_field_flag
    }

    fn parse_error_flag(&self) -> bool {
        self.parse_error_flag
    }
}
