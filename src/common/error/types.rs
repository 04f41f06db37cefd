//! Unified error types for the tabcursor library.
//!
//! Errors raised by the tokenizer carry a [`ParseErrorInfo`] with the raw
//! buffered text and the position of the failure so callers can report the
//! exact spot in the input.
use std::fmt;
use thiserror::Error;

/// Diagnostic context attached to missing-field and malformed-field errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorInfo {
    /// Raw buffered text at the failure point.
    pub raw_data: String,
    /// Character offset inside the raw buffer.
    pub position: usize,
    /// Index of the record being parsed (0 when no record was current yet).
    pub record_index: u64,
    /// Index of the field being parsed.
    pub field_index: usize,
}

impl ParseErrorInfo {
    pub fn new(raw_data: String, position: usize, record_index: u64, field_index: usize) -> Self {
        Self {
            raw_data,
            position,
            record_index,
            field_index,
        }
    }
}

impl fmt::Display for ParseErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "near record {} field {} at position {}, raw data: '{}'",
            self.record_index, self.field_index, self.position, self.raw_data
        )
    }
}

/// Main error type for tabcursor operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error from the underlying stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected reader configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The reader has been closed
    #[error("The reader has been closed")]
    Disposed,

    /// Field access before the first successful advance
    #[error("No current record")]
    NoCurrentRecord,

    /// Field position outside the established field count
    #[error("Field index {index} is out of range (field count is {count})")]
    FieldIndexOutOfRange { index: usize, count: usize },

    /// Header access on a reader configured without a header row
    #[error("The reader has no header row")]
    NoHeaders,

    /// Header lookup miss
    #[error("Field header '{0}' not found")]
    HeaderNotFound(String),

    /// Two header cells resolve to the same case-insensitive name
    #[error("Duplicate header '{name}' at columns {first} and {second}")]
    DuplicateHeader {
        name: String,
        first: usize,
        second: usize,
    },

    /// A record yielded fewer fields than the established field count
    #[error("Missing field {0}")]
    MissingField(ParseErrorInfo),

    /// A field could not be terminated according to the quoting rules
    #[error("Malformed field {0}")]
    MalformedField(ParseErrorInfo),

    /// The parse error handler asked to raise the notification again
    #[error("RaiseEvent is not a valid resolution inside a parse error handler ({0})")]
    InvalidRecoveryAction(ParseErrorInfo),

    /// Destination slice cannot hold the current record
    #[error("Destination holds {available} slots but the record has {needed} fields")]
    BufferTooSmall { needed: usize, available: usize },

    /// Forward-only cursor asked to move backwards
    #[error("Cannot move from record {current} back to record {target}")]
    CannotSeekBackward { current: u64, target: u64 },

    /// Record could not be reached before the end of the stream
    #[error("Cannot read record at index {0}")]
    RecordNotFound(u64),

    /// The underlying cursor moved since the iterator last observed it
    #[error("Enumeration invalidated: the reader was advanced outside of the iterator")]
    EnumerationInvalidated,

    /// Record count requested in deferred mode before counting
    #[error("Total record count is not available; call count_records() first")]
    CountUnavailable,

    /// Typed accessor could not convert the field text
    #[error("Cannot convert field {field} value '{value}' to {target}")]
    Conversion {
        field: usize,
        target: &'static str,
        value: String,
    },

    /// Unsupported feature or declared file type
    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

impl Error {
    /// Diagnostic context, when the error was raised by the tokenizer.
    pub fn parse_info(&self) -> Option<&ParseErrorInfo> {
        match self {
            Error::MissingField(info)
            | Error::MalformedField(info)
            | Error::InvalidRecoveryAction(info) => Some(info),
            _ => None,
        }
    }
}

/// Result type for tabcursor operations.
pub type Result<T> = std::result::Result<T, Error>;
