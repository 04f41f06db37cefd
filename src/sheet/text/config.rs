//! Configuration for parsing delimited text sources

use bitflags::bitflags;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::common::encoding::codepage_to_encoding;
use crate::common::{Error, Result};

/// Default buffer size in characters
pub const DEFAULT_BUFFER_SIZE: usize = 0x1000;

bitflags! {
    /// Which field values get leading and trailing whitespace stripped.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ValueTrimming: u8 {
        /// Trim unquoted fields
        const UNQUOTED = 0b01;
        /// Trim inside quoted fields
        const QUOTED = 0b10;
        /// Trim everything
        const ALL = Self::UNQUOTED.bits() | Self::QUOTED.bits();
    }
}

impl ValueTrimming {
    /// No trimming at all
    pub const NONE: Self = Self::empty();
}

/// Recovery action when a record yields fewer fields than the established count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingFieldAction {
    /// Report the field through the parse error policy
    #[default]
    ParseError,
    /// Substitute an empty string
    ReplaceByEmpty,
    /// Substitute an absent value
    ReplaceByNull,
}

/// Recovery action when a field cannot be terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseErrorAction {
    /// Notify the parse error handler and let it resolve the action
    #[default]
    RaiseEvent,
    /// Skip the rest of the line and continue with the next record
    AdvanceToNextLine,
    /// Fail the current operation
    ThrowException,
}

/// When the total record count is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrecountMode {
    /// Scan the whole stream at construction, then rewind
    #[default]
    Eager,
    /// Only count when `count_records()` is called
    Deferred,
}

/// Configuration for parsing delimited text files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Field delimiter character
    pub delimiter: char,
    /// Quote character for quoted fields
    pub quote: char,
    /// Escape character inside quoted fields
    pub escape: char,
    /// Comment character (lines starting with this are ignored)
    pub comment: Option<char>,
    /// Whether the first row contains headers
    pub has_headers: bool,
    /// Whitespace trimming mode
    pub trimming: ValueTrimming,
    /// Buffer size for reading, in characters
    pub buffer_size: usize,
    /// Whether quoted fields may span several lines
    pub multiline: bool,
    /// Whether blank lines are skipped
    pub skip_empty_lines: bool,
    /// Prefix for synthesized header names
    pub default_header_name: String,
    /// Default policy for short records
    pub missing_field_action: MissingFieldAction,
    /// Default policy for malformed fields
    pub parse_error_action: ParseErrorAction,
    /// When the total record count is computed
    pub precount: PrecountMode,
    /// Fallback encoding when the stream has no byte-order mark
    #[serde(with = "crate::common::encoding::serde_label")]
    pub encoding: &'static Encoding,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            escape: '"',
            comment: Some('#'),
            has_headers: true,
            trimming: ValueTrimming::UNQUOTED,
            buffer_size: DEFAULT_BUFFER_SIZE,
            multiline: true,
            skip_empty_lines: true,
            default_header_name: "Column".to_string(),
            missing_field_action: MissingFieldAction::ParseError,
            parse_error_action: ParseErrorAction::RaiseEvent,
            precount: PrecountMode::Eager,
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl TextConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the quote character
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    /// Set the escape character
    pub fn with_escape(mut self, escape: char) -> Self {
        self.escape = escape;
        self
    }

    /// Set the comment character (None to disable comments)
    pub fn with_comment(mut self, comment: Option<char>) -> Self {
        self.comment = comment;
        self
    }

    /// Set whether first row contains headers
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set the trimming mode
    pub fn with_trimming(mut self, trimming: ValueTrimming) -> Self {
        self.trimming = trimming;
        self
    }

    /// Set buffer size
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Enable/disable quoted fields spanning lines
    pub fn with_multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    /// Enable/disable blank line skipping
    pub fn with_skip_empty_lines(mut self, skip: bool) -> Self {
        self.skip_empty_lines = skip;
        self
    }

    /// Set the prefix used for synthesized header names
    pub fn with_default_header_name(mut self, name: impl Into<String>) -> Self {
        self.default_header_name = name.into();
        self
    }

    /// Set the missing field policy
    pub fn with_missing_field_action(mut self, action: MissingFieldAction) -> Self {
        self.missing_field_action = action;
        self
    }

    /// Set the malformed field policy
    pub fn with_parse_error_action(mut self, action: ParseErrorAction) -> Self {
        self.parse_error_action = action;
        self
    }

    /// Set when the record count is computed
    pub fn with_precount(mut self, precount: PrecountMode) -> Self {
        self.precount = precount;
        self
    }

    /// Set the fallback encoding
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the fallback encoding from a Windows codepage number
    pub fn with_codepage(self, codepage: u32) -> Result<Self> {
        let encoding = codepage_to_encoding(codepage)
            .ok_or_else(|| Error::InvalidConfig(format!("unsupported codepage {}", codepage)))?;
        Ok(self.with_encoding(encoding))
    }

    /// Create CSV (comma-separated) configuration
    pub fn csv() -> Self {
        Self::new()
    }

    /// Create TSV (tab-separated) configuration
    pub fn tsv() -> Self {
        Self::new().with_delimiter('\t')
    }

    /// Create PRN (semicolon-separated) configuration
    pub fn prn() -> Self {
        Self::new().with_delimiter(';')
    }

    /// Create pipe-separated configuration
    pub fn pipe() -> Self {
        Self::new().with_delimiter('|')
    }

    /// Reject configurations the tokenizer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::InvalidConfig(
                "buffer size must be greater than zero".to_string(),
            ));
        }
        if self.delimiter == self.quote {
            return Err(Error::InvalidConfig(format!(
                "delimiter and quote are both {:?}",
                self.delimiter
            )));
        }
        if self.delimiter == '\n' || self.quote == '\n' {
            return Err(Error::InvalidConfig(
                "line feed cannot be used as delimiter or quote".to_string(),
            ));
        }
        if self.default_header_name.is_empty() {
            return Err(Error::InvalidConfig(
                "default header name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
