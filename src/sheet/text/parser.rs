//! Field tokenizer for delimited text formats

use std::io::{Read, Seek};

use super::buffer::CharBuffer;
use super::config::{TextConfig, ValueTrimming};
use crate::common::Result;

/// How a scanned field ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldEnd {
    /// A delimiter follows; more fields remain on the line.
    Delimiter,
    /// The line terminator was consumed.
    LineEnd,
    /// The stream ended.
    EndOfStream,
    /// The field broke the quoting rules; nothing after the failure point was consumed.
    Malformed,
}

/// One field as produced by [`Tokenizer::read_field`].
#[derive(Debug)]
pub(crate) struct ScannedField {
    /// Field text, `None` when discarding or malformed.
    pub value: Option<String>,
    pub end: FieldEnd,
}

/// Position of the scanner inside a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Nothing consumed yet, leading whitespace may still be skipped.
    FieldStart,
    InUnquotedField,
    /// Just after the opening quote, leading whitespace may still be skipped.
    QuotedFieldStart,
    InQuotedField,
    /// The previous character was an escape; the next one is literal.
    AfterEscape,
    /// The closing quote was consumed.
    AfterClosingQuote,
}

/// Streaming tokenizer for delimited text
pub(crate) struct Tokenizer<R> {
    buffer: CharBuffer<R>,
    delimiter: char,
    quote: char,
    escape: char,
    comment: Option<char>,
    trimming: ValueTrimming,
    multiline: bool,
    skip_empty_lines: bool,
}

impl<R> Tokenizer<R> {
    pub(crate) fn buffer(&self) -> &CharBuffer<R> {
        &self.buffer
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut CharBuffer<R> {
        &mut self.buffer
    }
}

impl<R: Read + Seek> Tokenizer<R> {
    /// Create a new tokenizer over a stream
    pub(crate) fn new(reader: R, config: &TextConfig) -> Result<Self> {
        Ok(Tokenizer {
            buffer: CharBuffer::new(reader, config.buffer_size, config.encoding)?,
            delimiter: config.delimiter,
            quote: config.quote,
            escape: config.escape,
            comment: config.comment,
            trimming: config.trimming,
            multiline: config.multiline,
            skip_empty_lines: config.skip_empty_lines,
        })
    }

    /// Scan the next field starting at the cursor.
    ///
    /// With `discard` set the text is not accumulated. A malformed field
    /// leaves the cursor at the offending character so the caller can decide
    /// how to recover.
    pub(crate) fn read_field(&mut self, discard: bool) -> Result<ScannedField> {
        let mut value = String::new();
        let mut state = ScanState::FieldStart;

        loop {
            let Some(ch) = self.buffer.current()? else {
                return Ok(match state {
                    ScanState::QuotedFieldStart
                    | ScanState::InQuotedField
                    | ScanState::AfterEscape => Self::malformed(),
                    ScanState::InUnquotedField => {
                        self.finish_unquoted(value, discard, FieldEnd::EndOfStream)
                    },
                    ScanState::FieldStart | ScanState::AfterClosingQuote => {
                        Self::finish(value, discard, FieldEnd::EndOfStream)
                    },
                });
            };

            match state {
                ScanState::FieldStart => {
                    if self.trimming.contains(ValueTrimming::UNQUOTED) && self.is_whitespace(ch) {
                        self.buffer.bump();
                    } else if ch == self.quote {
                        self.buffer.bump();
                        state = ScanState::QuotedFieldStart;
                    } else {
                        state = ScanState::InUnquotedField;
                    }
                },
                ScanState::InUnquotedField => {
                    if ch == self.delimiter {
                        self.buffer.bump();
                        return Ok(self.finish_unquoted(value, discard, FieldEnd::Delimiter));
                    }
                    if self.is_newline(ch) {
                        self.consume_line_end()?;
                        return Ok(self.finish_unquoted(value, discard, FieldEnd::LineEnd));
                    }
                    if !discard {
                        value.push(ch);
                    }
                    self.buffer.bump();
                },
                ScanState::QuotedFieldStart => {
                    if self.trimming.contains(ValueTrimming::QUOTED) && self.is_whitespace(ch) {
                        self.buffer.bump();
                    } else {
                        state = ScanState::InQuotedField;
                    }
                },
                ScanState::InQuotedField => {
                    if ch == self.escape
                        && (self.escape != self.quote
                            || self.buffer.peek_next()? == Some(self.quote))
                    {
                        self.buffer.bump();
                        state = ScanState::AfterEscape;
                    } else if ch == self.quote {
                        self.buffer.bump();
                        if !discard && self.trimming.contains(ValueTrimming::QUOTED) {
                            self.trim_end(&mut value);
                        }
                        state = ScanState::AfterClosingQuote;
                    } else if !self.multiline && self.is_newline(ch) {
                        self.consume_line_end()?;
                        return Ok(Self::finish(value, discard, FieldEnd::LineEnd));
                    } else {
                        if !discard {
                            value.push(ch);
                        }
                        self.buffer.bump();
                    }
                },
                ScanState::AfterEscape => {
                    if !discard {
                        value.push(ch);
                    }
                    self.buffer.bump();
                    state = ScanState::InQuotedField;
                },
                ScanState::AfterClosingQuote => {
                    if ch == self.delimiter {
                        self.buffer.bump();
                        return Ok(Self::finish(value, discard, FieldEnd::Delimiter));
                    }
                    if self.is_newline(ch) {
                        self.consume_line_end()?;
                        return Ok(Self::finish(value, discard, FieldEnd::LineEnd));
                    }
                    if self.is_whitespace(ch) {
                        self.buffer.bump();
                    } else {
                        return Ok(Self::malformed());
                    }
                },
            }
        }
    }

    /// Skip comment lines and, when enabled, blank lines before a record.
    ///
    /// Returns `false` when the stream ends before another record starts.
    pub(crate) fn skip_empty_and_comment_lines(&mut self) -> Result<bool> {
        let mut blank_prefix = false;
        loop {
            let Some(ch) = self.buffer.current()? else {
                // A kept blank line counts as a record even without a terminator.
                return Ok(blank_prefix && !self.skip_empty_lines);
            };
            if Some(ch) == self.comment {
                self.skip_to_next_line()?;
                blank_prefix = false;
            } else if self.skip_empty_lines && self.is_newline(ch) {
                self.consume_line_end()?;
                blank_prefix = false;
            } else if self.trimming.contains(ValueTrimming::UNQUOTED) && self.is_whitespace(ch) {
                // Leading blanks of an unquoted field are trimmed anyway.
                self.buffer.bump();
                blank_prefix = true;
            } else {
                return Ok(true);
            }
        }
    }

    /// Consume everything up to and including the next line terminator.
    pub(crate) fn skip_to_next_line(&mut self) -> Result<()> {
        while let Some(ch) = self.buffer.current()? {
            if self.is_newline(ch) {
                return self.consume_line_end();
            }
            self.buffer.bump();
        }
        Ok(())
    }

    /// Consume a line terminator at the cursor (`\n`, `\r` or `\r\n`).
    fn consume_line_end(&mut self) -> Result<()> {
        match self.buffer.current()? {
            Some('\r') if self.delimiter != '\r' => {
                self.buffer.bump();
                if self.buffer.current()? == Some('\n') {
                    self.buffer.bump();
                }
            },
            Some('\n') => self.buffer.bump(),
            _ => {},
        }
        Ok(())
    }

    #[inline]
    fn is_newline(&self, ch: char) -> bool {
        ch == '\n' || (ch == '\r' && self.delimiter != '\r')
    }

    /// Space and tab, plus Unicode space separators above Latin-1.
    /// The delimiter is never whitespace.
    #[inline]
    fn is_whitespace(&self, ch: char) -> bool {
        if ch == self.delimiter {
            return false;
        }
        match ch {
            ' ' | '\t' => true,
            '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => true,
            _ => false,
        }
    }

    fn trim_end(&self, value: &mut String) {
        let kept = value.trim_end_matches(|c: char| self.is_whitespace(c)).len();
        value.truncate(kept);
    }

    fn finish_unquoted(&self, mut value: String, discard: bool, end: FieldEnd) -> ScannedField {
        if !discard && self.trimming.contains(ValueTrimming::UNQUOTED) {
            self.trim_end(&mut value);
        }
        Self::finish(value, discard, end)
    }

    fn finish(value: String, discard: bool, end: FieldEnd) -> ScannedField {
        ScannedField {
            value: (!discard).then_some(value),
            end,
        }
    }

    fn malformed() -> ScannedField {
        ScannedField {
            value: None,
            end: FieldEnd::Malformed,
        }
    }
}
