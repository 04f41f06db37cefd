//! Fixed-capacity character buffer refilled from the underlying stream

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

use encoding_rs::{CoderResult, Decoder, Encoding};
use log::trace;

use crate::common::{Error, Result};

/// Buffered input cursor over a seekable byte stream.
///
/// Bytes are decoded with `encoding_rs` into a small queue of pending
/// characters; `refill` moves up to `capacity` of them into the buffer,
/// replacing its contents. Decoding is incremental, so a multi-byte sequence
/// split across two reads never produces a partial character.
pub(crate) struct CharBuffer<R> {
    reader: Option<R>,
    origin: u64,
    encoding: &'static Encoding,
    decoder: Decoder,
    bytes: Vec<u8>,
    pending: VecDeque<char>,
    drained: bool,
    chars: Vec<char>,
    pos: usize,
    capacity: usize,
    eof: bool,
}

impl<R: Read + Seek> CharBuffer<R> {
    /// Wrap a stream, clamping the capacity to the remaining stream length.
    pub(crate) fn new(mut reader: R, capacity: usize, encoding: &'static Encoding) -> Result<Self> {
        let origin = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(origin))?;

        let remaining = end.saturating_sub(origin);
        let capacity = if remaining > 0 {
            capacity.min(usize::try_from(remaining).unwrap_or(usize::MAX))
        } else {
            capacity
        };

        Ok(CharBuffer {
            reader: Some(reader),
            origin,
            encoding,
            decoder: encoding.new_decoder(),
            bytes: vec![0; capacity],
            pending: VecDeque::new(),
            drained: false,
            chars: Vec::with_capacity(capacity),
            pos: 0,
            capacity,
            eof: false,
        })
    }

    /// Replace the buffer contents with the next characters of the stream.
    ///
    /// Returns `false` once the stream is exhausted; end-of-stream is then
    /// latched and the last window stays readable for diagnostics, with the
    /// cursor parked after it.
    pub(crate) fn refill(&mut self) -> Result<bool> {
        if self.reader.is_none() {
            return Err(Error::Disposed);
        }
        if self.eof {
            return Ok(false);
        }

        while self.pending.is_empty() {
            if !self.decode_more()? {
                trace!("end of stream reached");
                self.eof = true;
                self.pos = self.chars.len();
                return Ok(false);
            }
        }

        self.chars.clear();
        self.pos = 0;
        let take = self.capacity.min(self.pending.len());
        self.chars.extend(self.pending.drain(..take));
        trace!("buffer refilled with {} chars", self.chars.len());
        Ok(true)
    }

    /// Read one chunk of bytes and decode it into the pending queue.
    ///
    /// Returns `false` when nothing more will ever be decoded.
    fn decode_more(&mut self) -> Result<bool> {
        if self.drained {
            return Ok(false);
        }
        let reader = self.reader.as_mut().ok_or(Error::Disposed)?;
        let read = loop {
            match reader.read(&mut self.bytes) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };

        let last = read == 0;
        let needed = self
            .decoder
            .max_utf8_buffer_length(read)
            .unwrap_or(read.saturating_mul(3).saturating_add(16));
        let mut decoded = String::with_capacity(needed);
        let mut input = &self.bytes[..read];
        loop {
            let (result, consumed, _) = self.decoder.decode_to_string(input, &mut decoded, last);
            input = &input[consumed..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => {
                    let more = self
                        .decoder
                        .max_utf8_buffer_length(input.len())
                        .unwrap_or(input.len().saturating_mul(3).saturating_add(16));
                    decoded.reserve(more.max(4));
                },
            }
        }
        self.pending.extend(decoded.chars());

        if last {
            self.drained = true;
            return Ok(!decoded.is_empty());
        }
        Ok(true)
    }

    /// Character at the cursor, refilling first when the buffer is used up.
    #[inline]
    pub(crate) fn current(&mut self) -> Result<Option<char>> {
        if self.pos >= self.chars.len() && !self.refill()? {
            return Ok(None);
        }
        Ok(Some(self.chars[self.pos]))
    }

    /// Character following the cursor without consuming anything.
    ///
    /// When the cursor sits on the last buffered character this looks one
    /// character ahead in the stream instead of refilling.
    pub(crate) fn peek_next(&mut self) -> Result<Option<char>> {
        if self.pos + 1 < self.chars.len() {
            return Ok(Some(self.chars[self.pos + 1]));
        }
        loop {
            if let Some(&c) = self.pending.front() {
                return Ok(Some(c));
            }
            if self.eof || !self.decode_more()? {
                return Ok(None);
            }
        }
    }

    /// Consume the character at the cursor.
    #[inline]
    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    /// Next unread position inside the buffer.
    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Whether end-of-stream has been latched.
    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.eof
    }

    /// Effective capacity after clamping.
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw buffered text, used for diagnostics.
    pub(crate) fn raw_text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Seek back to where the stream was when the buffer was created.
    pub(crate) fn rewind(&mut self) -> Result<()> {
        let reader = self.reader.as_mut().ok_or(Error::Disposed)?;
        reader.seek(SeekFrom::Start(self.origin))?;
        self.decoder = self.encoding.new_decoder();
        self.pending.clear();
        self.drained = false;
        self.chars = Vec::with_capacity(self.capacity);
        self.pos = 0;
        self.eof = false;
        Ok(())
    }
}

impl<R> CharBuffer<R> {
    /// Release the stream. Later refills fail with [`Error::Disposed`].
    pub(crate) fn release(&mut self) -> Option<R> {
        self.eof = true;
        self.chars = Vec::new();
        self.bytes = Vec::new();
        self.pending.clear();
        self.reader.take()
    }

    pub(crate) fn is_released(&self) -> bool {
        self.reader.is_none()
    }
}
