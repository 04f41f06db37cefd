//! Record iterators over a [`TabularSource`]

use super::record::RecordExt;
use super::traits::TabularSource;
use crate::common::{Error, Result};

/// Detached record enumerator.
///
/// The cursor does not borrow the source; each step is given the source
/// explicitly. Several cursors may share one source, and all of them advance
/// the same underlying position. A cursor remembers the source
/// [`version`](TabularSource::version) it last observed and fails with
/// [`Error::EnumerationInvalidated`] when something else moved the source in
/// between.
#[derive(Debug, Clone)]
pub struct RecordCursor {
    version: u64,
    current: Option<Vec<Option<String>>>,
}

impl RecordCursor {
    /// Create a cursor positioned wherever the source currently is.
    pub fn new<S: TabularSource + ?Sized>(source: &S) -> Self {
        RecordCursor {
            version: source.version(),
            current: None,
        }
    }

    /// Advance the source and capture the next record.
    pub fn move_next<S: TabularSource + ?Sized>(&mut self, source: &mut S) -> Result<bool> {
        self.check(source)?;
        let advanced = source.advance()?;
        self.version = source.version();
        if !advanced {
            self.current = None;
            return Ok(false);
        }
        self.current = Some(source.record()?);
        Ok(true)
    }

    /// Record captured by the last successful [`move_next`](Self::move_next)
    pub fn current(&self) -> Option<&[Option<String>]> {
        self.current.as_deref()
    }

    /// Rewind the source and restart enumeration from the first record.
    pub fn reset<S: TabularSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        self.check(source)?;
        source.rewind()?;
        self.version = source.version();
        self.current = None;
        Ok(())
    }

    fn check<S: TabularSource + ?Sized>(&self, source: &S) -> Result<()> {
        if source.version() != self.version {
            return Err(Error::EnumerationInvalidated);
        }
        Ok(())
    }
}

/// Iterator over the remaining records of a source, created by
/// [`RecordExt::records`].
pub struct Records<'a, S> {
    source: &'a mut S,
    cursor: RecordCursor,
    done: bool,
}

impl<'a, S: TabularSource> Records<'a, S> {
    pub(crate) fn new(source: &'a mut S) -> Self {
        let cursor = RecordCursor::new(&*source);
        Records {
            source,
            cursor,
            done: false,
        }
    }
}

impl<S: TabularSource> Iterator for Records<'_, S> {
    type Item = Result<Vec<Option<String>>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.move_next(&mut *self.source) {
            Ok(true) => self.cursor.current.take().map(Ok),
            Ok(false) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}
