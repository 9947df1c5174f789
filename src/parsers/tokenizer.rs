//! Pull-based access to a JSON byte stream
//!
//! [`JsonTokenizer`] wraps a [`struson`] stream reader and narrows it to what message extraction
//! needs: peeking at the next value's type, skipping values unread, and reading the few strings
//! and integers that matter. Property names are matched against a caller-provided set so that
//! unclaimed names are never copied out of the reader.
//!
//! A stream that ends early is not an error here. Every operation then reports end of data
//! (`None`, `false`, or nothing consumed), and keeps doing so.

use std::io::{self, BufRead, ErrorKind, Read};

use struson::reader::{JsonReader, JsonStreamReader, ReaderError, ReaderSettings, SyntaxErrorKind};

use crate::parsers::error::{ParseError, Result};

pub use struson::reader::ValueType;

/// UTF-8 byte order mark, tolerated at the very start of the stream
const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A property name, as seen through a set of names of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyName {
    Known(&'static str),
    Other,
}

pub struct JsonTokenizer<R: BufRead> {
    reader: JsonStreamReader<BomSkipping<R>>,
    ended: bool,
}

impl<R: BufRead> JsonTokenizer<R> {
    pub fn new(reader: R) -> Self {
        let settings = ReaderSettings {
            // Skipped metadata may nest arbitrarily deep
            max_nesting_depth: None,
            track_path: false,
            ..Default::default()
        };
        Self {
            reader: JsonStreamReader::new_custom(BomSkipping { inner: reader, checked: false }, settings),
            ended: false,
        }
    }

    /// Bytes consumed from the stream so far, not counting a leading BOM
    pub fn offset(&self) -> u64 {
        self.reader.current_position(false).data_pos.unwrap_or_default()
    }

    /// True once the stream has ended (or failed) and nothing more will be read
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Type of the next value, without consuming it
    pub fn peek(&mut self) -> Result<Option<ValueType>> {
        self.guard(|r| r.peek())
    }

    /// Whether the current object or array has another member
    pub fn has_next(&mut self) -> Result<bool> {
        Ok(self.guard(|r| r.has_next())?.unwrap_or(false))
    }

    pub fn begin_object(&mut self) -> Result<()> {
        self.guard(|r| r.begin_object()).map(drop)
    }

    pub fn end_object(&mut self) -> Result<()> {
        self.guard(|r| r.end_object()).map(drop)
    }

    pub fn begin_array(&mut self) -> Result<()> {
        self.guard(|r| r.begin_array()).map(drop)
    }

    pub fn end_array(&mut self) -> Result<()> {
        self.guard(|r| r.end_array()).map(drop)
    }

    /// Reads the next property name and classifies it against `known`
    pub fn next_name(&mut self, known: &[&'static str]) -> Result<Option<PropertyName>> {
        self.guard(|r| {
            r.next_name().map(|name| match known.iter().find(|&&k| k == name) {
                Some(&k) => PropertyName::Known(k),
                None => PropertyName::Other,
            })
        })
    }

    pub fn next_string(&mut self) -> Result<Option<String>> {
        self.guard(|r| r.next_string())
    }

    /// Reads the next number, returning it if it is an integer that fits in `i64`
    ///
    /// A number cut off by the end of the stream is discarded rather than returned short.
    pub fn next_integer(&mut self) -> Result<Option<i64>> {
        let Some(text) = self.guard(|r| r.next_number_as_string())? else {
            return Ok(None);
        };
        if !self.has_next_or_end()? {
            return Ok(None);
        }
        Ok(text.parse().ok())
    }

    /// Consumes the next value (object, array or scalar) without materializing it
    pub fn skip_value(&mut self) -> Result<()> {
        self.guard(|r| r.skip_value()).map(drop)
    }

    // Confirms the stream continues after a value; false means it ended right there
    fn has_next_or_end(&mut self) -> Result<bool> {
        Ok(self.guard(|r| r.has_next().map(|_| ()))?.is_some())
    }

    fn guard<T>(
        &mut self,
        op: impl FnOnce(&mut JsonStreamReader<BomSkipping<R>>) -> std::result::Result<T, ReaderError>,
    ) -> Result<Option<T>> {
        if self.ended {
            return Ok(None);
        }
        match op(&mut self.reader) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                self.ended = true;
                if is_end_of_stream(&e) { Ok(None) } else { Err(self.convert(e)) }
            }
        }
    }

    fn convert(&self, error: ReaderError) -> ParseError {
        match error {
            ReaderError::IoError { error, .. } => ParseError::Io(error),
            other => ParseError::Syntax { offset: self.offset(), reason: other.to_string() },
        }
    }
}

fn is_end_of_stream(error: &ReaderError) -> bool {
    match error {
        ReaderError::SyntaxError(e) => matches!(e.kind, SyntaxErrorKind::IncompleteDocument),
        ReaderError::IoError { error, .. } => error.kind() == ErrorKind::UnexpectedEof,
        _ => false,
    }
}

/// Drops a UTF-8 BOM at the start of the wrapped stream
struct BomSkipping<R> {
    inner: R,
    checked: bool,
}

impl<R: BufRead> Read for BomSkipping<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.checked {
            if self.inner.fill_buf()?.starts_with(&BOM) {
                self.inner.consume(BOM.len());
            }
            self.checked = true;
        }
        self.inner.read(buf)
    }
}
