use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::ChatMessage;
use crate::parsers::error::{ParseError, Result};
use crate::parsers::request::RequestUnit;
use crate::parsers::tokenizer::{JsonTokenizer, PropertyName, ValueType};

const REQUESTS_FIELD: &str = "requests";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanPhase {
    /// Looking for the root object's `requests` array
    Seeking,
    InRequestsArray,
    /// Terminal: no further reads are made
    Finished,
}

struct ScanState<R: BufRead> {
    tokens: Option<JsonTokenizer<R>>,
    phase: ScanPhase,
    queue: VecDeque<ChatMessage>,
}

/// Streaming reader for a Copilot chat session file
///
/// Messages are produced one at a time from the `requests` array. Only the request object
/// currently being decoded is held in memory, plus the messages it produced that have not
/// been handed out yet.
///
/// All reads go through an internal mutex, so a parser can be shared between threads;
/// concurrent callers are served one at a time and each message is returned exactly once.
///
/// # Examples
///
/// ```
/// use copilot_history_explorer::parsers::JsonHistoryParser;
/// use copilot_history_explorer::models::MessageKind;
///
/// let json = r#"{"requests":[{"message":{"text":"Hello"},"response":[{"value":"Hi!"}]}]}"#;
/// let parser = JsonHistoryParser::from_reader(json.as_bytes());
///
/// let first = parser.read_next()?.unwrap();
/// assert_eq!(first.kind, MessageKind::User);
/// assert_eq!(parser.read_next()?.unwrap().content, "Hi!");
/// assert!(parser.read_next()?.is_none());
/// # Ok::<(), copilot_history_explorer::parsers::ParseError>(())
/// ```
pub struct JsonHistoryParser<R: BufRead> {
    state: Mutex<ScanState<R>>,
}

impl JsonHistoryParser<BufReader<File>> {
    /// Opens a chat session file for reading
    ///
    /// # Errors
    ///
    /// - [`ParseError::InvalidPath`] if the path is empty or blank
    /// - [`ParseError::NotFound`] if the path does not name an existing file
    /// - [`ParseError::Open`] for any other failure to open it
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(ParseError::InvalidPath);
        }

        let file = File::open(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ParseError::NotFound(path.to_path_buf()),
            _ => ParseError::Open { path: path.to_path_buf(), source },
        })?;

        let is_file = file
            .metadata()
            .map_err(|source| ParseError::Open { path: path.to_path_buf(), source })?
            .is_file();
        if !is_file {
            return Err(ParseError::NotFound(path.to_path_buf()));
        }

        Ok(Self::from_reader(file))
    }
}

impl<R: Read> JsonHistoryParser<BufReader<R>> {
    /// Wraps an already-open byte stream
    pub fn from_reader(reader: R) -> Self {
        Self::new(BufReader::new(reader))
    }
}

impl<R: BufRead> JsonHistoryParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            state: Mutex::new(ScanState {
                tokens: Some(JsonTokenizer::new(reader)),
                phase: ScanPhase::Seeking,
                queue: VecDeque::new(),
            }),
        }
    }

    /// Returns the next message, or `None` once the `requests` array (or the stream) has ended
    ///
    /// Messages already decoded from the current request object are returned without touching
    /// the stream. Otherwise the scan advances until a request object produces output.
    ///
    /// # Errors
    ///
    /// I/O and JSON syntax errors are returned as-is. The parser is finished afterwards and
    /// further calls return `Ok(None)`.
    pub fn read_next(&self) -> Result<Option<ChatMessage>> {
        self.lock().next_message()
    }

    /// Lazily yields every remaining message
    ///
    /// The iterator stops after end of data or after yielding the first error.
    pub fn read_all(&self) -> Messages<'_, R> {
        Messages { parser: self, done: false }
    }

    /// Releases the underlying stream
    ///
    /// Waits for an in-flight [`read_next`](Self::read_next) to complete first. Afterwards
    /// every read returns `Ok(None)`.
    pub fn close(&self) {
        let mut state = self.lock();
        state.tokens = None;
        state.queue.clear();
        state.phase = ScanPhase::Finished;
    }

    /// Bytes consumed from the stream so far
    pub fn bytes_consumed(&self) -> u64 {
        self.lock().tokens.as_ref().map(JsonTokenizer::offset).unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, ScanState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: BufRead> ScanState<R> {
    fn next_message(&mut self) -> Result<Option<ChatMessage>> {
        loop {
            if let Some(message) = self.queue.pop_front() {
                return Ok(Some(message));
            }
            if self.phase == ScanPhase::Finished {
                return Ok(None);
            }
            if let Err(e) = self.step() {
                self.phase = ScanPhase::Finished;
                return Err(e);
            }
        }
    }

    /// Advances the scan by one dispatch: locating the array, or one array element
    fn step(&mut self) -> Result<()> {
        let Some(tokens) = self.tokens.as_mut() else {
            self.phase = ScanPhase::Finished;
            return Ok(());
        };

        self.phase = match self.phase {
            ScanPhase::Seeking => seek_requests(tokens)?,
            ScanPhase::InRequestsArray => read_request_element(tokens, &mut self.queue)?,
            ScanPhase::Finished => ScanPhase::Finished,
        };
        Ok(())
    }
}

/// Scans the root object for `"requests": [` and stops just inside the array
///
/// Other root fields, and a `requests` field that is not an array, are skipped unread.
fn seek_requests<R: BufRead>(tokens: &mut JsonTokenizer<R>) -> Result<ScanPhase> {
    if tokens.peek()? != Some(ValueType::Object) {
        return Ok(ScanPhase::Finished);
    }
    tokens.begin_object()?;

    while tokens.has_next()? {
        match tokens.next_name(&[REQUESTS_FIELD])? {
            Some(PropertyName::Known(_)) if tokens.peek()? == Some(ValueType::Array) => {
                tokens.begin_array()?;
                return Ok(ScanPhase::InRequestsArray);
            }
            Some(_) => tokens.skip_value()?,
            None => break,
        }
    }
    // End of the root object or of the stream
    Ok(ScanPhase::Finished)
}

fn read_request_element<R: BufRead>(
    tokens: &mut JsonTokenizer<R>,
    queue: &mut VecDeque<ChatMessage>,
) -> Result<ScanPhase> {
    if !tokens.has_next()? {
        tokens.end_array()?;
        return Ok(ScanPhase::Finished);
    }
    match tokens.peek()? {
        Some(ValueType::Object) => {
            tokens.begin_object()?;
            RequestUnit::read(tokens)?.enqueue_into(queue);
            Ok(ScanPhase::InRequestsArray)
        }
        Some(_) => {
            tokens.skip_value()?;
            Ok(ScanPhase::InRequestsArray)
        }
        None => Ok(ScanPhase::Finished),
    }
}

/// Iterator returned by [`JsonHistoryParser::read_all`]
pub struct Messages<'a, R: BufRead> {
    parser: &'a JsonHistoryParser<R>,
    done: bool,
}

impl<R: BufRead> Iterator for Messages<'_, R> {
    type Item = Result<ChatMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.parser.read_next() {
            Ok(Some(message)) => Some(Ok(message)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for Messages<'_, R> {}
