//! Field extraction for a single request object of the `requests` array
//!
//! Each request object carries at most three fields of interest:
//!
//! ```text
//! { "message": { "text": "<prompt>" },
//!   "response": [ { "value": "<reply>" }, ... ],
//!   "timestamp": <ms since epoch> }
//! ```
//!
//! Everything else (including very large metadata blobs) is skipped with
//! [`JsonTokenizer::skip_value`] and never buffered.

use std::collections::VecDeque;
use std::io::BufRead;

use chrono::DateTime;

use crate::models::ChatMessage;
use crate::parsers::error::Result;
use crate::parsers::tokenizer::{JsonTokenizer, PropertyName, ValueType};

const MESSAGE_FIELD: &str = "message";
const TEXT_FIELD: &str = "text";
const RESPONSE_FIELD: &str = "response";
const VALUE_FIELD: &str = "value";
const TIMESTAMP_FIELD: &str = "timestamp";

const REQUEST_FIELDS: &[&str] = &[MESSAGE_FIELD, RESPONSE_FIELD, TIMESTAMP_FIELD];

/// Decoded content of one request object
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct RequestUnit {
    pub user_text: Option<String>,
    pub response_texts: Vec<String>,
    pub timestamp_millis: Option<i64>,
}

impl RequestUnit {
    /// Reads the request object whose `{` has just been consumed, up to and including its `}`
    ///
    /// If the stream ends early, the fields captured so far are kept.
    pub fn read<R: BufRead>(tokens: &mut JsonTokenizer<R>) -> Result<Self> {
        let mut unit = RequestUnit::default();

        read_object_fields(tokens, REQUEST_FIELDS, |name, tokens| match name {
            MESSAGE_FIELD => read_object_value(tokens, &[TEXT_FIELD], |_, tokens| {
                if let Some(text) = read_string_value(tokens)? {
                    unit.user_text = Some(text);
                }
                Ok(())
            }),
            RESPONSE_FIELD => read_array_objects(tokens, |tokens| {
                let mut value = None;
                read_object_fields(tokens, &[VALUE_FIELD], |_, tokens| {
                    if let Some(text) = read_string_value(tokens)? {
                        value = Some(text);
                    }
                    Ok(())
                })?;
                if let Some(text) = value.as_deref().and_then(retained_response) {
                    unit.response_texts.push(text.to_string());
                }
                Ok(())
            }),
            TIMESTAMP_FIELD => {
                if let Some(millis) = read_integer_value(tokens)? {
                    unit.timestamp_millis = Some(millis);
                }
                Ok(())
            }
            _ => tokens.skip_value(),
        })?;

        Ok(unit)
    }

    /// Pushes the user prompt (if any) followed by each reply, all sharing one timestamp
    pub fn enqueue_into(self, queue: &mut VecDeque<ChatMessage>) {
        let timestamp = self.timestamp_millis.and_then(DateTime::from_timestamp_millis);

        if let Some(text) = self.user_text.filter(|text| !text.is_empty()) {
            queue.push_back(ChatMessage::user(text, timestamp));
        }
        for text in self.response_texts {
            queue.push_back(ChatMessage::assistant(text, timestamp));
        }
    }
}

/// Returns the reply trimmed of outer whitespace, or `None` for fence-only values like "\n```\n"
fn retained_response(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.trim_matches('`').is_empty() { None } else { Some(trimmed) }
}

/// Walks the members of an object whose `{` was just consumed, then consumes its `}`
///
/// `on_field` is called for names listed in `fields` and must consume the value. Other
/// members are skipped without reading their names into owned strings.
fn read_object_fields<R, F>(
    tokens: &mut JsonTokenizer<R>,
    fields: &[&'static str],
    mut on_field: F,
) -> Result<()>
where
    R: BufRead,
    F: FnMut(&'static str, &mut JsonTokenizer<R>) -> Result<()>,
{
    while tokens.has_next()? {
        match tokens.next_name(fields)? {
            Some(PropertyName::Known(name)) => on_field(name, tokens)?,
            Some(PropertyName::Other) => tokens.skip_value()?,
            None => return Ok(()),
        }
    }
    tokens.end_object()
}

/// Walks the next value's fields if it is an object, otherwise skips it
fn read_object_value<R, F>(
    tokens: &mut JsonTokenizer<R>,
    fields: &[&'static str],
    on_field: F,
) -> Result<()>
where
    R: BufRead,
    F: FnMut(&'static str, &mut JsonTokenizer<R>) -> Result<()>,
{
    if tokens.peek()? != Some(ValueType::Object) {
        return tokens.skip_value();
    }
    tokens.begin_object()?;
    read_object_fields(tokens, fields, on_field)
}

/// Hands every object element of the next array to `on_object`; other elements are skipped
///
/// A value that is not an array is skipped as a whole.
fn read_array_objects<R, F>(tokens: &mut JsonTokenizer<R>, mut on_object: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(&mut JsonTokenizer<R>) -> Result<()>,
{
    if tokens.peek()? != Some(ValueType::Array) {
        return tokens.skip_value();
    }
    tokens.begin_array()?;

    while tokens.has_next()? {
        match tokens.peek()? {
            Some(ValueType::Object) => {
                tokens.begin_object()?;
                on_object(tokens)?;
            }
            Some(_) => tokens.skip_value()?,
            None => return Ok(()),
        }
    }
    tokens.end_array()
}

fn read_string_value<R: BufRead>(tokens: &mut JsonTokenizer<R>) -> Result<Option<String>> {
    if tokens.peek()? != Some(ValueType::String) {
        tokens.skip_value()?;
        return Ok(None);
    }
    tokens.next_string()
}

fn read_integer_value<R: BufRead>(tokens: &mut JsonTokenizer<R>) -> Result<Option<i64>> {
    if tokens.peek()? != Some(ValueType::Number) {
        tokens.skip_value()?;
        return Ok(None);
    }
    tokens.next_integer()
}
