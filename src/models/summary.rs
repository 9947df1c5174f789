use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// One row of the history list: a file and the first message read from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistorySummary {
    pub file_path: PathBuf,
    pub first_message: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatHistorySummary {
    /// First message flattened onto a single line
    pub fn first_message_display(&self) -> String {
        self.first_message.replace("\r\n", " ").replace(['\n', '\r'], " ")
    }

    /// Timestamp in local time, or an empty string when unknown
    pub fn timestamp_display(&self) -> String {
        self.timestamp_display_in(&Local)
    }

    pub fn timestamp_display_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: fmt::Display,
    {
        self.timestamp
            .map(|ts| ts.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default()
    }
}
