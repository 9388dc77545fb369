//! Task records and input parsing.
//!
//! A task is a plain value: repository operations hand out owned
//! `TaskRecord`s and every mutation goes back through the store.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// `dd/MM/yy HH:mm`, the due-date layout used in the store and exports.
pub const DUE_FORMAT: &str = "%d/%m/%y %H:%M";
pub const DATE_FORMAT: &str = "%d/%m/%y";
pub const TIME_FORMAT: &str = "%H:%M";
pub const DEFAULT_TIME: &str = "13:00";

const DATE_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    /// A spelling found in an existing store that is not one of the known
    /// priorities. Kept verbatim so the row round-trips.
    Unrecognized(String),
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Unrecognized(raw) => raw.as_str(),
        }
    }

    /// Lenient parse used when reading the store.
    pub fn from_stored(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|_| Priority::Unrecognized(value.to_string()))
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Priority::Unrecognized(_))
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(Error::validation(
                "priority",
                format!("'{}' (expected High, Medium or Low)", value.trim()),
            )),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    InProcess,
    Finished,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::InProcess, Status::Finished];

    /// Spelling written to the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::InProcess => "In process",
            Status::Finished => "Finish",
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "inprocess" | "inprogress" | "open" => Ok(Status::InProcess),
            "finish" | "finished" | "done" => Ok(Status::Finished),
            _ => Err(Error::validation(
                "status",
                format!("'{}' (expected \"In process\" or Finish)", value.trim()),
            )),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRecord {
    pub id: u32,
    pub title: String,
    #[serde(serialize_with = "serialize_due")]
    pub due: NaiveDateTime,
    pub priority: Priority,
    pub status: Status,
}

impl TaskRecord {
    pub fn new(id: u32, title: impl Into<String>, due: NaiveDateTime) -> Self {
        Self {
            id,
            title: title.into(),
            due,
            priority: Priority::default(),
            status: Status::default(),
        }
    }

    pub fn due_label(&self) -> String {
        format_due(self.due)
    }

    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }
}

fn serialize_due<S: Serializer>(
    due: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_due(*due))
}

pub fn format_due(due: NaiveDateTime) -> String {
    due.format(DUE_FORMAT).to_string()
}

/// Parse a stored `dd/MM/yy HH:mm` value.
pub fn parse_due(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DUE_FORMAT).ok()
}

/// Parse a strict 24-hour `HH:mm` time of day.
///
/// Hours 00-23 and minutes 00-59, both two digits. Nothing is clamped.
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    let trimmed = value.trim();
    let invalid = || Error::validation("time", format!("'{trimmed}' (expected HH:mm, 00:00-23:59)"));

    let bytes = trimmed.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid());
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let hour = u32::from(digits[0] - b'0') * 10 + u32::from(digits[1] - b'0');
    let minute = u32::from(digits[2] - b'0') * 10 + u32::from(digits[3] - b'0');
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Parse a calendar date given as `YYYY-MM-DD`, `dd/MM/yy` or `dd/MM/yyyy`.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("date", "a due date is required"));
    }
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| {
            Error::validation(
                "date",
                format!("'{trimmed}' (expected YYYY-MM-DD or dd/MM/yy)"),
            )
        })
}

/// Validate the pieces of an add/edit request and combine them into a due
/// date-time. Fields are checked in form order: title, date, time.
pub(crate) fn validate_input(
    title: &str,
    date: Option<NaiveDate>,
    time: &str,
) -> Result<(String, NaiveDateTime)> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("title", "title cannot be empty"));
    }
    let Some(date) = date else {
        return Err(Error::validation("date", "a due date is required"));
    };
    let time = parse_time(time)?;
    let due = date.and_time(time);
    // The stored two-digit year only covers 1969-2068.
    if parse_due(&format_due(due)) != Some(due) {
        return Err(Error::validation(
            "date",
            format!("'{date}' is outside the storable range 1969-2068"),
        ));
    }
    Ok((title.to_string(), due))
}
