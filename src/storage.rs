//! CSV record store
//!
//! The backing file is the single source of truth. It holds a fixed header
//! followed by one row per task:
//!
//! ```text
//! ID,Title,Due Date (dd/MM/yy HH:MM),Priority,Status
//! 1,Pay rent,01/07/24 09:00,High,In process
//! 2,"Call Ann, Bob",03/07/24 13:00,Medium,Finish
//! ```
//!
//! Every write replaces the whole file atomically (see [`crate::atomic`]).

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::atomic::write_atomic;
use crate::error::{Error, Result};
use crate::task::{format_due, parse_due, Priority, Status, TaskRecord};

/// Header row, always rewritten verbatim.
pub const HEADER: [&str; 5] = ["ID", "Title", "Due Date (dd/MM/yy HH:MM)", "Priority", "Status"];

/// Default location of the backing file, relative to the working directory
pub const DEFAULT_STORE_PATH: &str = "data/testdata.csv";

/// Full-set persistence for task records.
///
/// Implementations read and write every record at once; there is no
/// partial update.
pub trait RecordStore {
    /// Read all records in file order.
    fn load(&self) -> Result<Vec<TaskRecord>>;

    /// Replace the stored set with `records`.
    fn replace(&self, records: &[TaskRecord]) -> Result<()>;
}

/// Record store backed by a CSV file
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create the backing file with only the header if it does not exist.
    ///
    /// Returns `true` when a new file was written.
    pub fn init(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.replace(&[])?;
        tracing::info!(path = %self.path.display(), "initialized task store");
        Ok(true)
    }

    fn corrupt(&self, reason: impl Into<String>) -> Error {
        Error::StoreCorrupt {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

impl RecordStore for CsvStore {
    fn load(&self) -> Result<Vec<TaskRecord>> {
        let file = File::open(&self.path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => self.corrupt("file does not exist"),
            _ => self.corrupt(err.to_string()),
        })?;
        let records = read_records(file).map_err(|err| match err {
            Error::StoreCorrupt { reason, .. } => self.corrupt(reason),
            other => self.corrupt(other.to_string()),
        })?;
        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "loaded task store"
        );
        Ok(records)
    }

    fn replace(&self, records: &[TaskRecord]) -> Result<()> {
        let data = encode_records(records).map_err(|source| Error::StoreWrite {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &data).map_err(|source| Error::StoreWrite {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "rewrote task store"
        );
        Ok(())
    }
}

/// Serialize the header and `records` in the store's CSV layout.
pub fn encode_records(records: &[TaskRecord]) -> io::Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for record in records {
        let id = record.id.to_string();
        let due = format_due(record.due);
        writer.write_record([
            id.as_str(),
            record.title.as_str(),
            due.as_str(),
            record.priority.as_str(),
            record.status.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| io::Error::other(err.to_string()))
}

/// Parse CSV content (header first) into records.
///
/// Malformed rows are reported as `StoreCorrupt` with the line number; the
/// path is filled in by the caller.
pub fn read_records(reader: impl Read) -> Result<Vec<TaskRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    for row in csv_reader.records() {
        let row = row.map_err(|err| corrupt_row(None, err.to_string()))?;
        let record = decode_row(&row)?;
        if !seen.insert(record.id) {
            let line = row.position().map(|pos| pos.line());
            return Err(corrupt_row(line, format!("duplicate id {}", record.id)));
        }
        records.push(record);
    }
    Ok(records)
}

fn decode_row(row: &StringRecord) -> Result<TaskRecord> {
    let line = row.position().map(|pos| pos.line());
    if row.len() != HEADER.len() {
        return Err(corrupt_row(
            line,
            format!("expected {} fields, found {}", HEADER.len(), row.len()),
        ));
    }

    let id_text = row[0].trim();
    let id = match id_text.parse::<u32>() {
        Ok(id) if id > 0 => id,
        _ => return Err(corrupt_row(line, format!("invalid id '{id_text}'"))),
    };
    let due = parse_due(&row[2])
        .ok_or_else(|| corrupt_row(line, format!("invalid due date '{}'", &row[2])))?;
    let priority = Priority::from_stored(row[3].trim());
    if !priority.is_recognized() {
        tracing::warn!(id, priority = priority.as_str(), "unrecognized priority in store");
    }
    let status: Status = row[4]
        .parse()
        .map_err(|_| corrupt_row(line, format!("invalid status '{}'", &row[4])))?;

    Ok(TaskRecord {
        id,
        title: row[1].to_string(),
        due,
        priority,
        status,
    })
}

fn corrupt_row(line: Option<u64>, reason: String) -> Error {
    let reason = match line {
        Some(line) => format!("line {line}: {reason}"),
        None => reason,
    };
    Error::StoreCorrupt {
        path: PathBuf::new(),
        reason,
    }
}
