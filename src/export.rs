//! Export of the displayed task list to a fixed file name.

use std::path::{Path, PathBuf};

use crate::atomic::write_atomic;
use crate::error::{Error, Result};
use crate::storage::encode_records;
use crate::task::TaskRecord;

pub const EXPORT_FILE: &str = "ExportData.csv";
pub const DEFAULT_EXPORT_DIR: &str = "ExportData";

/// Write `records`, in the order given, to `<dir>/ExportData.csv`.
///
/// The layout matches the backing store, header included. An existing
/// export is replaced.
pub fn export_records(records: &[TaskRecord], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(EXPORT_FILE);
    let write_error = |source| Error::StoreWrite {
        path: path.clone(),
        source,
    };
    let data = encode_records(records).map_err(write_error)?;
    write_atomic(&path, &data).map_err(write_error)?;
    tracing::info!(path = %path.display(), count = records.len(), "exported tasks");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CsvStore, RecordStore, HEADER};
    use crate::task::{parse_due, Priority};

    #[test]
    fn export_writes_header_and_rows_in_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut high = TaskRecord::new(2, "Second", parse_due("02/01/24 10:00").unwrap());
        high.priority = Priority::High;
        let low = TaskRecord::new(1, "First", parse_due("01/01/24 10:00").unwrap());

        let export_dir = dir.path().join("ExportData");
        let path = export_records(&[high.clone(), low.clone()], &export_dir).unwrap();
        assert_eq!(path, export_dir.join(EXPORT_FILE));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], HEADER.join(","));
        assert_eq!(lines[1], "2,Second,02/01/24 10:00,High,In process");
        assert_eq!(lines[2], "1,First,01/01/24 10:00,Medium,In process");

        // The export is readable as a store.
        let reread = CsvStore::new(&path).load().unwrap();
        assert_eq!(reread, vec![high, low]);
    }

    #[test]
    fn export_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let record = TaskRecord::new(1, "Only", parse_due("01/01/24 10:00").unwrap());
        export_records(&[record.clone(), record.clone()], dir.path()).unwrap();
        let path = export_records(&[], dir.path()).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn export_into_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        assert!(matches!(
            export_records(&[], &blocker),
            Err(Error::StoreWrite { .. })
        ));
    }
}
