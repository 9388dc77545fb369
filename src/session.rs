//! Single-slot edit session
//!
//! A presentation layer edits at most one task at a time. The session is
//! either idle or holds the id being edited.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::repository::TaskRepository;
use crate::storage::RecordStore;
use crate::task::TaskRecord;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EditSession {
    editing: Option<u32>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editing(&self) -> Option<u32> {
        self.editing
    }

    pub fn is_idle(&self) -> bool {
        self.editing.is_none()
    }

    /// Start editing `id` and return its current values.
    pub fn begin<S: RecordStore>(
        &mut self,
        repo: &TaskRepository<S>,
        id: u32,
    ) -> Result<TaskRecord> {
        if let Some(current) = self.editing {
            return Err(Error::EditInProgress(current));
        }
        let record = repo.get(id)?;
        self.editing = Some(id);
        tracing::debug!(id, "edit session started");
        Ok(record)
    }

    /// Save the edited values.
    ///
    /// On validation errors the session stays open so the input can be
    /// corrected. It closes on success and when the record has vanished.
    pub fn commit<S: RecordStore>(
        &mut self,
        repo: &TaskRepository<S>,
        title: &str,
        date: Option<NaiveDate>,
        time: &str,
    ) -> Result<TaskRecord> {
        let id = self.editing.ok_or(Error::NoActiveEdit)?;
        match repo.edit(id, title, date, time) {
            Ok(record) => {
                self.editing = None;
                Ok(record)
            }
            Err(err @ Error::NotFound(_)) => {
                tracing::warn!(id, "edited task no longer exists");
                self.editing = None;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(id) = self.editing.take() {
            tracing::debug!(id, "edit session cancelled");
        }
    }

    /// Delete `id`, closing the session if it is the one being edited.
    ///
    /// A store failure leaves the session open since the record survives.
    pub fn delete<S: RecordStore>(
        &mut self,
        repo: &TaskRepository<S>,
        id: u32,
    ) -> Result<TaskRecord> {
        let result = repo.delete(id);
        if self.editing == Some(id) && matches!(result, Ok(_) | Err(Error::NotFound(_))) {
            self.editing = None;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CsvStore;
    use crate::task::Status;

    fn repo_with_tasks(dir: &tempfile::TempDir, count: u32) -> TaskRepository<CsvStore> {
        let store = CsvStore::new(dir.path().join("tasks.csv"));
        store.init().unwrap();
        let repo = TaskRepository::new(store);
        for n in 0..count {
            repo.add(&format!("task {n}"), NaiveDate::from_ymd_opt(2024, 6, 10), "13:00")
                .unwrap();
        }
        repo
    }

    fn day() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 7, 1)
    }

    #[test]
    fn begin_while_editing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_tasks(&dir, 2);
        let mut session = EditSession::new();

        session.begin(&repo, 1).unwrap();
        assert!(matches!(session.begin(&repo, 2), Err(Error::EditInProgress(1))));
        assert_eq!(session.editing(), Some(1));
    }

    #[test]
    fn begin_on_missing_task_stays_idle() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_tasks(&dir, 1);
        let mut session = EditSession::new();

        assert!(matches!(session.begin(&repo, 5), Err(Error::NotFound(5))));
        assert!(session.is_idle());
    }

    #[test]
    fn commit_without_begin_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_tasks(&dir, 1);
        let mut session = EditSession::new();
        assert!(matches!(
            session.commit(&repo, "x", day(), "10:00"),
            Err(Error::NoActiveEdit)
        ));
    }

    #[test]
    fn commit_closes_session_and_resets_status() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_tasks(&dir, 1);
        repo.update_fields(1, None, Some(Status::Finished)).unwrap();
        let mut session = EditSession::new();

        session.begin(&repo, 1).unwrap();
        let saved = session.commit(&repo, "renamed", day(), "10:00").unwrap();
        assert_eq!(saved.title, "renamed");
        assert_eq!(saved.status, Status::InProcess);
        assert!(session.is_idle());
    }

    #[test]
    fn invalid_input_keeps_session_open() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_tasks(&dir, 1);
        let mut session = EditSession::new();

        session.begin(&repo, 1).unwrap();
        assert!(matches!(
            session.commit(&repo, "renamed", day(), "25:00"),
            Err(Error::Validation { field: "time", .. })
        ));
        assert_eq!(session.editing(), Some(1));
        assert_eq!(repo.get(1).unwrap().title, "task 0");
    }

    #[test]
    fn commit_on_vanished_task_closes_session() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_tasks(&dir, 2);
        let mut session = EditSession::new();

        session.begin(&repo, 2).unwrap();
        repo.delete(2).unwrap();
        assert!(matches!(
            session.commit(&repo, "renamed", day(), "10:00"),
            Err(Error::NotFound(2))
        ));
        assert!(session.is_idle());
    }

    #[test]
    fn deleting_edited_task_closes_session() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_tasks(&dir, 2);
        let mut session = EditSession::new();

        session.begin(&repo, 1).unwrap();
        session.delete(&repo, 2).unwrap();
        assert_eq!(session.editing(), Some(1));

        session.delete(&repo, 1).unwrap();
        assert!(session.is_idle());
    }

    #[test]
    fn deleting_vanished_edited_task_still_closes_session() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_tasks(&dir, 1);
        let mut session = EditSession::new();

        session.begin(&repo, 1).unwrap();
        repo.delete(1).unwrap();
        assert!(matches!(session.delete(&repo, 1), Err(Error::NotFound(1))));
        assert!(session.is_idle());
    }

    #[test]
    fn failed_delete_keeps_session_open() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_tasks(&dir, 1);
        let mut session = EditSession::new();
        session.begin(&repo, 1).unwrap();

        std::fs::write(repo.store().path(), "ID,Title\nnot,a,task\n").unwrap();
        assert!(matches!(
            session.delete(&repo, 1),
            Err(Error::StoreCorrupt { .. })
        ));
        assert_eq!(session.editing(), Some(1));
    }
}
