use std::fs;

use chrono::NaiveDate;
use tasksched::error::Error;
use tasksched::ordering::Urgency;
use tasksched::repository::TaskRepository;
use tasksched::session::EditSession;
use tasksched::storage::{CsvStore, RecordStore};
use tasksched::task::{Priority, Status};

const HEADER: &str = "ID,Title,Due Date (dd/MM/yy HH:MM),Priority,Status\n";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn repo_in(dir: &tempfile::TempDir) -> TaskRepository<CsvStore> {
    let store = CsvStore::new(dir.path().join("data").join("testdata.csv"));
    store.init().expect("init store");
    TaskRepository::new(store)
}

#[test]
fn ids_follow_largest_existing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = repo_in(&dir);

    let first = repo.add("One", Some(date(2030, 1, 1)), "09:00").expect("add");
    let second = repo.add("Two", Some(date(2030, 1, 2)), "09:00").expect("add");
    let third = repo.add("Three", Some(date(2030, 1, 3)), "09:00").expect("add");
    assert_eq!((first.id, second.id, third.id), (1, 2, 3));

    repo.delete(2).expect("delete");
    assert_eq!(repo.next_id().expect("next id"), 4);

    repo.delete(3).expect("delete");
    assert_eq!(repo.next_id().expect("next id"), 2);
}

#[test]
fn deleting_missing_id_keeps_file_bytes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = repo_in(&dir);
    repo.add("Stay", Some(date(2030, 1, 1)), "09:00").expect("add");
    let before = fs::read(repo.store().path()).expect("read");

    assert!(matches!(repo.delete(9), Err(Error::NotFound(9))));
    assert!(matches!(
        repo.update_fields(9, Some(Priority::High), None),
        Err(Error::NotFound(9))
    ));

    assert_eq!(fs::read(repo.store().path()).expect("read"), before);
}

#[test]
fn classified_list_is_ordered_and_flagged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = repo_in(&dir);
    repo.add("Low later", Some(date(2024, 7, 1)), "09:00").expect("add");
    repo.add("Overdue", Some(date(2024, 6, 1)), "09:00").expect("add");
    repo.add("High soon", Some(date(2024, 6, 11)), "09:00").expect("add");
    repo.update_fields(1, Some(Priority::Low), None).expect("set");
    repo.update_fields(3, Some(Priority::High), None).expect("set");

    let rows = repo.list_classified(date(2024, 6, 10)).expect("list");
    let summary: Vec<(&str, Urgency)> = rows
        .iter()
        .map(|(record, urgency)| (record.title.as_str(), *urgency))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("High soon", Urgency::DueSoon),
            ("Overdue", Urgency::Overdue),
            ("Low later", Urgency::Normal),
        ]
    );
}

#[test]
fn session_edit_round_trip_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = repo_in(&dir);
    repo.add("Draft", Some(date(2030, 2, 1)), "13:00").expect("add");
    repo.update_fields(1, None, Some(Status::Finished)).expect("set");

    let mut session = EditSession::new();
    let current = session.begin(&repo, 1).expect("begin");
    assert_eq!(current.title, "Draft");
    assert!(matches!(session.begin(&repo, 1), Err(Error::EditInProgress(1))));

    let err = session
        .commit(&repo, "Final", Some(date(2030, 2, 2)), "25:00")
        .expect_err("bad time");
    assert!(matches!(err, Error::Validation { field: "time", .. }));
    assert_eq!(session.editing(), Some(1));

    session
        .commit(&repo, "Final", Some(date(2030, 2, 2)), "08:15")
        .expect("commit");
    assert!(session.is_idle());

    let contents = fs::read_to_string(repo.store().path()).expect("read");
    assert_eq!(
        contents,
        format!("{HEADER}1,Final,02/02/30 08:15,Medium,In process\n")
    );
}

#[test]
fn unknown_priority_survives_rewrite() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tasks.csv");
    fs::write(
        &path,
        format!("{HEADER}1,Legacy,01/01/30 10:00,Urgent,In process\n2,New,02/01/30 10:00,Low,In process\n"),
    )
    .expect("write");
    let repo = TaskRepository::new(CsvStore::new(&path));

    let ordered = repo.list_ordered().expect("list");
    assert_eq!(ordered[0].title, "New");
    assert_eq!(ordered[1].priority, Priority::Unrecognized("Urgent".to_string()));

    repo.update_fields(2, None, Some(Status::Finished)).expect("set");
    let contents = fs::read_to_string(&path).expect("read");
    assert!(contents.contains("1,Legacy,01/01/30 10:00,Urgent,In process"));
    assert!(contents.contains("2,New,02/01/30 10:00,Low,Finish"));
}

#[test]
fn malformed_row_reports_corrupt_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tasks.csv");
    fs::write(&path, format!("{HEADER}1,Broken,not a date,High,In process\n")).expect("write");
    let store = CsvStore::new(&path);

    match store.load() {
        Err(Error::StoreCorrupt { path: reported, reason }) => {
            assert_eq!(reported, path);
            assert!(reason.contains("due date"), "{reason}");
        }
        other => panic!("expected corrupt store, got {other:?}"),
    }
}

#[test]
fn far_future_due_date_is_rejected_not_truncated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = repo_in(&dir);
    let before = fs::read(repo.store().path()).expect("read");

    let err = repo
        .add("Far future", Some(date(2080, 1, 1)), "09:00")
        .expect_err("year outside the two-digit window");
    assert!(matches!(err, Error::Validation { field: "date", .. }));
    assert_eq!(fs::read(repo.store().path()).expect("read"), before);

    let kept = repo.add("Edge", Some(date(2068, 12, 31)), "23:59").expect("add");
    assert_eq!(repo.get(kept.id).expect("get").due, kept.due);
}

#[test]
fn duplicate_ids_in_file_are_refused() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tasks.csv");
    fs::write(
        &path,
        format!("{HEADER}1,A,01/01/30 10:00,High,In process\n1,B,02/01/30 10:00,Low,In process\n"),
    )
    .expect("write");
    let before = fs::read(&path).expect("read");
    let repo = TaskRepository::new(CsvStore::new(&path));

    assert!(matches!(repo.delete(1), Err(Error::StoreCorrupt { .. })));
    assert_eq!(fs::read(&path).expect("read"), before);
}
