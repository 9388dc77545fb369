//! Display order and due-date urgency
//!
//! Both are pure functions of the records (and "today"); nothing here
//! touches the store.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::task::{Priority, TaskRecord};

pub const DEFAULT_DUE_SOON_DAYS: u32 = 3;

/// Numeric weight of a priority. Unrecognized spellings sort last.
pub fn priority_rank(priority: &Priority) -> u8 {
    match priority {
        Priority::High => 3,
        Priority::Medium => 2,
        Priority::Low => 1,
        Priority::Unrecognized(_) => 0,
    }
}

/// Sort into display order: rank descending, then due ascending.
///
/// The sort is stable, so records that tie on both keys keep their
/// relative order from the store.
pub fn sort_records(records: &mut [TaskRecord]) {
    records.sort_by(|a, b| {
        priority_rank(&b.priority)
            .cmp(&priority_rank(&a.priority))
            .then_with(|| a.due.cmp(&b.due))
    });
}

pub fn ordered(mut records: Vec<TaskRecord>) -> Vec<TaskRecord> {
    sort_records(&mut records);
    records
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Done,
    Overdue,
    DueSoon,
    Normal,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Done => "done",
            Urgency::Overdue => "overdue",
            Urgency::DueSoon => "due_soon",
            Urgency::Normal => "normal",
        }
    }
}

/// Classify a record against `today`. Only the date part of the due
/// date-time is compared.
pub fn classify(record: &TaskRecord, today: NaiveDate, due_soon_days: u32) -> Urgency {
    if record.is_finished() {
        return Urgency::Done;
    }
    let due = record.due.date();
    if due < today {
        return Urgency::Overdue;
    }
    let horizon = today
        .checked_add_days(Days::new(u64::from(due_soon_days)))
        .unwrap_or(NaiveDate::MAX);
    if due < horizon {
        Urgency::DueSoon
    } else {
        Urgency::Normal
    }
}
