//! Task repository
//!
//! Every operation is a full load, one change, and a full rewrite through
//! the [`RecordStore`]. Nothing is cached between calls.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::ordering::{classify, ordered, Urgency, DEFAULT_DUE_SOON_DAYS};
use crate::storage::RecordStore;
use crate::task::{validate_input, Priority, Status, TaskRecord};

pub struct TaskRepository<S: RecordStore> {
    store: S,
    due_soon_days: u32,
}

impl<S: RecordStore> TaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }

    pub fn with_due_soon_days(mut self, days: u32) -> Self {
        self.due_soon_days = days;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn due_soon_days(&self) -> u32 {
        self.due_soon_days
    }

    /// One past the largest id in the store, or 1 when it is empty.
    pub fn next_id(&self) -> Result<u32> {
        let records = self.store.load()?;
        next_id_for(&records)
    }

    /// Create a task with priority Medium and status "In process".
    pub fn add(&self, title: &str, date: Option<NaiveDate>, time: &str) -> Result<TaskRecord> {
        let (title, due) = validate_input(title, date, time)?;
        let mut records = self.store.load()?;
        let record = TaskRecord::new(next_id_for(&records)?, title, due);
        records.push(record.clone());
        self.store.replace(&records)?;
        tracing::info!(id = record.id, "task added");
        Ok(record)
    }

    /// Remove the task with `id`. The store is not rewritten when it is absent.
    pub fn delete(&self, id: u32) -> Result<TaskRecord> {
        let mut records = self.store.load()?;
        let index = position(&records, id)?;
        let removed = records.remove(index);
        self.store.replace(&records)?;
        tracing::info!(id, "task deleted");
        Ok(removed)
    }

    /// Set priority and/or status in place.
    pub fn update_fields(
        &self,
        id: u32,
        priority: Option<Priority>,
        status: Option<Status>,
    ) -> Result<TaskRecord> {
        let mut records = self.store.load()?;
        let index = position(&records, id)?;
        if priority.is_none() && status.is_none() {
            return Ok(records.swap_remove(index));
        }

        let record = &mut records[index];
        if let Some(priority) = priority {
            record.priority = priority;
        }
        if let Some(status) = status {
            record.status = status;
        }
        let updated = record.clone();
        self.store.replace(&records)?;
        tracing::info!(
            id,
            priority = updated.priority.as_str(),
            status = updated.status.as_str(),
            "task updated"
        );
        Ok(updated)
    }

    /// Replace title and due date. Status goes back to "In process".
    pub fn edit(
        &self,
        id: u32,
        title: &str,
        date: Option<NaiveDate>,
        time: &str,
    ) -> Result<TaskRecord> {
        let (title, due) = validate_input(title, date, time)?;
        let mut records = self.store.load()?;
        let index = position(&records, id)?;

        let record = &mut records[index];
        record.title = title;
        record.due = due;
        record.status = Status::InProcess;
        let updated = record.clone();
        self.store.replace(&records)?;
        tracing::info!(id, "task edited");
        Ok(updated)
    }

    pub fn get(&self, id: u32) -> Result<TaskRecord> {
        let mut records = self.store.load()?;
        let index = position(&records, id)?;
        Ok(records.swap_remove(index))
    }

    /// All records in display order.
    pub fn list_ordered(&self) -> Result<Vec<TaskRecord>> {
        Ok(ordered(self.store.load()?))
    }

    /// Display order with each record's urgency relative to `today`.
    pub fn list_classified(&self, today: NaiveDate) -> Result<Vec<(TaskRecord, Urgency)>> {
        let records = self.list_ordered()?;
        Ok(records
            .into_iter()
            .map(|record| {
                let urgency = classify(&record, today, self.due_soon_days);
                (record, urgency)
            })
            .collect())
    }
}

fn position(records: &[TaskRecord], id: u32) -> Result<usize> {
    records
        .iter()
        .position(|record| record.id == id)
        .ok_or(Error::NotFound(id))
}

fn next_id_for(records: &[TaskRecord]) -> Result<u32> {
    let max = records.iter().map(|record| record.id).max().unwrap_or(0);
    max.checked_add(1)
        .ok_or_else(|| Error::OperationFailed("task id space exhausted".to_string()))
}
