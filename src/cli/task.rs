//! tasksched task command implementations.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::cli::Context;
use crate::error::{Error, Result};
use crate::export::export_records;
use crate::ordering::{classify, Urgency};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{parse_date, Priority, Status, TaskRecord};

pub struct AddOptions {
    pub title: String,
    pub date: Option<String>,
    pub time: Option<String>,
}

pub struct ListOptions {
    pub today: Option<String>,
    pub verbose: bool,
}

pub struct SetOptions {
    pub id: u32,
    pub priority: Option<String>,
    pub status: Option<String>,
}

pub struct EditOptions {
    pub id: u32,
    pub title: String,
    pub date: String,
    pub time: String,
}

#[derive(Serialize)]
struct TaskView<'a> {
    #[serde(flatten)]
    record: &'a TaskRecord,
    urgency: Urgency,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    store: PathBuf,
    today: String,
    tasks: Vec<TaskView<'a>>,
}

#[derive(Serialize)]
struct ExportOutput {
    path: PathBuf,
    count: usize,
}

pub fn run_add(ctx: &Context, options: AddOptions, output: OutputOptions) -> Result<()> {
    let date = match options.date.as_deref() {
        Some(value) => parse_date(value)?,
        None => today(),
    };
    let time = options
        .time
        .unwrap_or_else(|| ctx.config.input.default_time.clone());
    let record = ctx.repo.add(&options.title, Some(date), &time)?;

    let mut human = HumanOutput::new("Task added");
    push_task_summary(&mut human, &record);
    emit_success(output, "add", &record, Some(&human))
}

pub fn run_list(ctx: &Context, options: ListOptions, output: OutputOptions) -> Result<()> {
    let today = match options.today.as_deref() {
        Some(value) => parse_date(value)?,
        None => today(),
    };
    let classified = ctx.repo.list_classified(today)?;

    let header = if classified.is_empty() {
        "No tasks".to_string()
    } else {
        format!("Tasks ({})", classified.len())
    };
    let mut human = HumanOutput::new(header);
    if options.verbose {
        human.push_summary("Store", ctx.repo.store().path().display().to_string());
        human.push_summary("Today", today.to_string());
    }
    for (record, urgency) in &classified {
        human.push_detail(format_row(record, *urgency));
        if !record.priority.is_recognized() {
            human.push_warning(format!(
                "task {} has unknown priority '{}', listed last",
                record.id, record.priority
            ));
        }
    }
    if classified.is_empty() {
        human.push_next_step("tasksched add \"Title\" --date YYYY-MM-DD");
    }

    let data = ListOutput {
        store: ctx.repo.store().path().to_path_buf(),
        today: today.to_string(),
        tasks: classified
            .iter()
            .map(|(record, urgency)| TaskView {
                record,
                urgency: *urgency,
            })
            .collect(),
    };
    emit_success(output, "list", &data, Some(&human))
}

pub fn run_show(ctx: &Context, id: u32, output: OutputOptions) -> Result<()> {
    let record = ctx.repo.get(id)?;
    let urgency = classify(&record, today(), ctx.repo.due_soon_days());

    let mut human = HumanOutput::new(format!("Task {id}"));
    push_task_summary(&mut human, &record);
    human.push_summary("Urgency", urgency.as_str());

    let view = TaskView {
        record: &record,
        urgency,
    };
    emit_success(output, "show", &view, Some(&human))
}

pub fn run_delete(ctx: &Context, id: u32, output: OutputOptions) -> Result<()> {
    let removed = ctx.repo.delete(id)?;

    let mut human = HumanOutput::new("Task deleted");
    push_task_summary(&mut human, &removed);
    emit_success(output, "delete", &removed, Some(&human))
}

pub fn run_set(ctx: &Context, options: SetOptions, output: OutputOptions) -> Result<()> {
    if options.priority.is_none() && options.status.is_none() {
        return Err(Error::InvalidArgument(
            "nothing to set: pass --priority and/or --status".to_string(),
        ));
    }
    let priority = options
        .priority
        .as_deref()
        .map(str::parse::<Priority>)
        .transpose()?;
    let status = options
        .status
        .as_deref()
        .map(str::parse::<Status>)
        .transpose()?;
    let record = ctx.repo.update_fields(options.id, priority, status)?;

    let mut human = HumanOutput::new("Task updated");
    push_task_summary(&mut human, &record);
    emit_success(output, "set", &record, Some(&human))
}

pub fn run_edit(ctx: &Context, options: EditOptions, output: OutputOptions) -> Result<()> {
    let date = parse_date(&options.date)?;
    let record = ctx
        .repo
        .edit(options.id, &options.title, Some(date), &options.time)?;

    let mut human = HumanOutput::new("Task edited");
    push_task_summary(&mut human, &record);
    emit_success(output, "edit", &record, Some(&human))
}

pub fn run_export(ctx: &Context, dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let dir = dir.unwrap_or_else(|| ctx.config.store.export_dir.clone());
    let records = ctx.repo.list_ordered()?;
    let path = export_records(&records, &dir)?;

    let data = ExportOutput {
        path,
        count: records.len(),
    };
    let mut human = HumanOutput::new("Tasks exported");
    human.push_summary("File", data.path.display().to_string());
    human.push_summary("Tasks", data.count.to_string());
    emit_success(output, "export", &data, Some(&human))
}

pub fn run_tui(ctx: Context) -> Result<()> {
    crate::ui::task_viewer::run(
        ctx.repo,
        crate::ui::task_viewer::ViewerOptions {
            default_time: ctx.config.input.default_time,
            export_dir: ctx.config.store.export_dir,
        },
    )
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn push_task_summary(human: &mut HumanOutput, record: &TaskRecord) {
    human.push_summary("ID", record.id.to_string());
    human.push_summary("Title", record.title.clone());
    human.push_summary("Due", record.due_label());
    human.push_summary("Priority", record.priority.to_string());
    human.push_summary("Status", record.status.to_string());
}

fn format_row(record: &TaskRecord, urgency: Urgency) -> String {
    let mut row = format!(
        "{:>4}  {}  {:<6}  {:<10}  {}",
        record.id,
        record.due_label(),
        record.priority.as_str(),
        record.status.as_str(),
        record.title
    );
    match urgency {
        Urgency::Overdue | Urgency::DueSoon => {
            row.push_str(&format!("  [{}]", urgency.as_str()));
        }
        Urgency::Done | Urgency::Normal => {}
    }
    row
}
