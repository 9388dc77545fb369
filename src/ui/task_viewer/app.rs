use std::io;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::error::{Error, Result};
use crate::export::export_records;
use crate::ordering::Urgency;
use crate::repository::TaskRepository;
use crate::session::EditSession;
use crate::storage::RecordStore;
use crate::task::{TaskRecord, DEFAULT_TIME};

use super::editor::{
    EditorAction, EditorKind, EditorState, PickerAction, PriorityPicker, StatusPicker,
};
use super::view;

/// Settings the viewer takes from the loaded config
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub default_time: String,
    pub export_dir: PathBuf,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            default_time: DEFAULT_TIME.to_string(),
            export_dir: PathBuf::from(crate::export::DEFAULT_EXPORT_DIR),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

pub(crate) struct DeleteConfirmState {
    pub(crate) task_id: u32,
    pub(crate) title: String,
}

pub struct AppState<S: RecordStore> {
    pub(crate) rows: Vec<(TaskRecord, Urgency)>,
    pub(crate) selected: Option<usize>,
    pub(crate) editor: Option<EditorState>,
    pub(crate) priority_picker: Option<PriorityPicker>,
    pub(crate) status_picker: Option<StatusPicker>,
    pub(crate) delete_confirm: Option<DeleteConfirmState>,
    pub(crate) show_help: bool,
    pub(crate) today: NaiveDate,
    session: EditSession,
    status_message: Option<String>,
    info_message: Option<String>,
    repo: TaskRepository<S>,
    options: ViewerOptions,
}

impl<S: RecordStore> AppState<S> {
    pub fn new(repo: TaskRepository<S>, options: ViewerOptions, today: NaiveDate) -> Self {
        let mut app = Self {
            rows: Vec::new(),
            selected: None,
            editor: None,
            priority_picker: None,
            status_picker: None,
            delete_confirm: None,
            show_help: false,
            today,
            session: EditSession::new(),
            status_message: None,
            info_message: None,
            repo,
            options,
        };
        app.reload();
        app
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Re-read the store, keeping the selection on the same task id when
    /// it still exists.
    pub fn reload(&mut self) {
        let previous = self.selected_task().map(|task| task.id);
        match self.repo.list_classified(self.today) {
            Ok(rows) => self.rows = rows,
            Err(err) => {
                self.set_error(err.to_string());
                return;
            }
        }
        self.selected = previous
            .and_then(|id| self.rows.iter().position(|(task, _)| task.id == id))
            .or(if self.rows.is_empty() { None } else { Some(0) })
            .map(|idx| idx.min(self.rows.len().saturating_sub(1)));
    }

    pub(crate) fn selected_task(&self) -> Option<&TaskRecord> {
        self.selected
            .and_then(|idx| self.rows.get(idx))
            .map(|(task, _)| task)
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        if let Some(info) = self.info_message.as_ref() {
            return Some((info.clone(), StatusKind::Info));
        }
        self.session
            .editing()
            .map(|id| (format!("editing task {id}"), StatusKind::Info))
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.status_picker.is_some() || self.priority_picker.is_some() {
            return "j/k move  enter apply  esc cancel".to_string();
        }
        if self.delete_confirm.is_some() {
            return "y confirm delete  esc cancel".to_string();
        }
        if let Some(editor) = self.editor.as_ref() {
            if editor.confirming() {
                return "enter/y save  e back  esc cancel".to_string();
            }
            return "tab next field  enter next/save  ctrl+u clear  esc cancel".to_string();
        }
        "j/k move  n new  e edit  d delete  p priority  s status  x export  ? help  q quit"
            .to_string()
    }

    pub(crate) fn task_count_summary(&self) -> String {
        let mut overdue = 0usize;
        let mut due_soon = 0usize;
        let mut done = 0usize;
        for (_, urgency) in &self.rows {
            match urgency {
                Urgency::Overdue => overdue += 1,
                Urgency::DueSoon => due_soon += 1,
                Urgency::Done => done += 1,
                Urgency::Normal => {}
            }
        }
        format!(
            "{} tasks  {} overdue  {} due soon  {} done  (window {} days)",
            self.rows.len(),
            overdue,
            due_soon,
            done,
            self.repo.due_soon_days()
        )
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.selected = None;
            return;
        }
        let len = self.rows.len() as isize;
        let current = self.selected.unwrap_or(0) as isize;
        self.selected = Some((current + delta).clamp(0, len - 1) as usize);
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.info_message = None;
    }

    fn set_info(&mut self, message: String) {
        self.info_message = Some(message);
        self.status_message = None;
    }

    fn clear_messages(&mut self) {
        self.status_message = None;
        self.info_message = None;
    }

    /// Show the result of a mutation and reload on success.
    fn apply_result(&mut self, result: Result<TaskRecord>, verb: &str) {
        match result {
            Ok(task) => {
                self.clear_messages();
                self.reload();
                if self.status_message.is_none() {
                    self.set_info(format!("task {} {verb}", task.id));
                }
            }
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn begin_edit(&mut self) {
        let Some(id) = self.selected_task().map(|task| task.id) else {
            self.set_error("no task selected".to_string());
            return;
        };
        match self.session.begin(&self.repo, id) {
            Ok(task) => {
                self.clear_messages();
                self.editor = Some(EditorState::edit_task(&task));
            }
            Err(err @ Error::NotFound(_)) => {
                self.set_error(err.to_string());
                self.reload();
            }
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn submit_editor(&mut self, mut editor: EditorState) {
        let submit = match editor.build_submit() {
            Ok(submit) => submit,
            Err(err) => {
                editor.set_error(err);
                self.editor = Some(editor);
                return;
            }
        };

        let result = match editor.kind() {
            EditorKind::NewTask => self.repo.add(&submit.title, Some(submit.date), &submit.time),
            EditorKind::EditTask => {
                self.session
                    .commit(&self.repo, &submit.title, Some(submit.date), &submit.time)
            }
        };
        let verb = match editor.kind() {
            EditorKind::NewTask => "added",
            EditorKind::EditTask => "saved",
        };

        match result {
            Ok(task) => self.apply_result(Ok(task), verb),
            Err(err @ Error::Validation { .. }) => {
                editor.set_error(err.to_string());
                self.editor = Some(editor);
            }
            Err(err) => {
                // The session has already closed for a vanished task.
                if self.session.is_idle() {
                    self.reload();
                } else {
                    self.editor = Some(editor);
                }
                self.set_error(err.to_string());
            }
        }
    }

    fn export(&mut self) {
        let records: Vec<TaskRecord> = self.rows.iter().map(|(task, _)| task.clone()).collect();
        match export_records(&records, &self.options.export_dir) {
            Ok(path) => self.set_info(format!(
                "exported {} tasks to {}",
                records.len(),
                path.display()
            )),
            Err(err) => self.set_error(format!("export failed: {err}")),
        }
    }
}

pub fn run<S: RecordStore>(repo: TaskRepository<S>, options: ViewerOptions) -> Result<()> {
    let today = Local::now().date_naive();
    let mut app = AppState::new(repo, options, today);
    run_terminal(&mut app)
}

fn run_terminal<S: RecordStore>(app: &mut AppState<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<S: RecordStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<S>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| view::render(frame, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(app, key) {
                break;
            }
        }
    }
    Ok(())
}

/// Apply one key press. Returns `true` when the viewer should exit.
pub(crate) fn handle_key<S: RecordStore>(app: &mut AppState<S>, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some(confirm) = app.delete_confirm.take() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let result = app.session.delete(&app.repo, confirm.task_id);
                app.apply_result(result, "deleted");
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                app.set_info("cancelled".to_string());
            }
            _ => {
                app.delete_confirm = Some(confirm);
            }
        }
        return false;
    }

    if let Some(mut picker) = app.priority_picker.take() {
        match picker.handle_key(key) {
            PickerAction::None => app.priority_picker = Some(picker),
            PickerAction::Cancel => {}
            PickerAction::Confirm => {
                let Some(id) = app.selected_task().map(|task| task.id) else {
                    app.set_error("no task selected".to_string());
                    return false;
                };
                let result = app
                    .repo
                    .update_fields(id, Some(picker.selected_priority()), None);
                app.apply_result(result, "updated");
            }
        }
        return false;
    }

    if let Some(mut picker) = app.status_picker.take() {
        match picker.handle_key(key) {
            PickerAction::None => app.status_picker = Some(picker),
            PickerAction::Cancel => {}
            PickerAction::Confirm => {
                let Some(id) = app.selected_task().map(|task| task.id) else {
                    app.set_error("no task selected".to_string());
                    return false;
                };
                let result = app
                    .repo
                    .update_fields(id, None, Some(picker.selected_status()));
                app.apply_result(result, "updated");
            }
        }
        return false;
    }

    if let Some(mut editor) = app.editor.take() {
        match editor.handle_key(key) {
            EditorAction::None => app.editor = Some(editor),
            EditorAction::Cancel => {
                app.session.cancel();
                app.set_info("cancelled".to_string());
            }
            EditorAction::Submit => app.submit_editor(editor),
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('?') => app.show_help = !app.show_help,
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char('g') | KeyCode::Home => app.move_selection(isize::MIN / 2),
        KeyCode::Char('G') | KeyCode::End => app.move_selection(isize::MAX / 2),
        KeyCode::Char('r') => {
            app.clear_messages();
            app.reload();
        }
        KeyCode::Char('n') => {
            app.clear_messages();
            app.editor = Some(EditorState::new_task(app.today, &app.options.default_time));
        }
        KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Char('d') => match app.selected_task() {
            Some(task) => {
                app.delete_confirm = Some(DeleteConfirmState {
                    task_id: task.id,
                    title: task.title.clone(),
                });
            }
            None => app.set_error("no task selected".to_string()),
        },
        KeyCode::Char('p') => match app.selected_task() {
            Some(task) => app.priority_picker = Some(PriorityPicker::new(&task.priority)),
            None => app.set_error("no task selected".to_string()),
        },
        KeyCode::Char('s') => match app.selected_task() {
            Some(task) => app.status_picker = Some(StatusPicker::new(task.status)),
            None => app.set_error("no task selected".to_string()),
        },
        KeyCode::Char('x') => app.export(),
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CsvStore;
    use crate::task::{Priority, Status};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text<S: RecordStore>(app: &mut AppState<S>, text: &str) {
        for ch in text.chars() {
            handle_key(app, press(KeyCode::Char(ch)));
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn app_with_tasks(dir: &tempfile::TempDir, titles: &[&str]) -> AppState<CsvStore> {
        let store = CsvStore::new(dir.path().join("tasks.csv"));
        store.init().unwrap();
        let repo = TaskRepository::new(store);
        for title in titles {
            repo.add(title, Some(today()), "13:00").unwrap();
        }
        let options = ViewerOptions {
            default_time: "13:00".to_string(),
            export_dir: dir.path().join("ExportData"),
        };
        AppState::new(repo, options, today())
    }

    #[test]
    fn new_task_form_adds_task() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_tasks(&dir, &[]);
        assert!(app.rows.is_empty());

        handle_key(&mut app, press(KeyCode::Char('n')));
        type_text(&mut app, "Water plants");
        for _ in 0..3 {
            handle_key(&mut app, press(KeyCode::Enter));
        }
        assert!(app.editor.as_ref().is_some_and(|editor| editor.confirming()));
        handle_key(&mut app, press(KeyCode::Enter));

        assert!(app.editor.is_none());
        assert_eq!(app.rows.len(), 1);
        let (task, urgency) = &app.rows[0];
        assert_eq!(task.title, "Water plants");
        assert_eq!(task.due_label(), "10/06/24 13:00");
        assert_eq!(*urgency, Urgency::DueSoon);
        assert_eq!(app.selected, Some(0));
    }

    #[test]
    fn priority_picker_reorders_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_tasks(&dir, &["first", "second"]);
        assert_eq!(app.rows[0].0.id, 1);

        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Char('p')));
        handle_key(&mut app, press(KeyCode::Char('k')));
        handle_key(&mut app, press(KeyCode::Enter));

        assert_eq!(app.rows[0].0.id, 2);
        assert_eq!(app.rows[0].0.priority, Priority::High);
        assert_eq!(app.selected_task().map(|task| task.id), Some(2));
    }

    #[test]
    fn status_picker_marks_done() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_tasks(&dir, &["only"]);

        handle_key(&mut app, press(KeyCode::Char('s')));
        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Enter));

        assert_eq!(app.rows[0].0.status, Status::Finished);
        assert_eq!(app.rows[0].1, Urgency::Done);
    }

    #[test]
    fn delete_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_tasks(&dir, &["keep", "drop"]);

        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Char('d')));
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.rows.len(), 2);

        handle_key(&mut app, press(KeyCode::Char('d')));
        handle_key(&mut app, press(KeyCode::Char('y')));
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.rows[0].0.title, "keep");
    }

    #[test]
    fn invalid_edit_keeps_session_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_tasks(&dir, &["task"]);

        handle_key(&mut app, press(KeyCode::Char('e')));
        assert_eq!(app.session().editing(), Some(1));

        // Jump to the time field and enter an out-of-range hour.
        handle_key(&mut app, press(KeyCode::Tab));
        handle_key(&mut app, press(KeyCode::Tab));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        type_text(&mut app, "24:00");
        handle_key(&mut app, press(KeyCode::Enter));

        let editor = app.editor.as_ref().expect("editor stays open");
        assert!(editor.error().is_some());
        assert_eq!(app.session().editing(), Some(1));

        handle_key(&mut app, press(KeyCode::Esc));
        assert!(app.editor.is_none());
        assert!(app.session().is_idle());
    }

    #[test]
    fn edit_saves_and_resets_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_tasks(&dir, &["task"]);
        handle_key(&mut app, press(KeyCode::Char('s')));
        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.rows[0].0.status, Status::Finished);

        handle_key(&mut app, press(KeyCode::Char('e')));
        type_text(&mut app, " renamed");
        for _ in 0..4 {
            handle_key(&mut app, press(KeyCode::Enter));
        }

        assert!(app.editor.is_none());
        assert!(app.session().is_idle());
        assert_eq!(app.rows[0].0.title, "task renamed");
        assert_eq!(app.rows[0].0.status, Status::InProcess);
    }

    #[test]
    fn export_writes_visible_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_tasks(&dir, &["a", "b"]);

        handle_key(&mut app, press(KeyCode::Char('x')));

        let exported = dir.path().join("ExportData").join("ExportData.csv");
        let content = std::fs::read_to_string(exported).unwrap();
        assert_eq!(content.lines().count(), 3);
        let (message, kind) = app.status_line().unwrap();
        assert_eq!(kind, StatusKind::Info);
        assert!(message.starts_with("exported 2 tasks"));
    }

    #[test]
    fn missing_store_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let repo = TaskRepository::new(CsvStore::new(dir.path().join("absent.csv")));
        let mut app = AppState::new(repo, ViewerOptions::default(), today());

        let (message, kind) = app.status_line().unwrap();
        assert_eq!(kind, StatusKind::Error);
        assert!(message.contains("does not exist"));
        assert!(!handle_key(&mut app, press(KeyCode::Char('j'))));
        assert!(handle_key(&mut app, press(KeyCode::Char('q'))));
    }
}
