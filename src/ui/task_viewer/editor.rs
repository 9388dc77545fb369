use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::task::{parse_date, parse_time, Priority, Status, TaskRecord};

/// Date layout pre-filled in the form; `parse_date` also accepts `dd/MM/yy`.
const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    NewTask,
    EditTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFieldId {
    Title,
    Date,
    Time,
}

#[derive(Debug, Clone)]
pub struct EditorField {
    pub id: EditorFieldId,
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct EditorSubmit {
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Cancel,
    Submit,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    kind: EditorKind,
    fields: Vec<EditorField>,
    active: usize,
    confirming: bool,
    error: Option<String>,
    task_id: Option<u32>,
}

impl EditorState {
    pub fn new_task(today: NaiveDate, default_time: &str) -> Self {
        Self {
            kind: EditorKind::NewTask,
            fields: form_fields(
                String::new(),
                today.format(FORM_DATE_FORMAT).to_string(),
                default_time.to_string(),
            ),
            active: 0,
            confirming: false,
            error: None,
            task_id: None,
        }
    }

    pub fn edit_task(task: &TaskRecord) -> Self {
        Self {
            kind: EditorKind::EditTask,
            fields: form_fields(
                task.title.clone(),
                task.due.date().format(FORM_DATE_FORMAT).to_string(),
                task.due.time().format("%H:%M").to_string(),
            ),
            active: 0,
            confirming: false,
            error: None,
            task_id: Some(task.id),
        }
    }

    pub fn kind(&self) -> EditorKind {
        self.kind
    }

    pub fn task_id(&self) -> Option<u32> {
        self.task_id
    }

    pub fn fields(&self) -> &[EditorField] {
        &self.fields
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn confirming(&self) -> bool {
        self.confirming
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.confirming = false;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        if self.confirming {
            return self.handle_confirm_key(key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
            if let Some(field) = self.current_field_mut() {
                field.value.clear();
            }
            self.error = None;
            return EditorAction::None;
        }

        match key.code {
            KeyCode::Esc => return EditorAction::Cancel,
            KeyCode::Tab | KeyCode::Down => {
                self.move_active(1);
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_active(-1);
            }
            KeyCode::Enter => {
                if self.active + 1 >= self.fields.len() {
                    return self.attempt_confirm();
                }
                self.move_active(1);
            }
            KeyCode::Backspace => {
                if let Some(field) = self.current_field_mut() {
                    field.value.pop();
                }
            }
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return EditorAction::None;
                }
                if !ch.is_control() {
                    if let Some(field) = self.current_field_mut() {
                        field.value.push(ch);
                    }
                }
            }
            _ => {}
        }

        self.error = None;
        EditorAction::None
    }

    pub fn build_submit(&self) -> Result<EditorSubmit, String> {
        let date = self.validate()?;
        Ok(EditorSubmit {
            title: self.field_value(EditorFieldId::Title).trim().to_string(),
            date,
            time: self.field_value(EditorFieldId::Time).trim().to_string(),
        })
    }

    pub fn field_value(&self, id: EditorFieldId) -> &str {
        self.fields
            .iter()
            .find(|field| field.id == id)
            .map(|field| field.value.as_str())
            .unwrap_or("")
    }

    fn attempt_confirm(&mut self) -> EditorAction {
        match self.validate() {
            Ok(_) => {
                self.confirming = true;
                self.error = None;
            }
            Err(err) => self.set_error(err),
        }
        EditorAction::None
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> EditorAction {
        match key.code {
            KeyCode::Esc => EditorAction::Cancel,
            KeyCode::Backspace | KeyCode::Char('e') => {
                self.confirming = false;
                self.error = None;
                EditorAction::None
            }
            KeyCode::Char('y') | KeyCode::Enter => EditorAction::Submit,
            _ => EditorAction::None,
        }
    }

    /// Form-level checks, in field order. The repository validates again.
    fn validate(&self) -> Result<NaiveDate, String> {
        if self.field_value(EditorFieldId::Title).trim().is_empty() {
            return Err("title is required".to_string());
        }
        let date = parse_date(self.field_value(EditorFieldId::Date)).map_err(|err| err.to_string())?;
        parse_time(self.field_value(EditorFieldId::Time)).map_err(|err| err.to_string())?;
        Ok(date)
    }

    fn move_active(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        if len == 0 {
            self.active = 0;
            return;
        }
        let next = (self.active as isize + delta).rem_euclid(len);
        self.active = next as usize;
    }

    fn current_field_mut(&mut self) -> Option<&mut EditorField> {
        self.fields.get_mut(self.active)
    }
}

fn form_fields(title: String, date: String, time: String) -> Vec<EditorField> {
    vec![
        EditorField {
            id: EditorFieldId::Title,
            label: "Title",
            value: title,
        },
        EditorField {
            id: EditorFieldId::Date,
            label: "Due date",
            value: date,
        },
        EditorField {
            id: EditorFieldId::Time,
            label: "Due time",
            value: time,
        },
    ]
}

/// Outcome of a key press in either picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    None,
    Cancel,
    Confirm,
}

#[derive(Debug, Clone)]
pub struct PriorityPicker {
    options: Vec<Priority>,
    selected: usize,
}

impl PriorityPicker {
    /// Unrecognized stored priorities start on Medium.
    pub fn new(current: &Priority) -> Self {
        let options = Priority::ALL.to_vec();
        let selected = options
            .iter()
            .position(|value| value == current)
            .unwrap_or(1);
        Self { options, selected }
    }

    pub fn options(&self) -> &[Priority] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_priority(&self) -> Priority {
        self.options
            .get(self.selected)
            .cloned()
            .unwrap_or_default()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        handle_picker_key(key, &mut self.selected, self.options.len())
    }
}

#[derive(Debug, Clone)]
pub struct StatusPicker {
    selected: usize,
}

impl StatusPicker {
    pub fn new(current: Status) -> Self {
        let selected = Status::ALL
            .iter()
            .position(|value| *value == current)
            .unwrap_or(0);
        Self { selected }
    }

    pub fn options(&self) -> &[Status] {
        &Status::ALL
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_status(&self) -> Status {
        Status::ALL[self.selected]
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        handle_picker_key(key, &mut self.selected, Status::ALL.len())
    }
}

fn handle_picker_key(key: KeyEvent, selected: &mut usize, len: usize) -> PickerAction {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return PickerAction::Cancel,
        KeyCode::Enter => return PickerAction::Confirm,
        KeyCode::Down | KeyCode::Char('j') => move_selection(selected, len, 1),
        KeyCode::Up | KeyCode::Char('k') => move_selection(selected, len, -1),
        KeyCode::Char(ch) if ch.is_ascii_digit() => {
            if let Some(idx) = ch.to_digit(10).and_then(|value| value.checked_sub(1)) {
                let idx = idx as usize;
                if idx < len {
                    *selected = idx;
                }
            }
        }
        _ => {}
    }
    PickerAction::None
}

fn move_selection(selected: &mut usize, len: usize, delta: isize) {
    if len == 0 {
        *selected = 0;
        return;
    }
    let next = (*selected as isize + delta).rem_euclid(len as isize);
    *selected = next as usize;
}
