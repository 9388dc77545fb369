use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::ordering::Urgency;
use crate::storage::RecordStore;
use crate::task::{Priority, Status, TaskRecord};

use super::app::{AppState, DeleteConfirmState, StatusKind};
use super::editor::{EditorFieldId, EditorKind, EditorState, PriorityPicker, StatusPicker};

const ID_WIDTH: usize = 5;
const DUE_WIDTH: usize = 14;
const PRIORITY_WIDTH: usize = 8;
const STATUS_WIDTH: usize = 10;
const LABEL_WIDTH: usize = 10;
const HELP_KEY_WIDTH: usize = 10;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);

pub fn render<S: RecordStore>(frame: &mut Frame, app: &AppState<S>) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    render_table(frame, app, chunks[0]);
    render_footer(frame, app, chunks[1]);

    if let Some(editor) = app.editor.as_ref() {
        render_editor_modal(frame, area, editor);
    }
    if let Some(picker) = app.priority_picker.as_ref() {
        render_priority_modal(frame, area, picker);
    }
    if let Some(picker) = app.status_picker.as_ref() {
        render_status_modal(frame, area, picker);
    }
    if let Some(state) = app.delete_confirm.as_ref() {
        render_delete_confirm_modal(frame, area, state);
    }
}

fn render_table<S: RecordStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let help_lines = if app.show_help {
        build_help_lines(content_width)
    } else {
        Vec::new()
    };
    let help_reserved = if help_lines.is_empty() {
        0
    } else {
        help_lines.len() + 1
    };

    let mut lines = vec![render_header_row(content_width)];
    if app.rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "No tasks. Press n to add one.",
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        let list_height = (area.height as usize)
            .saturating_sub(3)
            .saturating_sub(help_reserved);
        let (start, end) = list_window(app.rows.len(), app.selected, list_height);
        for (idx, (task, urgency)) in app.rows.iter().enumerate().take(end).skip(start) {
            let selected = app.selected == Some(idx);
            lines.push(render_row(task, *urgency, selected, content_width));
        }
    }

    if !help_lines.is_empty() {
        lines.push(Line::from(""));
        lines.extend(help_lines);
    }

    let title = format!("Tasks  {}", app.today.format("%d/%m/%y"));
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn render_footer<S: RecordStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let hint_span = Span::styled(app.footer_hint(), Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let counts_line = Line::from(Span::styled(
        app.task_count_summary(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, counts_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

fn render_editor_modal(frame: &mut Frame, area: Rect, editor: &EditorState) {
    let content_width = area.width.saturating_sub(8).min(64);
    let modal = centered_rect(content_width, 10, area);
    frame.render_widget(Clear, modal);

    let title = match editor.kind() {
        EditorKind::NewTask => "New Task".to_string(),
        EditorKind::EditTask => match editor.task_id() {
            Some(id) => format!("Edit Task {id}"),
            None => "Edit Task".to_string(),
        },
    };
    let value_width = (content_width as usize).saturating_sub(LABEL_WIDTH + 4);
    let lines = if editor.confirming() {
        build_confirm_lines(editor, value_width)
    } else {
        build_editor_lines(editor, value_width)
    };

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(COLOR_ACCENT)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, modal);
}

fn build_editor_lines(editor: &EditorState, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, field) in editor.fields().iter().enumerate() {
        let is_active = idx == editor.active_index();
        let label_style = if is_active {
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_MUTED_DARK)
        };
        let mut spans = vec![Span::styled(pad_text(field.label, LABEL_WIDTH), label_style)];
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            truncate_text(&field.value, width.saturating_sub(1)),
            Style::default().fg(COLOR_TEXT),
        ));
        if is_active {
            spans.push(Span::styled(
                " ",
                Style::default().add_modifier(Modifier::REVERSED),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "date: YYYY-MM-DD or dd/MM/yy   time: HH:mm (24h)",
        Style::default().fg(COLOR_MUTED_DARK),
    )));
    if let Some(error) = editor.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines
}

fn build_confirm_lines(editor: &EditorState, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(Span::styled(
            "Save task?",
            Style::default()
                .fg(COLOR_WARNING)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for id in [EditorFieldId::Title, EditorFieldId::Date, EditorFieldId::Time] {
        let label = match id {
            EditorFieldId::Title => "Title",
            EditorFieldId::Date => "Due date",
            EditorFieldId::Time => "Due time",
        };
        lines.push(Line::from(vec![
            Span::styled(pad_text(label, LABEL_WIDTH), Style::default().fg(COLOR_MUTED_DARK)),
            Span::raw(" "),
            Span::styled(
                truncate_text(editor.field_value(id).trim(), width),
                Style::default().fg(COLOR_TEXT),
            ),
        ]));
    }
    if editor.kind() == EditorKind::EditTask {
        lines.push(Line::from(Span::styled(
            "Status will be set back to In process.",
            Style::default().fg(COLOR_MUTED),
        )));
    }
    lines
}

fn render_priority_modal(frame: &mut Frame, area: Rect, picker: &PriorityPicker) {
    let content_width = 22u16.min(area.width.saturating_sub(6));
    let height = (picker.options().len() as u16 + 4).min(area.height.saturating_sub(4));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, option) in picker.options().iter().enumerate() {
        let mut span = Span::styled(
            option.to_string(),
            Style::default()
                .fg(priority_color(option))
                .add_modifier(Modifier::BOLD),
        );
        if idx == picker.selected_index() {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(span));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter apply  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Priority"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_status_modal(frame: &mut Frame, area: Rect, picker: &StatusPicker) {
    let content_width = 26u16.min(area.width.saturating_sub(6));
    let height = (picker.options().len() as u16 + 4).min(area.height.saturating_sub(4));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, option) in picker.options().iter().enumerate() {
        let mut span = Span::styled(option.to_string(), status_style(*option));
        if idx == picker.selected_index() {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(span));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter apply  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_delete_confirm_modal(frame: &mut Frame, area: Rect, state: &DeleteConfirmState) {
    let content_width = area.width.saturating_sub(8).min(64);
    let height = 8u16.min(area.height.saturating_sub(6).max(7));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let title_width = (content_width as usize).saturating_sub(9);
    let lines: Vec<Line<'static>> = vec![
        Line::from(Span::styled(
            "Delete task?",
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("ID: ", Style::default().fg(COLOR_MUTED_DARK)),
            Span::styled(state.task_id.to_string(), id_style()),
        ]),
        Line::from(vec![
            Span::styled("Title: ", Style::default().fg(COLOR_MUTED_DARK)),
            Span::styled(
                truncate_text(&state.title, title_width),
                Style::default().fg(COLOR_TEXT),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "y/enter confirm  esc/n cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Delete Task"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn build_help_lines(width: usize) -> Vec<Line<'static>> {
    vec![
        help_header("Keys"),
        help_line("j/k", "move selection", width),
        help_line("g/G", "first / last task", width),
        help_line("n", "new task", width),
        help_line("e", "edit title and due date", width),
        help_line("d", "delete task", width),
        help_line("p", "change priority", width),
        help_line("s", "change status", width),
        help_line("x", "export to ExportData.csv", width),
        help_line("r", "reload from file", width),
        help_line("q/esc", "quit", width),
        help_line("?", "hide help", width),
    ]
}

fn help_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
    ))
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_width = width.saturating_sub(HELP_KEY_WIDTH + 1);
    let desc_text = truncate_text(desc, desc_width);
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(desc_text, Style::default().fg(COLOR_MUTED)),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_header_row(width: usize) -> Line<'static> {
    let used = ID_WIDTH + DUE_WIDTH + PRIORITY_WIDTH + STATUS_WIDTH + 5;
    let text = format!(
        " {} {} {} {} {}",
        pad_text("ID", ID_WIDTH),
        pad_text("Due", DUE_WIDTH),
        pad_text("Priority", PRIORITY_WIDTH),
        pad_text("Status", STATUS_WIDTH),
        truncate_text("Title", width.saturating_sub(used)),
    );
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(COLOR_MUTED)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

fn render_row(task: &TaskRecord, urgency: Urgency, selected: bool, width: usize) -> Line<'static> {
    let used = ID_WIDTH + DUE_WIDTH + PRIORITY_WIDTH + STATUS_WIDTH + 5;
    let row_style = Style::default().fg(urgency_color(urgency));

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(pad_text(&task.id.to_string(), ID_WIDTH), id_style()),
        Span::raw(" "),
        Span::styled(pad_text(&task.due_label(), DUE_WIDTH), row_style),
        Span::raw(" "),
        Span::styled(
            pad_text(task.priority.as_str(), PRIORITY_WIDTH),
            Style::default()
                .fg(priority_color(&task.priority))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(pad_text(task.status.as_str(), STATUS_WIDTH), status_style(task.status)),
        Span::raw(" "),
        Span::styled(truncate_text(&task.title, width.saturating_sub(used)), row_style),
    ];

    if selected {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }

    Line::from(spans)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn urgency_color(urgency: Urgency) -> Color {
    match urgency {
        Urgency::Overdue => COLOR_ERROR,
        Urgency::DueSoon => COLOR_WARNING,
        Urgency::Done => COLOR_SUCCESS,
        Urgency::Normal => COLOR_TEXT,
    }
}

fn priority_color(priority: &Priority) -> Color {
    match priority {
        Priority::High => Color::Rgb(255, 147, 112),
        Priority::Medium => COLOR_ACCENT,
        Priority::Low => COLOR_MUTED,
        Priority::Unrecognized(_) => COLOR_MUTED_DARK,
    }
}

fn status_style(status: Status) -> Style {
    match status {
        Status::InProcess => Style::default().fg(COLOR_INFO),
        Status::Finished => Style::default().fg(COLOR_SUCCESS),
    }
}

fn pad_text(value: &str, width: usize) -> String {
    let text = truncate_text(value, width);
    format!("{text:width$}")
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

fn id_style() -> Style {
    Style::default()
        .fg(COLOR_MUTED)
        .add_modifier(Modifier::BOLD)
}
