use crate::config::{absolute, EditorConfig};
use crate::error::EditorError;
use crate::form::{wrap_rows, Field, Focus, FormState};
use crate::media::{attachable_path, NewsLink};
use crate::news_entry::NewsEntry;
use crate::news_state::NewsState;
use crate::news_store::LoadReport;
use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{stdout, Stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::debug;
use unicode_width::UnicodeWidthChar;

const TITLE_WIDTH: usize = 60;
const CURSOR_BLINK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    New,
    Delete,
    Reload,
    Save,
    AttachImage,
    AddLink,
    Quit,
}

enum Mode {
    Edit,
    Prompt { kind: PromptKind, input: String },
    ConfirmDelete(usize),
}

enum PromptKind {
    ImagePath,
    LinkUrl,
    LinkLabel { url: String },
}

impl PromptKind {
    fn title(&self) -> &'static str {
        match self {
            PromptKind::ImagePath => "Attach image (file path)",
            PromptKind::LinkUrl => "Add link: URL",
            PromptKind::LinkLabel { .. } => "Add link: button label (optional)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Error,
}

struct Status {
    text: String,
    level: Level,
}

/// Everything the form shell shows, independent of the terminal.
struct Screen {
    form: FormState,
    list_index: usize,
    mode: Mode,
    status: Option<Status>,
    cursor_visible: bool,
    media_root: PathBuf,
}

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    screen: Screen,
    last_cursor_update: Instant,
}

impl UI {
    pub fn new(config: &EditorConfig) -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI {
            terminal,
            screen: Screen::new(config),
            last_cursor_update: Instant::now(),
        })
    }

    pub fn run(&mut self, state: &mut NewsState, report: &LoadReport) -> Result<()> {
        self.screen.show_report(state, report);

        loop {
            let now = Instant::now();
            if now.duration_since(self.last_cursor_update) >= CURSOR_BLINK {
                self.screen.cursor_visible = !self.screen.cursor_visible;
                self.last_cursor_update = now;
            }
            self.display(state.get_entries())?;

            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                self.screen.cursor_visible = true;
                self.last_cursor_update = Instant::now();

                if let Some(action) = self.screen.handle_input(key, state) {
                    debug!(?action, "form action");
                    if !self.screen.perform(action, state) {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    fn display(&mut self, entries: &[NewsEntry]) -> Result<()> {
        let screen = &self.screen;
        self.terminal.draw(|f| screen.render(f, entries))?;
        Ok(())
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

impl Screen {
    fn new(config: &EditorConfig) -> Self {
        Screen {
            form: FormState::new(config.default_tag.clone()),
            list_index: 0,
            mode: Mode::Edit,
            status: None,
            cursor_visible: true,
            media_root: config.media_root.clone(),
        }
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            level: Level::Info,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            level: Level::Error,
        });
    }

    fn show_report(&mut self, state: &NewsState, report: &LoadReport) {
        let text = format!("{}: {report}", state.store().path().display());
        if report.is_problem() {
            self.error(text);
        } else {
            self.info(text);
        }
        self.form.clear();
        self.list_index = 0;
    }

    fn handle_input(&mut self, key: KeyEvent, state: &mut NewsState) -> Option<Action> {
        match std::mem::replace(&mut self.mode, Mode::Edit) {
            Mode::Prompt { kind, input } => {
                self.handle_prompt_key(key.code, kind, input);
                None
            }
            Mode::ConfirmDelete(index) => {
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.delete(index, state);
                } else {
                    self.info("Nothing was deleted");
                }
                None
            }
            Mode::Edit => self.handle_edit_key(key, state),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent, state: &NewsState) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('n') => Some(Action::New),
                KeyCode::Char('d') => Some(Action::Delete),
                KeyCode::Char('r') => Some(Action::Reload),
                KeyCode::Char('s') => Some(Action::Save),
                KeyCode::Char('o') => Some(Action::AttachImage),
                KeyCode::Char('l') => Some(Action::AddLink),
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Esc => return Some(Action::Quit),
            KeyCode::Tab => self.form.focus = self.form.focus.next(),
            KeyCode::BackTab => self.form.focus = self.form.focus.prev(),
            code => match self.form.focus {
                Focus::List => self.handle_list_key(code, state.get_entries()),
                Focus::Field(field) => self.handle_field_key(code, field),
            },
        }
        None
    }

    fn handle_list_key(&mut self, code: KeyCode, entries: &[NewsEntry]) {
        if entries.is_empty() {
            return;
        }
        let last = entries.len() - 1;
        self.list_index = match code {
            KeyCode::Up => self.list_index.saturating_sub(1),
            KeyCode::Down => (self.list_index + 1).min(last),
            KeyCode::Home => 0,
            KeyCode::End => last,
            KeyCode::Enter => {
                self.form.focus = Focus::Field(Field::Title);
                self.list_index.min(last)
            }
            _ => return,
        };
        self.form.load(self.list_index, &entries[self.list_index]);
    }

    fn handle_field_key(&mut self, code: KeyCode, field: Field) {
        match code {
            KeyCode::Enter if !field.is_multiline() => {
                self.form.focus = self.form.focus.next();
                return;
            }
            KeyCode::Up if !field.is_multiline() => {
                self.form.focus = self.form.focus.prev();
                return;
            }
            KeyCode::Down if !field.is_multiline() => {
                self.form.focus = self.form.focus.next();
                return;
            }
            _ => {}
        }

        let input = self.form.input_mut(field);
        match code {
            KeyCode::Char(c) => input.insert(c),
            KeyCode::Enter => input.insert('\n'),
            KeyCode::Backspace => input.backspace(),
            KeyCode::Delete => input.delete(),
            KeyCode::Left => input.left(),
            KeyCode::Right => input.right(),
            KeyCode::Up => input.up(),
            KeyCode::Down => input.down(),
            KeyCode::Home => input.home(),
            KeyCode::End => input.end(),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, code: KeyCode, kind: PromptKind, mut input: String) {
        match code {
            KeyCode::Enter => self.submit_prompt(kind, input.trim()),
            KeyCode::Esc => self.info("Cancelled"),
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::Prompt { kind, input };
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::Prompt { kind, input };
            }
            _ => self.mode = Mode::Prompt { kind, input },
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, value: &str) {
        match kind {
            PromptKind::ImagePath if value.is_empty() => self.info("No image attached"),
            PromptKind::ImagePath => match absolute(Path::new(value)) {
                Ok(path) => {
                    let stored = attachable_path(&self.media_root, &path);
                    self.form.push_image(&stored);
                    self.info(format!("Attached {stored}"));
                }
                Err(e) => self.error(format!("Cannot attach {value}: {e}")),
            },
            PromptKind::LinkUrl if value.is_empty() => self.info("No link added"),
            PromptKind::LinkUrl => {
                self.mode = Mode::Prompt {
                    kind: PromptKind::LinkLabel {
                        url: value.to_string(),
                    },
                    input: String::new(),
                };
            }
            PromptKind::LinkLabel { url } => {
                self.form.push_link(NewsLink::new(value, url));
                self.info("Link added");
            }
        }
    }

    /// Runs `action`; returns false once the shell should exit.
    fn perform(&mut self, action: Action, state: &mut NewsState) -> bool {
        match action {
            Action::New => {
                self.form.clear();
                self.form.focus = Focus::Field(Field::Title);
                self.info("New entry: fill in the form and press Ctrl-S to save");
            }
            Action::Delete => match self.form.selected() {
                Some(index) => self.mode = Mode::ConfirmDelete(index),
                None => self.error("Select an entry in the list first"),
            },
            Action::Reload => match state.reload() {
                Ok(report) => self.show_report(state, &report),
                Err(e) => self.error(format!("Reload failed: {e}")),
            },
            Action::Save => self.save(state),
            Action::AttachImage => {
                self.mode = Mode::Prompt {
                    kind: PromptKind::ImagePath,
                    input: String::new(),
                }
            }
            Action::AddLink => {
                self.mode = Mode::Prompt {
                    kind: PromptKind::LinkUrl,
                    input: String::new(),
                }
            }
            Action::Quit => return false,
        }
        true
    }

    fn save(&mut self, state: &mut NewsState) {
        let draft = self.form.to_draft();
        let result = match self.form.selected() {
            None => state.add_entry(draft).map(|()| 0),
            Some(index) => state.update_entry(index, draft).map(|()| index),
        };

        match result {
            Ok(index) => {
                self.list_index = index;
                self.form.load(index, &state.get_entries()[index]);
                self.info(format!("Saved to {}", state.store().path().display()));
            }
            Err(EditorError::Invalid(e)) => {
                self.error(format!("Please fill in the title, date and body ({e})"))
            }
            Err(e) => self.error(format!("Save failed: {e}")),
        }
    }

    fn delete(&mut self, index: usize, state: &mut NewsState) {
        match state.delete_entry(index) {
            Ok(removed) => {
                self.form.clear();
                self.list_index = self
                    .list_index
                    .min(state.get_entries().len().saturating_sub(1));
                self.info(format!("Deleted \"{}\"", removed.display_title()));
            }
            Err(e) => self.error(format!("Delete failed: {e}")),
        }
    }

    fn render(&self, f: &mut Frame, entries: &[NewsEntry]) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(
                [
                    Constraint::Length(1),
                    Constraint::Min(10),
                    Constraint::Length(2),
                ]
                .as_ref(),
            )
            .split(f.area());

        let title = Paragraph::new("News Editor")
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(46), Constraint::Min(40)].as_ref())
            .split(chunks[1]);
        self.render_list(f, panes[0], entries);
        self.render_form(f, panes[1]);
        self.render_footer(f, chunks[2]);

        match &self.mode {
            Mode::Edit => {}
            Mode::Prompt { kind, input } => {
                render_popup(f, kind.title(), format!("{input}|"));
            }
            Mode::ConfirmDelete(index) => {
                let title = entries
                    .get(*index)
                    .map(NewsEntry::display_title)
                    .unwrap_or_default();
                render_popup(f, "Delete entry", format!("Delete \"{title}\"? (y/n)"));
            }
        }
    }

    fn render_list(&self, f: &mut Frame, area: Rect, entries: &[NewsEntry]) {
        let items: Vec<ListItem> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| ListItem::new(list_line(index, entry)))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Entries")
                    .border_style(focus_style(self.form.focus == Focus::List)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        let selected = (!entries.is_empty()).then_some(self.list_index);
        f.render_stateful_widget(list, area, &mut ListState::default().with_selected(selected));
    }

    fn render_form(&self, f: &mut Frame, area: Rect) {
        let constraints: Vec<Constraint> = Field::ALL
            .iter()
            .map(|field| match field {
                Field::Body => Constraint::Min(6),
                field if field.is_multiline() => Constraint::Length(5),
                _ => Constraint::Length(3),
            })
            .collect();
        let areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (field, area) in Field::ALL.iter().zip(areas.iter()) {
            self.render_field(f, *area, *field);
        }
    }

    fn render_field(&self, f: &mut Frame, area: Rect, field: Field) {
        let focused = self.form.focus == Focus::Field(field);
        let input = self.form.input(field);
        let text = if focused && self.cursor_visible && matches!(self.mode, Mode::Edit) {
            input.with_marker('|')
        } else {
            input.text().to_string()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(field.label())
            .border_style(focus_style(focused));

        let paragraph = if field.is_multiline() {
            let width = area.width.saturating_sub(2) as usize;
            let visible_rows = area.height.saturating_sub(2).max(1) as usize;
            let scroll = input.cursor_row(width).saturating_sub(visible_rows - 1);
            let rows: Vec<Line> = wrap_rows(&text, width).into_iter().map(Line::from).collect();
            Paragraph::new(rows)
                .block(block)
                .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0))
        } else {
            Paragraph::new(text).block(block)
        };
        f.render_widget(paragraph, area);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let status = match &self.status {
            Some(Status { text, level }) => {
                let color = match level {
                    Level::Info => Color::Green,
                    Level::Error => Color::Red,
                };
                Line::from(Span::styled(text.clone(), Style::default().fg(color)))
            }
            None => Line::from(""),
        };

        let hints = [
            ("Tab", "next field"),
            ("Ctrl-S", "save"),
            ("Ctrl-N", "new"),
            ("Ctrl-D", "delete"),
            ("Ctrl-R", "reload"),
            ("Ctrl-O", "attach image"),
            ("Ctrl-L", "add link"),
            ("Esc", "quit"),
        ];
        let mut controls = Vec::new();
        for (i, (key, what)) in hints.iter().enumerate() {
            if i > 0 {
                controls.push(Span::raw(", "));
            }
            controls.push(Span::styled(
                *key,
                Style::default().add_modifier(Modifier::BOLD),
            ));
            controls.push(Span::raw(format!(" {what}")));
        }

        let footer = Paragraph::new(vec![
            status,
            Line::from(controls).style(Style::default().fg(Color::Yellow)),
        ])
        .alignment(Alignment::Center);
        f.render_widget(footer, area);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn render_popup(f: &mut Frame, title: &str, text: String) {
    let area = centered_rect(60, 3, f.area());
    f.render_widget(Clear, area);
    let popup = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(popup, area);
}

fn centered_rect(width_percent: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    let side = (100 - width_percent) / 2;
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(side),
            Constraint::Percentage(width_percent),
            Constraint::Percentage(side),
        ])
        .split(vertical[1])[1]
}

fn list_line(index: usize, entry: &NewsEntry) -> String {
    format!(
        "{:02}. {} | {}",
        index + 1,
        entry.display_date(),
        truncate_width(entry.display_title(), TITLE_WIDTH)
    )
}

/// Cuts `text` to at most `max` terminal columns, marking the cut with `…`.
fn truncate_width(text: &str, max: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let width = c.width().unwrap_or(0);
        if used + width > max.saturating_sub(1) {
            break;
        }
        used += width;
        out.push(c);
    }
    out.push('…');
    out
}
