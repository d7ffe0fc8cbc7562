//! Editable state behind the two-pane form: the text inputs, which one has
//! focus, and which list entry (if any) the form is bound to.

use crate::media::{format_link_lines, parse_image_lines, parse_link_lines, NewsLink};
use crate::news_entry::{EntryDraft, NewsEntry};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Date,
    Tag,
    By,
    Images,
    Summary,
    Body,
    Links,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Title,
        Field::Date,
        Field::Tag,
        Field::By,
        Field::Images,
        Field::Summary,
        Field::Body,
        Field::Links,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title*",
            Field::Date => "Date*",
            Field::Tag => "Tag",
            Field::By => "Published by",
            Field::Images => "Images (one path per line)",
            Field::Summary => "Summary",
            Field::Body => "Body*",
            Field::Links => "Links (label|URL per line)",
        }
    }

    pub fn is_multiline(self) -> bool {
        matches!(
            self,
            Field::Images | Field::Summary | Field::Body | Field::Links
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Field(Field),
}

impl Focus {
    pub fn next(self) -> Focus {
        match self {
            Focus::List => Focus::Field(Field::Title),
            Focus::Field(field) => Field::ALL
                .get(field.index() + 1)
                .map_or(Focus::List, |f| Focus::Field(*f)),
        }
    }

    pub fn prev(self) -> Focus {
        match self {
            Focus::List => Focus::Field(Field::Links),
            Focus::Field(Field::Title) => Focus::List,
            Focus::Field(field) => Focus::Field(Field::ALL[field.index() - 1]),
        }
    }
}

/// A text buffer with a cursor counted in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        TextInput { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: impl Into<String>) {
        *self = TextInput::new(text);
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    /// (line start, column) of the cursor, both in characters.
    fn line_position(&self) -> (usize, usize) {
        let before: Vec<char> = self.text.chars().take(self.cursor).collect();
        let start = before
            .iter()
            .rposition(|c| *c == '\n')
            .map_or(0, |i| i + 1);
        (start, self.cursor - start)
    }

    /// Row the cursor sits on once the text, with a one-column marker at
    /// the cursor, is wrapped by [`wrap_rows`] to `width` columns.
    pub fn cursor_row(&self, width: usize) -> usize {
        let marked = self.with_marker('|');
        let end = self.byte_index(self.cursor) + 1;
        wrap_rows(&marked[..end], width).len() - 1
    }

    pub fn home(&mut self) {
        self.cursor = self.line_position().0;
    }

    pub fn end(&mut self) {
        let rest = self.text.chars().skip(self.cursor).take_while(|c| *c != '\n');
        self.cursor += rest.count();
    }

    pub fn up(&mut self) {
        let (start, column) = self.line_position();
        if start == 0 {
            return;
        }
        let chars: Vec<char> = self.text.chars().collect();
        let prev_start = chars[..start - 1]
            .iter()
            .rposition(|c| *c == '\n')
            .map_or(0, |i| i + 1);
        let prev_len = start - 1 - prev_start;
        self.cursor = prev_start + column.min(prev_len);
    }

    pub fn down(&mut self) {
        let (_, column) = self.line_position();
        let chars: Vec<char> = self.text.chars().collect();
        let Some(offset) = chars[self.cursor..].iter().position(|c| *c == '\n') else {
            return;
        };
        let next_start = self.cursor + offset + 1;
        let next_len = chars[next_start..]
            .iter()
            .position(|c| *c == '\n')
            .unwrap_or(chars.len() - next_start);
        self.cursor = next_start + column.min(next_len);
    }

    /// The text with `marker` inserted at the cursor.
    pub fn with_marker(&self, marker: char) -> String {
        let mut shown = self.text.clone();
        shown.insert(self.byte_index(self.cursor), marker);
        shown
    }
}

/// Splits `text` into rows of at most `width` display columns, breaking
/// inside words when needed. Always returns at least one row.
pub fn wrap_rows(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for line in text.split('\n') {
        let mut row = String::new();
        let mut used = 0;
        for c in line.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                used = 0;
            }
            row.push(c);
            used += w;
        }
        rows.push(row);
    }
    rows
}

pub struct FormState {
    inputs: [TextInput; 8],
    selected: Option<usize>,
    default_tag: String,
    pub focus: Focus,
}

impl FormState {
    pub fn new(default_tag: impl Into<String>) -> Self {
        let mut form = FormState {
            inputs: Default::default(),
            selected: None,
            default_tag: default_tag.into(),
            focus: Focus::List,
        };
        form.clear();
        form
    }

    /// Blank form for a new entry.
    pub fn clear(&mut self) {
        self.selected = None;
        for input in &mut self.inputs {
            input.set("");
        }
        let tag = self.default_tag.clone();
        self.input_mut(Field::Tag).set(tag);
    }

    /// Fills the form from the entry at `index` of the list. Stored values
    /// are shown as they are, an empty tag included.
    pub fn load(&mut self, index: usize, entry: &NewsEntry) {
        self.selected = Some(index);
        let draft = EntryDraft::from_entry(entry);
        self.input_mut(Field::Title).set(draft.title);
        self.input_mut(Field::Date).set(draft.date);
        self.input_mut(Field::Tag).set(draft.tag);
        self.input_mut(Field::By).set(draft.by);
        self.input_mut(Field::Images).set(draft.images.join("\n"));
        self.input_mut(Field::Summary).set(draft.summary);
        self.input_mut(Field::Body).set(draft.body);
        self.input_mut(Field::Links).set(format_link_lines(&draft.links));
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn input(&self, field: Field) -> &TextInput {
        &self.inputs[field.index()]
    }

    pub fn input_mut(&mut self, field: Field) -> &mut TextInput {
        &mut self.inputs[field.index()]
    }

    pub fn to_draft(&self) -> EntryDraft {
        let text = |field: Field| self.input(field).text().to_string();
        EntryDraft {
            title: text(Field::Title),
            date: text(Field::Date),
            tag: text(Field::Tag),
            by: text(Field::By),
            summary: text(Field::Summary),
            body: text(Field::Body),
            images: parse_image_lines(self.input(Field::Images).text()),
            links: parse_link_lines(self.input(Field::Links).text()),
        }
    }

    pub fn push_image(&mut self, path: &str) {
        let mut images = parse_image_lines(self.input(Field::Images).text());
        images.push(path.to_string());
        self.input_mut(Field::Images).set(images.join("\n"));
    }

    pub fn push_link(&mut self, link: NewsLink) {
        let mut links = parse_link_lines(self.input(Field::Links).text());
        links.push(link);
        self.input_mut(Field::Links).set(format_link_lines(&links));
    }
}
