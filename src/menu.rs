use crate::error::EditorError;
use crate::media::NewsLink;
use crate::news_entry::{EntryDraft, NewsEntry};
use crate::news_state::NewsState;
use color_eyre::eyre::{eyre, Result};
use std::io::{self, BufRead, Write};

const END_MARKER: &str = "END";

/// The numbered prompt menu, reading answers line by line from `input`.
pub struct Menu<R, W> {
    input: R,
    output: W,
    default_tag: String,
}

pub fn write_entry_list(output: &mut impl Write, entries: &[NewsEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(output, "There are no news entries yet.");
    }
    writeln!(output, "\nCurrent news entries:")?;
    for (position, entry) in entries.iter().enumerate() {
        writeln!(
            output,
            " {:>2}. {} | {}",
            position + 1,
            entry.display_date(),
            entry.display_title()
        )?;
    }
    writeln!(output)
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W, default_tag: impl Into<String>) -> Self {
        Menu {
            input,
            output,
            default_tag: default_tag.into(),
        }
    }

    pub fn run(&mut self, state: &mut NewsState) -> Result<()> {
        loop {
            writeln!(self.output, "\n====== News menu ======")?;
            writeln!(self.output, "1. List entries")?;
            writeln!(self.output, "2. Add an entry")?;
            writeln!(self.output, "3. Edit an entry")?;
            writeln!(self.output, "4. Delete an entry")?;
            writeln!(self.output, "5. Exit")?;
            write!(self.output, "Choose an option: ")?;
            self.output.flush()?;

            let Some(choice) = self.read_line()? else {
                writeln!(self.output)?;
                break;
            };
            match choice.trim() {
                "1" => write_entry_list(&mut self.output, state.get_entries())?,
                "2" => self.add_entry(state)?,
                "3" => self.edit_entry(state)?,
                "4" => self.delete_entry(state)?,
                "5" => break,
                _ => writeln!(self.output, "Please choose 1-5")?,
            }
        }
        writeln!(self.output, "Bye.")?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        self.read_line()?
            .ok_or_else(|| eyre!("input closed before the entry was finished"))
    }

    /// Single-line answer. Empty input keeps `default`; required fields
    /// without a default ask again.
    fn prompt_text(&mut self, label: &str, default: &str, required: bool) -> Result<String> {
        loop {
            let prompt = if default.is_empty() {
                format!("{label}: ")
            } else {
                format!("{label} [{default}]: ")
            };
            let value = self.ask(&prompt)?.trim().to_string();
            if !value.is_empty() {
                return Ok(value);
            }
            if !default.is_empty() {
                return Ok(default.to_string());
            }
            if !required {
                return Ok(String::new());
            }
            writeln!(self.output, "This field is required")?;
        }
    }

    /// Multi-line answer ended by a line reading `END`. An empty first line
    /// keeps `default`.
    fn prompt_multiline(&mut self, label: &str, default: &str, required: bool) -> Result<String> {
        loop {
            writeln!(self.output, "{label}:")?;
            if default.is_empty() {
                writeln!(self.output, "  (type the text line by line, then {END_MARKER} on its own line)")?;
            } else {
                writeln!(
                    self.output,
                    "  (press Enter to keep the current text, or type new text and finish with {END_MARKER})"
                )?;
            }

            let first = self.ask("> ")?;
            if first.trim().is_empty() {
                if !default.is_empty() {
                    return Ok(default.to_string());
                }
                if !required {
                    return Ok(String::new());
                }
                writeln!(self.output, "At least one line of text is required")?;
                continue;
            }

            let mut lines = Vec::new();
            let mut next = Some(first);
            while let Some(line) = next {
                if line.trim().eq_ignore_ascii_case(END_MARKER) {
                    break;
                }
                lines.push(line);
                write!(self.output, "> ")?;
                self.output.flush()?;
                next = self.read_line()?;
            }

            let value = lines.join("\n").trim().to_string();
            if !value.is_empty() || !required {
                return Ok(value);
            }
            writeln!(self.output, "The text must not be empty")?;
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} (y/N): "))?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }

    fn prompt_images(&mut self, current: Vec<String>) -> Result<Vec<String>> {
        writeln!(self.output, "\nCurrent images:")?;
        if current.is_empty() {
            writeln!(self.output, "  - no images yet")?;
        }
        for (position, image) in current.iter().enumerate() {
            writeln!(self.output, "  {}. {image}", position + 1)?;
        }
        if !self.confirm("Change images?")? {
            return Ok(current);
        }

        writeln!(
            self.output,
            "Type one image path per line (e.g. ./assets/images/news-4.jpg). Press Enter on an empty line to finish."
        )?;
        let mut images = Vec::new();
        loop {
            let path = self.ask("Image: ")?.trim().to_string();
            if path.is_empty() {
                return Ok(images);
            }
            images.push(path);
        }
    }

    fn prompt_links(&mut self, current: Vec<NewsLink>) -> Result<Vec<NewsLink>> {
        writeln!(self.output, "\nCurrent links:")?;
        if current.is_empty() {
            writeln!(self.output, "  - no links yet")?;
        }
        for (position, link) in current.iter().enumerate() {
            writeln!(
                self.output,
                "  {}. {} -> {}",
                position + 1,
                link.display_label(position + 1),
                link.url
            )?;
        }
        if !self.confirm("Change links?")? {
            return Ok(current);
        }

        writeln!(
            self.output,
            "Enter a URL and an optional button label. Press Enter at the URL prompt to finish."
        )?;
        let mut links = Vec::new();
        loop {
            let url = self.ask("URL: ")?.trim().to_string();
            if url.is_empty() {
                return Ok(links);
            }
            let label = self.ask("Button label (optional): ")?.trim().to_string();
            links.push(NewsLink::new(label, url));
        }
    }

    /// Asks for a 1-based entry number. `None` when the user cancels.
    fn select_entry(&mut self, entries: &[NewsEntry], verb: &str) -> Result<Option<usize>> {
        if entries.is_empty() {
            writeln!(self.output, "There are no entries to {verb}.")?;
            return Ok(None);
        }
        write_entry_list(&mut self.output, entries)?;
        loop {
            let prompt = format!("Number of the entry to {verb} (Enter to cancel): ");
            let choice = self.ask(&prompt)?.trim().to_string();
            if choice.is_empty() {
                return Ok(None);
            }
            match choice.parse::<usize>() {
                Ok(number) if (1..=entries.len()).contains(&number) => return Ok(Some(number - 1)),
                Ok(_) => writeln!(self.output, "There is no entry with that number")?,
                Err(_) => writeln!(self.output, "Please enter a number")?,
            }
        }
    }

    fn add_entry(&mut self, state: &mut NewsState) -> Result<()> {
        writeln!(self.output, "\n== Add a news entry ==")?;
        let default_tag = self.default_tag.clone();
        let draft = EntryDraft {
            title: self.prompt_text("Title", "", true)?,
            date: self.prompt_text("Date (e.g. 17 Nov 2024)", "", true)?,
            tag: self.prompt_text("Tag", &default_tag, false)?,
            by: self.prompt_text("Published by", "", false)?,
            summary: self.prompt_text("One-paragraph summary", "", false)?,
            body: self.prompt_multiline("Full text", "", true)?,
            images: self.prompt_images(Vec::new())?,
            links: self.prompt_links(Vec::new())?,
        };
        let result = state.add_entry(draft);
        self.report_saved(state, result)
    }

    fn edit_entry(&mut self, state: &mut NewsState) -> Result<()> {
        writeln!(self.output, "\n== Edit a news entry ==")?;
        let Some(index) = self.select_entry(state.get_entries(), "edit")? else {
            return Ok(());
        };
        let current = EntryDraft::from_entry(&state.get_entries()[index]);

        let draft = EntryDraft {
            title: self.prompt_text("Title", &current.title, true)?,
            date: self.prompt_text("Date", &current.date, true)?,
            tag: self.prompt_text("Tag", &current.tag, false)?,
            by: self.prompt_text("Published by", &current.by, false)?,
            summary: self.prompt_text("Summary", &current.summary, false)?,
            body: self.prompt_multiline("Full text", &current.body, true)?,
            images: self.prompt_images(current.images)?,
            links: self.prompt_links(current.links)?,
        };
        let result = state.update_entry(index, draft);
        self.report_saved(state, result)
    }

    fn delete_entry(&mut self, state: &mut NewsState) -> Result<()> {
        writeln!(self.output, "\n== Delete a news entry ==")?;
        let Some(index) = self.select_entry(state.get_entries(), "delete")? else {
            return Ok(());
        };
        let title = state.get_entries()[index].display_title().to_string();
        if !self.confirm(&format!("Delete \"{title}\"?"))? {
            writeln!(self.output, "Nothing was deleted.")?;
            return Ok(());
        }
        let result = state.delete_entry(index).map(|_| ());
        self.report_saved(state, result)
    }

    fn report_saved(&mut self, state: &NewsState, result: Result<(), EditorError>) -> Result<()> {
        match result {
            Ok(()) => {
                writeln!(self.output, "Saved to {}", state.store().path().display())?;
                Ok(())
            }
            Err(EditorError::Invalid(e)) => {
                writeln!(self.output, "Not saved: {e}")?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news_entry::DEFAULT_TAG;
    use crate::news_store::NewsStore;
    use std::{fs, io::Cursor};
    use tempfile::TempDir;

    fn run_script(state: &mut NewsState, script: &str) -> String {
        let mut output = Vec::new();
        Menu::new(Cursor::new(script.as_bytes()), &mut output, DEFAULT_TAG)
            .run(state)
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn state_with(dir: &TempDir, json: &str) -> NewsState {
        let path = dir.path().join("news.json");
        fs::write(&path, json).unwrap();
        NewsState::open(NewsStore::new(path)).unwrap().0
    }

    #[test]
    fn add_collects_every_field() {
        let dir = TempDir::new().unwrap();
        let mut state = NewsState::open(NewsStore::new(dir.path().join("news.json")))
            .unwrap()
            .0;

        let script = "2\n\
            Open house\n\
            17 Nov 2024\n\
            \n\
            Office\n\
            Short summary\n\
            Line one\n\
            Line two\n\
            end\n\
            y\n\
            ./assets/images/a.png\n\
            \n\
            y\n\
            http://x\n\
            \n\
            \n\
            5\n";
        let output = run_script(&mut state, script);
        assert!(output.contains("Saved to"));

        let (on_disk, _) = state.store().load().unwrap();
        let entry = &on_disk[0];
        assert_eq!(entry.title, "Open house");
        assert_eq!(entry.tag, DEFAULT_TAG);
        assert_eq!(entry.by, "Office");
        assert_eq!(entry.body, "Line one\nLine two");
        assert_eq!(entry.images, vec!["./assets/images/a.png"]);
        assert_eq!(entry.links, vec![NewsLink::new("", "http://x")]);

        let raw = fs::read_to_string(state.store().path()).unwrap();
        assert!(raw.contains("\"linkLabel\": \"\""));
    }

    #[test]
    fn required_fields_ask_again() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "[]");

        let script = "2\n\nTitle\nDate\n\n\n\n\nBody\nEND\nn\nn\n5\n";
        let output = run_script(&mut state, script);
        assert!(output.contains("This field is required"));
        assert!(output.contains("At least one line of text is required"));
        assert_eq!(state.get_entries()[0].title, "Title");
        assert_eq!(state.get_entries()[0].body, "Body");
    }

    #[test]
    fn edit_keeps_values_on_empty_answers() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(
            &dir,
            r#"[{"title": "Old", "date": "1 Jan", "tag": "Sport", "body": "Text",
                "image": "a.png", "link": "http://x", "linkLabel": "X", "views": 3}]"#,
        );

        let script = "3\n1\nNew title\n\n\n\n\n\nn\nn\n5\n";
        run_script(&mut state, script);

        let (on_disk, _) = state.store().load().unwrap();
        let entry = &on_disk[0];
        assert_eq!(entry.title, "New title");
        assert_eq!(entry.date, "1 Jan");
        assert_eq!(entry.tag, "Sport");
        assert_eq!(entry.body, "Text");
        assert_eq!(entry.images, vec!["a.png"]);
        assert_eq!(entry.links, vec![NewsLink::new("X", "http://x")]);
        assert_eq!(entry.extra.get("views"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn edit_keeps_an_empty_tag_empty() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(
            &dir,
            r#"[{"title": "T", "date": "D", "tag": "", "body": "B"}]"#,
        );

        let script = "3\n1\n\n\n\n\n\n\nn\nn\n5\n";
        let output = run_script(&mut state, script);
        assert!(!output.contains(DEFAULT_TAG));

        let (on_disk, _) = state.store().load().unwrap();
        assert_eq!(on_disk[0].tag, "");
        assert_eq!(on_disk[0].title, "T");
    }

    #[test]
    fn edit_can_replace_images() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(
            &dir,
            r#"[{"title": "T", "date": "D", "body": "B", "images": ["a.png", "b.png"]}]"#,
        );

        let script = "3\n1\n\n\n\n\n\n\ny\nc.png\n\nn\n5\n";
        run_script(&mut state, script);
        assert_eq!(state.get_entries()[0].images, vec!["c.png"]);
        let raw = fs::read_to_string(state.store().path()).unwrap();
        assert!(raw.contains("\"image\": \"c.png\""));
    }

    #[test]
    fn selection_rejects_bad_numbers_and_can_cancel() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, r#"[{"title": "T", "date": "D", "body": "B"}]"#);

        let output = run_script(&mut state, "3\nabc\n7\n\n5\n");
        assert!(output.contains("Please enter a number"));
        assert!(output.contains("There is no entry with that number"));
        assert_eq!(state.get_entries()[0].title, "T");
    }

    #[test]
    fn delete_needs_confirmation() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(
            &dir,
            r#"[{"title": "A", "date": "D", "body": "B"}, {"title": "B", "date": "D", "body": "B"}]"#,
        );

        let output = run_script(&mut state, "4\n1\nn\n4\n2\ny\n5\n");
        assert!(output.contains("Nothing was deleted."));
        let (on_disk, _) = state.store().load().unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk[0].title, "A");
    }

    #[test]
    fn list_shows_positions_dates_and_titles() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, r#"[{"title": "First", "date": "2 Feb"}, {}]"#);

        let output = run_script(&mut state, "1\n9\n5\n");
        assert!(output.contains("  1. 2 Feb | First"));
        assert!(output.contains("  2. - | (untitled)"));
        assert!(output.contains("Please choose 1-5"));
    }

    #[test]
    fn closed_input_at_the_menu_exits_cleanly() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "[]");
        let output = run_script(&mut state, "");
        assert!(output.ends_with("Bye.\n"));
    }

    #[test]
    fn closed_input_inside_a_flow_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, "[]");
        let mut output = Vec::new();
        let result = Menu::new(Cursor::new("2\nTitle\n".as_bytes()), &mut output, DEFAULT_TAG)
            .run(&mut state);
        assert!(result.is_err());
        assert!(state.get_entries().is_empty());
    }
}
