use crate::error::{EditorError, StoreError};
use crate::news_entry::{EntryDraft, NewsEntry};
use crate::news_store::{LoadReport, NewsStore};
use tracing::debug;

/// The news list held in memory, bound to the file it came from.
///
/// Every change is written to disk before it is applied in memory, so a
/// rejected draft or a failed save leaves both sides as they were.
pub struct NewsState {
    store: NewsStore,
    entries: Vec<NewsEntry>,
}

impl NewsState {
    pub fn open(store: NewsStore) -> Result<(Self, LoadReport), StoreError> {
        let (entries, report) = store.load()?;
        Ok((NewsState { store, entries }, report))
    }

    pub fn reload(&mut self) -> Result<LoadReport, StoreError> {
        let (entries, report) = self.store.load()?;
        self.entries = entries;
        Ok(report)
    }

    pub fn store(&self) -> &NewsStore {
        &self.store
    }

    pub fn get_entries(&self) -> &[NewsEntry] {
        &self.entries
    }

    /// Adds a new entry at the top of the list.
    pub fn add_entry(&mut self, draft: EntryDraft) -> Result<(), EditorError> {
        let entry = draft.validate()?;
        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.push(entry);
        next.extend(self.entries.iter().cloned());
        self.commit(next)?;
        debug!(count = self.entries.len(), "added news entry");
        Ok(())
    }

    /// Replaces the entry at `index`, keeping any keys the editor does not
    /// manage.
    pub fn update_entry(&mut self, index: usize, draft: EntryDraft) -> Result<(), EditorError> {
        let current = self
            .entries
            .get(index)
            .ok_or(EditorError::NoSuchEntry(index))?;
        let mut entry = draft.validate()?;
        entry.extra = current.extra.clone();

        let mut next = self.entries.clone();
        next[index] = entry;
        self.commit(next)?;
        debug!(index, "updated news entry");
        Ok(())
    }

    pub fn delete_entry(&mut self, index: usize) -> Result<NewsEntry, EditorError> {
        if index >= self.entries.len() {
            return Err(EditorError::NoSuchEntry(index));
        }
        let mut next = self.entries.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        debug!(index, "deleted news entry");
        Ok(removed)
    }

    fn commit(&mut self, next: Vec<NewsEntry>) -> Result<(), StoreError> {
        self.store.save(&next)?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntryError;
    use crate::media::NewsLink;
    use std::fs;
    use tempfile::TempDir;

    fn draft(title: &str) -> EntryDraft {
        EntryDraft {
            title: title.to_string(),
            date: "1 Jan 2025".to_string(),
            body: format!("About {title}"),
            ..EntryDraft::default()
        }
    }

    fn open(dir: &TempDir) -> NewsState {
        NewsState::open(NewsStore::new(dir.path().join("news.json")))
            .unwrap()
            .0
    }

    #[test]
    fn new_entries_go_to_the_top_and_are_saved() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir);
        state.add_entry(draft("first")).unwrap();
        state.add_entry(draft("second")).unwrap();

        let titles: Vec<&str> = state.get_entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);

        let (on_disk, _) = state.store().load().unwrap();
        assert_eq!(on_disk, state.get_entries());
    }

    #[test]
    fn blank_title_is_rejected_without_saving() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir);

        let err = state.add_entry(draft("  ")).unwrap_err();
        assert!(matches!(
            err,
            EditorError::Invalid(EntryError::MissingFields(ref fields)) if fields == &["title"]
        ));
        assert!(state.get_entries().is_empty());
        assert!(!state.store().path().exists());
    }

    #[test]
    fn update_keeps_position_and_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news.json");
        fs::write(
            &path,
            r#"[{"title": "a", "date": "d", "body": "b", "views": 10}, {"title": "z"}]"#,
        )
        .unwrap();
        let (mut state, _) = NewsState::open(NewsStore::new(&path)).unwrap();

        let mut edit = EntryDraft::from_entry(&state.get_entries()[0]);
        edit.title = "a (edited)".to_string();
        edit.links = vec![NewsLink::new("", "http://more")];
        state.update_entry(0, edit).unwrap();

        let (reloaded, _) = state.store().load().unwrap();
        assert_eq!(reloaded[0].title, "a (edited)");
        assert_eq!(reloaded[0].links, vec![NewsLink::new("", "http://more")]);
        assert_eq!(reloaded[0].extra.get("views"), Some(&serde_json::json!(10)));
        assert_eq!(reloaded[1].title, "z");
    }

    #[test]
    fn out_of_range_index_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir);
        state.add_entry(draft("only")).unwrap();

        assert!(matches!(
            state.update_entry(3, draft("x")),
            Err(EditorError::NoSuchEntry(3))
        ));
        assert!(matches!(state.delete_entry(1), Err(EditorError::NoSuchEntry(1))));
        assert_eq!(state.get_entries().len(), 1);
    }

    #[test]
    fn delete_removes_and_saves() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir);
        state.add_entry(draft("keep")).unwrap();
        state.add_entry(draft("drop")).unwrap();

        let removed = state.delete_entry(0).unwrap();
        assert_eq!(removed.title, "drop");

        let (on_disk, _) = state.store().load().unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk[0].title, "keep");
    }

    #[test]
    fn failed_save_changes_neither_memory_nor_disk() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir);
        state.add_entry(draft("saved")).unwrap();

        let path = state.store().path().to_path_buf();
        fs::remove_file(&path).unwrap();
        fs::create_dir_all(path.join("occupied")).unwrap();

        let err = state.add_entry(draft("lost")).unwrap_err();
        assert!(matches!(err, EditorError::Store(StoreError::Write { .. })));
        assert!(matches!(state.delete_entry(0), Err(EditorError::Store(_))));
        assert_eq!(state.get_entries().len(), 1);
        assert_eq!(state.get_entries()[0].title, "saved");
        assert!(path.join("occupied").is_dir());
    }

    #[test]
    fn reload_picks_up_outside_changes() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir);
        state.add_entry(draft("mine")).unwrap();

        fs::write(state.store().path(), "[]").unwrap();
        let report = state.reload().unwrap();
        assert_eq!(report, LoadReport::Loaded { count: 0 });
        assert!(state.get_entries().is_empty());
    }
}
