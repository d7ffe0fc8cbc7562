use crate::error::StoreError;
use crate::news_entry::NewsEntry;
use chrono::Local;
use serde_json::Value;
use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::Builder;
use tracing::{info, warn};

/// Why an existing news file could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadProblem {
    InvalidJson(String),
    NotAnArray,
    InvalidEntry { position: usize, found: &'static str },
}

impl fmt::Display for LoadProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadProblem::InvalidJson(detail) => write!(f, "the file is not valid JSON ({detail})"),
            LoadProblem::NotAnArray => write!(f, "the file must contain a list of news entries"),
            LoadProblem::InvalidEntry { position, found } => {
                write!(f, "entry {position} is {found}, expected an object")
            }
        }
    }
}

/// Outcome of reading the news file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadReport {
    Loaded { count: usize },
    Missing,
    /// The file was unusable and has been renamed to `backup`.
    Recovered { problem: LoadProblem, backup: PathBuf },
}

impl LoadReport {
    pub fn is_problem(&self) -> bool {
        matches!(self, LoadReport::Recovered { .. })
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadReport::Loaded { count } => write!(f, "loaded {count} entries"),
            LoadReport::Missing => write!(f, "file not found, it will be created on the first save"),
            LoadReport::Recovered { problem, backup } => write!(
                f,
                "{problem}; moved it to {} and started with an empty list",
                backup.display()
            ),
        }
    }
}

/// The JSON file holding every news entry.
#[derive(Debug, Clone)]
pub struct NewsStore {
    path: PathBuf,
}

impl NewsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        NewsStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every entry. A missing file is an empty list; a file that is not
    /// a JSON list of objects is renamed aside and also yields an empty list.
    pub fn load(&self) -> Result<(Vec<NewsEntry>, LoadReport), StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "news file not found");
                return Ok((Vec::new(), LoadReport::Missing));
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match parse_entries(&raw) {
            Ok(entries) => {
                info!(path = %self.path.display(), count = entries.len(), "loaded news entries");
                let count = entries.len();
                Ok((entries, LoadReport::Loaded { count }))
            }
            Err(problem) => {
                let backup = self.move_aside()?;
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    %problem,
                    "news file unusable, moved aside"
                );
                Ok((Vec::new(), LoadReport::Recovered { problem, backup }))
            }
        }
    }

    /// Replaces the file with `entries`, written to a temporary file in the
    /// same directory first and renamed into place. A symlinked news file is
    /// written through to its target.
    pub fn save(&self, entries: &[NewsEntry]) -> Result<(), StoreError> {
        let mut serialized = serde_json::to_string_pretty(entries)?;
        serialized.push('\n');

        let write_error = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let target = self.resolved_target()?;
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let existing = existing_permissions(&target).map_err(write_error)?;

        fs::create_dir_all(&dir).map_err(write_error)?;
        let mut builder = Builder::new();
        if existing.is_none() {
            if let Some(permissions) = new_file_permissions() {
                builder.permissions(permissions);
            }
        }
        let mut tmp = builder.tempfile_in(&dir).map_err(write_error)?;
        tmp.write_all(serialized.as_bytes()).map_err(write_error)?;
        if let Some(permissions) = existing {
            tmp.as_file()
                .set_permissions(permissions)
                .map_err(write_error)?;
        }
        tmp.as_file().sync_all().map_err(write_error)?;
        tmp.persist(&target).map_err(|e| write_error(e.error))?;

        info!(path = %target.display(), count = entries.len(), "saved news entries");
        Ok(())
    }

    /// The real file behind `path`, or `path` itself when nothing is there yet.
    fn resolved_target(&self) -> Result<PathBuf, StoreError> {
        match fs::canonicalize(&self.path) {
            Ok(resolved) => Ok(resolved),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(self.path.clone()),
            Err(source) => Err(StoreError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn move_aside(&self) -> Result<PathBuf, StoreError> {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "news.json".to_string());
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let backup_error = |source| StoreError::Backup {
            path: self.path.clone(),
            source,
        };

        let mut backup = self.path.with_file_name(format!("{name}.broken-{stamp}"));
        let mut suffix = 0;
        while fs::symlink_metadata(&backup).is_ok() {
            suffix += 1;
            backup = self
                .path
                .with_file_name(format!("{name}.broken-{stamp}-{suffix}"));
        }

        fs::rename(&self.path, &backup).map_err(backup_error)?;
        Ok(backup)
    }
}

fn existing_permissions(path: &Path) -> io::Result<Option<fs::Permissions>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Mode requested for a new news file; the process umask still applies, as
/// it would for a plain `File::create`.
#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

fn parse_entries(raw: &[u8]) -> Result<Vec<NewsEntry>, LoadProblem> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|e| LoadProblem::InvalidJson(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(LoadProblem::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(NewsEntry::from(record)),
            other => Err(LoadProblem::InvalidEntry {
                position: index + 1,
                found: json_kind(&other),
            }),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
