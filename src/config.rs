use crate::cli::Cli;
use color_eyre::eyre::{Result, WrapErr};
use std::{
    env,
    path::{Path, PathBuf},
};

/// Settings shared by both shells, resolved from the command line.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub news_file: PathBuf,
    /// Absolute directory that attached images are stored relative to.
    pub media_root: PathBuf,
    pub default_tag: String,
}

impl EditorConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = match &cli.root {
            Some(root) => root.clone(),
            None => cli
                .file
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        };
        Ok(EditorConfig {
            news_file: cli.file.clone(),
            media_root: absolute(&root)?,
            default_tag: cli.default_tag.trim().to_string(),
        })
    }
}

/// `path` joined onto the working directory when it is relative, with `.`
/// components dropped.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .wrap_err("failed to read the working directory")?
            .join(path)
    };
    Ok(joined.components().collect())
}
