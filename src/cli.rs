use crate::news_entry::DEFAULT_TAG;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Edit the news list stored in a JSON file
#[derive(Parser)]
#[command(name = "news-editor", version)]
#[command(about = "Add, edit and delete entries of a news.json file", long_about = None)]
pub struct Cli {
    /// Path to the news JSON file
    #[arg(short, long, env = "NEWS_EDITOR_FILE", default_value = "news.json", global = true)]
    pub file: PathBuf,

    /// Directory attached image paths are made relative to [default: the news file's directory]
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Tag given to new entries
    #[arg(long, env = "NEWS_EDITOR_DEFAULT_TAG", default_value = DEFAULT_TAG, global = true)]
    pub default_tag: String,

    /// Write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, Default, PartialEq, Eq)]
pub enum Commands {
    /// Two-pane form with the entry list beside the editor (default)
    #[default]
    Form,
    /// Numbered menu with line-by-line prompts
    Menu,
}
