use color_eyre::eyre::{eyre, Result, WrapErr};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs the global subscriber. Logs go to `log_file` when given,
/// otherwise to stderr if `stderr_fallback` is set, otherwise nowhere.
pub fn init(log_file: Option<&Path>, stderr_fallback: bool) -> Result<()> {
    if let Some(path) = log_file {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre!("log file {} has no file name", path.display()))?;
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(name.to_string_lossy())
            .build(dir)
            .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(env_filter("info"))
            .with_writer(appender)
            .with_ansi(false)
            .try_init()
            .map_err(|e| eyre!("failed to install the log subscriber: {e}"))?;
    } else if stderr_fallback {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter("warn"))
            .with_writer(std::io::stderr)
            .compact()
            .try_init()
            .map_err(|e| eyre!("failed to install the log subscriber: {e}"))?;
    }
    Ok(())
}
