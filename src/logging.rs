use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// Opens (appending) the log file, creating parent directories as needed
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global tracing subscriber when a log file is configured.
///
/// The TUI owns stdout/stderr, so without `log_file` nothing is installed and
/// all events are dropped.
pub fn init(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = cfg.log_file.as_deref() else {
        return Ok(());
    };

    let filter = EnvFilter::try_new(&cfg.log_filter)?;
    let file = open_log_file(path)?;

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|err| err as Box<dyn std::error::Error>)?;

    Ok(())
}
