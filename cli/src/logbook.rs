//! Operator-facing log sink with bounded retention.
//!
//! Emission goes through `tracing` (so the subscriber configured in
//! `main` controls formatting and filtering); on top of that the logbook
//! retains the most recent entries in memory and, optionally, in a
//! line-capped log file. Retention is diagnostics only — no correctness
//! depends on it, and file write failures are reported but never
//! propagated.

use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;

/// Default number of entries kept in memory.
pub const DEFAULT_MAX_RETAINED: usize = 100;

/// Default number of lines kept in the log file.
pub const DEFAULT_MAX_FILE_LINES: usize = 1000;

/// Bounded log retention over the `tracing` stack.
pub struct Logbook {
    entries: Mutex<VecDeque<String>>,
    max_retained: usize,
    file: Option<PathBuf>,
    max_file_lines: usize,
    debug_enabled: bool,
}

impl Default for Logbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Logbook {
    /// In-memory retention only, with default capacity.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            max_retained: DEFAULT_MAX_RETAINED,
            file: None,
            max_file_lines: DEFAULT_MAX_FILE_LINES,
            debug_enabled: false,
        }
    }

    /// Also appends entries to `path`, keeping at most
    /// [`DEFAULT_MAX_FILE_LINES`] lines (oldest dropped first).
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            ..Self::new()
        }
    }

    /// Overrides the in-memory retention capacity.
    pub fn max_retained(mut self, max: usize) -> Self {
        self.max_retained = max;
        self
    }

    /// Overrides the log-file line cap.
    pub fn max_file_lines(mut self, max: usize) -> Self {
        self.max_file_lines = max;
        self
    }

    /// Enables `debug` entries, which are dropped by default.
    pub fn debug_enabled(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self
    }

    /// Logs an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
        self.retain("INFO", msg);
    }

    /// Logs a warning.
    pub fn warning(&self, msg: &str) {
        tracing::warn!("{msg}");
        self.retain("WARNING", msg);
    }

    /// Logs an error.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
        self.retain("ERROR", msg);
    }

    /// Logs a debug message when the debug toggle is on.
    pub fn debug(&self, msg: &str) {
        if !self.debug_enabled {
            return;
        }
        tracing::debug!("{msg}");
        self.retain("DEBUG", msg);
    }

    /// Snapshot of the retained entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    fn retain(&self, level: &str, msg: &str) {
        let timestamp = Local::now().format("%Y/%m/%d %H:%M:%S");
        let line = format!("{timestamp} [{level}] {msg}");

        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.push_back(line.clone());
        while entries.len() > self.max_retained {
            entries.pop_front();
        }
        drop(entries);

        if let Some(path) = &self.file {
            if let Err(err) = append_capped(path, &line, self.max_file_lines) {
                tracing::warn!(path = %path.display(), "failed to write log file: {err}");
            }
        }
    }
}

/// Appends `line` to the file at `path`, dropping the oldest lines when
/// the cap is exceeded.
fn append_capped(path: &PathBuf, line: &str, max_lines: usize) -> std::io::Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err),
    };

    let mut lines: Vec<&str> = existing.lines().collect();
    lines.push(line);
    let start = lines.len().saturating_sub(max_lines);

    let mut file = std::fs::File::create(path)?;
    for kept in &lines[start..] {
        writeln!(file, "{kept}")?;
    }
    Ok(())
}
