//! # Event Logger
//!
//! An [`EventSink`] that appends every controller event to a JSON Lines file.
//!
//! Each line looks like:
//!
//! ```text
//! {"timestamp":"2024-05-01T12:00:00.123+02:00","channel":"trackpaddown","event":{"type":"button","button":"trackpad","transition":"down"}}
//! ```
//!
//! Files are named `events_<YYYYmmdd_HHMMSS>_<seq>.jsonl` and are never
//! reopened; an existing name bumps `<seq>`. A new file is
//! started after `max_records_per_file` records, and the oldest files beyond
//! `max_files_to_keep` are deleted.

use chrono::{Local, SecondsFormat};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::EventLogConfig;
use crate::error::Result;
use crate::events::{ControllerEvent, EventSink};

const FILE_PREFIX: &str = "events_";
const FILE_EXTENSION: &str = "jsonl";

/// One line of the event log.
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    timestamp: String,
    channel: String,
    event: &'a ControllerEvent,
}

/// Rotating JSONL event log.
#[derive(Debug)]
pub struct EventLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
    file_seq: u64,
}

impl EventLogger {
    /// Creates a logger writing into `dir`, creating the directory if needed.
    ///
    /// No file is opened until the first event arrives.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>, max_records_per_file: usize, max_files_to_keep: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            current_path: None,
            records_in_file: 0,
            file_seq: 0,
        })
    }

    /// Creates a logger from the `[event_log]` configuration section.
    pub fn from_config(config: &EventLogConfig) -> Result<Self> {
        Self::new(&config.log_dir, config.max_records_per_file, config.max_files_to_keep)
    }

    /// Path of the file currently being written, if any.
    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Appends one event.
    ///
    /// # Errors
    ///
    /// Returns `Io` on write failures and `Json` if the record cannot be encoded.
    pub fn log(&mut self, event: &ControllerEvent) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let record = EventRecord {
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Millis, false),
            channel: event.channel(),
            event,
        };
        let line = serde_json::to_string(&record)?;

        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
            writer.flush()?;
        }
        self.records_in_file += 1;
        Ok(())
    }

    /// Starts a new file and prunes old ones.
    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        // Each file belongs to exactly one logger; skip names already on disk.
        let (path, file) = loop {
            let name = format!(
                "{}{}_{:04}.{}",
                FILE_PREFIX,
                Local::now().format("%Y%m%d_%H%M%S"),
                self.file_seq,
                FILE_EXTENSION
            );
            self.file_seq += 1;

            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("Event log {} already exists, trying next", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        };
        debug!("Event log rotated to {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.current_path = Some(path);
        self.records_in_file = 0;

        self.prune()
    }

    /// Deletes the oldest log files beyond `max_files_to_keep`.
    fn prune(&self) -> Result<()> {
        let mut files = log_files(&self.dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }
        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            debug!("Removing old event log {}", path.display());
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// Event log files in `dir`, unsorted.
fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_log = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with(FILE_PREFIX))
            .unwrap_or(false)
            && path.extension().map(|e| e == FILE_EXTENSION).unwrap_or(false);
        if is_log {
            files.push(path);
        }
    }
    Ok(files)
}

impl EventSink for EventLogger {
    fn emit(&mut self, event: ControllerEvent) {
        if let Err(e) = self.log(&event) {
            warn!("Failed to write event log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AxisGroup, Button, Transition};
    use tempfile::tempdir;

    fn down() -> ControllerEvent {
        ControllerEvent::Button {
            button: Button::Trackpad,
            transition: Transition::Down,
        }
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_no_file_until_first_event() {
        let dir = tempdir().unwrap();
        let logger = EventLogger::new(dir.path(), 10, 2).unwrap();
        assert!(logger.current_path().is_none());
        assert!(log_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        EventLogger::new(&nested, 10, 2).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_writes_jsonl_record() {
        let dir = tempdir().unwrap();
        let mut logger = EventLogger::new(dir.path(), 10, 2).unwrap();

        logger.log(&down()).unwrap();
        logger.emit(ControllerEvent::AxisChanged {
            group: AxisGroup::Trackpad,
            values: [0.5, 0.0].into(),
        });

        let lines = read_lines(logger.current_path().unwrap());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["channel"], "trackpaddown");
        assert_eq!(lines[0]["event"]["type"], "button");
        assert_eq!(lines[0]["event"]["transition"], "down");
        assert!(lines[0]["timestamp"].is_string());
        assert_eq!(lines[1]["channel"], "trackpadchanged");
        assert_eq!(lines[1]["event"]["values"]["x"], 0.5);
    }

    #[test]
    fn test_rotates_after_max_records() {
        let dir = tempdir().unwrap();
        let mut logger = EventLogger::new(dir.path(), 2, 10).unwrap();

        for _ in 0..5 {
            logger.log(&down()).unwrap();
        }

        let mut files = log_files(dir.path()).unwrap();
        files.sort();
        assert_eq!(files.len(), 3);
        let counts: Vec<usize> = files.iter().map(|f| read_lines(f).len()).collect();
        assert_eq!(counts, vec![2, 2, 1]);
    }

    #[test]
    fn test_restarted_logger_starts_fresh_file() {
        let dir = tempdir().unwrap();

        let mut first = EventLogger::new(dir.path(), 2, 10).unwrap();
        first.log(&down()).unwrap();
        first.log(&down()).unwrap();
        let first_path = first.current_path().unwrap().to_path_buf();
        drop(first);

        let mut second = EventLogger::new(dir.path(), 2, 10).unwrap();
        second.log(&down()).unwrap();
        second.log(&down()).unwrap();
        let second_path = second.current_path().unwrap().to_path_buf();

        assert_ne!(first_path, second_path);
        assert_eq!(read_lines(&first_path).len(), 2);
        assert_eq!(read_lines(&second_path).len(), 2);
        assert_eq!(log_files(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_prunes_oldest_files() {
        let dir = tempdir().unwrap();
        let mut logger = EventLogger::new(dir.path(), 1, 2).unwrap();

        for _ in 0..4 {
            logger.log(&down()).unwrap();
        }

        let files = log_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| Some(f.as_path()) == logger.current_path()));
    }

    #[test]
    fn test_ignores_foreign_files_when_pruning() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();
        let mut logger = EventLogger::new(dir.path(), 1, 1).unwrap();

        for _ in 0..3 {
            logger.log(&down()).unwrap();
        }

        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(log_files(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_from_config() {
        let dir = tempdir().unwrap();
        let config = EventLogConfig {
            enabled: true,
            log_dir: dir.path().join("events").to_string_lossy().to_string(),
            max_records_per_file: 5,
            max_files_to_keep: 3,
        };
        let logger = EventLogger::from_config(&config).unwrap();
        assert_eq!(logger.max_records_per_file, 5);
        assert_eq!(logger.max_files_to_keep, 3);
        assert!(dir.path().join("events").is_dir());
    }
}
