// In crates/audit-log/src/lib.rs

use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A single line of the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogEntry {
    /// Renders the entry as `[<ISO-8601>] message`, without the trailing newline.
    pub fn render(&self) -> String {
        format!(
            "[{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.message
        )
    }

    /// Parses a line previously produced by [`LogEntry::render`].
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('[')?;
        let (timestamp, message) = rest.split_once("] ")?;
        let timestamp = DateTime::parse_from_rfc3339(timestamp).ok()?.with_timezone(&Utc);
        Some(Self {
            timestamp,
            message: message.to_string(),
        })
    }
}

/// Append-only, timestamped record of every trading decision and exchange call outcome.
///
/// Writes go through a mutex and each entry is written with a single `write_all`,
/// so concurrent writers never interleave within a line.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one timestamped line. Never fails outward: I/O errors are reported
    /// on the diagnostic log and the caller carries on.
    pub fn append(&self, message: impl AsRef<str>) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            // Keep one entry per line.
            message: message.as_ref().replace(['\r', '\n'], " "),
        };
        tracing::info!(target: "audit", "{}", entry.message);

        if let Err(e) = self.write_line(&entry) {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to append to audit log.");
        }
    }

    fn write_line(&self, entry: &LogEntry) -> io::Result<()> {
        let mut line = entry.render();
        line.push('\n');

        // A poisoned lock only means another writer panicked; the file itself is still usable.
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }

    /// Reads back every well-formed entry in append order.
    pub fn entries(&self) -> io::Result<Vec<LogEntry>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(content.lines().filter_map(LogEntry::parse).collect())
    }
}
