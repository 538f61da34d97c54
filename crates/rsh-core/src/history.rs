//! In-memory history with `!`-event expansion and file persistence.

use std::collections::VecDeque;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::HistoryError;

/// Ordered command history, capped at a fixed number of entries.
pub struct HistoryEngine {
    entries: VecDeque<String>,
    capacity: usize,
    /// Index into `entries` marking the boundary between what has already
    /// been persisted and what was added this session.
    checkpoint: usize,
}

impl HistoryEngine {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            checkpoint: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    /// Append a line, dropping from the front if over capacity.
    pub fn push(&mut self, line: String) {
        self.entries.push_back(line);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.checkpoint = self.checkpoint.saturating_sub(1);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.checkpoint = 0;
    }

    /// Mark everything currently in the buffer as persisted, so a later
    /// `-a` only appends what's new.
    pub fn mark_checkpoint(&mut self) {
        self.checkpoint = self.entries.len();
    }

    /// Expand a `!`-event line. Returns the line unchanged if it isn't an
    /// event reference (doesn't start with `!`, or contains whitespace).
    pub fn expand(&self, line: &str) -> Result<String, HistoryError> {
        if !line.starts_with('!') || line.contains(char::is_whitespace) {
            return Ok(line.to_string());
        }

        let event = &line[1..];
        let index = if event == "!" {
            self.len().checked_sub(1)
        } else if let Some(n) = event.strip_prefix('-') {
            let n: usize = n.parse().ok().filter(|&n| n > 0).ok_or(HistoryError::EventNotFound)?;
            self.len().checked_sub(n)
        } else {
            let n: usize = event.parse().ok().filter(|&n| n > 0).ok_or(HistoryError::EventNotFound)?;
            n.checked_sub(1)
        };

        index
            .and_then(|i| self.entries.get(i))
            .cloned()
            .ok_or(HistoryError::EventNotFound)
    }

    /// Load entries from `path`, appending them in-memory (oldest first).
    /// Used both at startup and for `history -r FILE`.
    pub fn load_file(&mut self, path: &Path) -> Result<(), HistoryError> {
        if !path.exists() {
            return Ok(());
        }
        let contents = fs::read_to_string(path).map_err(|e| HistoryError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        for line in contents.lines() {
            self.push(line.to_string());
        }
        Ok(())
    }

    /// Overwrite `path` with the entire in-memory buffer (`history -w`).
    pub fn write_file(&mut self, path: &Path) -> Result<(), HistoryError> {
        let mut buf = String::new();
        for entry in &self.entries {
            buf.push_str(entry);
            buf.push('\n');
        }
        fs::write(path, buf).map_err(|e| HistoryError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.mark_checkpoint();
        Ok(())
    }

    /// Append entries added since the last checkpoint to `path`
    /// (`history -a`, and the implicit flush on clean exit).
    pub fn append_since_checkpoint(&mut self, path: &Path) -> Result<(), HistoryError> {
        let new_entries: Vec<&String> = self.entries.iter().skip(self.checkpoint).collect();
        if new_entries.is_empty() {
            return Ok(());
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| HistoryError::Write {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        for entry in &new_entries {
            writeln!(file, "{entry}").map_err(|e| HistoryError::Write {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }
        self.mark_checkpoint();
        Ok(())
    }
}
