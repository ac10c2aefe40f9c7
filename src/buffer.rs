//! In-memory batching of formatted rows, keyed by destination path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Accumulated row text per output path.
///
/// Rows for the same path keep their insertion order. The buffer owns the
/// text exclusively until [`BatchBuffer::drain`] hands it to the flusher.
#[derive(Debug, Default)]
pub struct BatchBuffer {
    entries: HashMap<PathBuf, String>,
    rows: usize,
}

impl BatchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newline-terminated row to the text held for `path`.
    pub fn append(&mut self, path: &Path, row: &str) {
        match self.entries.get_mut(path) {
            Some(text) => text.push_str(row),
            None => {
                self.entries.insert(path.to_path_buf(), row.to_string());
            }
        }
        self.rows += 1;
    }

    /// Take every buffered entry, leaving the buffer empty.
    ///
    /// Entries come back sorted by path so flush order is stable.
    pub fn drain(&mut self) -> Vec<(PathBuf, String)> {
        self.rows = 0;
        let mut batch: Vec<(PathBuf, String)> = self.entries.drain().collect();
        batch.sort_by(|a, b| a.0.cmp(&b.0));
        batch
    }

    /// Rows appended since the last drain.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Distinct paths currently buffered.
    pub fn paths(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
