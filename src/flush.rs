//! Persist buffered rows to their CSV files.
//!
//! Each destination path moves from UNSEEN to SEEN the first time a flush
//! touches it. On that transition the engine checks whether the file already
//! exists; if it does not, the schema header is written ahead of the data.
//! Once SEEN, a path is never checked again and never gets another header.
//!
//! Files are opened in append mode and closed before the next path is
//! handled. A failure on one path does not stop the remaining paths in the
//! same flush; the failing path's rows for that flush are dropped.
//!
//! Routed paths must stay under the output root. Absolute paths and `..`
//! components are refused as failures before anything touches the disk.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ConvertError, Result};
use crate::schema::Schema;

/// Outcome of writing one destination during a flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathWrite {
    /// Path relative to the output root.
    pub path: PathBuf,
    pub rows: usize,
    /// Bytes appended, header included.
    pub bytes: u64,
    pub header_written: bool,
}

/// A destination that could not be written during a flush.
#[derive(Debug)]
pub struct FlushFailure {
    pub path: PathBuf,
    pub error: ConvertError,
}

/// Everything that happened during one flush.
#[derive(Debug, Default)]
pub struct FlushReport {
    pub writes: Vec<PathWrite>,
    pub failures: Vec<FlushFailure>,
}

impl FlushReport {
    pub fn rows(&self) -> usize {
        self.writes.iter().map(|w| w.rows).sum()
    }

    pub fn bytes(&self) -> u64 {
        self.writes.iter().map(|w| w.bytes).sum()
    }

    pub fn headers(&self) -> usize {
        self.writes.iter().filter(|w| w.header_written).count()
    }
}

/// Writes drained batches under an output root, tracking header state.
#[derive(Debug)]
pub struct FlushEngine {
    root: PathBuf,
    header: String,
    initialized: HashSet<PathBuf>,
    written: HashSet<PathBuf>,
}

impl FlushEngine {
    pub fn new(root: impl Into<PathBuf>, schema: &Schema) -> Self {
        Self {
            root: root.into(),
            header: schema.header(),
            initialized: HashSet::new(),
            written: HashSet::new(),
        }
    }

    /// Write every non-empty entry of `batch`.
    pub fn flush(&mut self, batch: Vec<(PathBuf, String)>) -> FlushReport {
        let mut report = FlushReport::default();

        for (path, text) in batch {
            if text.is_empty() {
                continue;
            }
            let rows = text.matches('\n').count();
            if !is_contained(&path) {
                let error = ConvertError::UnsafePath { path: path.clone() };
                warn!(path = %path.display(), rows, %error, "dropping rows for path");
                report.failures.push(FlushFailure { path, error });
                continue;
            }
            let target = self.root.join(&path);
            let header = self.needs_header(&path, &target);

            match self.write_one(&target, header, &text) {
                Ok(bytes) => {
                    self.written.insert(path.clone());
                    debug!(path = %path.display(), rows, bytes, header, "appended rows");
                    report.writes.push(PathWrite {
                        path,
                        rows,
                        bytes,
                        header_written: header,
                    });
                }
                Err(error) => {
                    warn!(path = %path.display(), rows, %error, "dropping rows for path");
                    report.failures.push(FlushFailure { path, error });
                }
            }
        }

        report
    }

    /// Number of paths whose header status has been decided this run.
    pub fn initialized_paths(&self) -> usize {
        self.initialized.len()
    }

    /// Number of paths that received at least one successful write.
    pub fn written_paths(&self) -> usize {
        self.written.len()
    }

    pub fn is_initialized(&self, path: &Path) -> bool {
        self.initialized.contains(path)
    }

    /// Decide the header for a path the first time it is flushed; the path
    /// is marked SEEN whatever the existence check says.
    fn needs_header(&mut self, path: &Path, target: &Path) -> bool {
        if self.initialized.contains(path) {
            return false;
        }
        let write_header = !target.exists();
        self.initialized.insert(path.to_path_buf());
        write_header
    }

    fn write_one(&self, target: &Path, header: bool, text: &str) -> Result<u64> {
        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| ConvertError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(target)
            .map_err(|source| ConvertError::OpenOutput {
                path: target.to_path_buf(),
                source,
            })?;

        let write_err = |source: io::Error| ConvertError::WriteOutput {
            path: target.to_path_buf(),
            source,
        };

        let mut bytes = 0u64;
        if header {
            file.write_all(self.header.as_bytes()).map_err(write_err)?;
            bytes += self.header.len() as u64;
        }
        file.write_all(text.as_bytes()).map_err(write_err)?;
        bytes += text.len() as u64;

        Ok(bytes)
    }
}

/// True when `path` is relative and has no `..` components.
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
