//! Trace types for observing flush cadence.
//!
//! A traced run records every flush: why it happened, how many rows it
//! carried, and what each destination received. Tests use this to check
//! intermediate flushes without polling the filesystem mid-run.

use std::path::PathBuf;

use crate::flush::{FlushReport, PathWrite};
use crate::schema::SchemaKind;

/// What triggered a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// The accepted-row counter reached the batch size.
    Threshold,
    /// The input was exhausted.
    EndOfInput,
}

/// One flush and its per-destination results.
#[derive(Debug, Clone, PartialEq)]
pub struct FlushTrace {
    /// Zero-based position of this flush within the run.
    pub index: usize,
    pub reason: FlushReason,
    /// Rows drained from the buffer, including any that failed to write.
    pub rows: usize,
    pub writes: Vec<PathWrite>,
    /// Destinations that failed, with the error text.
    pub failures: Vec<(PathBuf, String)>,
}

impl FlushTrace {
    pub(crate) fn from_report(
        index: usize,
        reason: FlushReason,
        rows: usize,
        report: &FlushReport,
    ) -> Self {
        Self {
            index,
            reason,
            rows,
            writes: report.writes.clone(),
            failures: report
                .failures
                .iter()
                .map(|f| (f.path.clone(), f.error.to_string()))
                .collect(),
        }
    }

    /// Bytes appended to disk by this flush.
    pub fn bytes(&self) -> u64 {
        self.writes.iter().map(|w| w.bytes).sum()
    }
}

/// Complete trace of a conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTrace {
    pub schema: SchemaKind,
    pub batch_size: usize,
    pub flushes: Vec<FlushTrace>,
}

impl RunTrace {
    pub fn new(schema: SchemaKind, batch_size: usize) -> Self {
        Self {
            schema,
            batch_size,
            flushes: Vec::new(),
        }
    }

    /// Flushes triggered by the batch threshold.
    pub fn threshold_flushes(&self) -> usize {
        self.flushes
            .iter()
            .filter(|f| f.reason == FlushReason::Threshold)
            .count()
    }
}
