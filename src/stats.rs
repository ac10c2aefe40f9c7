//! Per-run counters.

use std::fmt;

use crate::flush::FlushReport;

/// Totals gathered over one conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Lines read from the input, blank ones included.
    pub lines_read: usize,
    pub blank_lines: usize,
    /// Lines that were not a JSON object.
    pub skipped_lines: usize,
    /// Rows formatted and buffered.
    pub rows_accepted: usize,
    pub rows_written: usize,
    /// Rows lost to failed destination writes.
    pub rows_dropped: usize,
    pub flushes: usize,
    pub flush_failures: usize,
    pub headers_written: usize,
    pub bytes_written: u64,
    /// Distinct destinations that received at least one row.
    pub output_files: usize,
}

impl RunStats {
    pub(crate) fn record_flush(&mut self, report: &FlushReport, drained_rows: usize) {
        let written = report.rows();
        self.flushes += 1;
        self.rows_written += written;
        self.rows_dropped += drained_rows.saturating_sub(written);
        self.flush_failures += report.failures.len();
        self.headers_written += report.headers();
        self.bytes_written += report.bytes();
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processing complete. Data distributed into {} unique CSV files \
             ({} rows written, {} lines skipped, {} flush failures).",
            self.output_files, self.rows_written, self.skipped_lines, self.flush_failures
        )
    }
}
