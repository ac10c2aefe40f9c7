//! The conversion driver loop.
//!
//! Reads the input one line at a time and pushes each line through
//! parse, route, format and buffer before reading the next. When the
//! accepted-row counter reaches the batch size the buffer is flushed and
//! the counter reset. At end of input one final flush runs regardless of
//! the counter.
//!
//! Blank lines and lines that are not JSON objects are dropped without
//! touching the row counter; they only show up in [`RunStats`].

use std::fs::File;
use std::io::{BufRead, BufReader};

use tracing::{debug, info};

use crate::buffer::BatchBuffer;
use crate::config::ConvertConfig;
use crate::debug_trace::{FlushReason, FlushTrace, RunTrace};
use crate::error::{ConvertError, Result};
use crate::flush::FlushEngine;
use crate::record::Record;
use crate::router::route;
use crate::schema::Schema;
use crate::stats::RunStats;

/// One converter instance: a schema, its buffer and its flush state.
#[derive(Debug)]
pub struct Converter {
    schema: &'static Schema,
    batch_size: usize,
    buffer: BatchBuffer,
    engine: FlushEngine,
    stats: RunStats,
    trace: Option<RunTrace>,
}

impl Converter {
    pub fn new(config: &ConvertConfig) -> Result<Self> {
        config.validate()?;
        let schema = config.schema.schema();
        Ok(Self {
            schema,
            batch_size: config.batch_size,
            buffer: BatchBuffer::new(),
            engine: FlushEngine::new(&config.output_root, schema),
            stats: RunStats::default(),
            trace: None,
        })
    }

    /// Record a [`FlushTrace`] for every flush.
    #[must_use]
    pub fn traced(mut self) -> Self {
        self.trace = Some(RunTrace::new(self.schema.kind, self.batch_size));
        self
    }

    /// Handle one raw input line (without its trailing `\n`).
    pub fn push_line(&mut self, line: &[u8]) {
        self.stats.lines_read += 1;
        if line.iter().all(u8::is_ascii_whitespace) {
            self.stats.blank_lines += 1;
            return;
        }
        let Some(record) = Record::parse(line) else {
            self.stats.skipped_lines += 1;
            return;
        };
        self.push_record(&record);
    }

    /// Route, format and buffer an already parsed record.
    pub fn push_record(&mut self, record: &Record) {
        let device_id = record.device_id();
        let path = route(&device_id, self.schema.file_name);
        let row = self.schema.format_row(record, &device_id);
        self.buffer.append(&path, &row);
        self.stats.rows_accepted += 1;

        if self.buffer.rows() >= self.batch_size {
            self.flush(FlushReason::Threshold);
        }
    }

    /// Rows buffered since the last flush.
    pub fn pending_rows(&self) -> usize {
        self.buffer.rows()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Run the final flush and hand back the run's totals and trace.
    pub fn finish(mut self) -> (RunStats, Option<RunTrace>) {
        self.flush(FlushReason::EndOfInput);
        self.stats.output_files = self.engine.written_paths();
        info!(
            schema = %self.schema.kind,
            lines = self.stats.lines_read,
            rows = self.stats.rows_written,
            skipped = self.stats.skipped_lines,
            files = self.stats.output_files,
            flush_failures = self.stats.flush_failures,
            "conversion finished"
        );
        (self.stats, self.trace)
    }

    fn flush(&mut self, reason: FlushReason) {
        let rows = self.buffer.rows();
        let paths = self.buffer.paths();
        let batch = self.buffer.drain();
        debug!(?reason, rows, paths, "flushing batch");

        let report = self.engine.flush(batch);
        if let Some(trace) = self.trace.as_mut() {
            let index = trace.flushes.len();
            trace
                .flushes
                .push(FlushTrace::from_report(index, reason, rows, &report));
        }
        self.stats.record_flush(&report, rows);
    }
}

/// Convert a line-delimited JSON stream.
///
/// A read error stops the loop; rows accepted so far are still flushed
/// before the error is returned.
pub fn convert<R: BufRead>(reader: R, config: &ConvertConfig) -> Result<RunStats> {
    let mut converter = Converter::new(config)?;
    let read = drive(reader, &mut converter);
    let (stats, _) = converter.finish();
    read.map(|()| stats)
}

/// Like [`convert`], also returning a trace of every flush.
pub fn convert_traced<R: BufRead>(
    reader: R,
    config: &ConvertConfig,
) -> Result<(RunStats, RunTrace)> {
    let mut converter = Converter::new(config)?.traced();
    let read = drive(reader, &mut converter);
    let (stats, trace) = converter.finish();
    let trace = trace.unwrap_or_else(|| RunTrace::new(config.schema, config.batch_size));
    read.map(|()| (stats, trace))
}

/// Open `config.input_path` and convert it.
pub fn convert_file(config: &ConvertConfig) -> Result<RunStats> {
    config.validate()?;
    let file = File::open(&config.input_path).map_err(|source| ConvertError::OpenInput {
        path: config.input_path.clone(),
        source,
    })?;
    info!(
        input = %config.input_path.display(),
        schema = %config.schema,
        batch_size = config.batch_size,
        output_root = %config.output_root.display(),
        "starting conversion"
    );
    convert(BufReader::new(file), config)
}

fn drive<R: BufRead>(mut reader: R, converter: &mut Converter) -> Result<()> {
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(ConvertError::ReadInput)?;
        if n == 0 {
            return Ok(());
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        converter.push_line(&line);
    }
}
