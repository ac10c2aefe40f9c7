//! Error types for the conversion pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors raised while reading input or persisting CSV output.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input file could not be opened for reading.
    #[error("could not open input file '{}': {source}", path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from the input stream failed part way through.
    #[error("error reading input: {0}")]
    ReadInput(#[source] io::Error),

    #[error("could not create directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not open output file '{}': {source}", path.display())]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write output file '{}': {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A routed path would resolve outside the output root.
    #[error("refusing to write outside the output root: '{}'", path.display())]
    UnsafePath { path: PathBuf },

    #[error("batch size must be a positive integer (got {0})")]
    InvalidBatchSize(usize),

    #[error("unknown schema '{0}' (expected network, process, proc-mem, interfaces or file)")]
    UnknownSchema(String),
}
