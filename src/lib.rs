//! # devcsv-rs
//!
//! Route line-delimited JSON device records into per-device CSV files.
//!
//! Each input line is a JSON object carrying a dotted `DevID` such as
//! `client.a.b.c.d`. The identifier picks the destination
//! (`a_b_c_d/client-data/<schema file>`), the schema picks the columns, and
//! rows are batched in memory before being appended to disk.
//!
//! ## Overview
//!
//! - **Record**: one parsed input line; anything but a JSON object is dropped
//! - **Router**: dotted identifier to relative output path
//! - **Schema**: ordered columns, defaults, header and file name
//! - **Buffer**: formatted rows grouped by destination
//! - **Flush**: append to disk, writing the header once per new file
//!
//! ## Example
//!
//! ```
//! use devcsv_rs::{ConvertConfig, SchemaKind, convert};
//! use std::io::Cursor;
//!
//! let out = tempfile::tempdir().unwrap();
//! let config = ConvertConfig::new(SchemaKind::Network, "capture.jsonl")
//!     .with_output_root(out.path());
//!
//! let input = "{\"DevID\":\"client.lab.rack1\",\"Dev\":\"eth0\",\"Length\":60}\n";
//! let stats = convert(Cursor::new(input), &config).unwrap();
//!
//! assert_eq!(stats.rows_written, 1);
//! assert!(out.path().join("lab_rack1/client-data/network.csv").exists());
//! ```

pub mod buffer;
pub mod config;
pub mod debug_trace;
pub mod error;
pub mod executor;
pub mod flush;
pub mod logging;
pub mod record;
pub mod router;
pub mod schema;
pub mod stats;

pub use buffer::BatchBuffer;
pub use config::ConvertConfig;
pub use debug_trace::{FlushReason, FlushTrace, RunTrace};
pub use error::{ConvertError, Result};
pub use executor::{Converter, convert, convert_file, convert_traced};
pub use flush::{FlushEngine, FlushFailure, FlushReport, PathWrite};
pub use logging::{LogConfig, LogFormat, init_logging};
pub use record::Record;
pub use router::{DeviceRoute, UNKNOWN_GROUP, route};
pub use schema::{Column, Schema, SchemaKind, Source};
pub use stats::RunStats;
