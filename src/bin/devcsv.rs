//! CLI tool to split a line-delimited JSON capture into per-device CSV files.
//!
//! Usage:
//!   devcsv <input.jsonl>
//!   devcsv <input.jsonl> --schema process --batch-size 5000 -o out/

use std::path::PathBuf;
use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use devcsv_rs::{ConvertConfig, LogConfig, LogFormat, SchemaKind, convert_file, init_logging};

/// Route JSON device records into `<group>/<source>-data/<schema>.csv` files.
///
/// Files are appended to; a header is written only when a file is created.
#[derive(Parser)]
#[command(name = "devcsv", version)]
struct Cli {
    /// Line-delimited JSON input file
    input: PathBuf,

    /// Record schema: network, process, proc-mem, interfaces or file
    #[arg(short, long, env = "DEVCSV_SCHEMA", default_value = "network")]
    schema: SchemaKind,

    /// Rows buffered in memory before flushing (default depends on schema)
    #[arg(short, long, env = "DEVCSV_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Directory the device folders are created under
    #[arg(short, long, env = "DEVCSV_OUTPUT_ROOT", default_value = ".")]
    output_root: PathBuf,

    /// Log level for stderr diagnostics
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log format: human or json
    #[arg(long, default_value = "human")]
    log_format: LogFormat,

    /// Suppress the end-of-run summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };

    init_logging(&LogConfig {
        level: cli.log_level.clone(),
        format: cli.log_format,
    });

    let mut config = ConvertConfig::new(cli.schema, &cli.input).with_output_root(&cli.output_root);
    if let Some(batch_size) = cli.batch_size {
        config = config.with_batch_size(batch_size);
    }

    match convert_file(&config) {
        Ok(stats) => {
            if !cli.quiet {
                eprintln!("{stats}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
