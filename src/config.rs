//! Run configuration.

use std::path::PathBuf;

use crate::error::{ConvertError, Result};
use crate::schema::SchemaKind;

/// Everything one conversion run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    /// Record type being converted.
    pub schema: SchemaKind,
    /// Accepted rows held in memory before a flush.
    pub batch_size: usize,
    /// Line-delimited JSON input.
    pub input_path: PathBuf,
    /// Directory the per-device folders are created under.
    pub output_root: PathBuf,
}

impl ConvertConfig {
    /// Config with the schema's default batch size, writing under the
    /// current directory.
    pub fn new(schema: SchemaKind, input_path: impl Into<PathBuf>) -> Self {
        Self {
            schema,
            batch_size: schema.schema().batch_size,
            input_path: input_path.into(),
            output_root: PathBuf::from("."),
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ConvertError::InvalidBatchSize(self.batch_size));
        }
        Ok(())
    }
}
