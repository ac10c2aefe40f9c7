//! Derive output paths from dotted device identifiers.
//!
//! `client.a.b.c.d` routes to `a_b_c_d/client-data/<file>`. Identifiers with
//! fewer than two segments land under `unknown_device_group/<id>-data/<file>`.
//!
//! Routing is a pure function of the identifier and the file name; the same
//! identifier always yields the same path.

use std::path::PathBuf;

/// Base folder for identifiers with fewer than two segments.
pub const UNKNOWN_GROUP: &str = "unknown_device_group";

/// The two folder levels an identifier maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRoute {
    /// Top-level folder: segments 1.. joined with `_`.
    pub base: String,
    /// Per-source folder: `<segment0>-data`.
    pub sub: String,
}

impl DeviceRoute {
    pub fn from_device_id(device_id: &str) -> Self {
        let parts = segments(device_id);
        if parts.len() >= 2 {
            Self {
                base: parts[1..].join("_"),
                sub: format!("{}-data", parts[0]),
            }
        } else {
            Self {
                base: UNKNOWN_GROUP.to_string(),
                sub: format!("{device_id}-data"),
            }
        }
    }

    /// Path of `file_name` inside this route, relative to the output root.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        PathBuf::from(&self.base).join(&self.sub).join(file_name)
    }
}

/// Route an identifier straight to its relative output path.
pub fn route(device_id: &str, file_name: &str) -> PathBuf {
    DeviceRoute::from_device_id(device_id).file_path(file_name)
}

/// Split on `.` the way a stream tokenizer does: an empty identifier has no
/// segments and one trailing empty segment is dropped.
fn segments(device_id: &str) -> Vec<&str> {
    if device_id.is_empty() {
        return Vec::new();
    }
    let mut parts: Vec<&str> = device_id.split('.').collect();
    if parts.last() == Some(&"") {
        parts.pop();
    }
    parts
}
