//! Output schemas and row formatting.
//!
//! A [`Schema`] is a data-driven descriptor: an ordered list of columns,
//! the header line, the output file name and the default batch size. Every
//! converter shares one pipeline and differs only in the schema it is given.
//!
//! Rows are joined with [`DELIMITER`] and terminated with `\n`. No quoting
//! or escaping is applied; field values are assumed not to contain the
//! delimiter or line breaks.

use std::fmt;
use std::str::FromStr;

use crate::error::ConvertError;
use crate::record::Record;

/// Column delimiter for every schema.
pub const DELIMITER: char = ',';

/// Default for absent string fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// How one output column gets its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Scalar lookup by field name with a default for absent/null values.
    Field {
        name: &'static str,
        default: &'static str,
    },
    /// The record's device identifier, verbatim.
    DeviceId,
    /// A list field joined with a separator.
    List {
        name: &'static str,
        separator: &'static str,
    },
    /// First item of a list field.
    First {
        name: &'static str,
        default: &'static str,
    },
    /// A field of the first object in a list field.
    FirstObjectField {
        name: &'static str,
        key: &'static str,
        default: &'static str,
    },
}

/// One output column: its header name and where its value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub source: Source,
}

impl Column {
    const fn field(name: &'static str, source: &'static str) -> Self {
        Self::field_or(name, source, NOT_AVAILABLE)
    }

    const fn field_or(name: &'static str, source: &'static str, default: &'static str) -> Self {
        Self {
            name,
            source: Source::Field {
                name: source,
                default,
            },
        }
    }

    const fn device_id(name: &'static str) -> Self {
        Self {
            name,
            source: Source::DeviceId,
        }
    }

    const fn list(name: &'static str, source: &'static str, separator: &'static str) -> Self {
        Self {
            name,
            source: Source::List {
                name: source,
                separator,
            },
        }
    }

    const fn first(name: &'static str, source: &'static str, default: &'static str) -> Self {
        Self {
            name,
            source: Source::First {
                name: source,
                default,
            },
        }
    }

    const fn first_object_field(name: &'static str, source: &'static str, key: &'static str) -> Self {
        Self {
            name,
            source: Source::FirstObjectField {
                name: source,
                key,
                default: NOT_AVAILABLE,
            },
        }
    }

    fn render(&self, record: &Record, device_id: &str) -> String {
        match self.source {
            Source::Field { name, default } => record.text_or(name, default),
            Source::DeviceId => device_id.to_string(),
            Source::List { name, separator } => record.list_text(name, separator),
            Source::First { name, default } => record.first_text(name, default),
            Source::FirstObjectField { name, key, default } => {
                record.first_object_text(name, key, default)
            }
        }
    }
}

/// The record types this tool knows how to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemaKind {
    /// Network packet captures.
    #[default]
    Network,
    /// Process resource snapshots.
    Process,
    /// Process memory snapshots (no resident-set column).
    ProcMem,
    /// Network interface events.
    Interfaces,
    /// File change events.
    File,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 5] = [
        SchemaKind::Network,
        SchemaKind::Process,
        SchemaKind::ProcMem,
        SchemaKind::Interfaces,
        SchemaKind::File,
    ];

    /// The descriptor for this record type.
    pub fn schema(self) -> &'static Schema {
        match self {
            SchemaKind::Network => &NETWORK,
            SchemaKind::Process => &PROCESS,
            SchemaKind::ProcMem => &PROC_MEM,
            SchemaKind::Interfaces => &INTERFACES,
            SchemaKind::File => &FILE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SchemaKind::Network => "network",
            SchemaKind::Process => "process",
            SchemaKind::ProcMem => "proc-mem",
            SchemaKind::Interfaces => "interfaces",
            SchemaKind::File => "file",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemaKind {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "network" | "net" => Ok(SchemaKind::Network),
            "process" | "proc" | "proc-new" => Ok(SchemaKind::Process),
            "proc-mem" | "procmem" => Ok(SchemaKind::ProcMem),
            "interfaces" | "interface" => Ok(SchemaKind::Interfaces),
            "file" | "files" => Ok(SchemaKind::File),
            _ => Err(ConvertError::UnknownSchema(s.to_string())),
        }
    }
}

/// Fixed layout of one CSV output type.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub kind: SchemaKind,
    /// File name written inside each device's data folder.
    pub file_name: &'static str,
    /// Rows buffered before a flush.
    pub batch_size: usize,
    pub columns: &'static [Column],
}

impl Schema {
    /// Header line, newline terminated.
    pub fn header(&self) -> String {
        let mut line = String::new();
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                line.push(DELIMITER);
            }
            line.push_str(column.name);
        }
        line.push('\n');
        line
    }

    /// Format one record as a newline-terminated row.
    ///
    /// `device_id` is the identifier the record was routed by; it is reused
    /// verbatim by [`Source::DeviceId`] columns.
    pub fn format_row(&self, record: &Record, device_id: &str) -> String {
        let mut row = String::new();
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                row.push(DELIMITER);
            }
            row.push_str(&column.render(record, device_id));
        }
        row.push('\n');
        row
    }
}

/// Network packet layout.
///
/// `timestamp` defaults to `N/A` like every other string column; only
/// `length` defaults to `0`. Rows for records carrying nothing but a `DevID`
/// are therefore `N/A,N/A,0,N/A,...`.
pub static NETWORK: Schema = Schema {
    kind: SchemaKind::Network,
    file_name: "network.csv",
    batch_size: 50_000,
    columns: &[
        Column::field("timestamp", "TimeStamp"),
        Column::field("device", "Dev"),
        Column::field_or("length", "Length", "0"),
        Column::field("link_protocol", "LinkProtocol"),
        Column::field("network_protocol", "NetworkProtocol"),
        Column::field("transport_protocol", "TransportProtocol"),
        Column::field("application_protocol", "ApplicationProtocol"),
        Column::field("ip_version", "Version"),
        Column::field("src_ip", "SRC_IP"),
        Column::field("dst_ip", "DST_IP"),
        Column::field("src_port", "SrcPort"),
        Column::field("dst_port", "DstPort"),
        Column::field("arp_operation", "Operation"),
        Column::field("arp_protocol", "Protocol"),
        Column::field("arp_src_proto", "SrcProtAdd"),
        Column::field("arp_dst_proto", "DstProtAdd"),
        Column::field("eth_src_mac", "SRC_MAC"),
        Column::field("eth_dst_mac", "DST_MAC"),
    ],
};

pub static PROCESS: Schema = Schema {
    kind: SchemaKind::Process,
    file_name: "proc-new.csv",
    batch_size: 20_000,
    columns: &[
        Column::field("timestamp", "TimeStamp"),
        Column::field("pid", "Pid"),
        Column::field("ppid", "PPid"),
        Column::field("real_uid", "RealUid"),
        Column::field("effective_uid", "EffectiveUid"),
        Column::field("saved_uid", "SavedUid"),
        Column::field("filesystem_uid", "FilesystemUid"),
        Column::field("real_gid", "RealGid"),
        Column::field("effective_gid", "EffectiveGid"),
        Column::field("saved_gid", "SavedGid"),
        Column::field("filesystem_gid", "FilesystemGid"),
        Column::field("vm_peak", "VmPeak"),
        Column::field("vm_size", "VmSize"),
        Column::field("vm_hwm", "VmHWM"),
        Column::field("vm_rss", "VmRss"),
        Column::field("rss_shmem", "RssShmem"),
        Column::field("vm_stk", "VmStk"),
        Column::field("vm_data", "VmData"),
        Column::field("threads", "Threads"),
        Column::field("name", "Name"),
        Column::field("state", "State"),
        Column::device_id("device_id"),
        Column::field_or("cpu", "Cpu", "0.0"),
    ],
};

pub static PROC_MEM: Schema = Schema {
    kind: SchemaKind::ProcMem,
    file_name: "proc-mem.csv",
    batch_size: 20_000,
    columns: &[
        Column::field("timestamp", "TimeStamp"),
        Column::field("pid", "Pid"),
        Column::field("ppid", "PPid"),
        Column::field("real_uid", "RealUid"),
        Column::field("effective_uid", "EffectiveUid"),
        Column::field("saved_uid", "SavedUid"),
        Column::field("filesystem_uid", "FilesystemUid"),
        Column::field("real_gid", "RealGid"),
        Column::field("effective_gid", "EffectiveGid"),
        Column::field("saved_gid", "SavedGid"),
        Column::field("filesystem_gid", "FilesystemGid"),
        Column::field("vm_peak", "VmPeak"),
        Column::field("vm_size", "VmSize"),
        Column::field("vm_hwm", "VmHWM"),
        Column::field("rss_shmem", "RssShmem"),
        Column::field("vm_stk", "VmStk"),
        Column::field("vm_data", "VmData"),
        Column::field("threads", "Threads"),
        Column::field("name", "Name"),
        Column::field("state", "State"),
        Column::device_id("device_id"),
        Column::field_or("cpu", "Cpu", "0.0"),
    ],
};

pub static INTERFACES: Schema = Schema {
    kind: SchemaKind::Interfaces,
    file_name: "interfaces.csv",
    batch_size: 20_000,
    columns: &[
        Column::field("timestamp", "TimeStamp"),
        Column::device_id("device_id"),
        Column::field("interface_name", "Name"),
        Column::field("action", "Action"),
        Column::field("hardware_addr", "HardwareAddr"),
        Column::list("ips", "IPs", "; "),
    ],
};

pub static FILE: Schema = Schema {
    kind: SchemaKind::File,
    file_name: "file.csv",
    batch_size: 20_000,
    columns: &[
        Column::field("timestamp", "TimeStamp"),
        Column::device_id("device_id"),
        Column::first("location", "Location", NOT_AVAILABLE),
        Column::first("size", "Size", "0"),
        Column::first("hash", "Hash", NOT_AVAILABLE),
        Column::first_object_field("owner", "Ownership", "Owner"),
        Column::first_object_field("group", "Ownership", "Group"),
    ],
};
