//! End-to-end conversion tests against a scratch output root.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use devcsv_rs::{ConvertConfig, SchemaKind, convert, convert_file, convert_traced, route, schema};
use tempfile::TempDir;

fn config(root: &Path, schema: SchemaKind, batch_size: usize) -> ConvertConfig {
    ConvertConfig::new(schema, "input.jsonl")
        .with_batch_size(batch_size)
        .with_output_root(root)
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

#[test]
fn test_header_written_once_across_runs() {
    let dir = TempDir::new().unwrap();
    let cfg = config(dir.path(), SchemaKind::Network, 100);

    convert(Cursor::new("{\"DevID\":\"a.b.c\",\"Dev\":\"eth0\"}\n"), &cfg).unwrap();
    convert(Cursor::new("{\"DevID\":\"a.b.c\",\"Dev\":\"eth1\"}\n"), &cfg).unwrap();

    let content = read(dir.path(), "b_c/a-data/network.csv");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines
            .iter()
            .filter(|l| l.starts_with("timestamp,device,"))
            .count(),
        1
    );
    assert!(lines[1].starts_with("N/A,eth0,"));
    assert!(lines[2].starts_with("N/A,eth1,"));
}

#[test]
fn test_rows_keep_input_order() {
    let dir = TempDir::new().unwrap();
    let input: String = (0..250)
        .map(|i| format!("{{\"DevID\":\"host.rack.1\",\"Pid\":{i}}}\n"))
        .collect();
    convert(
        Cursor::new(input),
        &config(dir.path(), SchemaKind::Process, 7),
    )
    .unwrap();

    let content = read(dir.path(), "rack_1/host-data/proc-new.csv");
    let pids: Vec<usize> = content
        .lines()
        .skip(1)
        .map(|l| l.split(',').nth(1).unwrap().parse().unwrap())
        .collect();
    assert_eq!(pids, (0..250).collect::<Vec<_>>());
}

#[test]
fn test_malformed_lines_do_not_disturb_neighbours() {
    let dir = TempDir::new().unwrap();
    let input = concat!(
        "{\"DevID\":\"c.d\",\"TimeStamp\":1}\n",
        "garbage{\n",
        "[\"DevID\",\"c.d\"]\n",
        "\"just a string\"\n",
        "3.14\n",
        "{\"DevID\":\"c.d\",\"TimeStamp\":2}\n",
    );
    let stats = convert(
        Cursor::new(input),
        &config(dir.path(), SchemaKind::Network, 100),
    )
    .unwrap();

    assert_eq!(stats.skipped_lines, 4);
    let content = read(dir.path(), "d/c-data/network.csv");
    let stamps: Vec<&str> = content
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(stamps, vec!["1", "2"]);
}

#[test]
fn test_flush_cadence_does_not_change_content() {
    let input: String = (0..5)
        .map(|i| format!("{{\"DevID\":\"p.q\",\"TimeStamp\":{i},\"Length\":{}}}\n", i * 10))
        .collect();

    let small = TempDir::new().unwrap();
    let (_, trace) = convert_traced(
        Cursor::new(input.clone()),
        &config(small.path(), SchemaKind::Network, 2),
    )
    .unwrap();

    // Each threshold flush grows the file.
    assert!(trace.threshold_flushes() >= 2);
    let growth: Vec<u64> = trace.flushes.iter().map(|f| f.bytes()).collect();
    assert!(growth[0] > 0);
    assert!(growth[1] > 0);
    assert!(growth[2] > 0);

    let large = TempDir::new().unwrap();
    let (_, trace_large) = convert_traced(
        Cursor::new(input),
        &config(large.path(), SchemaKind::Network, 1000),
    )
    .unwrap();
    assert_eq!(trace_large.flushes.len(), 1);

    let rel = "q/p-data/network.csv";
    let small_content = read(small.path(), rel);
    assert_eq!(small_content, read(large.path(), rel));
    assert_eq!(
        small_content.len() as u64,
        growth.iter().sum::<u64>()
    );
}

#[test]
fn test_default_row_and_location() {
    let dir = TempDir::new().unwrap();
    convert(
        Cursor::new("{\"DevID\":\"a.b.c\"}\n"),
        &config(dir.path(), SchemaKind::Network, 10),
    )
    .unwrap();
    let content = read(dir.path(), "b_c/a-data/network.csv");
    assert_eq!(
        content.lines().nth(1).unwrap(),
        "N/A,N/A,0,N/A,N/A,N/A,N/A,N/A,N/A,N/A,N/A,N/A,N/A,N/A,N/A,N/A,N/A,N/A"
    );
}

#[test]
fn test_short_identifiers_go_to_unknown_group() {
    let dir = TempDir::new().unwrap();
    let input = "{\"DevID\":\"lonely\"}\n{}\n{\"DevID\":null}\n";
    let stats = convert(
        Cursor::new(input),
        &config(dir.path(), SchemaKind::Process, 10),
    )
    .unwrap();

    assert_eq!(stats.output_files, 2);
    let lonely = read(dir.path(), "unknown_device_group/lonely-data/proc-new.csv");
    assert_eq!(lonely.lines().count(), 2);
    let unknown = read(dir.path(), "unknown_device_group/unknown-data/proc-new.csv");
    let rows: Vec<&str> = unknown.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert!(row.ends_with(",unknown,0.0"));
    }
}

#[test]
fn test_many_destinations_in_one_batch() {
    let dir = TempDir::new().unwrap();
    let input: String = (0..12)
        .map(|i| format!("{{\"DevID\":\"src{}.grp{}\"}}\n", i % 3, i % 2))
        .collect();
    let stats = convert(
        Cursor::new(input),
        &config(dir.path(), SchemaKind::Network, 5),
    )
    .unwrap();

    assert_eq!(stats.rows_written, 12);
    assert_eq!(stats.output_files, 6);
    assert_eq!(stats.headers_written, 6);
    for i in 0..3 {
        for g in 0..2 {
            let content = read(dir.path(), &format!("grp{g}/src{i}-data/network.csv"));
            assert_eq!(content.lines().count(), 3);
        }
    }
}

#[test]
fn test_interfaces_schema() {
    let dir = TempDir::new().unwrap();
    let input = "{\"DevID\":\"client.edge\",\"TimeStamp\":5,\"Name\":\"eth0\",\"Action\":\"up\",\"IPs\":[\"10.1.1.1\",\"::1\"]}\n";
    convert(
        Cursor::new(input),
        &config(dir.path(), SchemaKind::Interfaces, 10),
    )
    .unwrap();
    let content = read(dir.path(), "edge/client-data/interfaces.csv");
    assert_eq!(
        content,
        format!(
            "{}5,client.edge,eth0,up,N/A,10.1.1.1; ::1\n",
            schema::INTERFACES.header()
        )
    );
}

#[test]
fn test_file_schema() {
    let dir = TempDir::new().unwrap();
    let input = concat!(
        "{\"DevID\":\"host.site\",\"TimeStamp\":9,\"Location\":[\"/etc/hosts\",\"/etc/motd\"],",
        "\"Size\":[220],\"Hash\":[\"ab12\"],\"Ownership\":[{\"Owner\":\"root\",\"Group\":\"wheel\"}]}\n",
        "{\"DevID\":\"host.site\"}\n",
    );
    let stats = convert(Cursor::new(input), &config(dir.path(), SchemaKind::File, 10)).unwrap();
    assert_eq!(stats.rows_written, 2);

    let content = read(dir.path(), "site/host-data/file.csv");
    assert_eq!(
        content,
        format!(
            "{}9,host.site,/etc/hosts,220,ab12,root,wheel\nN/A,host.site,N/A,0,N/A,N/A,N/A\n",
            schema::FILE.header()
        )
    );
}

#[test]
fn test_absolute_device_id_cannot_escape_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("out");
    let outside = dir.path().join("elsewhere");
    let device_id = format!("x.{}", outside.display());
    let target = route(&device_id, "network.csv");
    assert!(target.is_absolute());

    let input = format!(
        "{{\"DevID\":\"{device_id}\"}}\n{{\"DevID\":\"a.b\"}}\n"
    );
    let stats = convert(Cursor::new(input), &config(&root, SchemaKind::Network, 10)).unwrap();

    assert_eq!(stats.flush_failures, 1);
    assert_eq!(stats.rows_written, 1);
    assert_eq!(stats.rows_dropped, 1);
    assert!(!target.exists());
    assert!(!outside.exists());
    assert!(root.join("b/a-data/network.csv").exists());
}

#[test]
fn test_output_files_counts_only_written_paths() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("blocked"), "not a directory").unwrap();

    let input = "{\"DevID\":\"a.blocked\"}\n{\"DevID\":\"a.open\"}\n";
    let stats = convert(Cursor::new(input), &config(dir.path(), SchemaKind::Network, 10)).unwrap();

    assert_eq!(stats.flush_failures, 1);
    assert_eq!(stats.output_files, 1);
    assert!(stats.to_string().contains("into 1 unique CSV files"));
}

#[test]
fn test_convert_file_reads_from_disk() {
    let dir = TempDir::new().unwrap();
    let input_path = dir.path().join("capture.jsonl");
    fs::write(&input_path, "{\"DevID\":\"m.n\",\"Cpu\":1.5}\n").unwrap();
    let out = dir.path().join("out");

    let cfg = ConvertConfig::new(SchemaKind::ProcMem, &input_path).with_output_root(&out);
    let stats = convert_file(&cfg).unwrap();
    assert_eq!(stats.rows_written, 1);

    let content = read(&out, "n/m-data/proc-mem.csv");
    assert!(content.lines().nth(1).unwrap().ends_with(",m.n,1.500000"));
}
