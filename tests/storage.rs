use sortbench::model::{Algorithm, Record, RunResult, SortColumn, SortOrder};
use sortbench::storage;
use sortbench::SortError;
use std::time::Duration;
use tempfile::TempDir;

fn sample_result(run_id: &str, timestamp: &str) -> RunResult {
    RunResult {
        timestamp_utc: timestamp.into(),
        run_id: run_id.into(),
        algorithm: Algorithm::Insertion,
        column: SortColumn::LastName,
        order: SortOrder::Ascending,
        record_count: 2,
        elapsed: Duration::from_micros(12_345),
        source: Some("people.csv".into()),
        records: vec![
            Record::new(7, "Ada", "Lovelace"),
            Record::new(3, "Grace", "Hopper, Jr."),
        ],
    }
}

#[test]
fn loads_a_dataset_with_loose_headers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.csv");
    std::fs::write(
        &path,
        "\u{feff}First Name,ID,Last_Name,Email\n\nAlice,2,\"Smith, Jr.\",a@x\nbob,1,jones,b@x\n",
    )
    .unwrap();

    let records = storage::load_records(&path).unwrap();
    assert_eq!(
        records,
        vec![
            Record::new(2, "Alice", "Smith, Jr."),
            Record::new(1, "bob", "jones"),
        ]
    );
}

#[test]
fn malformed_rows_fail_the_whole_load() {
    let err = storage::parse_records("ID,FirstName,LastName\n1,a,b\nx,c,d\n").unwrap_err();
    assert!(matches!(err, SortError::Load { line: 3, .. }), "{err}");

    let err = storage::parse_records("ID,FirstName,LastName\n1,a\n").unwrap_err();
    assert!(matches!(err, SortError::Load { line: 2, .. }), "{err}");

    let err = storage::parse_records("ID,Name\n1,a\n").unwrap_err();
    assert!(matches!(err, SortError::Load { line: 1, .. }), "{err}");

    assert!(matches!(
        storage::parse_records(""),
        Err(SortError::Load { .. })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = storage::load_records(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, SortError::Io { .. }));
}

#[test]
fn written_dataset_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("data.csv");
    let records = sortbench::dataset::generate_records(25, Some(9));
    storage::write_records(&path, &records).unwrap();
    assert_eq!(storage::load_records(&path).unwrap(), records);
}

#[test]
fn csv_export_has_ranked_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    storage::export_csv(&path, &sample_result("abcdef0123456789", "2026-03-01T10:00:00Z")).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Rank,ID,First Name,Last Name,Algorithm,Sorted Column,Records Processed,Execution Time (seconds)"
    );
    assert_eq!(lines[1], "1,7,Ada,Lovelace,Insertion Sort,LastName,2,0.0123");
    assert_eq!(
        lines[2],
        "2,3,Grace,\"Hopper, Jr.\",Insertion Sort,LastName,2,0.0123"
    );
    assert_eq!(lines.len(), 3);
}

#[test]
fn json_export_keeps_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.json");
    let result = sample_result("abcdef0123456789", "2026-03-01T10:00:00Z");
    storage::export_json(&path, &result).unwrap();

    let back: RunResult = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back.records, result.records);
    assert_eq!(back.elapsed, result.elapsed);
    assert_eq!(back.algorithm, Algorithm::Insertion);
}

#[test]
fn history_lists_newest_summaries_first() {
    let dir = TempDir::new().unwrap();
    let runs = dir.path().join("runs");
    assert!(storage::load_recent_in(&runs, 5).unwrap().is_empty());

    storage::save_run_in(&runs, &sample_result("1111111111111111", "2026-03-01T10:00:00Z")).unwrap();
    storage::save_run_in(&runs, &sample_result("2222222222222222", "2026-03-02T10:00:00Z")).unwrap();
    let p = storage::save_run_in(&runs, &sample_result("3333333333333333", "2026-03-03T10:00:00Z"))
        .unwrap();
    assert!(p.file_name().unwrap().to_string_lossy().starts_with("run-2026-03-03_10-00-00Z"));
    std::fs::write(runs.join("run-2026-01-01_00-00-00Z-broken.json"), "{").unwrap();

    let recent = storage::load_recent_in(&runs, 2).unwrap();
    let ids: Vec<&str> = recent.iter().map(|r| r.run_id.as_str()).collect();
    assert_eq!(ids, vec!["3333333333333333", "2222222222222222"]);
    assert!(recent.iter().all(|r| r.records.is_empty()));

    // Unreadable files are skipped.
    assert_eq!(storage::load_recent_in(&runs, 10).unwrap().len(), 3);
}

#[test]
fn integer_files_accept_commas_and_whitespace() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.txt");
    std::fs::write(&path, "64\n34, 25\n\n12 22\t11,90\n-7\n").unwrap();
    assert_eq!(
        storage::load_values(&path).unwrap(),
        vec![64, 34, 25, 12, 22, 11, 90, -7]
    );
}

#[test]
fn bad_integer_reports_its_line() {
    let err = storage::parse_values("1\n2\n3.5\n").unwrap_err();
    assert!(matches!(err, SortError::Load { line: 3, .. }), "{err}");
    assert!(storage::parse_values("").unwrap().is_empty());
}
