//! Dataset loading (records and plain integers), result export and run history on disk.

use crate::error::SortError;
use crate::model::{Record, RunResult};
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const RESULT_CSV_HEADER: &str = "Rank,ID,First Name,Last Name,Algorithm,Sorted Column,Records Processed,Execution Time (seconds)";

/// Load records from a delimited text file with a header row.
///
/// Any malformed row fails the whole load; no partial dataset is returned.
pub fn load_records(path: &Path) -> std::result::Result<Vec<Record>, SortError> {
    let text = std::fs::read_to_string(path).map_err(|source| SortError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(&text)?;
    info!(path = %path.display(), records = records.len(), "dataset loaded");
    Ok(records)
}

/// Parse comma-separated text whose header names the id, first-name and last-name columns.
/// Header matching ignores case, spaces and underscores; other columns are ignored.
pub fn parse_records(text: &str) -> std::result::Result<Vec<Record>, SortError> {
    let mut lines = text
        .trim_start_matches('\u{feff}')
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty());

    let (header_line, header) = lines
        .next()
        .ok_or_else(|| SortError::load(1, "missing header row"))?;
    let header = split_fields(header).map_err(|e| SortError::load(header_line, e))?;
    let column = |name: &str| {
        header
            .iter()
            .position(|h| normalize_header(h) == name)
            .ok_or_else(|| SortError::load(header_line, format!("header has no {name} column")))
    };
    let id_col = column("id")?;
    let first_col = column("firstname")?;
    let last_col = column("lastname")?;
    let width = header.len();

    let mut records = Vec::new();
    for (line_no, line) in lines {
        let fields = split_fields(line).map_err(|e| SortError::load(line_no, e))?;
        if fields.len() != width {
            return Err(SortError::load(
                line_no,
                format!("expected {} fields, found {}", width, fields.len()),
            ));
        }
        let raw_id = fields[id_col].trim();
        let id = raw_id
            .parse::<i64>()
            .map_err(|_| SortError::load(line_no, format!("id {raw_id:?} is not an integer")))?;
        records.push(Record::new(
            id,
            fields[first_col].trim(),
            fields[last_col].trim(),
        ));
    }
    Ok(records)
}

/// Load integers from a text file; see [`parse_values`].
pub fn load_values(path: &Path) -> std::result::Result<Vec<i64>, SortError> {
    let text = std::fs::read_to_string(path).map_err(|source| SortError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let values = parse_values(&text)?;
    info!(path = %path.display(), values = values.len(), "values loaded");
    Ok(values)
}

/// Parse integers separated by commas and/or whitespace, any number per line.
pub fn parse_values(text: &str) -> std::result::Result<Vec<i64>, SortError> {
    let mut values = Vec::new();
    for (i, line) in text.trim_start_matches('\u{feff}').lines().enumerate() {
        let tokens = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty());
        for token in tokens {
            let value = token
                .parse::<i64>()
                .map_err(|_| SortError::load(i + 1, format!("{token:?} is not an integer")))?;
            values.push(value);
        }
    }
    Ok(values)
}

fn normalize_header(h: &str) -> String {
    h.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split one line into fields. Supports double-quoted fields with `""` escapes.
fn split_fields(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            (',', false) => fields.push(std::mem::take(&mut field)),
            (c, _) => field.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quoted field".into());
    }
    fields.push(field);
    Ok(fields)
}

fn csv_field(s: &str) -> Cow<'_, str> {
    if s.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(s)
    }
}

/// Write records back as a loadable dataset.
pub fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    let mut out = String::from("ID,FirstName,LastName\n");
    for r in records {
        let _ = writeln!(
            out,
            "{},{},{}",
            r.id,
            csv_field(&r.first_name),
            csv_field(&r.last_name)
        );
    }
    write_file(path, &out)
}

/// Render the sorted records of a run as CSV, one row per rank.
pub fn result_csv(result: &RunResult) -> String {
    let mut out = String::with_capacity(64 * (result.records.len() + 1));
    out.push_str(RESULT_CSV_HEADER);
    out.push('\n');
    let secs = format!("{:.4}", result.elapsed.as_secs_f64());
    for (rank, r) in result.records.iter().enumerate() {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            rank + 1,
            r.id,
            csv_field(&r.first_name),
            csv_field(&r.last_name),
            result.algorithm.label(),
            result.column.label(),
            result.record_count,
            secs
        );
    }
    out
}

pub fn export_csv(path: &Path, result: &RunResult) -> Result<()> {
    write_file(path, &result_csv(result))
}

pub fn export_json(path: &Path, result: &RunResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("serialize run result")?;
    write_file(path, &json)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write {}", path.display()))?;
    debug!(path = %path.display(), bytes = contents.len(), "file written");
    Ok(())
}

/// Default directory for saved run summaries.
pub fn runs_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .context("no data directory available")?;
    Ok(base.join("sortbench").join("runs"))
}

/// Save a run summary (without sorted records) to the history directory.
pub fn save_run(result: &RunResult) -> Result<PathBuf> {
    save_run_in(&runs_dir()?, result)
}

pub fn save_run_in(dir: &Path, result: &RunResult) -> Result<PathBuf> {
    let name = format!(
        "run-{}-{}.json",
        result.timestamp_utc.replace(':', "-").replace('T', "_"),
        &result.run_id[..8.min(result.run_id.len())]
    );
    let path = dir.join(name);
    export_json(&path, &result.summary())?;
    Ok(path)
}

/// Load up to `limit` saved run summaries, newest first.
pub fn load_recent(limit: usize) -> Result<Vec<RunResult>> {
    load_recent_in(&runs_dir()?, limit)
}

pub fn load_recent_in(dir: &Path, limit: usize) -> Result<Vec<RunResult>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("read {}", dir.display())),
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    // File names start with the RFC 3339 timestamp.
    paths.sort_unstable_by(|a, b| b.file_name().cmp(&a.file_name()));

    let mut runs = Vec::new();
    for path in paths.into_iter().take(limit) {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?;
        match serde_json::from_str::<RunResult>(&text) {
            Ok(run) => runs.push(run),
            Err(e) => debug!(path = %path.display(), error = %e, "skipping unreadable run"),
        }
    }
    Ok(runs)
}
