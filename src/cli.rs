use crate::engine::Cancelled;
use crate::error::SortError;
use crate::model::{
    Algorithm, Record, RunConfig, RunResult, SortColumn, SortEvent, SortOrder,
};
use crate::orchestrator::{self, SessionOptions, UiCommand};
use crate::text_summary::{self, format_progress, percent};
use crate::{dataset, storage};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

/// Read interactive commands from stdin on a detached thread.
///
/// Not a blocking task: a pending stdin read must not hold up runtime shutdown.
fn spawn_command_reader(cmd_tx: mpsc::UnboundedSender<UiCommand>) {
    let _ = std::thread::Builder::new()
        .name("stdin-commands".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if let Some(cmd) = UiCommand::parse(&line) {
                    if cmd_tx.send(cmd).is_err() {
                        break;
                    }
                }
            }
        });
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "sortbench",
    version,
    about = "Sorting algorithm stress test with live progress, pause/resume and stop",
    group(clap::ArgGroup::new("generated").args(["random", "random_values"])),
    group(
        clap::ArgGroup::new("numeric")
            .args(["numbers", "values", "random_values"])
            .conflicts_with_all(["input", "random", "export_json", "export_csv"])
    )
)]
pub struct Cli {
    /// CSV file with ID, FirstName and LastName columns
    #[arg(long, conflicts_with = "random")]
    pub input: Option<PathBuf>,

    /// Sort a generated dataset with this many records instead of a file
    #[arg(long)]
    pub random: Option<usize>,

    /// Seed for the generated dataset
    #[arg(long, requires = "generated")]
    pub seed: Option<u64>,

    /// Also write the generated dataset to this CSV file
    #[arg(long, requires = "random")]
    pub write_dataset: Option<PathBuf>,

    /// Sort plain integers read from this file (comma or whitespace separated)
    #[arg(long, value_name = "FILE")]
    pub numbers: Option<PathBuf>,

    /// Sort plain integers given inline, e.g. --values 64,34,25,12
    #[arg(long, value_name = "LIST", allow_hyphen_values = true)]
    pub values: Option<String>,

    /// Sort this many random integers between --min and --max
    #[arg(long, value_name = "N")]
    pub random_values: Option<usize>,

    /// Smallest random integer (default 1)
    #[arg(long, requires = "random_values", allow_hyphen_values = true)]
    pub min: Option<i64>,

    /// Largest random integer (default 1000)
    #[arg(long, requires = "random_values", allow_hyphen_values = true)]
    pub max: Option<i64>,

    /// Number of leading records to sort
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub rows: u64,

    /// Column to sort by
    #[arg(long, value_enum, default_value = "id")]
    pub column: SortColumn,

    /// Algorithm to run
    #[arg(long, value_enum, default_value = "merge")]
    pub algorithm: Algorithm,

    /// Sort in descending order
    #[arg(long)]
    pub descending: bool,

    /// Run every algorithm over the same records and compare their times
    #[arg(long)]
    pub compare: bool,

    /// Runs per algorithm in --compare mode
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub repeat: u64,

    /// Number of sorted records to show after a run
    #[arg(long, default_value_t = 10)]
    pub preview: usize,

    /// Print JSON result and exit (no interactive controls)
    #[arg(long)]
    pub json: bool,

    /// Print text summary and exit (no interactive controls)
    #[arg(long)]
    pub text: bool,

    /// Run silently: suppress all output except errors (for scripted use)
    #[arg(long)]
    pub silent: bool,

    /// Export results as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Export sorted records as CSV
    #[arg(long)]
    pub export_csv: Option<PathBuf>,

    /// Use --auto-save true or --auto-save false to override
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_save: bool,

    /// List the N most recent saved runs and exit
    #[arg(long, value_name = "N")]
    pub history: Option<usize>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Interactive,
    Text,
    Json,
    Silent,
}

impl OutputMode {
    fn from_args(args: &Cli) -> Self {
        if args.silent {
            OutputMode::Silent
        } else if args.json {
            OutputMode::Json
        } else if args.text {
            OutputMode::Text
        } else {
            OutputMode::Interactive
        }
    }

    fn shows_progress(self) -> bool {
        matches!(self, OutputMode::Interactive | OutputMode::Text)
    }
}

pub async fn run(args: Cli) -> Result<()> {
    // Validate that --silent can only be used with --json
    if args.silent && !args.json {
        return Err(anyhow::anyhow!(
            "--silent can only be used with --json. Use --silent --json together."
        ));
    }

    if let Some(limit) = args.history {
        return show_history(&args, limit);
    }

    if let Some(values) = load_values(&args)? {
        return run_values(args, values).await;
    }

    let (records, source) = load_dataset(&args)?;
    if args.compare {
        return run_compare(args, records, source).await;
    }
    run_sort(args, records, source).await
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli, source: Option<String>) -> RunConfig {
    RunConfig {
        algorithm: args.algorithm,
        column: args.column,
        order: if args.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        },
        row_limit: usize::try_from(args.rows).unwrap_or(usize::MAX),
        source,
    }
}

/// Load the dataset named by the arguments, or generate one.
fn load_dataset(args: &Cli) -> Result<(Vec<Record>, Option<String>)> {
    if let Some(count) = args.random {
        let records = dataset::generate_records(count, args.seed);
        if let Some(path) = args.write_dataset.as_deref() {
            storage::write_records(path, &records)
                .with_context(|| format!("failed to write dataset to {}", path.display()))?;
        }
        let source = match args.seed {
            Some(seed) => format!("random ({count} records, seed {seed})"),
            None => format!("random ({count} records)"),
        };
        return Ok((records, Some(source)));
    }

    let path = args
        .input
        .as_deref()
        .context("no dataset: pass --input <FILE> or --random <N>")?;
    let records = storage::load_records(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((records, Some(source)))
}

/// Load the integer dataset named by the arguments, if any.
fn load_values(args: &Cli) -> Result<Option<Vec<i64>>> {
    let values = if let Some(path) = args.numbers.as_deref() {
        storage::load_values(path).with_context(|| format!("failed to load {}", path.display()))?
    } else if let Some(list) = args.values.as_deref() {
        storage::parse_values(list).context("invalid --values")?
    } else if let Some(count) = args.random_values {
        dataset::generate_values(
            count,
            args.min.unwrap_or(1),
            args.max.unwrap_or(1000),
            args.seed,
        )?
    } else {
        return Ok(None);
    };
    if values.is_empty() {
        return Err(SortError::invalid("no values to sort").into());
    }
    Ok(Some(values))
}

/// Renders progress-type events; throttled to whole-percent steps.
struct ProgressPrinter {
    out_tx: mpsc::UnboundedSender<OutputLine>,
    last_percent: Option<u64>,
}

impl ProgressPrinter {
    fn new(out_tx: mpsc::UnboundedSender<OutputLine>) -> Self {
        Self {
            out_tx,
            last_percent: None,
        }
    }

    fn err(&self, msg: String) {
        let _ = self.out_tx.send(OutputLine::Stderr(msg));
    }

    fn handle(&mut self, ev: &SortEvent) {
        match ev {
            SortEvent::RunStarted {
                algorithm,
                column,
                order,
                total,
            } => {
                self.last_percent = None;
                self.err(format!(
                    "== {algorithm}: {total} records by {column} ({}) ==",
                    order.label()
                ));
            }
            SortEvent::Progress {
                processed,
                total,
                elapsed,
            } => {
                let pct = percent(*processed, *total).floor() as u64;
                if self.last_percent != Some(pct) {
                    self.last_percent = Some(pct);
                    self.err(format_progress(*processed, *total, *elapsed));
                }
            }
            SortEvent::Paused { elapsed } => self.err(format!(
                "Paused (time preserved at {:.2}s)",
                elapsed.as_secs_f64()
            )),
            SortEvent::Resumed { elapsed } => {
                self.err(format!("Resumed at {:.2}s", elapsed.as_secs_f64()))
            }
            SortEvent::Info(info) => self.err(info.to_message()),
            SortEvent::RunCompleted { result } => self.err(format!(
                "Completed | Total Time: {:.4}s",
                result.elapsed.as_secs_f64()
            )),
            SortEvent::RunCancelled { elapsed } => {
                self.err(format!("Stopped after {:.2}s", elapsed.as_secs_f64()))
            }
        }
    }
}

async fn run_sort(args: Cli, records: Vec<Record>, source: Option<String>) -> Result<()> {
    let mode = OutputMode::from_args(&args);
    let cfg = build_config(&args, source);
    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<SortEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let interactive = mode == OutputMode::Interactive;
    if interactive {
        let _ = out_tx.send(OutputLine::Stderr(
            "Commands: p pause, r resume, Enter toggle, s stop, n restart, q quit".into(),
        ));
        spawn_command_reader(cmd_tx);
    } else {
        drop(cmd_tx);
    }

    let opts = SessionOptions {
        interactive,
        handle_ctrl_c: true,
    };
    let session = tokio::spawn(orchestrator::run_session(
        Arc::new(records),
        cfg,
        opts,
        evt_tx,
        cmd_rx,
    ));

    let mut printer = ProgressPrinter::new(out_tx.clone());
    let mut last_result: Option<RunResult> = None;
    while let Some(ev) = evt_rx.recv().await {
        if mode.shows_progress() {
            printer.handle(&ev);
        }
        if let SortEvent::RunCompleted { result } = ev {
            if interactive {
                let summary = text_summary::build_text_summary(&result, args.preview);
                for line in summary.lines {
                    let _ = out_tx.send(OutputLine::Stdout(line));
                }
                let processed = orchestrator::process_run_completion(&args, &result);
                for msg in processed.export_messages {
                    let _ = out_tx.send(OutputLine::Stderr(msg));
                }
                if let Some(p) = processed.auto_saved_path {
                    let _ = out_tx.send(OutputLine::Stderr(format!("Saved: {}", p.display())));
                }
                let _ = out_tx.send(OutputLine::Stderr("n restart, q quit".into()));
            }
            last_result = Some(*result);
        }
    }

    session.await.context("sort session task failed")??;

    if !interactive {
        match last_result.as_ref() {
            Some(result) => finish_run(&args, mode, result, &out_tx)?,
            None if mode != OutputMode::Silent => {
                let _ = out_tx.send(OutputLine::Stderr("Sort stopped; no result".into()));
            }
            None => {}
        }
    }

    drop(printer);
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Exports, output and auto-save for the non-interactive modes. Errors propagate.
fn finish_run(
    args: &Cli,
    mode: OutputMode,
    result: &RunResult,
    out_tx: &mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    handle_exports(args, result)?;

    match mode {
        OutputMode::Json => {
            let out = serde_json::to_string_pretty(result)?;
            let _ = out_tx.send(OutputLine::Stdout(out));
        }
        OutputMode::Text => {
            let summary = text_summary::build_text_summary(result, args.preview);
            for line in summary.lines {
                let _ = out_tx.send(OutputLine::Stdout(line));
            }
        }
        OutputMode::Silent | OutputMode::Interactive => {}
    }

    if args.auto_save {
        if mode == OutputMode::Silent {
            storage::save_run(result).context("failed to save run results")?;
        } else if let Ok(p) = storage::save_run(result) {
            let _ = out_tx.send(OutputLine::Stderr(format!("Saved: {}", p.display())));
        }
    }
    Ok(())
}

async fn run_compare(args: Cli, records: Vec<Record>, source: Option<String>) -> Result<()> {
    let mode = OutputMode::from_args(&args);
    let cfg = build_config(&args, source);
    let (out_tx, out_handle) = spawn_output_writer();

    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<SortEvent>();
    let mut printer = ProgressPrinter::new(out_tx.clone());
    let show = mode.shows_progress();
    let printer_handle = tokio::spawn(async move {
        while let Some(ev) = evt_rx.recv().await {
            if show {
                printer.handle(&ev);
            }
        }
    });

    let repeat = usize::try_from(args.repeat).unwrap_or(usize::MAX);
    let comparison =
        orchestrator::run_comparison(&records, &cfg, repeat, Some(evt_tx), true).await?;
    let _ = printer_handle.await;

    match comparison {
        Some(cmp) => match mode {
            OutputMode::Json => {
                let out = serde_json::to_string_pretty(&cmp)?;
                let _ = out_tx.send(OutputLine::Stdout(out));
            }
            OutputMode::Silent => {}
            OutputMode::Text | OutputMode::Interactive => {
                for line in text_summary::build_comparison_summary(&cmp).lines {
                    let _ = out_tx.send(OutputLine::Stdout(line));
                }
            }
        },
        None if mode != OutputMode::Silent => {
            let _ = out_tx.send(OutputLine::Stderr("Comparison stopped".into()));
        }
        None => {}
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Sort plain integers with the chosen algorithm, or all of them with --compare.
async fn run_values(args: Cli, values: Vec<i64>) -> Result<()> {
    let mode = OutputMode::from_args(&args);
    let order = build_config(&args, None).order;
    let algorithms = if args.compare {
        Algorithm::ALL.to_vec()
    } else {
        vec![args.algorithm]
    };
    let (out_tx, out_handle) = spawn_output_writer();

    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<SortEvent>();
    let mut printer = ProgressPrinter::new(out_tx.clone());
    let show = mode.shows_progress();
    let printer_handle = tokio::spawn(async move {
        while let Some(ev) = evt_rx.recv().await {
            if show {
                printer.handle(&ev);
            }
        }
    });

    let cancel = Arc::new(AtomicBool::new(false));
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, stopping sort");
                cancel.store(true, Ordering::Relaxed);
            }
        })
    };

    if show {
        let _ = out_tx.send(OutputLine::Stderr(format!(
            "Sorting {} values with {}",
            values.len(),
            algorithms
                .iter()
                .map(|a| a.label())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    let runs = tokio::task::spawn_blocking(move || {
        orchestrator::compare_values(&values, &algorithms, order, &cancel, Some(&evt_tx))
    })
    .await
    .context("value sort task failed")?;
    ctrl_c.abort();
    let _ = printer_handle.await;

    match runs {
        Ok(runs) => match mode {
            OutputMode::Json => {
                let out = match runs.as_slice() {
                    [run] => serde_json::to_string_pretty(run)?,
                    runs => serde_json::to_string_pretty(runs)?,
                };
                let _ = out_tx.send(OutputLine::Stdout(out));
            }
            OutputMode::Silent => {}
            OutputMode::Text | OutputMode::Interactive => {
                for line in text_summary::build_values_summary(&runs, args.preview).lines {
                    let _ = out_tx.send(OutputLine::Stdout(line));
                }
            }
        },
        Err(Cancelled) if mode != OutputMode::Silent => {
            let _ = out_tx.send(OutputLine::Stderr("Sort stopped; no result".into()));
        }
        Err(Cancelled) => {}
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

fn show_history(args: &Cli, limit: usize) -> Result<()> {
    let runs = storage::load_recent(limit).context("failed to load run history")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
    } else {
        for line in text_summary::build_history_summary(&runs).lines {
            println!("{line}");
        }
    }
    Ok(())
}

/// Handle export operations (JSON and CSV) for the non-interactive modes.
fn handle_exports(args: &Cli, result: &RunResult) -> Result<()> {
    if let Some(p) = args.export_json.as_deref() {
        storage::export_json(p, result)?;
    }
    if let Some(p) = args.export_csv.as_deref() {
        storage::export_csv(p, result)?;
    }
    Ok(())
}
