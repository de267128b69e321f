//! Run every algorithm over the same dataset and compare elapsed times.

use crate::metrics::{compute_timing_metrics, TimingSummary};
use crate::model::{Algorithm, Record, RunConfig, SortColumn, SortEvent, SortOrder};
use crate::orchestrator::controller::SortController;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub algorithm: Algorithm,
    pub timing: TimingSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub column: SortColumn,
    pub order: SortOrder,
    pub record_count: usize,
    pub repeat: usize,
    pub rows: Vec<ComparisonRow>,
}

impl Comparison {
    /// Row with the lowest mean elapsed time.
    pub fn fastest(&self) -> Option<&ComparisonRow> {
        self.rows.iter().min_by_key(|row| row.timing.mean)
    }
}

/// Sort `dataset` with each algorithm `repeat` times, sequentially, through the controller.
///
/// Events of every run are forwarded to `event_tx` when given. Returns `None` if a run was
/// stopped (Ctrl-C when `handle_ctrl_c`), in which case the remaining runs are skipped.
pub async fn run_comparison(
    dataset: &[Record],
    base: &RunConfig,
    repeat: usize,
    event_tx: Option<UnboundedSender<SortEvent>>,
    handle_ctrl_c: bool,
) -> Result<Option<Comparison>> {
    let repeat = repeat.max(1);
    let ctrl_c = async {
        if handle_ctrl_c && tokio::signal::ctrl_c().await.is_ok() {
            return;
        }
        futures::future::pending::<()>().await
    };
    tokio::pin!(ctrl_c);

    let mut rows = Vec::with_capacity(Algorithm::ALL.len());
    for algorithm in Algorithm::ALL {
        let cfg = RunConfig {
            algorithm,
            ..base.clone()
        };
        let mut samples: Vec<Duration> = Vec::with_capacity(repeat);

        for round in 0..repeat {
            debug!(%algorithm, round, "comparison run");
            let (tx, mut rx) = mpsc::unbounded_channel::<SortEvent>();
            let mut controller = SortController::new(tx);
            controller
                .start(dataset, &cfg)
                .with_context(|| format!("failed to start {algorithm}"))?;

            let mut stopped = false;
            loop {
                tokio::select! {
                    ev = rx.recv() => {
                        let Some(ev) = ev else { break };
                        let terminal = ev.is_terminal();
                        match &ev {
                            SortEvent::RunCompleted { result } => samples.push(result.elapsed),
                            SortEvent::RunCancelled { .. } => stopped = true,
                            _ => {}
                        }
                        if let Some(out) = &event_tx {
                            let _ = out.send(ev);
                        }
                        if terminal {
                            break;
                        }
                    }
                    _ = &mut ctrl_c, if !stopped => {
                        warn!("interrupted, stopping comparison");
                        stopped = true;
                        controller.stop();
                    }
                }
            }
            controller.join();
            if stopped {
                return Ok(None);
            }
        }

        let timing = compute_timing_metrics(&samples)
            .with_context(|| format!("no completed runs for {algorithm}"))?;
        rows.push(ComparisonRow { algorithm, timing });
    }

    Ok(Some(Comparison {
        column: base.column,
        order: base.order,
        record_count: base.row_limit.min(dataset.len()),
        repeat,
        rows,
    }))
}
