//! Execution controller.
//!
//! Owns the single run slot. Each `start()` copies the dataset into a dedicated worker thread,
//! which drives one algorithm call and reports progress, pause and completion over the event
//! channel. Pause and stop are cooperative: the caller only flips flags, the worker observes
//! them at its next checkpoint. Once a new run starts, events of the run it replaced are no
//! longer delivered.

use crate::engine::{self, Cancelled, SortControl};
use crate::error::{Result, SortError};
use crate::model::{InfoEvent, Record, RunConfig, RunResult, RunState, SortEvent};
use crate::orchestrator::stopwatch::Stopwatch;
use rand::RngCore;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// Upper bound on how long a parked worker sleeps between flag checks.
const PAUSE_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Default)]
struct Signals {
    paused: AtomicBool,
    cancel: AtomicBool,
}

impl Signals {
    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

/// State shared between the controller and one worker. Fresh per run, so a cancelled worker
/// that is still unwinding never sees the next run's cleared flags.
#[derive(Debug)]
struct RunShared {
    signals: Signals,
    state: Mutex<RunState>,
}

impl RunShared {
    fn new() -> Self {
        Self {
            signals: Signals::default(),
            state: Mutex::new(RunState::Running),
        }
    }

    fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to `to` if the current state is one of `from`.
    fn transition(&self, from: &[RunState], to: RunState) -> bool {
        self.transition_with(from, to, |_| {})
    }

    /// Like [`transition`](Self::transition), updating the signals under the same lock so
    /// the flags always agree with the state.
    fn transition_with(
        &self,
        from: &[RunState],
        to: RunState,
        update: impl FnOnce(&Signals),
    ) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if from.contains(&state) {
            *state = to;
            update(&self.signals);
            true
        } else {
            false
        }
    }
}

/// Event sink shared by every worker of one controller. Only the newest run may publish, so a
/// superseded worker that is still unwinding can never interleave with its successor.
#[derive(Debug)]
struct EventGate {
    generation: Mutex<u64>,
    tx: UnboundedSender<SortEvent>,
}

impl EventGate {
    /// Supersede every earlier run and return the new run's generation.
    fn open(&self) -> u64 {
        let mut current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        *current
    }

    /// Deliver `ev` if `generation` is still the newest run.
    fn send(&self, generation: u64, ev: SortEvent) {
        let current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == generation {
            let _ = self.tx.send(ev);
        }
    }
}

struct RunHandle {
    shared: Arc<RunShared>,
    worker: Option<JoinHandle<()>>,
}

impl RunHandle {
    fn wake(&self) {
        if let Some(worker) = &self.worker {
            worker.thread().unpark();
        }
    }
}

/// Drives at most one sort at a time and relays its events to the caller.
pub struct SortController {
    events: Arc<EventGate>,
    current: Option<RunHandle>,
}

impl SortController {
    pub fn new(event_tx: UnboundedSender<SortEvent>) -> Self {
        Self {
            events: Arc::new(EventGate {
                generation: Mutex::new(0),
                tx: event_tx,
            }),
            current: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.current
            .as_ref()
            .map(|run| run.shared.state())
            .unwrap_or_default()
    }

    /// Whether the worker thread of the last run has exited (trivially true when idle).
    pub fn is_finished(&self) -> bool {
        self.current
            .as_ref()
            .and_then(|run| run.worker.as_ref())
            .map_or(true, JoinHandle::is_finished)
    }

    /// Start sorting the first `cfg.row_limit` records of `dataset` on a worker thread.
    ///
    /// Returns as soon as the worker is spawned. Rejects an empty dataset, a zero row limit and
    /// a start while another sort is in flight.
    pub fn start(&mut self, dataset: &[Record], cfg: &RunConfig) -> Result<()> {
        if self.state().is_active() {
            return Err(SortError::invalid("a sort is already running"));
        }
        if dataset.is_empty() {
            return Err(SortError::invalid("dataset is empty"));
        }
        if cfg.row_limit == 0 {
            return Err(SortError::invalid("row limit must be a positive integer"));
        }

        // From here on a previous worker's events are dropped.
        let generation = self.events.open();
        if cfg.row_limit > dataset.len() {
            self.events.send(
                generation,
                SortEvent::Info(InfoEvent::RowLimitClamped {
                    requested: cfg.row_limit,
                    available: dataset.len(),
                }),
            );
        }
        let records = dataset[..cfg.row_limit.min(dataset.len())].to_vec();

        info!(
            algorithm = %cfg.algorithm,
            column = %cfg.column,
            order = cfg.order.label(),
            records = records.len(),
            "starting sort"
        );

        let shared = Arc::new(RunShared::new());
        let stopwatch = Stopwatch::start();
        let worker_shared = shared.clone();
        let worker_cfg = cfg.clone();
        let events = self.events.clone();
        let worker = std::thread::Builder::new()
            .name("sort-worker".into())
            .spawn(move || {
                run_worker(
                    worker_shared,
                    records,
                    worker_cfg,
                    stopwatch,
                    Publisher { events, generation },
                )
            })
            .map_err(SortError::Spawn)?;

        // A previous worker that is still unwinding is detached; it only touches its own state.
        self.current = Some(RunHandle {
            shared,
            worker: Some(worker),
        });
        Ok(())
    }

    /// Ask the worker to park. No-op unless running.
    pub fn pause(&self) {
        if let Some(run) = &self.current {
            if run
                .shared
                .transition_with(&[RunState::Running], RunState::Paused, |signals| {
                    signals.paused.store(true, Ordering::Relaxed)
                })
            {
                debug!("pause requested");
            }
        }
    }

    /// Let a parked worker continue. No-op unless paused.
    pub fn resume(&self) {
        if let Some(run) = &self.current {
            if run
                .shared
                .transition_with(&[RunState::Paused], RunState::Running, |signals| {
                    signals.paused.store(false, Ordering::Relaxed)
                })
            {
                run.wake();
                debug!("resume requested");
            }
        }
    }

    /// Cancel the in-flight sort. A paused worker is released so it can observe the stop.
    pub fn stop(&self) {
        if let Some(run) = &self.current {
            if run.shared.transition_with(
                &[RunState::Running, RunState::Paused],
                RunState::Cancelled,
                |signals| {
                    signals.cancel.store(true, Ordering::Relaxed);
                    signals.paused.store(false, Ordering::Relaxed);
                },
            ) {
                run.wake();
                info!("stop requested");
            }
        }
    }

    /// Block until the current worker exits. A panic on the worker is resumed here.
    pub fn join(&mut self) {
        let Some(worker) = self.current.as_mut().and_then(|run| run.worker.take()) else {
            return;
        };
        if let Err(panic) = worker.join() {
            std::panic::resume_unwind(panic);
        }
    }
}

impl Drop for SortController {
    fn drop(&mut self) {
        // Never leave a detached worker sorting for nobody.
        self.stop();
    }
}

/// A worker's handle on the event gate.
struct Publisher {
    events: Arc<EventGate>,
    generation: u64,
}

impl Publisher {
    fn send(&self, ev: SortEvent) {
        self.events.send(self.generation, ev);
    }
}

/// Worker side of the hooks: relays progress with pause-aware elapsed time.
struct WorkerControl<'a> {
    shared: &'a RunShared,
    stopwatch: Stopwatch,
    events: &'a Publisher,
}

impl SortControl for WorkerControl<'_> {
    fn progress(&mut self, processed: usize, total: usize) {
        self.events.send(SortEvent::Progress {
            processed,
            total,
            elapsed: self.stopwatch.elapsed(),
        });
    }

    fn checkpoint(&mut self) -> std::result::Result<(), Cancelled> {
        let signals = &self.shared.signals;
        if signals.is_paused() && !signals.is_cancelled() {
            self.stopwatch.pause();
            self.events.send(SortEvent::Paused {
                elapsed: self.stopwatch.elapsed(),
            });
            while signals.is_paused() && !signals.is_cancelled() {
                std::thread::park_timeout(PAUSE_POLL);
            }
            self.stopwatch.resume();
            if !signals.is_cancelled() {
                self.events.send(SortEvent::Resumed {
                    elapsed: self.stopwatch.elapsed(),
                });
            }
        }
        if signals.is_cancelled() {
            return Err(Cancelled);
        }
        Ok(())
    }
}

fn run_worker(
    shared: Arc<RunShared>,
    records: Vec<Record>,
    cfg: RunConfig,
    stopwatch: Stopwatch,
    events: Publisher,
) {
    let total = records.len();
    events.send(SortEvent::RunStarted {
        algorithm: cfg.algorithm,
        column: cfg.column,
        order: cfg.order,
        total,
    });

    let mut ctl = WorkerControl {
        shared: &shared,
        stopwatch,
        events: &events,
    };
    // The trailing checkpoint keeps a pause in force and lets a late stop win.
    let outcome =
        engine::sort_records(&records, cfg.algorithm, cfg.column, cfg.order, &mut ctl)
            .and_then(|sorted| ctl.checkpoint().map(|()| sorted));
    let elapsed = ctl.stopwatch.elapsed();
    drop(records);

    match outcome {
        // A completion that lost the race against stop() is discarded.
        Ok(sorted)
            if shared.transition(&[RunState::Running, RunState::Paused], RunState::Completed) =>
        {
            info!(algorithm = %cfg.algorithm, records = total, elapsed = ?elapsed, "sort completed");
            let result = RunResult {
                timestamp_utc: time::OffsetDateTime::now_utc()
                    .format(&time::format_description::well_known::Rfc3339)
                    .unwrap_or_else(|_| "now".into()),
                run_id: gen_run_id(),
                algorithm: cfg.algorithm,
                column: cfg.column,
                order: cfg.order,
                record_count: total,
                elapsed,
                source: cfg.source,
                records: sorted,
            };
            events.send(SortEvent::RunCompleted {
                result: Box::new(result),
            });
        }
        _ => {
            shared.transition(&[RunState::Running, RunState::Paused], RunState::Cancelled);
            info!(algorithm = %cfg.algorithm, elapsed = ?elapsed, "sort cancelled");
            events.send(SortEvent::RunCancelled { elapsed });
        }
    }
}

/// Generate a random identifier for a run.
fn gen_run_id() -> String {
    let mut b = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut b);
    format!("{:016x}", u64::from_le_bytes(b))
}
