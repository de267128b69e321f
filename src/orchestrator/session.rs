//! Run lifecycle session.
//!
//! Translates UI commands into controller calls, serialises restarts behind a finished
//! worker and turns Ctrl-C into a stop.

use crate::model::{InfoEvent, Record, RunConfig, RunState, SortEvent};
use crate::orchestrator::controller::SortController;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::Duration;
use tracing::{debug, warn};

/// Commands emitted by UI layers to control the running sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Pause,
    Resume,
    /// Pause when running, resume when paused.
    TogglePause,
    Stop,
    Restart,
    Quit,
}

impl UiCommand {
    /// Parse one line typed on an interactive terminal.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" => Some(UiCommand::Pause),
            "r" | "resume" => Some(UiCommand::Resume),
            "" => Some(UiCommand::TogglePause),
            "s" | "stop" => Some(UiCommand::Stop),
            "n" | "restart" => Some(UiCommand::Restart),
            "q" | "quit" | "exit" => Some(UiCommand::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Keep the session alive after a run finishes, waiting for restart or quit.
    pub interactive: bool,
    /// Stop the run on Ctrl-C.
    pub handle_ctrl_c: bool,
}

/// Drive sort runs from UI commands until quit (or, non-interactively, until the first run
/// finishes). Events flow straight from the controller to `event_tx`.
pub async fn run_session(
    dataset: Arc<Vec<Record>>,
    cfg: RunConfig,
    opts: SessionOptions,
    event_tx: UnboundedSender<SortEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut controller = SortController::new(event_tx.clone());
    controller
        .start(&dataset, &cfg)
        .context("failed to start sort")?;

    let mut restart_pending = false;
    let mut quit_pending = false;
    let mut commands_open = true;
    let mut interactive = opts.interactive;
    // Cancel watchdog: if the worker takes long to unwind, keep the UI informed.
    let mut cancel_deadline: Option<tokio::time::Instant> = None;
    let mut watchdog = tokio::time::interval(Duration::from_millis(50));

    let ctrl_c = async {
        if opts.handle_ctrl_c {
            if tokio::signal::ctrl_c().await.is_ok() {
                return;
            }
        }
        futures::future::pending::<()>().await
    };
    tokio::pin!(ctrl_c);
    let mut ctrl_c_done = false;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv(), if commands_open => {
                match cmd {
                    Some(UiCommand::Pause) => controller.pause(),
                    Some(UiCommand::Resume) => controller.resume(),
                    Some(UiCommand::TogglePause) => {
                        if controller.state() == RunState::Paused {
                            controller.resume();
                        } else {
                            controller.pause();
                        }
                    }
                    Some(UiCommand::Stop) => {
                        if controller.state().is_active() {
                            controller.stop();
                            let _ = event_tx.send(SortEvent::Info(InfoEvent::Message(
                                "Stopping…".into(),
                            )));
                            cancel_deadline = Some(tokio::time::Instant::now() + Duration::from_secs(3));
                        }
                    }
                    Some(UiCommand::Restart) => {
                        // Restart is serialised: stop the active run, start again once its
                        // worker has exited.
                        restart_pending = true;
                        controller.stop();
                        let _ = event_tx.send(SortEvent::Info(InfoEvent::Message(
                            "Restarting…".into(),
                        )));
                    }
                    Some(UiCommand::Quit) => {
                        quit_pending = true;
                        controller.stop();
                    }
                    None => {
                        // Input closed: let the current run finish, then end the session.
                        commands_open = false;
                        interactive = false;
                    }
                }
            }
            _ = &mut ctrl_c, if !ctrl_c_done => {
                ctrl_c_done = true;
                warn!("interrupted, stopping sort");
                quit_pending = true;
                controller.stop();
            }
            _ = watchdog.tick() => {
                if let Some(deadline) = cancel_deadline {
                    if tokio::time::Instant::now() >= deadline && !controller.is_finished() {
                        let _ = event_tx.send(SortEvent::Info(InfoEvent::Message(
                            "Still stopping…".into(),
                        )));
                        cancel_deadline = None;
                    }
                }
                if !controller.is_finished() {
                    continue;
                }
                cancel_deadline = None;
                if quit_pending {
                    break;
                }
                if restart_pending {
                    restart_pending = false;
                    debug!("restarting sort");
                    controller
                        .start(&dataset, &cfg)
                        .context("failed to restart sort")?;
                    continue;
                }
                if !interactive && !controller.state().is_active() {
                    break;
                }
            }
        }
    }

    controller.join();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_terminal_commands() {
        assert_eq!(UiCommand::parse("p\n"), Some(UiCommand::Pause));
        assert_eq!(UiCommand::parse(" Resume "), Some(UiCommand::Resume));
        assert_eq!(UiCommand::parse(""), Some(UiCommand::TogglePause));
        assert_eq!(UiCommand::parse("s"), Some(UiCommand::Stop));
        assert_eq!(UiCommand::parse("n"), Some(UiCommand::Restart));
        assert_eq!(UiCommand::parse("QUIT"), Some(UiCommand::Quit));
        assert_eq!(UiCommand::parse("x"), None);
    }
}
