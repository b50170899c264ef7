// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background execution of one action at a time.
//
// The action runs on tokio's blocking pool; it talks back through a
// `Reporter` whose events are applied to the activity log on the calling
// task. A "working" line appears only if the action outlives
// `WORKING_DELAY`.

use std::time::Duration;

use pdfpress_core::error::{PdfpressError, Result};
use tokio::sync::mpsc;
use tracing::debug;

use crate::state::ActivityLog;

pub const WORKING_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Log(String),
    Progress { done: usize, total: usize },
}

/// Handle given to a running action for reporting back.
#[derive(Debug, Clone)]
pub struct Reporter {
    tx: mpsc::UnboundedSender<WorkerEvent>,
}

impl Reporter {
    pub fn log(&self, message: impl Into<String>) {
        // The receiver only goes away once the action has been abandoned.
        let _ = self.tx.send(WorkerEvent::Log(message.into()));
    }

    pub fn progress(&self, done: usize, total: usize) {
        let _ = self.tx.send(WorkerEvent::Progress { done, total });
    }
}

fn apply(log: &mut ActivityLog, event: WorkerEvent) {
    match event {
        WorkerEvent::Log(message) => log.push(message),
        WorkerEvent::Progress { done, total } => log.progress(done, total),
    }
}

/// Run `action` on the blocking pool and wait for it, forwarding its
/// events into `log`.
pub async fn run_action<T, F>(label: &str, log: &mut ActivityLog, action: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(Reporter) -> Result<T> + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let reporter = Reporter { tx };
    let mut handle = tokio::task::spawn_blocking(move || action(reporter));

    let indicator = tokio::time::sleep(WORKING_DELAY);
    tokio::pin!(indicator);
    let mut indicator_shown = false;

    let joined = loop {
        tokio::select! {
            Some(event) = rx.recv() => apply(log, event),
            () = &mut indicator, if !indicator_shown => {
                indicator_shown = true;
                log.push(format!("{label}: working..."));
            }
            joined = &mut handle => break joined,
        }
    };

    // Events sent just before the action returned.
    while let Ok(event) = rx.try_recv() {
        apply(log, event);
    }

    debug!(label, indicator_shown, "action finished");
    joined.map_err(|err| PdfpressError::Worker(err.to_string()))?
}
