//! The event scheduler.
//!
//! # Responsibilities
//! - Wait on snapshots, watcher errors, internal errors and shutdown
//! - Run one reconciliation pass per snapshot, never two at once
//! - Route pass and watcher failures to the internal error queue
//!
//! # Design Decisions
//! - Errors are queued from a spawned task: the loop is the queue's only
//!   consumer, so sending inline could block it on itself
//! - Shutdown is observed only between events; an in-flight pass finishes
//! - Pending events are dropped on shutdown

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::error::Error;
use crate::observability::metrics;
use crate::reconcile::Reconciler;
use crate::storage::watcher::WatchHandle;

/// Where an event-loop error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    Update,
    Watcher,
}

impl ErrorOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorOrigin::Update => "update",
            ErrorOrigin::Watcher => "watcher",
        }
    }
}

/// An error queued for logging by the event loop.
#[derive(Debug, Clone)]
pub struct LoopError {
    pub origin: ErrorOrigin,
    pub error: Error,
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            ErrorOrigin::Update => write!(f, "update failed: {}", self.error),
            ErrorOrigin::Watcher => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for LoopError {}

/// Single-consumer dispatcher driving reconciliation.
pub struct EventLoop {
    reconciler: Arc<Reconciler>,
    watch: WatchHandle,
    error_capacity: usize,
    handled_errors: Arc<AtomicUsize>,
}

impl EventLoop {
    pub fn new(reconciler: Arc<Reconciler>, watch: WatchHandle, error_capacity: usize) -> Self {
        Self {
            reconciler,
            watch,
            error_capacity: error_capacity.max(1),
            handled_errors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter of errors the loop has consumed and logged.
    pub fn handled_errors(&self) -> Arc<AtomicUsize> {
        self.handled_errors.clone()
    }

    /// Dispatch events until `stop` fires (or its sender is dropped).
    pub async fn run(self, mut stop: broadcast::Receiver<()>) {
        let Self {
            reconciler,
            mut watch,
            error_capacity,
            handled_errors,
        } = self;
        let (errs_tx, mut errs_rx) = mpsc::channel::<LoopError>(error_capacity);

        tracing::info!("Event loop started");
        loop {
            tokio::select! {
                Some(snapshot) = watch.snapshots.recv() => {
                    if let Err(error) = reconciler.reconcile(&snapshot).await {
                        send_err(&errs_tx, LoopError { origin: ErrorOrigin::Update, error });
                    }
                }
                Some(err) = watch.errors.recv() => {
                    send_err(&errs_tx, LoopError { origin: ErrorOrigin::Watcher, error: err.into() });
                }
                Some(err) = errs_rx.recv() => {
                    metrics::record_loop_error(err.origin.as_str());
                    handled_errors.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(origin = err.origin.as_str(), error = %err, "Error in event loop");
                }
                _ = stop.recv() => {
                    tracing::info!("Event loop received shutdown signal, exiting");
                    return;
                }
            }
        }
    }
}

/// Queue an error without waiting on the loop that drains the queue.
fn send_err(errs: &mpsc::Sender<LoopError>, err: LoopError) {
    let errs = errs.clone();
    tokio::spawn(async move {
        let _ = errs.send(err).await;
    });
}
