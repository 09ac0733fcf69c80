//! Watch transports producing configuration snapshots.
//!
//! Each transport yields a [`WatchHandle`]: a snapshot stream and a separate
//! failure stream. The snapshot channel holds a single pending snapshot, so a
//! producer waits until the event loop has taken the previous one.

use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::time;

use crate::model::Snapshot;
use crate::storage::{ConfigStore, FileStore, StorageError};

const ERROR_CAPACITY: usize = 16;

/// Failures of the watch transport itself.
#[derive(Debug, Clone, Error)]
pub enum WatchError {
    #[error("watch error: {0}")]
    Notify(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] StorageError),
}

impl From<notify::Error> for WatchError {
    fn from(err: notify::Error) -> Self {
        WatchError::Notify(err.to_string())
    }
}

/// Receiving side of a watch transport.
#[derive(Debug)]
pub struct WatchHandle {
    pub snapshots: mpsc::Receiver<Arc<Snapshot>>,
    pub errors: mpsc::Receiver<WatchError>,
}

/// Producing side of a watch transport.
#[derive(Debug, Clone)]
pub struct WatchSender {
    snapshots: mpsc::Sender<Arc<Snapshot>>,
    errors: mpsc::Sender<WatchError>,
}

impl WatchHandle {
    pub fn channel() -> (WatchSender, WatchHandle) {
        let (snapshot_tx, snapshot_rx) = mpsc::channel(1);
        let (error_tx, error_rx) = mpsc::channel(ERROR_CAPACITY);
        (
            WatchSender {
                snapshots: snapshot_tx,
                errors: error_tx,
            },
            WatchHandle {
                snapshots: snapshot_rx,
                errors: error_rx,
            },
        )
    }
}

impl WatchSender {
    /// Deliver a snapshot. Returns false once the receiver is gone.
    pub async fn send_snapshot(&self, snapshot: Snapshot) -> bool {
        self.snapshots.send(Arc::new(snapshot)).await.is_ok()
    }

    /// Deliver a failure. Returns false once the receiver is gone.
    pub async fn send_error(&self, err: WatchError) -> bool {
        self.errors.send(err).await.is_ok()
    }
}

/// Remembers the last delivered snapshot so unchanged observations are dropped.
#[derive(Default)]
struct LastDelivered(Option<Snapshot>);

impl LastDelivered {
    fn is_new(&mut self, snapshot: &Snapshot) -> bool {
        if self.0.as_ref() == Some(snapshot) {
            return false;
        }
        self.0 = Some(snapshot.clone());
        true
    }
}

/// Watches a [`FileStore`] directory for changes.
pub struct DirectoryWatcher {
    store: Arc<FileStore>,
    poll_interval: Duration,
}

impl DirectoryWatcher {
    pub fn new(store: Arc<FileStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    /// Start watching on notify's background thread.
    ///
    /// The initial state is queued immediately. The returned watcher must be
    /// kept alive for as long as events are wanted.
    pub fn run(self) -> Result<(RecommendedWatcher, WatchHandle), WatchError> {
        let (tx, handle) = WatchHandle::channel();
        let mut last = LastDelivered::default();

        match self.store.load_snapshot() {
            Ok(snapshot) => {
                last.is_new(&snapshot);
                let _ = tx.snapshots.try_send(Arc::new(snapshot));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load initial configuration");
                if let Err(err) = tx.errors.try_send(e.into()) {
                    tracing::warn!(error = %err, "Dropped watcher error");
                }
            }
        }

        let store = self.store.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
                        return;
                    }
                    match store.load_snapshot() {
                        Ok(snapshot) => {
                            if last.is_new(&snapshot) {
                                tracing::info!(
                                    schemas = snapshot.schemas.len(),
                                    resolver_maps = snapshot.resolver_maps.len(),
                                    "Configuration change detected"
                                );
                                let _ = tx.snapshots.blocking_send(Arc::new(snapshot));
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to load configuration. Keeping current configuration.");
                            if tx.errors.blocking_send(e.into()).is_err() {
                                tracing::debug!("Watcher error receiver closed");
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Filesystem watch error");
                    if tx.errors.blocking_send(e.into()).is_err() {
                        tracing::debug!("Watcher error receiver closed");
                    }
                }
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(self.store.root(), RecursiveMode::Recursive)?;

        tracing::info!(root = ?self.store.root(), "Configuration watcher started");
        Ok((watcher, handle))
    }
}

/// Poll any [`ConfigStore`] on an interval until `stop` fires.
pub fn poll_store(
    store: Arc<dyn ConfigStore>,
    interval: Duration,
    mut stop: broadcast::Receiver<()>,
) -> WatchHandle {
    let (tx, handle) = WatchHandle::channel();

    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        let mut last = LastDelivered::default();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let delivered = match store.snapshot().await {
                        Ok(snapshot) if last.is_new(&snapshot) => tx.send_snapshot(snapshot).await,
                        Ok(_) => true,
                        Err(e) => tx.send_error(e.into()).await,
                    };
                    if !delivered {
                        break;
                    }
                }
                _ = stop.recv() => break,
            }
        }
        tracing::debug!("Store poller stopped");
    });

    handle
}
