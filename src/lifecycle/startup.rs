//! Startup orchestration.
//!
//! # Responsibilities
//! - Open storage and wire the reconciliation collaborators
//! - Start the directory watcher and the HTTP server
//! - Drive the event loop until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The watcher guard lives for the whole run; dropping it stops events

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ControlPlaneConfig;
use crate::graphql::{BuildError, ProxyResolverFactory};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::operator::RouteTableOperator;
use crate::reconcile::{EventLoop, Reconciler};
use crate::reporter::StorageReporter;
use crate::routing::EndpointRouter;
use crate::storage::{DirectoryWatcher, FileStore, StorageError, WatchError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open storage: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid proxy configuration: {0}")]
    Proxy(#[from] BuildError),

    #[error("failed to start configuration watcher: {0}")]
    Watch(#[from] WatchError),

    #[error("HTTP server failed: {0}")]
    Server(#[from] std::io::Error),

    #[error("HTTP server task failed: {0}")]
    Task(String),
}

/// A fully wired control plane, ready to run.
pub struct ControlPlane {
    config: ControlPlaneConfig,
    store: Arc<FileStore>,
    router: Arc<EndpointRouter>,
    reconciler: Arc<Reconciler>,
}

impl ControlPlane {
    pub fn setup(config: ControlPlaneConfig) -> Result<Self, StartupError> {
        let store = Arc::new(FileStore::open(&config.storage.root)?);
        let resolvers = Arc::new(ProxyResolverFactory::new(&config.proxy.address)?);
        let operator = Arc::new(RouteTableOperator::new(
            config.proxy.virtual_service.as_str(),
            config.proxy.role.as_str(),
            config.proxy.route_table_path.as_path(),
        ));
        let reporter = Arc::new(StorageReporter::new(store.clone()));
        let router = Arc::new(EndpointRouter::new());
        let reconciler = Arc::new(Reconciler::new(
            store.clone(),
            resolvers,
            operator,
            reporter,
            router.clone(),
        ));

        tracing::info!(
            storage_root = ?config.storage.root,
            proxy = %config.proxy.address,
            route_table = ?config.proxy.route_table_path,
            "Control plane initialized"
        );

        Ok(Self {
            config,
            store,
            router,
            reconciler,
        })
    }

    /// The endpoints currently served.
    pub fn router(&self) -> &Arc<EndpointRouter> {
        &self.router
    }

    /// Run until `shutdown` fires, then wait for the server to drain.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), StartupError> {
        let poll_interval = Duration::from_secs(self.config.storage.poll_interval_secs);
        let (_watcher, watch) = DirectoryWatcher::new(self.store.clone(), poll_interval).run()?;

        let server = HttpServer::new(self.router.clone(), &self.config.server);
        let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

        let event_loop = EventLoop::new(
            self.reconciler,
            watch,
            self.config.reconcile.error_queue_capacity,
        );
        event_loop.run(shutdown.subscribe()).await;

        match server_task.await {
            Ok(result) => result?,
            Err(e) => return Err(StartupError::Task(e.to_string())),
        }
        Ok(())
    }
}
