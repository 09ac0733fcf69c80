//! Route table output for the proxy.
//!
//! Each upstream function referenced by a registered resolver map gets one
//! route `/<upstream>/<function>`, matching the URLs resolvers are built with.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{validate_name, ResolverMap};
use crate::operator::{OperatorError, ProxyOperator};

/// One proxy route.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub struct RouteEntry {
    pub path_prefix: String,
    pub upstream: String,
    pub function: String,
}

/// The full set of routes owned by this control plane.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteTable {
    pub virtual_service: String,
    pub role: String,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn load(path: &Path) -> Result<Self, OperatorError> {
        let content = std::fs::read_to_string(path).map_err(|e| OperatorError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| OperatorError::Serialize(e.to_string()))
    }
}

/// Operator that writes a TOML route table consumed by the proxy.
pub struct RouteTableOperator {
    virtual_service: String,
    role: String,
    path: PathBuf,
    pending: Mutex<BTreeSet<RouteEntry>>,
    last_written: tokio::sync::Mutex<Option<RouteTable>>,
}

impl RouteTableOperator {
    pub fn new(
        virtual_service: impl Into<String>,
        role: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            virtual_service: virtual_service.into(),
            role: role.into(),
            path: path.into(),
            pending: Mutex::new(BTreeSet::new()),
            last_written: tokio::sync::Mutex::new(None),
        }
    }

    /// The table most recently written to disk.
    pub async fn current_table(&self) -> Option<RouteTable> {
        self.last_written.lock().await.clone()
    }

    async fn write(&self, table: &RouteTable) -> Result<(), OperatorError> {
        let write_err = |e: std::io::Error| OperatorError::Write {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        };
        let content =
            toml::to_string_pretty(table).map_err(|e| OperatorError::Serialize(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(write_err)?;
        Ok(())
    }
}

#[async_trait]
impl ProxyOperator for RouteTableOperator {
    fn register(&self, resolver_map: &ResolverMap) -> Result<(), OperatorError> {
        let routes = resolver_map
            .upstream_bindings()
            .map(|binding| {
                validate_name(&binding.upstream)
                    .and_then(|_| validate_name(&binding.function))
                    .map_err(|reason| OperatorError::InvalidRoute {
                        resolver_map: resolver_map.name.clone(),
                        reason,
                    })?;
                Ok(RouteEntry {
                    path_prefix: format!("/{}/{}", binding.upstream, binding.function),
                    upstream: binding.upstream.clone(),
                    function: binding.function.clone(),
                })
            })
            .collect::<Result<Vec<_>, OperatorError>>()?;

        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(routes);
        Ok(())
    }

    async fn reconfigure(&self) -> Result<(), OperatorError> {
        let routes = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        let table = RouteTable {
            virtual_service: self.virtual_service.clone(),
            role: self.role.clone(),
            routes: routes.into_iter().collect(),
        };

        let mut last = self.last_written.lock().await;
        if last.as_ref() == Some(&table) {
            tracing::debug!(routes = table.routes.len(), "Route table unchanged");
            return Ok(());
        }
        self.write(&table).await?;
        tracing::info!(
            path = %self.path.display(),
            routes = table.routes.len(),
            "Route table written"
        );
        *last = Some(table);
        Ok(())
    }
}
