//! Whole-configuration snapshots.

use crate::model::{ResolverMap, Schema};

/// One complete observation of the desired configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub schemas: Vec<Schema>,
    pub resolver_maps: Vec<ResolverMap>,
}

impl Snapshot {
    pub fn new(schemas: Vec<Schema>, resolver_maps: Vec<ResolverMap>) -> Self {
        Self {
            schemas,
            resolver_maps,
        }
    }

    /// Look up a resolver map by name.
    pub fn resolver_map(&self, name: &str) -> Option<&ResolverMap> {
        self.resolver_maps.iter().find(|m| m.name == name)
    }
}
