//! In-process storage backend.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::model::{ObjectKind, ResolverMap, Schema};
use crate::storage::{check_name, ConfigStore, StorageError, StorageResult};

/// A concurrent in-memory store. Listing order is by name.
#[derive(Debug, Default)]
pub struct MemoryStore {
    schemas: DashMap<String, Schema>,
    resolver_maps: DashMap<String, ResolverMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a schema, bypassing version checks.
    pub fn put_schema(&self, mut schema: Schema) {
        schema.resource_version = schema.resource_version.max(1);
        self.schemas.insert(schema.name.clone(), schema);
    }

    /// Insert or overwrite a resolver map, bypassing version checks.
    pub fn put_resolver_map(&self, mut resolver_map: ResolverMap) {
        resolver_map.resource_version = resolver_map.resource_version.max(1);
        self.resolver_maps
            .insert(resolver_map.name.clone(), resolver_map);
    }
}

/// Compare-and-bump shared by both object kinds.
fn versioned_update<T: Clone>(
    map: &DashMap<String, T>,
    kind: ObjectKind,
    name: &str,
    mut object: T,
    version: impl Fn(&T) -> u64,
    set_version: impl Fn(&mut T, u64),
) -> StorageResult<T> {
    let mut current = map.get_mut(name).ok_or_else(|| StorageError::NotFound {
        kind,
        name: name.to_string(),
    })?;
    let expected = version(&object);
    let actual = version(current.value());
    if expected != actual {
        return Err(StorageError::Conflict {
            kind,
            name: name.to_string(),
            expected,
            actual,
        });
    }
    set_version(&mut object, actual + 1);
    *current.value_mut() = object.clone();
    Ok(object)
}

fn sorted<T: Clone>(map: &DashMap<String, T>) -> Vec<T> {
    let mut entries: Vec<(String, T)> = map
        .iter()
        .map(|r| (r.key().clone(), r.value().clone()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().map(|(_, v)| v).collect()
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get_schema(&self, name: &str) -> StorageResult<Schema> {
        self.schemas
            .get(name)
            .map(|r| r.value().clone())
            .ok_or_else(|| StorageError::NotFound {
                kind: ObjectKind::Schema,
                name: name.to_string(),
            })
    }

    async fn update_schema(&self, schema: Schema) -> StorageResult<Schema> {
        let name = schema.name.clone();
        versioned_update(
            &self.schemas,
            ObjectKind::Schema,
            &name,
            schema,
            |s| s.resource_version,
            |s, v| s.resource_version = v,
        )
    }

    async fn list_schemas(&self) -> StorageResult<Vec<Schema>> {
        Ok(sorted(&self.schemas))
    }

    async fn get_resolver_map(&self, name: &str) -> StorageResult<ResolverMap> {
        self.resolver_maps
            .get(name)
            .map(|r| r.value().clone())
            .ok_or_else(|| StorageError::NotFound {
                kind: ObjectKind::ResolverMap,
                name: name.to_string(),
            })
    }

    async fn create_resolver_map(&self, mut resolver_map: ResolverMap) -> StorageResult<ResolverMap> {
        check_name(ObjectKind::ResolverMap, &resolver_map.name)?;
        match self.resolver_maps.entry(resolver_map.name.clone()) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists {
                kind: ObjectKind::ResolverMap,
                name: resolver_map.name,
            }),
            Entry::Vacant(slot) => {
                resolver_map.resource_version = 1;
                slot.insert(resolver_map.clone());
                Ok(resolver_map)
            }
        }
    }

    async fn update_resolver_map(&self, resolver_map: ResolverMap) -> StorageResult<ResolverMap> {
        let name = resolver_map.name.clone();
        versioned_update(
            &self.resolver_maps,
            ObjectKind::ResolverMap,
            &name,
            resolver_map,
            |m| m.resource_version,
            |m, v| m.resource_version = v,
        )
    }

    async fn list_resolver_maps(&self) -> StorageResult<Vec<ResolverMap>> {
        Ok(sorted(&self.resolver_maps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_requires_current_version() {
        let store = MemoryStore::new();
        store.put_schema(Schema::new("orders", "type Query { a: Int }"));

        let mut schema = store.get_schema("orders").await.unwrap();
        schema.resolver_map = "orders-resolvers".into();
        let updated = store.update_schema(schema.clone()).await.unwrap();
        assert_eq!(updated.resource_version, 2);

        // Stale copy still carries version 1.
        let err = store.update_schema(schema).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let store = MemoryStore::new();
        store
            .create_resolver_map(ResolverMap::new("m"))
            .await
            .unwrap();
        let err = store
            .create_resolver_map(ResolverMap::new("m"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_missing_objects_are_not_found() {
        let store = MemoryStore::new();
        assert!(store.get_schema("nope").await.unwrap_err().is_not_found());
        assert!(store
            .update_resolver_map(ResolverMap::new("nope"))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_snapshot_is_sorted_by_name() {
        let store = MemoryStore::new();
        store.put_schema(Schema::new("b", ""));
        store.put_schema(Schema::new("a", ""));
        let snapshot = store.snapshot().await.unwrap();
        let names: Vec<_> = snapshot.schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
