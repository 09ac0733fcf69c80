//! Directory-backed storage.
//!
//! Layout:
//! ```text
//! <root>/schemas/<name>.toml
//! <root>/resolver_maps/<name>.toml
//! ```
//! Writes go to a temporary sibling and are renamed into place, so readers
//! (and the directory watcher) never observe a half-written document.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::model::{ObjectKind, ResolverMap, Schema, Snapshot};
use crate::storage::{check_name, ConfigStore, StorageError, StorageResult};

const SCHEMAS_DIR: &str = "schemas";
const RESOLVER_MAPS_DIR: &str = "resolver_maps";

/// Storage over a directory of TOML documents.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    /// Serializes read-compare-write sequences within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory layout if needed.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(SCHEMAS_DIR))?;
        fs::create_dir_all(root.join(RESOLVER_MAPS_DIR))?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir(&self, kind: ObjectKind) -> PathBuf {
        match kind {
            ObjectKind::Schema => self.root.join(SCHEMAS_DIR),
            ObjectKind::ResolverMap => self.root.join(RESOLVER_MAPS_DIR),
        }
    }

    fn path(&self, kind: ObjectKind, name: &str) -> StorageResult<PathBuf> {
        check_name(kind, name)?;
        Ok(self.dir(kind).join(format!("{}.toml", name)))
    }

    /// Read the whole configuration set synchronously.
    ///
    /// Used from the directory watcher's callback thread.
    pub fn load_snapshot(&self) -> StorageResult<Snapshot> {
        Ok(Snapshot::new(
            load_dir(&self.dir(ObjectKind::Schema))?,
            load_dir(&self.dir(ObjectKind::ResolverMap))?,
        ))
    }

    async fn read<T: Document>(&self, kind: ObjectKind, name: &str) -> StorageResult<T> {
        let path = self.path(kind, name)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    kind,
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        parse_document(&path, &content)
    }

    async fn write<T: Serialize>(&self, path: &Path, object: &T) -> StorageResult<()> {
        let content =
            toml::to_string_pretty(object).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

/// A stored object whose name must match its file stem.
trait Document: DeserializeOwned {
    fn name(&self) -> &str;
}

impl Document for Schema {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Document for ResolverMap {
    fn name(&self) -> &str {
        &self.name
    }
}

fn parse_document<T: Document>(path: &Path, content: &str) -> StorageResult<T> {
    let document: T = toml::from_str(content)
        .map_err(|e| StorageError::Serialization(format!("{}: {}", path.display(), e)))?;
    let expected = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if document.name() != expected {
        return Err(StorageError::NameMismatch {
            path: path.display().to_string(),
            declared: document.name().to_string(),
            expected: expected.to_string(),
        });
    }
    Ok(document)
}

fn load_dir<T: Document>(dir: &Path) -> StorageResult<Vec<T>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let content = fs::read_to_string(path)?;
            parse_document(path, &content)
        })
        .collect()
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn get_schema(&self, name: &str) -> StorageResult<Schema> {
        self.read(ObjectKind::Schema, name).await
    }

    async fn update_schema(&self, mut schema: Schema) -> StorageResult<Schema> {
        let _guard = self.write_lock.lock().await;
        let current: Schema = self.read(ObjectKind::Schema, &schema.name).await?;
        if current.resource_version != schema.resource_version {
            return Err(StorageError::Conflict {
                kind: ObjectKind::Schema,
                name: schema.name,
                expected: schema.resource_version,
                actual: current.resource_version,
            });
        }
        schema.resource_version += 1;
        let path = self.path(ObjectKind::Schema, &schema.name)?;
        self.write(&path, &schema).await?;
        Ok(schema)
    }

    async fn list_schemas(&self) -> StorageResult<Vec<Schema>> {
        let dir = self.dir(ObjectKind::Schema);
        tokio::task::spawn_blocking(move || load_dir(&dir))
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?
    }

    async fn get_resolver_map(&self, name: &str) -> StorageResult<ResolverMap> {
        self.read(ObjectKind::ResolverMap, name).await
    }

    async fn create_resolver_map(&self, mut resolver_map: ResolverMap) -> StorageResult<ResolverMap> {
        let _guard = self.write_lock.lock().await;
        let path = self.path(ObjectKind::ResolverMap, &resolver_map.name)?;
        if tokio::fs::try_exists(&path).await? {
            return Err(StorageError::AlreadyExists {
                kind: ObjectKind::ResolverMap,
                name: resolver_map.name,
            });
        }
        resolver_map.resource_version = 1;
        self.write(&path, &resolver_map).await?;
        Ok(resolver_map)
    }

    async fn update_resolver_map(&self, mut resolver_map: ResolverMap) -> StorageResult<ResolverMap> {
        let _guard = self.write_lock.lock().await;
        let current: ResolverMap = self
            .read(ObjectKind::ResolverMap, &resolver_map.name)
            .await?;
        if current.resource_version != resolver_map.resource_version {
            return Err(StorageError::Conflict {
                kind: ObjectKind::ResolverMap,
                name: resolver_map.name,
                expected: resolver_map.resource_version,
                actual: current.resource_version,
            });
        }
        resolver_map.resource_version += 1;
        let path = self.path(ObjectKind::ResolverMap, &resolver_map.name)?;
        self.write(&path, &resolver_map).await?;
        Ok(resolver_map)
    }

    async fn list_resolver_maps(&self) -> StorageResult<Vec<ResolverMap>> {
        let dir = self.dir(ObjectKind::ResolverMap);
        tokio::task::spawn_blocking(move || load_dir(&dir))
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?
    }
}
