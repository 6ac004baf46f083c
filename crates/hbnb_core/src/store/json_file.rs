//! JSON file backed object store.
//!
//! The file holds one JSON object mapping each composite key to the object's
//! dictionary form. A store opened with `in_memory()` never touches disk.

use super::{ObjectMap, ObjectStore, StoreError, StoreResult};
use crate::model::record::{Model, CLASS_KEY};
use crate::model::registry::ModelRegistry;
use crate::model::value::AttrMap;
use indexmap::IndexMap;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File-backed store; the default persistence for the console.
#[derive(Debug, Default)]
pub struct JsonFileStore {
    path: Option<PathBuf>,
    objects: ObjectMap,
}

impl JsonFileStore {
    /// Opens a store at `path`, loading existing objects when the file exists.
    ///
    /// # Side effects
    /// - Emits `store_load` logging events with duration and status.
    ///
    /// # Errors
    /// - Returns an error when the file exists but cannot be read or parsed,
    ///   or when an entry names an unregistered class.
    pub fn open(path: impl AsRef<Path>, registry: &ModelRegistry) -> StoreResult<Self> {
        let mut store = Self {
            path: Some(path.as_ref().to_path_buf()),
            objects: ObjectMap::new(),
        };
        store.reload(registry)?;
        Ok(store)
    }

    /// Store without a backing file; `save` and `reload` are no-ops.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn write_file(&self, path: &Path) -> StoreResult<()> {
        let snapshot = self
            .objects
            .iter()
            .map(|(key, object)| (key.as_str(), object.to_dict()))
            .collect::<IndexMap<&str, AttrMap>>();
        let payload = serde_json::to_string(&snapshot)?;
        std::fs::write(path, payload)?;
        Ok(())
    }
}

impl ObjectStore for JsonFileStore {
    fn all(&self) -> &ObjectMap {
        &self.objects
    }

    fn get(&self, key: &str) -> Option<&dyn Model> {
        self.objects.get(key).map(|object| &**object)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut (dyn Model + 'static)> {
        self.objects.get_mut(key).map(|object| &mut **object)
    }

    fn insert(&mut self, object: Box<dyn Model>) -> String {
        let key = object.storage_key();
        self.objects.insert(key.clone(), object);
        key
    }

    fn remove(&mut self, key: &str) -> Option<Box<dyn Model>> {
        self.objects.shift_remove(key)
    }

    fn save(&self) -> StoreResult<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let started_at = Instant::now();
        match self.write_file(path) {
            Ok(()) => {
                info!(
                    "event=store_save module=store status=ok objects={} duration_ms={}",
                    self.objects.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error path={} duration_ms={} error={}",
                    path.display(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn reload(&mut self, registry: &ModelRegistry) -> StoreResult<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        let started_at = Instant::now();
        if !path.exists() {
            info!("event=store_load module=store status=skipped reason=missing_file");
            return Ok(());
        }

        match read_objects(&path, registry) {
            Ok(objects) => {
                info!(
                    "event=store_load module=store status=ok objects={} duration_ms={}",
                    objects.len(),
                    started_at.elapsed().as_millis()
                );
                self.objects = objects;
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error path={} duration_ms={} error={}",
                    path.display(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn read_objects(path: &Path, registry: &ModelRegistry) -> StoreResult<ObjectMap> {
    let raw = std::fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        warn!("event=store_load module=store status=empty_file");
        return Ok(ObjectMap::new());
    }

    let entries: IndexMap<String, AttrMap> = serde_json::from_str(&raw)?;
    let mut objects = ObjectMap::with_capacity(entries.len());

    for (key, dict) in entries {
        let class_name = dict
            .get(CLASS_KEY)
            .and_then(|value| value.as_str())
            .ok_or_else(|| StoreError::InvalidData(format!("entry `{key}` has no `{CLASS_KEY}`")))?
            .to_string();
        let constructor = registry
            .lookup(&class_name)
            .ok_or_else(|| StoreError::UnknownClass {
                key: key.clone(),
                class_name: class_name.clone(),
            })?;

        let object = constructor(Some(&dict)).map_err(|source| StoreError::Model {
            key: key.clone(),
            source,
        })?;
        if object.storage_key() != key {
            return Err(StoreError::InvalidData(format!(
                "entry `{key}` does not match its object key `{}`",
                object.storage_key()
            )));
        }
        objects.insert(key, object);
    }

    Ok(objects)
}
