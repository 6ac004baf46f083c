//! Object store contracts and the JSON file implementation.
//!
//! # Responsibility
//! - Hold every live object keyed by its composite key `Class.id`.
//! - Persist the full object set with whole-file overwrite semantics.
//!
//! # Invariants
//! - A stored object's key always equals `Model::storage_key()`.
//! - `save()` writes the complete current state; there are no partial writes.
//! - `reload()` validates every entry through the model registry and leaves
//!   the in-memory state untouched when any entry is rejected.

use crate::model::record::{Model, ModelError};
use crate::model::registry::ModelRegistry;
use indexmap::IndexMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod json_file;

pub use json_file::JsonFileStore;

/// Live objects by composite key, in insertion order.
pub type ObjectMap = IndexMap<String, Box<dyn Model>>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence and load errors.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Model { key: String, source: ModelError },
    UnknownClass { key: String, class_name: String },
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "invalid storage file: {err}"),
            Self::Model { key, source } => write!(f, "invalid stored object `{key}`: {source}"),
            Self::UnknownClass { key, class_name } => {
                write!(f, "stored object `{key}` has unknown class `{class_name}`")
            }
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Model { source, .. } => Some(source),
            Self::UnknownClass { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Storage interface consumed by the console.
pub trait ObjectStore {
    /// Every live object.
    fn all(&self) -> &ObjectMap;

    fn get(&self, key: &str) -> Option<&dyn Model>;

    fn get_mut(&mut self, key: &str) -> Option<&mut (dyn Model + 'static)>;

    /// Adds an object under its storage key and returns that key.
    fn insert(&mut self, object: Box<dyn Model>) -> String;

    fn remove(&mut self, key: &str) -> Option<Box<dyn Model>>;

    /// Writes the whole object set to the backing medium.
    fn save(&self) -> StoreResult<()>;

    /// Replaces the in-memory set with the persisted one.
    fn reload(&mut self, registry: &ModelRegistry) -> StoreResult<()>;

    /// Number of objects whose class name is exactly `class_name`.
    fn count_class(&self, class_name: &str) -> usize {
        self.all()
            .values()
            .filter(|object| object.class_name() == class_name)
            .count()
    }
}
