//! Class-name to constructor registry.

use super::record::{Model, ModelResult, Record};
use super::value::AttrMap;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Class names registered by `ModelRegistry::with_builtin_classes`.
pub const BUILTIN_CLASSES: &[&str] = &[
    "BaseModel",
    "User",
    "State",
    "City",
    "Amenity",
    "Place",
    "Review",
];

/// Builds a fresh instance (`None`) or restores one from its dictionary form.
pub type ModelConstructor =
    Arc<dyn Fn(Option<&AttrMap>) -> ModelResult<Box<dyn Model>> + Send + Sync>;

/// Class registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidClassName(String),
    DuplicateClassName(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidClassName(value) => write!(f, "class name is invalid: `{value}`"),
            Self::DuplicateClassName(value) => write!(f, "class already registered: `{value}`"),
        }
    }
}

impl Error for RegistryError {}

/// Explicit registry queried instead of runtime reflection.
#[derive(Default, Clone)]
pub struct ModelRegistry {
    constructors: BTreeMap<String, ModelConstructor>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in class, each backed by `Record`.
    pub fn with_builtin_classes() -> Self {
        let constructors = BUILTIN_CLASSES
            .iter()
            .map(|class_name| (class_name.to_string(), record_constructor(class_name)))
            .collect();
        Self { constructors }
    }

    /// Registers one class constructor.
    ///
    /// # Errors
    /// - `InvalidClassName` unless the name is an ASCII identifier starting
    ///   with a letter.
    /// - `DuplicateClassName` when the name is already taken.
    pub fn register(
        &mut self,
        class_name: &str,
        constructor: ModelConstructor,
    ) -> Result<(), RegistryError> {
        if !is_valid_class_name(class_name) {
            return Err(RegistryError::InvalidClassName(class_name.to_string()));
        }
        if self.constructors.contains_key(class_name) {
            return Err(RegistryError::DuplicateClassName(class_name.to_string()));
        }

        self.constructors.insert(class_name.to_string(), constructor);
        Ok(())
    }

    /// Registers a class whose instances are plain `Record`s.
    pub fn register_record_class(&mut self, class_name: &str) -> Result<(), RegistryError> {
        self.register(class_name, record_constructor(class_name))
    }

    pub fn lookup(&self, class_name: &str) -> Option<ModelConstructor> {
        self.constructors.get(class_name).cloned()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.constructors.contains_key(class_name)
    }

    /// Returns sorted class names.
    pub fn class_names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl Debug for ModelRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("classes", &self.class_names())
            .finish()
    }
}

fn record_constructor(class_name: &str) -> ModelConstructor {
    let owned = class_name.to_string();
    Arc::new(move |kwargs: Option<&AttrMap>| {
        Record::construct(owned.as_str(), kwargs).map(|record| Box::new(record) as Box<dyn Model>)
    })
}

fn is_valid_class_name(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
