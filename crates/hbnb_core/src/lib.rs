//! Core of the HBNB console.
//! This crate owns the command interpreter, the object model and the
//! file-backed object store.

pub mod console;
pub mod logging;
pub mod model;
pub mod store;

pub use console::interpreter::{Console, Flow, PROMPT};
pub use console::messages::ConsoleError;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::record::{Model, ModelError, ModelResult, Record, Timestamp};
pub use model::registry::{ModelConstructor, ModelRegistry, RegistryError, BUILTIN_CLASSES};
pub use model::value::{AttrMap, AttrValue};
pub use store::{JsonFileStore, ObjectMap, ObjectStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
