//! User-facing console errors and their exact message strings.

use crate::model::record::ModelError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors a single command can report; every one is printed as one line and
/// never ends the read loop.
#[derive(Debug)]
pub enum ConsoleError {
    NoClassName,
    NoClass,
    NoObjectId,
    NoObject,
    NoAttributeName,
    NoAttributeValue,
    /// Dotted call naming a verb the console does not know.
    NoMethod(String),
    /// Direct command naming a verb the console does not know.
    UnknownSyntax(String),
    /// Registered constructor rejected its input.
    Model(ModelError),
    Storage(StoreError),
}

impl ConsoleError {
    /// Symbolic catalogue key, also used as the log `error_code`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoClassName => "no_cls_name",
            Self::NoClass => "no_cls",
            Self::NoObjectId => "no_obj_id",
            Self::NoObject => "no_obj",
            Self::NoAttributeName => "no_attr_name",
            Self::NoAttributeValue => "no_attr_val",
            Self::NoMethod(_) => "no_method",
            Self::UnknownSyntax(_) => "unknown_syntax",
            Self::Model(_) => "model",
            Self::Storage(_) => "storage",
        }
    }
}

/// Returns the catalogue message for a symbolic key.
///
/// `no_method` is a prefix; the rendered error appends `: <verb> **`.
pub fn message(code: &str) -> Option<&'static str> {
    match code {
        "no_cls_name" => Some("** class name missing **"),
        "no_cls" => Some("** class doesn't exist **"),
        "no_obj_id" => Some("** instance id missing **"),
        "no_obj" => Some("** no instance found **"),
        "no_attr_name" => Some("** attribute name missing **"),
        "no_attr_val" => Some("** value missing **"),
        "no_method" => Some("** no method found"),
        _ => None,
    }
}

impl Display for ConsoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMethod(verb) => {
                write!(f, "{}: {verb} **", message("no_method").unwrap_or_default())
            }
            Self::UnknownSyntax(line) => write!(f, "*** Unknown syntax: {line}"),
            Self::Model(err) => write!(f, "** invalid object: {err} **"),
            Self::Storage(err) => write!(f, "** storage error: {err} **"),
            other => f.write_str(message(other.code()).unwrap_or_default()),
        }
    }
}

impl Error for ConsoleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ConsoleError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}
