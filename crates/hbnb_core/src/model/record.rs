//! Model contract and the generic record implementation.
//!
//! # Responsibility
//! - Define the `Model` interface every registered class satisfies.
//! - Provide `Record`, the attribute-bag model backing all built-in classes.
//! - Convert models to and from their dictionary form.
//!
//! # Invariants
//! - `id`, `created_at`, `updated_at` and `__class__` are never stored as
//!   plain attributes; `set_attr` refuses them.
//! - The storage key `Class.id` is fixed once a record exists.
//! - Timestamps carry microsecond precision so the dictionary form
//!   round-trips exactly.

use super::value::{AttrMap, AttrValue};
use chrono::{NaiveDateTime, SubsecRound, Utc};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

/// Write format for `created_at`/`updated_at` in dictionary form.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub const CLASS_KEY: &str = "__class__";
pub const ID_KEY: &str = "id";
pub const CREATED_AT_KEY: &str = "created_at";
pub const UPDATED_AT_KEY: &str = "updated_at";

const RESERVED_KEYS: &[&str] = &[CLASS_KEY, ID_KEY, CREATED_AT_KEY, UPDATED_AT_KEY];

/// Naive UTC timestamp.
pub type Timestamp = NaiveDateTime;

pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building a model from its dictionary form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    MissingField(&'static str),
    /// Field is present but is not a string.
    InvalidFieldType(&'static str),
    EmptyId,
    InvalidTimestamp { field: &'static str, value: String },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidFieldType(field) => write!(f, "field `{field}` must be a string"),
            Self::EmptyId => write!(f, "id cannot be empty"),
            Self::InvalidTimestamp { field, value } => {
                write!(f, "field `{field}` is not a valid timestamp: `{value}`")
            }
        }
    }
}

impl Error for ModelError {}

/// Returns whether `name` is managed by the model itself.
pub fn is_reserved_key(name: &str) -> bool {
    RESERVED_KEYS.contains(&name)
}

pub fn now() -> Timestamp {
    Utc::now().naive_utc().trunc_subsecs(6)
}

pub fn format_timestamp(value: Timestamp) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Interface shared by every class the registry can construct.
pub trait Model: Debug {
    fn class_name(&self) -> &str;
    fn id(&self) -> &str;
    fn created_at(&self) -> Timestamp;
    fn updated_at(&self) -> Timestamp;
    fn attrs(&self) -> &AttrMap;

    /// Sets one attribute. Returns `false` for reserved names, which are left
    /// untouched.
    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool;

    /// Refreshes `updated_at`.
    fn touch(&mut self);

    /// Composite key `Class.id` used by the object store.
    fn storage_key(&self) -> String {
        storage_key(self.class_name(), self.id())
    }

    /// Dictionary form: `__class__`, `id`, timestamps, then attributes.
    fn to_dict(&self) -> AttrMap {
        let mut dict = AttrMap::with_capacity(self.attrs().len() + RESERVED_KEYS.len());
        dict.insert(CLASS_KEY.to_string(), self.class_name().into());
        dict.extend(self.field_dict());
        dict
    }

    /// Fields as printed by `describe`: `id`, timestamps, then attributes.
    fn field_dict(&self) -> AttrMap {
        let mut dict = AttrMap::with_capacity(self.attrs().len() + 3);
        dict.insert(ID_KEY.to_string(), self.id().into());
        dict.insert(
            CREATED_AT_KEY.to_string(),
            format_timestamp(self.created_at()).into(),
        );
        dict.insert(
            UPDATED_AT_KEY.to_string(),
            format_timestamp(self.updated_at()).into(),
        );
        for (name, value) in self.attrs() {
            dict.insert(name.clone(), value.clone());
        }
        dict
    }

    /// String form `[Class] (id) {'key': value, ...}`.
    ///
    /// Timestamps print as quoted ISO strings in `TIMESTAMP_FORMAT`, the same
    /// text the dictionary form stores.
    fn describe(&self) -> String {
        let fields = self
            .field_dict()
            .iter()
            .map(|(name, value)| format!("{}: {}", AttrValue::from(name.as_str()).repr(), value.repr()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("[{}] ({}) {{{}}}", self.class_name(), self.id(), fields)
    }
}

impl Display for dyn Model + '_ {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

pub fn storage_key(class_name: &str, id: &str) -> String {
    format!("{class_name}.{id}")
}

/// Attribute-bag model used for every built-in class.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    class_name: String,
    id: String,
    created_at: Timestamp,
    updated_at: Timestamp,
    attrs: AttrMap,
}

impl Record {
    /// Creates a fresh record with a random v4 id and both timestamps set to
    /// now.
    pub fn new(class_name: impl Into<String>) -> Self {
        let created_at = now();
        Self {
            class_name: class_name.into(),
            id: Uuid::new_v4().to_string(),
            created_at,
            updated_at: created_at,
            attrs: AttrMap::new(),
        }
    }

    /// Builds a fresh record, or restores one when `kwargs` is provided.
    pub fn construct(class_name: impl Into<String>, kwargs: Option<&AttrMap>) -> ModelResult<Self> {
        match kwargs {
            Some(kwargs) => Self::from_dict(class_name, kwargs),
            None => Ok(Self::new(class_name)),
        }
    }

    /// Restores a record from its dictionary form.
    ///
    /// `__class__` is ignored; the caller already chose the class.
    ///
    /// # Errors
    /// - `MissingField` when `id`, `created_at` or `updated_at` is absent.
    /// - `InvalidFieldType`, `EmptyId`, `InvalidTimestamp` for malformed values.
    pub fn from_dict(class_name: impl Into<String>, dict: &AttrMap) -> ModelResult<Self> {
        let id = required_str(dict, ID_KEY)?;
        if id.trim().is_empty() {
            return Err(ModelError::EmptyId);
        }
        let created_at = required_timestamp(dict, CREATED_AT_KEY)?;
        let updated_at = required_timestamp(dict, UPDATED_AT_KEY)?;

        let attrs = dict
            .iter()
            .filter(|(name, _)| !is_reserved_key(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Ok(Self {
            class_name: class_name.into(),
            id: id.to_string(),
            created_at,
            updated_at,
            attrs,
        })
    }
}

impl Model for Record {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        if is_reserved_key(name) {
            return false;
        }
        self.attrs.insert(name.to_string(), value);
        true
    }

    fn touch(&mut self) {
        self.updated_at = now();
    }
}

fn required_str<'a>(dict: &'a AttrMap, field: &'static str) -> ModelResult<&'a str> {
    dict.get(field)
        .ok_or(ModelError::MissingField(field))?
        .as_str()
        .ok_or(ModelError::InvalidFieldType(field))
}

fn required_timestamp(dict: &AttrMap, field: &'static str) -> ModelResult<Timestamp> {
    let raw = required_str(dict, field)?;
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_PARSE_FORMAT).map_err(|_| {
        ModelError::InvalidTimestamp {
            field,
            value: raw.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, Model, Record};
    use crate::model::value::{AttrMap, AttrValue};

    #[test]
    fn set_attr_refuses_reserved_names() {
        let mut record = Record::new("User");
        let id = record.id().to_string();

        assert!(!record.set_attr("id", AttrValue::from("other")));
        assert!(!record.set_attr("__class__", AttrValue::from("State")));
        assert!(record.set_attr("name", AttrValue::from("x")));

        assert_eq!(record.id(), id);
        assert_eq!(record.attrs().len(), 1);
    }

    #[test]
    fn describe_lists_fields_in_order() {
        let mut record = Record::new("City");
        record.set_attr("name", AttrValue::from("Lagos"));
        record.set_attr("size", AttrValue::Int(3));

        let created = format_timestamp(record.created_at());
        let expected = format!(
            "[City] ({id}) {{'id': '{id}', 'created_at': '{created}', 'updated_at': '{created}', 'name': 'Lagos', 'size': 3}}",
            id = record.id(),
        );
        assert_eq!(record.describe(), expected);
    }

    #[test]
    fn timestamp_parser_accepts_missing_fraction() {
        let mut dict = AttrMap::new();
        dict.insert("id".to_string(), AttrValue::from("abc"));
        dict.insert("created_at".to_string(), AttrValue::from("2024-01-02T03:04:05"));
        dict.insert(
            "updated_at".to_string(),
            AttrValue::from("2024-01-02T03:04:05.000100"),
        );

        let record = Record::from_dict("Place", &dict).unwrap();
        assert_eq!(format_timestamp(record.created_at()), "2024-01-02T03:04:05.000000");
        assert_eq!(format_timestamp(record.updated_at()), "2024-01-02T03:04:05.000100");
    }
}
