use hbnb_core::{AttrMap, AttrValue, Model, ModelError, ModelRegistry, Record, RegistryError};
use regex::Regex;

const UUID_PATTERN: &str = r"^[a-f0-9]{8}(-[a-f0-9]{4}){3}-[a-f0-9]{12}$";

fn dict(entries: &[(&str, &str)]) -> AttrMap {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), AttrValue::from(*value)))
        .collect()
}

#[test]
fn new_record_has_uuid_and_equal_timestamps() {
    let record = Record::new("BaseModel");

    assert!(Regex::new(UUID_PATTERN).unwrap().is_match(record.id()));
    assert_eq!(record.created_at(), record.updated_at());
    assert!(record.attrs().is_empty());
    assert_eq!(record.storage_key(), format!("BaseModel.{}", record.id()));
}

#[test]
fn new_records_get_distinct_ids() {
    let first = Record::new("User");
    let second = Record::new("User");
    assert_ne!(first.id(), second.id());
}

#[test]
fn to_dict_starts_with_class_and_identity_fields() {
    let mut record = Record::new("User");
    record.set_attr("first_name", AttrValue::from("Ada"));

    let dict = record.to_dict();
    let keys: Vec<&str> = dict.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["__class__", "id", "created_at", "updated_at", "first_name"]
    );
    assert_eq!(dict["__class__"], AttrValue::from("User"));
}

#[test]
fn from_dict_restores_an_equal_record() {
    let mut record = Record::new("Review");
    record.set_attr("text", AttrValue::from("great"));
    record.set_attr("stars", AttrValue::Int(5));

    let restored = Record::from_dict("Review", &record.to_dict()).unwrap();
    assert_eq!(restored, record);
}

#[test]
fn from_dict_reports_missing_and_malformed_fields() {
    let stamp = "2024-05-06T07:08:09.123456";

    assert_eq!(
        Record::from_dict("User", &dict(&[("created_at", stamp), ("updated_at", stamp)])),
        Err(ModelError::MissingField("id"))
    );
    assert_eq!(
        Record::from_dict(
            "User",
            &dict(&[("id", " "), ("created_at", stamp), ("updated_at", stamp)])
        ),
        Err(ModelError::EmptyId)
    );
    assert_eq!(
        Record::from_dict(
            "User",
            &dict(&[("id", "1"), ("created_at", "yesterday"), ("updated_at", stamp)])
        ),
        Err(ModelError::InvalidTimestamp {
            field: "created_at",
            value: "yesterday".to_string(),
        })
    );

    let mut numeric_id = dict(&[("created_at", stamp), ("updated_at", stamp)]);
    numeric_id.insert("id".to_string(), AttrValue::Int(1));
    assert_eq!(
        Record::from_dict("User", &numeric_id),
        Err(ModelError::InvalidFieldType("id"))
    );
}

#[test]
fn display_matches_describe() {
    let record = Record::new("State");
    let model: &dyn Model = &record;
    assert_eq!(model.to_string(), record.describe());
    assert!(model
        .to_string()
        .starts_with(&format!("[State] ({}) {{'id': ", record.id())));
}

#[test]
fn registry_constructs_fresh_and_restored_records() {
    let registry = ModelRegistry::with_builtin_classes();
    let constructor = registry.lookup("Place").unwrap();

    let fresh = constructor(None).unwrap();
    assert_eq!(fresh.class_name(), "Place");

    let restored = constructor(Some(&fresh.to_dict())).unwrap();
    assert_eq!(restored.to_dict(), fresh.to_dict());
}

#[test]
fn registry_lookup_is_exact() {
    let registry = ModelRegistry::with_builtin_classes();
    assert!(registry.contains("BaseModel"));
    assert!(!registry.contains("basemodel"));
    assert!(registry.lookup("Base").is_none());
}

#[test]
fn registry_accepts_new_classes_and_rejects_duplicates() {
    let mut registry = ModelRegistry::with_builtin_classes();
    let before = registry.len();

    registry.register_record_class("Booking").unwrap();
    assert_eq!(registry.len(), before + 1);
    assert!(matches!(
        registry.register_record_class("Booking"),
        Err(RegistryError::DuplicateClassName(_))
    ));
    assert!(matches!(
        registry.register_record_class("9lives"),
        Err(RegistryError::InvalidClassName(_))
    ));
}
