//! Document persistence interface shared by the credential and task stores.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};
use crate::errors::{StoreError, StoreResult};

/// Key under which every stored document carries its assigned id.
pub const ID_FIELD: &str = "_id";

/// A collection-oriented JSON document store.
///
/// Filters are JSON objects: a document matches when every key of the
/// filter is present in the document with an equal value. An empty
/// object matches everything. Results come back in insertion order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document, assigning and returning its id.
    async fn insert(&self, collection: &str, record: Value) -> StoreResult<String>;

    /// First document matching `filter`, if any.
    async fn find_one(&self, collection: &str, filter: &Value) -> StoreResult<Option<Value>>;

    /// All documents matching `filter`.
    async fn find_all(&self, collection: &str, filter: &Value) -> StoreResult<Vec<Value>>;

    /// Remove a collection and everything in it. Missing collections are not an error.
    async fn drop_collection(&self, collection: &str) -> StoreResult<()>;
}

/// Filter selecting a single document by id.
pub fn by_id(id: &str) -> Value {
    json!({ ID_FIELD: id })
}

/// Filter matching every document.
pub fn match_all() -> Value {
    Value::Object(Map::new())
}

pub fn matches_filter(document: &Value, filter: &Value) -> bool {
    match filter.as_object() {
        Some(conditions) => conditions
            .iter()
            .all(|(key, expected)| document.get(key) == Some(expected)),
        None => false,
    }
}

pub fn encode<T: Serialize>(record: &T) -> StoreResult<Value> {
    Ok(serde_json::to_value(record)?)
}

pub fn decode<T: DeserializeOwned>(document: Value) -> StoreResult<T> {
    Ok(serde_json::from_value(document)?)
}

/// Writes a fresh id into `record`; only JSON objects can be stored.
pub(crate) fn assign_id(record: &mut Value) -> StoreResult<String> {
    let object = record
        .as_object_mut()
        .ok_or_else(|| StoreError::InvalidDocument("document must be a JSON object".into()))?;

    let id = uuid::Uuid::new_v4().to_string();
    object.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_requires_every_key_to_match() {
        let doc = json!({ "_id": "1", "username": "Admin", "salt": "x" });

        assert!(matches_filter(&doc, &json!({ "username": "Admin" })));
        assert!(matches_filter(&doc, &json!({ "username": "Admin", "_id": "1" })));
        assert!(!matches_filter(&doc, &json!({ "username": "Admin", "_id": "2" })));
        assert!(!matches_filter(&doc, &json!({ "missing": "Admin" })));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(matches_filter(&json!({ "a": 1 }), &match_all()));
    }

    #[test]
    fn non_object_filter_matches_nothing() {
        assert!(!matches_filter(&json!({ "a": 1 }), &json!("a")));
    }

    #[test]
    fn assign_id_overwrites_placeholder() {
        let mut doc = json!({ "_id": "", "title": "x" });
        let id = assign_id(&mut doc).unwrap();

        assert!(!id.is_empty());
        assert_eq!(doc["_id"], Value::String(id));
    }

    #[test]
    fn assign_id_rejects_non_objects() {
        let mut doc = json!([1, 2, 3]);
        assert!(matches!(assign_id(&mut doc), Err(StoreError::InvalidDocument(_))));
    }
}
