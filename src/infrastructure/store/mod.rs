//! Document store adapter
//!
//! The catalog core talks to its document database through the
//! [`DocumentStore`] trait: create, partial-merge update, fetch by id,
//! dot-path equality queries, full collection snapshots, and a push-based
//! change feed that live queries are built on. [`MemoryStore`] is the
//! in-process backend wired in by default and used by the tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

pub mod error;
pub mod live;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use live::LiveQuery;
pub use memory::MemoryStore;

/// A stored document: the store-assigned id plus the JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	pub id: Uuid,
	pub data: Value,
}

impl Document {
	/// Deserialize the body into an entity, injecting the document id as the
	/// `id` field
	pub fn deserialize<T: DeserializeOwned>(&self) -> StoreResult<T> {
		let mut data = self.data.clone();
		if let Value::Object(map) = &mut data {
			map.insert("id".to_string(), serde_json::to_value(self.id)?);
		}
		Ok(serde_json::from_value(data)?)
	}
}

/// Serialize an entity into a document body, stripping the `id` field (the
/// id lives outside the body; the store assigns it on create)
pub fn to_document_value<T: Serialize>(entity: &T) -> StoreResult<Value> {
	let mut value = serde_json::to_value(entity)?;
	match &mut value {
		Value::Object(map) => {
			map.remove("id");
		}
		_ => return Err(StoreError::NotAnObject),
	}
	Ok(value)
}

/// Notification that a document in a collection was created or updated
#[derive(Debug, Clone)]
pub struct StoreChange {
	pub collection: String,
	pub id: Uuid,
}

/// Interface over the document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Create a document; the store assigns and returns a fresh id
	async fn create(&self, collection: &str, data: Value) -> StoreResult<Uuid>;

	/// Shallow-merge `patch` into the document's top-level fields, atomically
	/// per document; fields not named in the patch are left untouched
	async fn update(&self, collection: &str, id: Uuid, patch: Value) -> StoreResult<()>;

	/// Fetch a document by id, regardless of its `isActive` flag
	async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>>;

	/// All documents where the dot-path `field` equals `value`; stepping into
	/// an array matches any element, so `categoryTypes.categoryTypeId` finds
	/// documents whose array embeds the given id
	async fn query_eq(&self, collection: &str, field: &str, value: &Value)
		-> StoreResult<Vec<Document>>;

	/// Full snapshot of a collection
	async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

	/// Push-based change feed across all collections
	fn changes(&self) -> broadcast::Receiver<StoreChange>;
}

/// Dot-path equality check used by [`DocumentStore::query_eq`]
pub(crate) fn field_matches(data: &Value, path: &str, expected: &Value) -> bool {
	let segments: Vec<&str> = path.split('.').collect();
	matches_at(data, &segments, expected)
}

fn matches_at(value: &Value, segments: &[&str], expected: &Value) -> bool {
	match segments.split_first() {
		None => match value {
			Value::Array(items) => items.iter().any(|v| v == expected) || value == expected,
			_ => value == expected,
		},
		Some((segment, rest)) => match value {
			Value::Object(map) => map
				.get(*segment)
				.map_or(false, |v| matches_at(v, rest, expected)),
			// Apply the remaining path to every element of an array
			Value::Array(items) => items.iter().any(|v| matches_at(v, segments, expected)),
			_ => false,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_field_matches_top_level() {
		let doc = json!({"name": "Lighting", "isActive": true});
		assert!(field_matches(&doc, "name", &json!("Lighting")));
		assert!(field_matches(&doc, "isActive", &json!(true)));
		assert!(!field_matches(&doc, "name", &json!("Hardware")));
		assert!(!field_matches(&doc, "missing", &json!("Lighting")));
	}

	#[test]
	fn test_field_matches_nested_object() {
		let doc = json!({"supplier": {"supplierId": "abc", "company": "Acme"}});
		assert!(field_matches(&doc, "supplier.supplierId", &json!("abc")));
		assert!(!field_matches(&doc, "supplier.supplierId", &json!("def")));
	}

	#[test]
	fn test_field_matches_array_elements() {
		let doc = json!({
			"categoryTypes": [
				{"categoryTypeId": "c1", "categoryTypeName": "Indoor"},
				{"categoryTypeId": "c2", "categoryTypeName": "Outdoor"},
			]
		});
		assert!(field_matches(&doc, "categoryTypes.categoryTypeId", &json!("c1")));
		assert!(field_matches(&doc, "categoryTypes.categoryTypeId", &json!("c2")));
		assert!(!field_matches(&doc, "categoryTypes.categoryTypeId", &json!("c3")));
	}

	#[test]
	fn test_field_matches_array_contains() {
		let doc = json!({"emails": ["a@x.com", "b@x.com"]});
		assert!(field_matches(&doc, "emails", &json!("a@x.com")));
		assert!(!field_matches(&doc, "emails", &json!("c@x.com")));
	}
}
