//! In-memory document store backend

use super::{Document, DocumentStore, StoreChange, StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Change feed capacity; a lagged live query re-reads the full snapshot, so
/// losing individual notifications is harmless
const CHANGE_CAPACITY: usize = 256;

/// In-memory [`DocumentStore`] backed by per-collection hash maps
pub struct MemoryStore {
	collections: RwLock<HashMap<String, HashMap<Uuid, Value>>>,
	changes: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
	pub fn new() -> Self {
		let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
		Self {
			collections: RwLock::new(HashMap::new()),
			changes,
		}
	}

	fn notify(&self, collection: &str, id: Uuid) {
		// Ignore send errors (no live queries attached)
		let _ = self.changes.send(StoreChange {
			collection: collection.to_string(),
			id,
		});
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl DocumentStore for MemoryStore {
	async fn create(&self, collection: &str, data: Value) -> StoreResult<Uuid> {
		if !data.is_object() {
			return Err(StoreError::NotAnObject);
		}
		let id = Uuid::new_v4();
		self.collections
			.write()
			.await
			.entry(collection.to_string())
			.or_default()
			.insert(id, data);
		self.notify(collection, id);
		Ok(id)
	}

	async fn update(&self, collection: &str, id: Uuid, patch: Value) -> StoreResult<()> {
		let patch = match patch {
			Value::Object(map) => map,
			_ => return Err(StoreError::NotAnObject),
		};
		{
			let mut collections = self.collections.write().await;
			let doc = collections
				.get_mut(collection)
				.and_then(|docs| docs.get_mut(&id))
				.ok_or_else(|| StoreError::DocumentNotFound {
					collection: collection.to_string(),
					id,
				})?;
			// Merged under the write lock: the patch lands atomically
			let Value::Object(fields) = doc else {
				return Err(StoreError::NotAnObject);
			};
			for (key, value) in patch {
				fields.insert(key, value);
			}
		}
		self.notify(collection, id);
		Ok(())
	}

	async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>> {
		Ok(self
			.collections
			.read()
			.await
			.get(collection)
			.and_then(|docs| docs.get(&id))
			.map(|data| Document {
				id,
				data: data.clone(),
			}))
	}

	async fn query_eq(
		&self,
		collection: &str,
		field: &str,
		value: &Value,
	) -> StoreResult<Vec<Document>> {
		Ok(self
			.collections
			.read()
			.await
			.get(collection)
			.map(|docs| {
				docs.iter()
					.filter(|(_, data)| super::field_matches(data, field, value))
					.map(|(id, data)| Document {
						id: *id,
						data: data.clone(),
					})
					.collect()
			})
			.unwrap_or_default())
	}

	async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
		Ok(self
			.collections
			.read()
			.await
			.get(collection)
			.map(|docs| {
				docs.iter()
					.map(|(id, data)| Document {
						id: *id,
						data: data.clone(),
					})
					.collect()
			})
			.unwrap_or_default())
	}

	fn changes(&self) -> broadcast::Receiver<StoreChange> {
		self.changes.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[tokio::test]
	async fn test_create_get_update() {
		let store = MemoryStore::new();
		let id = store
			.create("things", json!({"name": "a", "isActive": true}))
			.await
			.unwrap();

		let doc = store.get("things", id).await.unwrap().unwrap();
		assert_eq!(doc.data["name"], "a");

		store
			.update("things", id, json!({"name": "b"}))
			.await
			.unwrap();
		let doc = store.get("things", id).await.unwrap().unwrap();
		assert_eq!(doc.data["name"], "b");
		// Untouched fields survive a partial update
		assert_eq!(doc.data["isActive"], true);
	}

	#[tokio::test]
	async fn test_update_unknown_document() {
		let store = MemoryStore::new();
		let err = store
			.update("things", Uuid::new_v4(), json!({"name": "x"}))
			.await
			.unwrap_err();
		assert!(matches!(err, StoreError::DocumentNotFound { .. }));
	}

	#[tokio::test]
	async fn test_query_eq_dot_path() {
		let store = MemoryStore::new();
		store
			.create("products", json!({"supplier": {"supplierId": "s1"}}))
			.await
			.unwrap();
		store
			.create("products", json!({"supplier": {"supplierId": "s2"}}))
			.await
			.unwrap();

		let hits = store
			.query_eq("products", "supplier.supplierId", &json!("s1"))
			.await
			.unwrap();
		assert_eq!(hits.len(), 1);
	}

	#[tokio::test]
	async fn test_change_feed() {
		let store = MemoryStore::new();
		let mut changes = store.changes();
		let id = store.create("things", json!({"n": 1})).await.unwrap();
		let change = changes.recv().await.unwrap();
		assert_eq!(change.collection, "things");
		assert_eq!(change.id, id);
	}
}
