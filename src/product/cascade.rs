//! Denormalized name rewrites
//!
//! When a taxonomy node or a supplier is renamed, every product document
//! embedding the old name must be rewritten. Each helper queries the
//! referencing products by id and patches only the embedded name field(s),
//! dispatching all per-product writes concurrently and joining them before
//! reporting. These rewrites are idempotent: re-running one after a partial
//! failure converges the remaining stale copies.

use crate::domain::product::PRODUCT_COLLECTION;
use crate::infrastructure::store::{Document, DocumentStore, StoreResult};
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Result of one fan-out pass over the referencing products
#[derive(Debug, Default)]
pub struct CascadeOutcome {
	/// Product documents successfully rewritten
	pub updated: usize,
	/// Product documents whose rewrite failed; their embedded names stay
	/// stale until the cascade is re-run
	pub failures: Vec<Uuid>,
}

impl CascadeOutcome {
	pub fn failed(&self) -> usize {
		self.failures.len()
	}
}

/// Rewrite `classificationName` on every product referencing the
/// classification
pub async fn rewrite_classification_name(
	store: &Arc<dyn DocumentStore>,
	classification_id: Uuid,
	new_name: &str,
) -> StoreResult<CascadeOutcome> {
	let docs = store
		.query_eq(
			PRODUCT_COLLECTION,
			"classificationId",
			&json!(classification_id),
		)
		.await?;
	apply(store, docs, |_| {
		Some(json!({ "classificationName": new_name }))
	})
	.await
}

/// Rewrite the matching entry of each product's `categoryTypes` array,
/// leaving sibling entries untouched
pub async fn rewrite_category_type_name(
	store: &Arc<dyn DocumentStore>,
	category_type_id: Uuid,
	new_name: &str,
) -> StoreResult<CascadeOutcome> {
	let docs = store
		.query_eq(
			PRODUCT_COLLECTION,
			"categoryTypes.categoryTypeId",
			&json!(category_type_id),
		)
		.await?;
	apply(store, docs, |doc| {
		let entries = rename_entries(
			doc.data.get("categoryTypes")?,
			"categoryTypeId",
			category_type_id,
			"categoryTypeName",
			new_name,
		);
		Some(json!({ "categoryTypes": entries }))
	})
	.await
}

/// Rewrite the matching entry of each product's `productTypes` array
pub async fn rewrite_product_type_name(
	store: &Arc<dyn DocumentStore>,
	product_type_id: Uuid,
	new_name: &str,
) -> StoreResult<CascadeOutcome> {
	let docs = store
		.query_eq(
			PRODUCT_COLLECTION,
			"productTypes.productTypeId",
			&json!(product_type_id),
		)
		.await?;
	apply(store, docs, |doc| {
		let entries = rename_entries(
			doc.data.get("productTypes")?,
			"productTypeId",
			product_type_id,
			"productTypeName",
			new_name,
		);
		Some(json!({ "productTypes": entries }))
	})
	.await
}

/// Rewrite `supplier.company` on every product referencing the supplier
pub async fn rewrite_supplier_company(
	store: &Arc<dyn DocumentStore>,
	supplier_id: Uuid,
	new_company: &str,
) -> StoreResult<CascadeOutcome> {
	let docs = store
		.query_eq(PRODUCT_COLLECTION, "supplier.supplierId", &json!(supplier_id))
		.await?;
	apply(store, docs, |doc| {
		// Replace company inside the embedded object so the shallow-merge
		// update patches `supplier` as one field
		let mut supplier = doc.data.get("supplier")?.clone();
		supplier
			.as_object_mut()?
			.insert("company".to_string(), json!(new_company));
		Some(json!({ "supplier": supplier }))
	})
	.await
}

/// Dispatch one patch per document concurrently and tally the outcome
async fn apply<F>(
	store: &Arc<dyn DocumentStore>,
	docs: Vec<Document>,
	patch_for: F,
) -> StoreResult<CascadeOutcome>
where
	F: Fn(&Document) -> Option<Value>,
{
	let writes = docs.iter().filter_map(|doc| {
		let patch = patch_for(doc)?;
		let store = store.clone();
		let id = doc.id;
		Some(async move {
			store
				.update(PRODUCT_COLLECTION, id, patch)
				.await
				.map_err(|e| {
					warn!("Cascade write to product {} failed: {}", id, e);
					id
				})
		})
	});

	let mut outcome = CascadeOutcome::default();
	for result in join_all(writes).await {
		match result {
			Ok(()) => outcome.updated += 1,
			Err(id) => outcome.failures.push(id),
		}
	}
	Ok(outcome)
}

/// Copy of an embedded-ref array with the matching entry renamed
fn rename_entries(
	entries: &Value,
	id_field: &str,
	id: Uuid,
	name_field: &str,
	new_name: &str,
) -> Value {
	let id_value = json!(id);
	match entries {
		Value::Array(items) => Value::Array(
			items
				.iter()
				.map(|entry| {
					let mut entry = entry.clone();
					if entry.get(id_field) == Some(&id_value) {
						if let Some(fields) = entry.as_object_mut() {
							fields.insert(name_field.to_string(), json!(new_name));
						}
					}
					entry
				})
				.collect(),
		),
		other => other.clone(),
	}
}
