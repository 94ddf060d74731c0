//! Partial fan-out recovery: a rename whose product rewrites partly fail
//! surfaces the failure without rolling back, and a later resync converges
//! the stale documents.

use async_trait::async_trait;
use catalog_core::domain::product::{SupplierRef, PRODUCT_COLLECTION};
use catalog_core::domain::taxonomy::TaxonomyLevel;
use catalog_core::domain::UserProfile;
use catalog_core::infrastructure::store::{
	Document, DocumentStore, MemoryStore, StoreChange, StoreError, StoreResult,
};
use catalog_core::product::NewProduct;
use catalog_core::session::StaticResolver;
use catalog_core::taxonomy::TaxonomyError;
use catalog_core::Core;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Store wrapper that can be told to fail product updates
struct FlakyStore {
	inner: MemoryStore,
	fail_product_updates: AtomicBool,
}

impl FlakyStore {
	fn new() -> Self {
		Self {
			inner: MemoryStore::new(),
			fail_product_updates: AtomicBool::new(false),
		}
	}

	fn set_failing(&self, failing: bool) {
		self.fail_product_updates.store(failing, Ordering::SeqCst);
	}
}

#[async_trait]
impl DocumentStore for FlakyStore {
	async fn create(&self, collection: &str, data: Value) -> StoreResult<Uuid> {
		self.inner.create(collection, data).await
	}

	async fn update(&self, collection: &str, id: Uuid, patch: Value) -> StoreResult<()> {
		if collection == PRODUCT_COLLECTION && self.fail_product_updates.load(Ordering::SeqCst) {
			return Err(StoreError::Backend("injected write failure".to_string()));
		}
		self.inner.update(collection, id, patch).await
	}

	async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>> {
		self.inner.get(collection, id).await
	}

	async fn query_eq(
		&self,
		collection: &str,
		field: &str,
		value: &Value,
	) -> StoreResult<Vec<Document>> {
		self.inner.query_eq(collection, field, value).await
	}

	async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
		self.inner.list(collection).await
	}

	fn changes(&self) -> broadcast::Receiver<StoreChange> {
		self.inner.changes()
	}
}

#[tokio::test]
async fn test_rename_survives_partial_fanout_and_resync_heals() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.try_init();

	let dir = tempfile::tempdir().unwrap();
	let flaky = Arc::new(FlakyStore::new());
	let resolver = Arc::new(StaticResolver::new().with_user(
		"u1",
		UserProfile {
			firstname: "Ada".into(),
			lastname: "Reyes".into(),
			role: "Staff".into(),
			reference_id: "REF-1".into(),
			email: "ada@example.com".into(),
		},
	));
	let core = Core::new_with_store(dir.path().to_path_buf(), flaky.clone(), resolver)
		.await
		.unwrap();
	core.session.sign_in("u1").await.unwrap();
	let user = core.session.acting_user().await.unwrap();

	// Tree plus one product referencing it
	let mut selection = core.selection().await;
	let root = selection.add_classification("Lighting", &user).await.unwrap();
	selection.select_classification(root.id).await.unwrap();
	let indoor = selection.add_category_type("Indoor", &user).await.unwrap();
	selection.select_category_type(indoor.id).await.unwrap();
	let snapshot = selection.snapshot().unwrap();

	let product = core
		.products
		.create(
			NewProduct {
				product_name: "Slim Downlight".into(),
				supplier: SupplierRef {
					supplier_id: Uuid::new_v4(),
					company: "Acme".into(),
				},
				technical_specifications: vec![],
				main_image: None,
			},
			&snapshot,
			&user,
		)
		.await
		.unwrap();

	// The node rename commits even though every product rewrite fails
	flaky.set_failing(true);
	let err = core
		.taxonomy
		.rename(TaxonomyLevel::CategoryType, indoor.id, "Interior", &user)
		.await
		.unwrap_err();
	match err {
		TaxonomyError::FanoutPartialFailure {
			updated, failed, ..
		} => {
			assert_eq!(updated, 0);
			assert_eq!(failed, 1);
		}
		other => panic!("expected FanoutPartialFailure, got {other}"),
	}

	let node = core
		.taxonomy
		.fetch(TaxonomyLevel::CategoryType, indoor.id)
		.await
		.unwrap();
	assert_eq!(node.name, "Interior");

	// The product still embeds the stale name
	let doc = core
		.store
		.get(PRODUCT_COLLECTION, product.id)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(doc.data["categoryTypes"][0]["categoryTypeName"], "Indoor");

	// Once writes succeed again, resync converges the copy
	flaky.set_failing(false);
	let report = core
		.taxonomy
		.resync(TaxonomyLevel::CategoryType, indoor.id)
		.await
		.unwrap();
	assert_eq!(report.products_updated, 1);

	let doc = core
		.store
		.get(PRODUCT_COLLECTION, product.id)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(doc.data["categoryTypes"][0]["categoryTypeName"], "Interior");

	// A second resync is a harmless rewrite of already-correct copies
	let report = core
		.taxonomy
		.resync(TaxonomyLevel::CategoryType, indoor.id)
		.await
		.unwrap();
	assert_eq!(report.products_updated, 1);
}
