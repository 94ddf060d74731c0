//! Product creation
//!
//! Products are written exactly once, embedding denormalized snapshots of the
//! taxonomy selection and the chosen supplier. After creation only the rename
//! cascades touch them.

use super::error::{ProductError, ProductResult};
use crate::domain::product::{Product, SupplierRef, TechSpec, PRODUCT_COLLECTION};
use crate::infrastructure::events::{Event, EventBus};
use crate::infrastructure::store::{to_document_value, DocumentStore, LiveQuery};
use crate::session::ActingUser;
use crate::shared::{generate_code, CodeKind};
use crate::taxonomy::TaxonomySnapshot;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

/// Caller-supplied fields for a new product; everything else is derived from
/// the taxonomy snapshot and the acting user
#[derive(Debug, Clone)]
pub struct NewProduct {
	pub product_name: String,
	pub supplier: SupplierRef,
	pub technical_specifications: Vec<TechSpec>,
	pub main_image: Option<String>,
}

/// Writes product documents
pub struct ProductWriter {
	store: Arc<dyn DocumentStore>,
	events: Arc<EventBus>,
}

impl ProductWriter {
	pub fn new(store: Arc<dyn DocumentStore>, events: Arc<EventBus>) -> Self {
		Self { store, events }
	}

	/// Live view of the active products, sorted by name
	pub async fn list_active(&self) -> LiveQuery<Product> {
		LiveQuery::start(
			self.store.clone(),
			PRODUCT_COLLECTION.to_string(),
			|docs| {
				let mut products: Vec<Product> = docs
					.iter()
					.filter_map(|doc| doc.deserialize::<Product>().ok())
					.filter(|p| p.is_active)
					.collect();
				products.sort_by(|a, b| a.product_name.cmp(&b.product_name));
				products
			},
		)
		.await
	}

	/// Create a product from the resolved taxonomy selection.
	///
	/// Every selected product type must sit under one of the selected category
	/// types; blank technical-specification rows are dropped before
	/// persisting.
	#[instrument(skip(self, new, snapshot, user), fields(user = %user.reference_id))]
	pub async fn create(
		&self,
		new: NewProduct,
		snapshot: &TaxonomySnapshot,
		user: &ActingUser,
	) -> ProductResult<Product> {
		let product_name = new.product_name.trim().to_string();
		if product_name.is_empty() {
			return Err(ProductError::EmptyName);
		}

		for product_type in &snapshot.product_types {
			let owned = snapshot
				.category_types
				.iter()
				.any(|c| c.category_type_id == product_type.category_type_id);
			if !owned {
				return Err(ProductError::OrphanProductType(
					product_type.product_type_id,
				));
			}
		}

		let technical_specifications: Vec<TechSpec> = new
			.technical_specifications
			.into_iter()
			.filter(|spec| !spec.is_blank())
			.collect();

		let mut product = Product {
			id: uuid::Uuid::nil(),
			product_code: generate_code(&product_name, CodeKind::Product),
			product_name,
			classification_id: snapshot.classification_id,
			classification_name: snapshot.classification_name.clone(),
			supplier: new.supplier,
			product_types: snapshot.product_types.clone(),
			category_types: snapshot.category_types.clone(),
			technical_specifications,
			main_image: new.main_image,
			created_by: user.user_id.clone(),
			reference_id: user.reference_id.clone(),
			is_active: true,
			created_at: Utc::now(),
		};
		product.id = self
			.store
			.create(PRODUCT_COLLECTION, to_document_value(&product)?)
			.await?;

		info!(
			"Created product \"{}\" ({}) with code {}",
			product.product_name, product.id, product.product_code
		);
		self.events.emit(Event::ProductCreated {
			id: product.id,
			product_code: product.product_code.clone(),
		});
		Ok(product)
	}
}
