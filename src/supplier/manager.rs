//! Supplier management
//!
//! Suppliers are the one entity edited in place after creation. A company
//! rename fans out into the embedded `supplier` object of every referencing
//! product, with the same commit-then-cascade contract the taxonomy renames
//! use.

use super::error::{SupplierError, SupplierResult};
use crate::domain::supplier::{Supplier, SupplierContact, SUPPLIER_COLLECTION};
use crate::infrastructure::events::{Event, EventBus};
use crate::infrastructure::store::{to_document_value, DocumentStore, LiveQuery};
use crate::product::cascade;
use crate::session::ActingUser;
use crate::shared::text::compact;
use crate::shared::{generate_code, CodeKind};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Caller-editable supplier fields, shared by create and update
#[derive(Debug, Clone, Default)]
pub struct SupplierFields {
	pub company: String,
	pub internal_code: String,
	pub addresses: Vec<String>,
	pub emails: Vec<String>,
	pub website: String,
	pub contacts: Vec<SupplierContact>,
	pub forte_products: Vec<String>,
	pub products: Vec<String>,
	pub certificates: Vec<String>,
}

/// Manages supplier records
pub struct SupplierManager {
	pub(super) store: Arc<dyn DocumentStore>,
	pub(super) events: Arc<EventBus>,
	// Serializes dedupe-then-write pairs (and whole upload batches); the
	// store has no transactions, so concurrent creates of the same company
	// would otherwise both pass the duplicate check
	pub(super) write_lock: Mutex<()>,
}

impl SupplierManager {
	pub fn new(store: Arc<dyn DocumentStore>, events: Arc<EventBus>) -> Self {
		Self {
			store,
			events,
			write_lock: Mutex::new(()),
		}
	}

	/// Live view of the active suppliers, sorted by company name
	pub async fn list_active(&self) -> LiveQuery<Supplier> {
		LiveQuery::start(
			self.store.clone(),
			SUPPLIER_COLLECTION.to_string(),
			|docs| {
				let mut suppliers: Vec<Supplier> = docs
					.iter()
					.filter_map(|doc| doc.deserialize::<Supplier>().ok())
					.filter(|s| s.is_active)
					.collect();
				suppliers.sort_by(|a, b| a.company.cmp(&b.company));
				suppliers
			},
		)
		.await
	}

	/// Fetch a supplier by id, regardless of its active flag
	pub async fn get(&self, id: Uuid) -> SupplierResult<Supplier> {
		let doc = self
			.store
			.get(SUPPLIER_COLLECTION, id)
			.await?
			.ok_or(SupplierError::NotFound(id))?;
		Ok(doc.deserialize()?)
	}

	/// Create a supplier. The company name must be unique among active
	/// suppliers, compared case-insensitively; at least one non-blank address
	/// is required.
	#[instrument(skip(self, fields, user), fields(user = %user.reference_id))]
	pub async fn create(
		&self,
		fields: SupplierFields,
		user: &ActingUser,
	) -> SupplierResult<Supplier> {
		let _guard = self.write_lock.lock().await;
		let company = fields.company.trim().to_string();
		if self.active_company_exists(&company, None).await?.is_some() {
			return Err(SupplierError::DuplicateCompany(company));
		}
		self.insert(fields, user).await
	}

	/// Insert a validated-but-unchecked supplier; callers are responsible for
	/// the duplicate-company check (the bulk upload checks against its own
	/// batch snapshot instead of rescanning per row)
	pub(super) async fn insert(
		&self,
		fields: SupplierFields,
		user: &ActingUser,
	) -> SupplierResult<Supplier> {
		let (company, addresses, emails) = validate(&fields)?;
		let now = Utc::now();
		let mut supplier = Supplier {
			id: Uuid::nil(),
			supplier_id: None,
			company_code: generate_code(&company, CodeKind::Supplier),
			company,
			internal_code: fields.internal_code.trim().to_string(),
			addresses,
			emails,
			website: fields.website.trim().to_string(),
			contacts: fields.contacts,
			forte_products: compact(&fields.forte_products),
			products: compact(&fields.products),
			certificates: compact(&fields.certificates),
			created_by: user.user_id.clone(),
			reference_id: user.reference_id.clone(),
			is_active: true,
			created_at: now,
			updated_at: None,
			deleted_by: None,
			deleted_at: None,
		};
		supplier.id = self
			.store
			.create(SUPPLIER_COLLECTION, to_document_value(&supplier)?)
			.await?;

		// Second write: the document references itself so products can query
		// suppliers through a body field
		supplier.supplier_id = Some(supplier.id);
		self.store
			.update(
				SUPPLIER_COLLECTION,
				supplier.id,
				json!({ "supplierId": supplier.id }),
			)
			.await?;

		info!(
			"Created supplier \"{}\" ({}) with code {}",
			supplier.company, supplier.id, supplier.company_code
		);
		self.events.emit(Event::SupplierCreated {
			id: supplier.id,
			company: supplier.company.clone(),
		});
		Ok(supplier)
	}

	/// Replace a supplier's editable fields. A changed company name fans out
	/// into every referencing product; a partial fan-out returns
	/// `FanoutPartialFailure` with the edit already committed.
	#[instrument(skip(self, fields, user), fields(user = %user.reference_id))]
	pub async fn update(
		&self,
		id: Uuid,
		fields: SupplierFields,
		user: &ActingUser,
	) -> SupplierResult<Supplier> {
		let _guard = self.write_lock.lock().await;
		let existing = self.get(id).await?;
		let (company, addresses, emails) = validate(&fields)?;
		if self
			.active_company_exists(&company, Some(id))
			.await?
			.is_some()
		{
			return Err(SupplierError::DuplicateCompany(company));
		}

		self.store
			.update(
				SUPPLIER_COLLECTION,
				id,
				json!({
					"company": company,
					"internalCode": fields.internal_code.trim(),
					"addresses": addresses,
					"emails": emails,
					"website": fields.website.trim(),
					"contacts": fields.contacts,
					"forteProducts": compact(&fields.forte_products),
					"products": compact(&fields.products),
					"certificates": compact(&fields.certificates),
					"referenceID": user.reference_id,
					"updatedAt": Utc::now(),
				}),
			)
			.await?;

		let mut products_updated = 0;
		if existing.company != company {
			let outcome = cascade::rewrite_supplier_company(&self.store, id, &company).await?;
			products_updated = outcome.updated;
			if !outcome.failures.is_empty() {
				warn!(
					"Supplier {} rename left {} product(s) stale",
					id,
					outcome.failed()
				);
				self.events.emit(Event::SupplierUpdated {
					id,
					products_updated,
				});
				return Err(SupplierError::FanoutPartialFailure {
					id,
					updated: outcome.updated,
					failed: outcome.failed(),
				});
			}
		}

		info!(
			"Updated supplier {} ({} product(s) rewritten)",
			id, products_updated
		);
		self.events.emit(Event::SupplierUpdated {
			id,
			products_updated,
		});
		self.get(id).await
	}

	/// Soft-delete a supplier; products referencing it are left untouched
	#[instrument(skip(self, user), fields(user = %user.reference_id))]
	pub async fn soft_delete(&self, id: Uuid, user: &ActingUser) -> SupplierResult<()> {
		self.get(id).await?;
		self.store
			.update(
				SUPPLIER_COLLECTION,
				id,
				json!({
					"isActive": false,
					"deletedBy": user.reference_id,
					"deletedAt": Utc::now(),
				}),
			)
			.await?;

		info!("Soft-deleted supplier {}", id);
		self.events.emit(Event::SupplierDeleted { id });
		Ok(())
	}

	/// Re-run the company fan-out with the supplier's current name, healing
	/// products a previous partial fan-out left stale. Idempotent.
	#[instrument(skip(self))]
	pub async fn resync(&self, id: Uuid) -> SupplierResult<usize> {
		let supplier = self.get(id).await?;
		let outcome =
			cascade::rewrite_supplier_company(&self.store, id, &supplier.company).await?;
		if !outcome.failures.is_empty() {
			return Err(SupplierError::FanoutPartialFailure {
				id,
				updated: outcome.updated,
				failed: outcome.failed(),
			});
		}
		Ok(outcome.updated)
	}

	/// The active supplier with this company name, compared case-insensitively
	pub(super) async fn active_company_exists(
		&self,
		company: &str,
		exclude: Option<Uuid>,
	) -> SupplierResult<Option<Uuid>> {
		let needle = company.to_lowercase();
		let docs = self.store.list(SUPPLIER_COLLECTION).await?;
		Ok(docs
			.iter()
			.filter(|doc| Some(doc.id) != exclude)
			.find(|doc| {
				matches!(
					doc.deserialize::<Supplier>(),
					Ok(s) if s.is_active && s.company.to_lowercase() == needle
				)
			})
			.map(|doc| doc.id))
	}
}

/// Shared create/update validation; returns the cleaned company, addresses
/// and emails
fn validate(fields: &SupplierFields) -> SupplierResult<(String, Vec<String>, Vec<String>)> {
	let company = fields.company.trim().to_string();
	if company.is_empty() {
		return Err(SupplierError::MissingCompany);
	}

	let addresses = compact(&fields.addresses);
	if addresses.is_empty() {
		return Err(SupplierError::MissingAddress);
	}

	let emails = compact(&fields.emails);
	for email in &emails {
		// Minimal shape check, matching the upload path
		if !email.contains('@') {
			return Err(SupplierError::InvalidEmail(email.clone()));
		}
	}

	Ok((company, addresses, emails))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::infrastructure::store::{Document, MemoryStore, StoreChange, StoreResult};
	use async_trait::async_trait;
	use serde_json::Value;
	use tokio::sync::broadcast;

	fn manager() -> SupplierManager {
		SupplierManager::new(Arc::new(MemoryStore::new()), Arc::new(EventBus::default()))
	}

	/// Delegating store that yields before answering reads, like any
	/// networked backend would
	struct YieldingStore(MemoryStore);

	#[async_trait]
	impl DocumentStore for YieldingStore {
		async fn create(&self, collection: &str, data: Value) -> StoreResult<Uuid> {
			tokio::task::yield_now().await;
			self.0.create(collection, data).await
		}

		async fn update(&self, collection: &str, id: Uuid, patch: Value) -> StoreResult<()> {
			self.0.update(collection, id, patch).await
		}

		async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>> {
			tokio::task::yield_now().await;
			self.0.get(collection, id).await
		}

		async fn query_eq(
			&self,
			collection: &str,
			field: &str,
			value: &Value,
		) -> StoreResult<Vec<Document>> {
			tokio::task::yield_now().await;
			self.0.query_eq(collection, field, value).await
		}

		async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
			tokio::task::yield_now().await;
			self.0.list(collection).await
		}

		fn changes(&self) -> broadcast::Receiver<StoreChange> {
			self.0.changes()
		}
	}

	fn user() -> ActingUser {
		ActingUser {
			user_id: "u1".into(),
			reference_id: "REF-1".into(),
		}
	}

	fn fields(company: &str) -> SupplierFields {
		SupplierFields {
			company: company.into(),
			addresses: vec!["1 Main St".into()],
			emails: vec!["sales@example.com".into()],
			..Default::default()
		}
	}

	#[tokio::test]
	async fn test_create_writes_back_supplier_id() {
		let mgr = manager();
		let supplier = mgr.create(fields("Acme"), &user()).await.unwrap();

		assert_eq!(supplier.supplier_id, Some(supplier.id));
		assert!(supplier.company_code.contains("-SUPP-"));

		let stored = mgr.get(supplier.id).await.unwrap();
		assert_eq!(stored.supplier_id, Some(supplier.id));
	}

	#[tokio::test]
	async fn test_duplicate_company_is_case_insensitive() {
		let mgr = manager();
		let user = user();
		mgr.create(fields("Acme Lighting"), &user).await.unwrap();

		let err = mgr
			.create(fields("ACME LIGHTING"), &user)
			.await
			.unwrap_err();
		assert!(matches!(err, SupplierError::DuplicateCompany(_)));
	}

	#[tokio::test]
	async fn test_concurrent_creates_of_same_company_admit_one() {
		let store: Arc<dyn DocumentStore> = Arc::new(YieldingStore(MemoryStore::new()));
		let mgr = SupplierManager::new(store.clone(), Arc::new(EventBus::default()));
		let user = user();

		let (a, b) = tokio::join!(
			mgr.create(fields("Acme"), &user),
			mgr.create(fields("ACME"), &user)
		);

		assert_eq!(a.is_ok() as usize + b.is_ok() as usize, 1);
		let err = a.err().or(b.err()).unwrap();
		assert!(matches!(err, SupplierError::DuplicateCompany(_)));

		let docs = store.list(SUPPLIER_COLLECTION).await.unwrap();
		assert_eq!(docs.len(), 1);
	}

	#[tokio::test]
	async fn test_validation_rejects_bad_input() {
		let mgr = manager();
		let user = user();

		let err = mgr.create(fields("   "), &user).await.unwrap_err();
		assert!(matches!(err, SupplierError::MissingCompany));

		let mut no_address = fields("Acme");
		no_address.addresses = vec!["  ".into()];
		let err = mgr.create(no_address, &user).await.unwrap_err();
		assert!(matches!(err, SupplierError::MissingAddress));

		let mut bad_email = fields("Acme");
		bad_email.emails = vec!["not-an-email".into()];
		let err = mgr.create(bad_email, &user).await.unwrap_err();
		assert!(matches!(err, SupplierError::InvalidEmail(_)));
	}

	#[tokio::test]
	async fn test_soft_delete_frees_company_name() {
		let mgr = manager();
		let user = user();
		let supplier = mgr.create(fields("Acme"), &user).await.unwrap();
		mgr.soft_delete(supplier.id, &user).await.unwrap();

		let again = mgr.create(fields("acme"), &user).await.unwrap();
		assert_ne!(again.id, supplier.id);

		let old = mgr.get(supplier.id).await.unwrap();
		assert!(!old.is_active);
		assert_eq!(old.deleted_by.as_deref(), Some("REF-1"));
	}

	#[tokio::test]
	async fn test_update_stamps_and_keeps_created_fields() {
		let mgr = manager();
		let user = user();
		let supplier = mgr.create(fields("Acme"), &user).await.unwrap();

		let mut edited = fields("Acme");
		edited.website = "https://acme.example".into();
		let updated = mgr.update(supplier.id, edited, &user).await.unwrap();

		assert_eq!(updated.website, "https://acme.example");
		assert!(updated.updated_at.is_some());
		assert_eq!(updated.created_by, "u1");
		assert_eq!(updated.company_code, supplier.company_code);
	}
}
