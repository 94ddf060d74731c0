//! Taxonomy tree management
//!
//! Owns every write to the taxonomy collection and the rename cascades into
//! product documents. A node's own rename always commits first; the fan-out
//! into products runs afterwards, and a partial fan-out surfaces as
//! [`TaxonomyError::FanoutPartialFailure`] without rolling the rename back.
//! [`TaxonomyManager::resync`] re-runs the cascade until every embedded copy
//! converges.

use super::error::{TaxonomyError, TaxonomyResult};
use crate::domain::taxonomy::{TaxonomyLevel, TaxonomyNode, TAXONOMY_COLLECTION};
use crate::infrastructure::events::{Event, EventBus};
use crate::infrastructure::store::{to_document_value, DocumentStore, LiveQuery, StoreError};
use crate::product::cascade::{self, CascadeOutcome};
use crate::session::ActingUser;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// How many product documents a rename cascade touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeReport {
	pub products_updated: usize,
}

/// Manages the classification tree
pub struct TaxonomyManager {
	store: Arc<dyn DocumentStore>,
	events: Arc<EventBus>,
	// Serializes every dedupe-then-write pair; the store has no transactions,
	// so without it two concurrent adds of the same name both pass the check
	write_lock: Mutex<()>,
}

impl TaxonomyManager {
	pub fn new(store: Arc<dyn DocumentStore>, events: Arc<EventBus>) -> Self {
		Self {
			store,
			events,
			write_lock: Mutex::new(()),
		}
	}

	/// Live view of the active nodes at one level under one parent, sorted by
	/// name. Classifications pass `parent_id: None`.
	pub async fn list_active(
		&self,
		level: TaxonomyLevel,
		parent_id: Option<Uuid>,
	) -> LiveQuery<TaxonomyNode> {
		LiveQuery::start(
			self.store.clone(),
			TAXONOMY_COLLECTION.to_string(),
			move |docs| {
				let mut nodes: Vec<TaxonomyNode> = docs
					.iter()
					.filter_map(|doc| doc.deserialize::<TaxonomyNode>().ok())
					.filter(|node| {
						node.is_active && node.level == level && node.parent_id == parent_id
					})
					.collect();
				nodes.sort_by(|a, b| a.name.cmp(&b.name));
				nodes
			},
		)
		.await
	}

	/// Create a node under `parent_id` (which must be `None` exactly for
	/// classifications). Duplicate names among active siblings are rejected,
	/// case-sensitively.
	#[instrument(skip(self, user), fields(user = %user.reference_id))]
	pub async fn add(
		&self,
		level: TaxonomyLevel,
		parent_id: Option<Uuid>,
		name: &str,
		user: &ActingUser,
	) -> TaxonomyResult<TaxonomyNode> {
		let name = name.trim();
		if name.is_empty() {
			return Err(TaxonomyError::EmptyName(level));
		}

		// Root nodes never carry a parent; lower levels require a live one
		let parent_id = match level.parent() {
			None => None,
			Some(parent_level) => {
				let parent_id = parent_id
					.ok_or(TaxonomyError::MissingParentSelection(parent_level))?;
				let parent = self.fetch(parent_level, parent_id).await?;
				if !parent.is_active {
					return Err(TaxonomyError::NodeNotFound {
						level: parent_level,
						id: parent_id,
					});
				}
				Some(parent_id)
			}
		};

		let mut node = TaxonomyNode::new(level, parent_id, name);
		{
			let _guard = self.write_lock.lock().await;
			if self.active_sibling_exists(level, parent_id, name, None).await? {
				return Err(TaxonomyError::DuplicateName {
					level,
					name: name.to_string(),
				});
			}
			node.id = self
				.store
				.create(TAXONOMY_COLLECTION, to_document_value(&node)?)
				.await?;
		}

		info!("Added {} \"{}\" ({})", level, node.name, node.id);
		self.events.emit(Event::TaxonomyNodeAdded {
			level,
			id: node.id,
			parent_id,
			name: node.name.clone(),
		});
		Ok(node)
	}

	/// Rename a node and fan the new name out into every product embedding it.
	///
	/// The rename itself commits before the fan-out; a partial fan-out returns
	/// `FanoutPartialFailure` with the renamed node already in place.
	#[instrument(skip(self, user), fields(user = %user.reference_id))]
	pub async fn rename(
		&self,
		level: TaxonomyLevel,
		id: Uuid,
		new_name: &str,
		user: &ActingUser,
	) -> TaxonomyResult<CascadeReport> {
		let new_name = new_name.trim();
		if new_name.is_empty() {
			return Err(TaxonomyError::EmptyName(level));
		}

		{
			let _guard = self.write_lock.lock().await;
			let node = self.fetch(level, id).await?;
			if node.name == new_name {
				return Ok(CascadeReport {
					products_updated: 0,
				});
			}
			if self
				.active_sibling_exists(level, node.parent_id, new_name, Some(id))
				.await?
			{
				return Err(TaxonomyError::DuplicateName {
					level,
					name: new_name.to_string(),
				});
			}

			self.store
				.update(TAXONOMY_COLLECTION, id, json!({ "name": new_name }))
				.await?;
		}

		let outcome = self.fan_out(level, id, new_name).await?;
		info!(
			"Renamed {} {} to \"{}\", {} product(s) updated",
			level, id, new_name, outcome.updated
		);
		self.events.emit(Event::TaxonomyNodeRenamed {
			level,
			id,
			name: new_name.to_string(),
			products_updated: outcome.updated,
		});

		if !outcome.failures.is_empty() {
			warn!(
				"Rename of {} {} left {} product(s) stale",
				level,
				id,
				outcome.failed()
			);
			return Err(TaxonomyError::FanoutPartialFailure {
				level,
				id,
				updated: outcome.updated,
				failed: outcome.failed(),
			});
		}
		Ok(CascadeReport {
			products_updated: outcome.updated,
		})
	}

	/// Soft-delete a node: it disappears from active listings but keeps its
	/// document, stamped with who deleted it and when. Children and products
	/// referencing the node are left untouched.
	#[instrument(skip(self, user), fields(user = %user.reference_id))]
	pub async fn soft_delete(
		&self,
		level: TaxonomyLevel,
		id: Uuid,
		user: &ActingUser,
	) -> TaxonomyResult<()> {
		self.fetch(level, id).await?;
		self.store
			.update(
				TAXONOMY_COLLECTION,
				id,
				json!({
					"isActive": false,
					"deletedBy": user.reference_id,
					"deletedAt": Utc::now(),
				}),
			)
			.await?;

		info!("Soft-deleted {} {}", level, id);
		self.events.emit(Event::TaxonomyNodeDeleted { level, id });
		Ok(())
	}

	/// Re-run the rename cascade with the node's current name, healing product
	/// documents a previous partial fan-out left stale. Idempotent.
	#[instrument(skip(self))]
	pub async fn resync(&self, level: TaxonomyLevel, id: Uuid) -> TaxonomyResult<CascadeReport> {
		let node = self.fetch(level, id).await?;
		let outcome = self.fan_out(level, id, &node.name).await?;
		if !outcome.failures.is_empty() {
			return Err(TaxonomyError::FanoutPartialFailure {
				level,
				id,
				updated: outcome.updated,
				failed: outcome.failed(),
			});
		}
		Ok(CascadeReport {
			products_updated: outcome.updated,
		})
	}

	/// Fetch a node by id, checking it sits at the expected level
	pub async fn fetch(&self, level: TaxonomyLevel, id: Uuid) -> TaxonomyResult<TaxonomyNode> {
		let doc = self
			.store
			.get(TAXONOMY_COLLECTION, id)
			.await?
			.ok_or(TaxonomyError::NodeNotFound { level, id })?;
		let node: TaxonomyNode = doc.deserialize()?;
		if node.level != level {
			return Err(TaxonomyError::NodeNotFound { level, id });
		}
		Ok(node)
	}

	async fn fan_out(
		&self,
		level: TaxonomyLevel,
		id: Uuid,
		name: &str,
	) -> Result<CascadeOutcome, StoreError> {
		match level {
			TaxonomyLevel::Classification => {
				cascade::rewrite_classification_name(&self.store, id, name).await
			}
			TaxonomyLevel::CategoryType => {
				cascade::rewrite_category_type_name(&self.store, id, name).await
			}
			TaxonomyLevel::ProductType => {
				cascade::rewrite_product_type_name(&self.store, id, name).await
			}
		}
	}

	async fn active_sibling_exists(
		&self,
		level: TaxonomyLevel,
		parent_id: Option<Uuid>,
		name: &str,
		exclude: Option<Uuid>,
	) -> Result<bool, StoreError> {
		let docs = self
			.store
			.query_eq(TAXONOMY_COLLECTION, "name", &json!(name))
			.await?;
		Ok(docs.iter().any(|doc| {
			if Some(doc.id) == exclude {
				return false;
			}
			matches!(
				doc.deserialize::<TaxonomyNode>(),
				Ok(node) if node.is_active && node.level == level && node.parent_id == parent_id
			)
		}))
	}
}
