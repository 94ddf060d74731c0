//! Taxonomy selection state machine
//!
//! Product creation walks the tree top-down: pick a classification, pick
//! category types under it, pick product types under those. [`SelectionState`]
//! enforces the walk and keeps live feeds scoped to the current picks.
//! Changing the classification drops every lower feed and subscription before
//! resubscribing, so a stale feed can never repopulate a cleared level.

use super::error::{TaxonomyError, TaxonomyResult};
use super::manager::TaxonomyManager;
use crate::domain::product::{CategoryTypeRef, ProductTypeRef};
use crate::domain::taxonomy::{TaxonomyLevel, TaxonomyNode};
use crate::infrastructure::store::LiveQuery;
use crate::session::ActingUser;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// The resolved selection a new product snapshots its taxonomy refs from
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomySnapshot {
	pub classification_id: Uuid,
	pub classification_name: String,
	pub category_types: Vec<CategoryTypeRef>,
	pub product_types: Vec<ProductTypeRef>,
}

/// One product-creation session's walk through the tree.
///
/// Picks are validated against the store at selection time; the live feeds
/// back the `available_*` views for display and stay scoped to the picks.
pub struct SelectionState {
	manager: Arc<TaxonomyManager>,
	classifications: LiveQuery<TaxonomyNode>,
	classification: Option<TaxonomyNode>,
	category_feed: Option<LiveQuery<TaxonomyNode>>,
	selected_category_types: Vec<TaxonomyNode>,
	// One feed per selected category type, keyed by its id
	product_type_feeds: HashMap<Uuid, LiveQuery<TaxonomyNode>>,
	selected_product_types: Vec<TaxonomyNode>,
}

impl SelectionState {
	pub async fn new(manager: Arc<TaxonomyManager>) -> Self {
		let classifications = manager
			.list_active(TaxonomyLevel::Classification, None)
			.await;
		Self {
			manager,
			classifications,
			classification: None,
			category_feed: None,
			selected_category_types: Vec::new(),
			product_type_feeds: HashMap::new(),
			selected_product_types: Vec::new(),
		}
	}

	/// Active classifications, live
	pub fn available_classifications(&self) -> Vec<TaxonomyNode> {
		self.classifications.current()
	}

	/// Active category types under the selected classification, live
	pub fn available_category_types(&self) -> Vec<TaxonomyNode> {
		self.category_feed
			.as_ref()
			.map(|feed| feed.current())
			.unwrap_or_default()
	}

	/// Active product types under every selected category type, live
	pub fn available_product_types(&self) -> Vec<TaxonomyNode> {
		// Merge in selection order so the view is stable
		self.selected_category_types
			.iter()
			.filter_map(|cat| self.product_type_feeds.get(&cat.id))
			.flat_map(|feed| feed.current())
			.collect()
	}

	/// Select a classification; everything picked below the previous one is
	/// cleared and the category feed is re-scoped
	pub async fn select_classification(&mut self, id: Uuid) -> TaxonomyResult<()> {
		let node = self.manager.fetch(TaxonomyLevel::Classification, id).await?;
		if !node.is_active {
			return Err(TaxonomyError::NodeNotFound {
				level: TaxonomyLevel::Classification,
				id,
			});
		}

		self.clear_below_classification();
		self.category_feed = Some(
			self.manager
				.list_active(TaxonomyLevel::CategoryType, Some(id))
				.await,
		);
		self.classification = Some(node);
		Ok(())
	}

	/// Add a category type to the selection; it must be an active child of the
	/// selected classification
	pub async fn select_category_type(&mut self, id: Uuid) -> TaxonomyResult<()> {
		let classification =
			self.classification
				.as_ref()
				.ok_or(TaxonomyError::MissingParentSelection(
					TaxonomyLevel::Classification,
				))?;
		let node = self.manager.fetch(TaxonomyLevel::CategoryType, id).await?;
		if !node.is_active || node.parent_id != Some(classification.id) {
			return Err(TaxonomyError::NotInSelection {
				level: TaxonomyLevel::CategoryType,
				id,
			});
		}
		if self.selected_category_types.iter().any(|n| n.id == id) {
			return Ok(());
		}

		let feed = self
			.manager
			.list_active(TaxonomyLevel::ProductType, Some(id))
			.await;
		self.product_type_feeds.insert(id, feed);
		self.selected_category_types.push(node);
		Ok(())
	}

	/// Drop a category type from the selection, along with its product-type
	/// feed and any selected product types it owned
	pub fn deselect_category_type(&mut self, id: Uuid) {
		self.selected_category_types.retain(|n| n.id != id);
		self.product_type_feeds.remove(&id);
		self.selected_product_types
			.retain(|pt| pt.parent_id != Some(id));
	}

	/// Add a product type to the selection; it must be an active child of one
	/// of the selected category types
	pub async fn select_product_type(&mut self, id: Uuid) -> TaxonomyResult<()> {
		let node = self.manager.fetch(TaxonomyLevel::ProductType, id).await?;
		let under_selection = node.parent_id.map_or(false, |parent| {
			self.selected_category_types.iter().any(|c| c.id == parent)
		});
		if !node.is_active || !under_selection {
			return Err(TaxonomyError::NotInSelection {
				level: TaxonomyLevel::ProductType,
				id,
			});
		}
		if !self.selected_product_types.iter().any(|n| n.id == id) {
			self.selected_product_types.push(node);
		}
		Ok(())
	}

	pub fn deselect_product_type(&mut self, id: Uuid) {
		self.selected_product_types.retain(|pt| pt.id != id);
	}

	/// Create a classification through the current session
	pub async fn add_classification(
		&self,
		name: &str,
		user: &ActingUser,
	) -> TaxonomyResult<TaxonomyNode> {
		self.manager
			.add(TaxonomyLevel::Classification, None, name, user)
			.await
	}

	/// Create a category type under the selected classification
	pub async fn add_category_type(
		&self,
		name: &str,
		user: &ActingUser,
	) -> TaxonomyResult<TaxonomyNode> {
		let parent = self
			.classification
			.as_ref()
			.map(|n| n.id)
			.ok_or(TaxonomyError::MissingParentSelection(
				TaxonomyLevel::Classification,
			))?;
		self.manager
			.add(TaxonomyLevel::CategoryType, Some(parent), name, user)
			.await
	}

	/// Create a product type under the single selected category type.
	///
	/// Exactly one category type must be selected; with several selected the
	/// new node's parent would be ambiguous, so the call is rejected instead
	/// of guessing.
	pub async fn add_product_type(
		&self,
		name: &str,
		user: &ActingUser,
	) -> TaxonomyResult<TaxonomyNode> {
		let parent = match self.selected_category_types.as_slice() {
			[] => {
				return Err(TaxonomyError::MissingParentSelection(
					TaxonomyLevel::CategoryType,
				))
			}
			[single] => single.id,
			_ => {
				return Err(TaxonomyError::AmbiguousParentSelection(
					TaxonomyLevel::CategoryType,
				))
			}
		};
		self.manager
			.add(TaxonomyLevel::ProductType, Some(parent), name, user)
			.await
	}

	pub fn selected_category_types(&self) -> &[TaxonomyNode] {
		&self.selected_category_types
	}

	pub fn selected_product_types(&self) -> &[TaxonomyNode] {
		&self.selected_product_types
	}

	/// Resolve the selection into the refs a new product will embed
	pub fn snapshot(&self) -> TaxonomyResult<TaxonomySnapshot> {
		let classification =
			self.classification
				.as_ref()
				.ok_or(TaxonomyError::MissingParentSelection(
					TaxonomyLevel::Classification,
				))?;

		let category_types = self
			.selected_category_types
			.iter()
			.map(|node| CategoryTypeRef {
				category_type_id: node.id,
				category_type_name: node.name.clone(),
			})
			.collect();

		let product_types = self
			.selected_product_types
			.iter()
			.filter_map(|node| {
				let category_type_id = node.parent_id?;
				Some(ProductTypeRef {
					product_type_id: node.id,
					product_type_name: node.name.clone(),
					category_type_id,
				})
			})
			.collect();

		Ok(TaxonomySnapshot {
			classification_id: classification.id,
			classification_name: classification.name.clone(),
			category_types,
			product_types,
		})
	}

	fn clear_below_classification(&mut self) {
		// Drop feeds before re-scoping; Drop aborts their tasks
		self.category_feed = None;
		self.product_type_feeds.clear();
		self.selected_category_types.clear();
		self.selected_product_types.clear();
	}
}
