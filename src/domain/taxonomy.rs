//! Taxonomy tree nodes
//!
//! The taxonomy is a strict three-level tree: Classification -> Category Type
//! -> Product Type. Nodes are stored flat in one collection, each carrying its
//! level and parent id, so listing and cascade queries scope by
//! `(level, parentId)` instead of nested collection paths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Collection holding every taxonomy node
pub const TAXONOMY_COLLECTION: &str = "taxonomyNodes";

/// Position of a node in the three-level tree
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	strum::Display,
	strum::EnumString,
)]
pub enum TaxonomyLevel {
	#[strum(serialize = "classification")]
	Classification,
	#[strum(serialize = "category type")]
	CategoryType,
	#[strum(serialize = "product type")]
	ProductType,
}

impl TaxonomyLevel {
	/// The level a parent of this node must have; `None` for the root level
	pub fn parent(self) -> Option<TaxonomyLevel> {
		match self {
			TaxonomyLevel::Classification => None,
			TaxonomyLevel::CategoryType => Some(TaxonomyLevel::Classification),
			TaxonomyLevel::ProductType => Some(TaxonomyLevel::CategoryType),
		}
	}

	pub fn is_root(self) -> bool {
		self.parent().is_none()
	}
}

/// A node of the classification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyNode {
	/// Store-assigned document id
	#[serde(default)]
	pub id: Uuid,

	/// Tree level of this node
	pub level: TaxonomyLevel,

	/// Owning node one level up; `None` only for classifications
	#[serde(default)]
	pub parent_id: Option<Uuid>,

	/// Display name; the source of truth that product documents snapshot
	pub name: String,

	/// Soft-delete flag; inactive nodes stay fetchable by id
	pub is_active: bool,

	pub created_at: DateTime<Utc>,

	/// ReferenceID of the user who soft-deleted this node
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deleted_by: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deleted_at: Option<DateTime<Utc>>,
}

impl TaxonomyNode {
	/// Create an active node; the id is assigned by the store on create
	pub fn new(level: TaxonomyLevel, parent_id: Option<Uuid>, name: impl Into<String>) -> Self {
		Self {
			id: Uuid::nil(),
			level,
			parent_id,
			name: name.into(),
			is_active: true,
			created_at: Utc::now(),
			deleted_by: None,
			deleted_at: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_level_hierarchy() {
		assert!(TaxonomyLevel::Classification.is_root());
		assert_eq!(
			TaxonomyLevel::CategoryType.parent(),
			Some(TaxonomyLevel::Classification)
		);
		assert_eq!(
			TaxonomyLevel::ProductType.parent(),
			Some(TaxonomyLevel::CategoryType)
		);
	}

	#[test]
	fn test_node_serializes_camel_case() {
		let node = TaxonomyNode::new(TaxonomyLevel::Classification, None, "Lighting");
		let value = serde_json::to_value(&node).unwrap();
		assert_eq!(value["isActive"], true);
		assert!(value.get("createdAt").is_some());
		// Deletion stamps only appear once set
		assert!(value.get("deletedBy").is_none());
	}
}
