//! Product entity
//!
//! The taxonomy and supplier names embedded here are denormalized snapshots
//! taken at creation time, not live joins. Product.classificationName is a
//! cached projection of the classification's name as of the last successful
//! cascade; the rename cascades are the only mechanism keeping these copies
//! consistent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Collection holding product documents
pub const PRODUCT_COLLECTION: &str = "products";

/// A key/value technical specification row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechSpec {
	pub key: String,
	pub value: String,
}

impl TechSpec {
	/// Rows with neither key nor value are dropped before persisting
	pub fn is_blank(&self) -> bool {
		self.key.trim().is_empty() && self.value.trim().is_empty()
	}
}

/// Snapshot of the supplier at product creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRef {
	pub supplier_id: Uuid,
	pub company: String,
}

/// Snapshot of one selected category type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTypeRef {
	pub category_type_id: Uuid,
	pub category_type_name: String,
}

/// Snapshot of one selected product type, keeping its owning category type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTypeRef {
	pub product_type_id: Uuid,
	pub product_type_name: String,
	pub category_type_id: Uuid,
}

/// A product record; created once, afterwards touched only by cascades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
	/// Store-assigned document id
	#[serde(default)]
	pub id: Uuid,

	pub product_name: String,

	/// Generated `PREFIX-PROD-XXXXXX` code
	pub product_code: String,

	pub classification_id: Uuid,
	pub classification_name: String,

	pub supplier: SupplierRef,

	pub product_types: Vec<ProductTypeRef>,
	pub category_types: Vec<CategoryTypeRef>,

	pub technical_specifications: Vec<TechSpec>,

	/// File name of the uploaded main image, if any
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub main_image: Option<String>,

	pub created_by: String,

	#[serde(rename = "referenceID")]
	pub reference_id: String,

	pub is_active: bool,

	pub created_at: DateTime<Utc>,
}
