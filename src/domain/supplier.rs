//! Supplier entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Collection holding supplier documents
pub const SUPPLIER_COLLECTION: &str = "suppliers";

/// A contact person; phones pair positionally with names in bulk uploads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierContact {
	pub name: String,
	#[serde(default)]
	pub phone: String,
}

/// A supplier record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
	/// Store-assigned document id
	#[serde(default)]
	pub id: Uuid,

	/// Copy of the document id written back into the body after creation;
	/// product documents reference suppliers through this field
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub supplier_id: Option<Uuid>,

	/// Company name; unique (case-insensitive) among active suppliers
	pub company: String,

	/// Generated `PREFIX-SUPP-XXXXXX` code
	pub company_code: String,

	#[serde(default)]
	pub internal_code: String,

	pub addresses: Vec<String>,
	pub emails: Vec<String>,

	#[serde(default)]
	pub website: String,

	pub contacts: Vec<SupplierContact>,
	pub forte_products: Vec<String>,
	pub products: Vec<String>,
	pub certificates: Vec<String>,

	/// User id of the creator
	pub created_by: String,

	/// ReferenceID of the acting user at creation or last edit
	#[serde(rename = "referenceID")]
	pub reference_id: String,

	/// Soft-delete flag; reactivation happens only via bulk upload
	pub is_active: bool,

	pub created_at: DateTime<Utc>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<DateTime<Utc>>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deleted_by: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deleted_at: Option<DateTime<Utc>>,
}
