//! Supplier-specific error types

use crate::infrastructure::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Supplier operation errors
#[derive(Error, Debug)]
pub enum SupplierError {
	/// Blank company name
	#[error("Company name is required")]
	MissingCompany,

	/// No address survived trimming; at least one is required
	#[error("At least one address is required")]
	MissingAddress,

	/// An active supplier with this company name already exists
	/// (case-insensitive)
	#[error("A supplier named \"{0}\" already exists")]
	DuplicateCompany(String),

	/// An email failed the shape check
	#[error("Invalid email address: {0}")]
	InvalidEmail(String),

	/// Unknown supplier id
	#[error("Supplier {0} not found")]
	NotFound(Uuid),

	/// The supplier edit committed, but some embedded product copies were not
	/// rewritten; `resync` heals the stragglers
	#[error(
		"Updated supplier {id}, but {failed} of {} product update(s) failed",
		updated + failed
	)]
	FanoutPartialFailure {
		id: Uuid,
		updated: usize,
		failed: usize,
	},

	/// Store error
	#[error("Store error: {0}")]
	Store(#[from] StoreError),
}

/// Result type for supplier operations
pub type SupplierResult<T> = std::result::Result<T, SupplierError>;
