//! Product-specific error types

use crate::infrastructure::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Product operation errors
#[derive(Error, Debug)]
pub enum ProductError {
	/// Blank product name on create
	#[error("Product name cannot be empty")]
	EmptyName,

	/// A selected product type's owning category type is not part of the
	/// selection
	#[error("Product type {0} has no selected parent category type")]
	OrphanProductType(Uuid),

	/// Store error
	#[error("Store error: {0}")]
	Store(#[from] StoreError),
}

/// Result type for product operations
pub type ProductResult<T> = std::result::Result<T, ProductError>;
