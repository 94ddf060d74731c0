//! Store-specific error types

use thiserror::Error;
use uuid::Uuid;

/// Document store errors
#[derive(Error, Debug)]
pub enum StoreError {
	/// Document does not exist
	#[error("Document {id} not found in {collection}")]
	DocumentNotFound { collection: String, id: Uuid },

	/// Document bodies and update patches must be JSON objects
	#[error("Document body must be a JSON object")]
	NotAnObject,

	/// Serialization error
	#[error("Serialization error: {0}")]
	Serde(#[from] serde_json::Error),

	/// Backend-specific failure
	#[error("Store backend error: {0}")]
	Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
