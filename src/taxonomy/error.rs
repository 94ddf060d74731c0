//! Taxonomy-specific error types

use crate::domain::taxonomy::TaxonomyLevel;
use crate::infrastructure::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Taxonomy operation errors
#[derive(Error, Debug)]
pub enum TaxonomyError {
	/// An active sibling with the same name already exists
	#[error("A {level} named \"{name}\" already exists")]
	DuplicateName { level: TaxonomyLevel, name: String },

	/// Blank name on create or rename
	#[error("{0} name cannot be empty")]
	EmptyName(TaxonomyLevel),

	/// No parent of the required level is selected or supplied
	#[error("No {0} is selected")]
	MissingParentSelection(TaxonomyLevel),

	/// More than one candidate parent is selected, so the new node's
	/// attribution would be ambiguous
	#[error("More than one {0} is selected")]
	AmbiguousParentSelection(TaxonomyLevel),

	/// The node is not under the currently selected parent
	#[error("{level} {id} is not under the current selection")]
	NotInSelection { level: TaxonomyLevel, id: Uuid },

	/// Unknown node id (or a node of a different level)
	#[error("{level} {id} not found")]
	NodeNotFound { level: TaxonomyLevel, id: Uuid },

	/// The node's own rename committed, but some embedded product copies
	/// were not rewritten; `resync` heals the stragglers
	#[error(
		"Renamed {level} {id}, but {failed} of {} product update(s) failed",
		updated + failed
	)]
	FanoutPartialFailure {
		level: TaxonomyLevel,
		id: Uuid,
		updated: usize,
		failed: usize,
	},

	/// Store error
	#[error("Store error: {0}")]
	Store(#[from] StoreError),
}

/// Result type for taxonomy operations
pub type TaxonomyResult<T> = std::result::Result<T, TaxonomyError>;
