//! Classification tree: three fixed levels, soft delete, rename cascades, and
//! the top-down selection walk product creation uses

pub mod error;
pub mod manager;
pub mod selection;

pub use error::{TaxonomyError, TaxonomyResult};
pub use manager::{CascadeReport, TaxonomyManager};
pub use selection::{SelectionState, TaxonomySnapshot};
