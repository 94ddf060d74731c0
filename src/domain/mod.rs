//! Catalog entities
//!
//! Field names serialize camelCase to match the document schema the store
//! holds (`isActive`, `createdAt`, `classificationName`, ...).

pub mod product;
pub mod supplier;
pub mod taxonomy;
pub mod user;

pub use product::{CategoryTypeRef, Product, ProductTypeRef, SupplierRef, TechSpec};
pub use supplier::{Supplier, SupplierContact};
pub use taxonomy::{TaxonomyLevel, TaxonomyNode};
pub use user::UserProfile;
