//! Supplier records, edits with company fan-out, and bulk upload
//! reconciliation

pub mod error;
pub mod manager;
pub mod upload;

pub use error::{SupplierError, SupplierResult};
pub use manager::{SupplierFields, SupplierManager};
pub use upload::{RowOutcome, SupplierRow, UploadSummary};
