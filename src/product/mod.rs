//! Product creation and the denormalized-name cascades

pub mod cascade;
pub mod error;
pub mod writer;

pub use cascade::CascadeOutcome;
pub use error::{ProductError, ProductResult};
pub use writer::{NewProduct, ProductWriter};
