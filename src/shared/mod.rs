//! Shared helpers

pub mod codegen;
pub mod text;

pub use codegen::{generate_code, CodeKind};
