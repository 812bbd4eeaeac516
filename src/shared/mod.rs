//! Cross-cutting building blocks shared by every layer.

pub mod errors;
pub mod pagination;
pub mod shutdown;
pub mod validations;

pub use errors::*;
pub use pagination::*;
pub use validations::*;
