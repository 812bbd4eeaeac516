//! Liveness and store probe

pub mod handlers;

pub use handlers::*;
