//! User aggregate
//!
//! Accounts consumed by the authentication layer.

pub mod model;
pub mod repository;

pub use model::{NewUser, User, UserRole};
pub use repository::UserRepository;
