//! Database entities module

pub mod station;
pub mod user;

pub use station::Entity as Station;
pub use user::Entity as User;
