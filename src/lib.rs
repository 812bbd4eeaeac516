//! # Charging Station Service
//!
//! CRUD backend for electric-vehicle charging station records with
//! JWT-authenticated REST access.
//!
//! ## Architecture
//!
//! - **domain**: Station and user entities, validation and repository traits
//! - **application**: Station service with its available-stations cache, user service
//! - **infrastructure**: SeaORM and in-memory repositories, JWT and password crypto
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Errors, pagination, validation helpers and shutdown signalling

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
