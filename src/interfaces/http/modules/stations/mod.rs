//! Station module - CRUD, filtered queries and statistics

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
