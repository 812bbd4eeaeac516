//! Non-persistent repository implementations

mod memory;

pub use memory::{InMemoryStationRepository, InMemoryUserRepository};
