//! Database repository layer

pub mod exhibition_repo;
pub mod memory;
pub mod user_repo;

pub use exhibition_repo::*;
pub use memory::InMemoryStore;
pub use user_repo::*;
