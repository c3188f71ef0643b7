//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod base;
mod generic;

pub use base::{DeleteRepository, ReadRepository, Repository, WriteRepository};
pub use generic::GenericRepository;
