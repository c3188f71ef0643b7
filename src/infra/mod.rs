//! Infrastructure layer - Persistence behind the repository contract
//!
//! This module handles:
//! - The in-memory table store and its JSON snapshots
//! - The Unit of Work contract and its in-memory implementation
//! - The generic repository built on top of a Unit of Work

pub mod memory;
pub mod repositories;
pub mod snapshot;
pub mod unit_of_work;

pub use memory::{MemoryDatabase, Table};
pub use repositories::{DeleteRepository, GenericRepository, ReadRepository, Repository, WriteRepository};
pub use unit_of_work::{Change, Commit, Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockUnitOfWork;
