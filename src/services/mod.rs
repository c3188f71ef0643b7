//! Application services layer - Entry points consumed by callers.
//!
//! Facades are the only surface callers touch; the registry makes sure
//! each entity type has exactly one of them.

pub mod container;
mod facade;

pub use container::{parallel, Registry};
pub use facade::Facade;
