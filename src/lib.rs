//! Entity Repository - Generic CRUD repository over a unit of work
//!
//! This crate provides one repository shape for any entity type, a shared
//! facade per type, and an in-memory unit of work with optional JSON
//! snapshots behind them.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities, predicates and validation
//! - **services**: Facades and the registry that shares them
//! - **infra**: Repositories, unit of work and the storage engine
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Store a product
//! cargo run -- products add --name PS4 --date 2024-06-01
//!
//! # List products persisted under ./data
//! cargo run -- --data-dir ./data products list
//!
//! # Run the scripted walkthrough
//! cargo run -- demo
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use config::Config;
pub use domain::{Entity, EntityId, Gate, Predicate, Product};
pub use errors::{AppError, AppResult};
pub use infra::{MemoryDatabase, Repository};
pub use services::{Facade, Registry};
