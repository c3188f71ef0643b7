//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `products` - CRUD and queries over the product table
//! - `demo` - Scripted walkthrough of every repository operation

pub mod args;

pub use args::{Cli, Commands};
