//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::PRODUCT_STATUS_ACTIVE;
use crate::domain::EntityId;

/// Entity Repository - Generic CRUD repository over a unit of work
#[derive(Parser, Debug)]
#[command(name = "entity-repository")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding table snapshots; in-memory only when unset
    #[arg(short, long, global = true, env = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage stored products
    Products(ProductsArgs),

    /// Walk through every repository operation on a scratch table
    Demo,
}

/// Arguments for the products command
#[derive(Parser, Debug)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub action: ProductsAction,
}

/// Product actions
#[derive(Subcommand, Debug)]
pub enum ProductsAction {
    /// List every product
    List,
    /// Count stored products
    Count,
    /// Show one product
    Get {
        /// Product identity
        id: EntityId,
    },
    /// Store a new product
    Add(ProductFields),
    /// Overwrite a stored product's values
    Update {
        /// Product identity
        id: EntityId,

        #[command(flatten)]
        fields: ProductFields,
    },
    /// Remove a stored product
    Delete {
        /// Product identity
        id: EntityId,
    },
    /// Show the single product with this exact name
    Find {
        #[arg(short, long)]
        name: String,
    },
    /// Check whether exactly one product has this name
    Exists {
        #[arg(short, long)]
        name: String,
    },
    /// List products whose name contains the given text
    Search {
        #[arg(short, long)]
        contains: String,
    },
}

/// Editable product values
#[derive(Args, Debug, Clone)]
pub struct ProductFields {
    #[arg(short, long)]
    pub name: String,

    /// 0 (inactive) or 1 (active)
    #[arg(short, long, default_value_t = PRODUCT_STATUS_ACTIVE)]
    pub status: i32,

    /// Release date (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub date: Option<NaiveDate>,
}
