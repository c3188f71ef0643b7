//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Identity
// =============================================================================

/// Identity carried by an entity that has never been committed
pub const UNSAVED_ID: i32 = 0;

/// First identity handed out by a fresh table
pub const FIRST_ENTITY_ID: i32 = 1;

// =============================================================================
// Snapshots
// =============================================================================

/// File extension for table snapshot files
pub const SNAPSHOT_EXTENSION: &str = "json";

/// Suffix of the temporary file written before a snapshot is swapped in
pub const SNAPSHOT_TMP_SUFFIX: &str = "tmp";

// =============================================================================
// Logging
// =============================================================================

/// Default log filter when neither RUST_LOG nor LOG_LEVEL is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log filter used by `--verbose`
pub const VERBOSE_LOG_LEVEL: &str = "debug";

// =============================================================================
// Products
// =============================================================================

/// Table name of the sample product entity
pub const PRODUCTS_TABLE: &str = "products";

/// Product status flag: inactive
pub const PRODUCT_STATUS_INACTIVE: i32 = 0;

/// Product status flag: active
pub const PRODUCT_STATUS_ACTIVE: i32 = 1;

/// Days ahead of today the demo schedules its products
pub const DEMO_SCHEDULE_DAYS: i64 = 10;

/// Name the demo writes over every record during its update pass
pub const DEMO_UPDATED_NAME: &str = "UPDATE";
