//! Demo command - Scripted walkthrough of every repository operation.
//!
//! Runs against a scratch in-memory database so stored data is never touched.

use chrono::{Duration, Local, NaiveDate};

use super::products::print_rows;
use crate::config::{DEMO_SCHEDULE_DAYS, DEMO_UPDATED_NAME};
use crate::domain::Product;
use crate::errors::AppResult;
use crate::infra::MemoryDatabase;
use crate::services::{parallel, Registry};

/// Execute the demo command
pub async fn execute() -> AppResult<()> {
    let registry = Registry::new(MemoryDatabase::new());
    let products = registry.register::<Product>()?;
    let today = Local::now().date_naive();

    run(&registry, today)?;

    let (count, rows) = parallel::join2(products.count_async(), products.read_async()).await?;
    tracing::info!(count, "Walkthrough finished");

    print_rows(&rows)
}

/// Blocking walkthrough
fn run(registry: &Registry, today: NaiveDate) -> AppResult<()> {
    let products = registry.facade::<Product>()?;
    let release = today + Duration::days(DEMO_SCHEDULE_DAYS);

    let batch = vec![Product::new("PS4", release), Product::new("XBOX ONE", release)];

    let created = products.create(batch.first().cloned())?;
    tracing::debug!(?created, "Created");

    products.add_range(Some(batch.clone()))?;

    for product in products.read()? {
        tracing::info!(id = product.id, name = %product.name, "Stored product");
    }

    for mut product in products.read()? {
        product.name = DEMO_UPDATED_NAME.to_string();
        product.date = today;
        let id = product.id;
        products.update(Some(product), id)?;
    }

    let removed = products.delete_range(Some(products.read()?))?;
    tracing::debug!(removed = removed.map(|r| r.len()), "Deleted every product");

    products.add_range(Some(batch))?;
    Ok(())
}
