//! Products command - CRUD and queries over the product table.

use chrono::Local;
use serde::Serialize;

use crate::cli::args::{ProductFields, ProductsAction, ProductsArgs};
use crate::domain::{EntityId, Predicate, Product};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::services::{Facade, Registry};

/// Execute the products command
pub async fn execute(args: ProductsArgs, registry: &Registry) -> AppResult<()> {
    let products = registry.facade::<Product>()?;

    match args.action {
        ProductsAction::List => {
            let rows = products.read_async().await?;
            print_rows(&rows)?;
        }
        ProductsAction::Count => {
            println!("{}", products.count_async().await?);
        }
        ProductsAction::Get { id } => {
            let product = products.get_async(id).await?.ok_or_not_found()?;
            print_row(&product)?;
        }
        ProductsAction::Add(fields) => {
            let created = products
                .create_async(Some(into_product(fields)))
                .await?
                .ok_or_else(|| AppError::internal("Create returned no product"))?;
            tracing::info!(id = created.id, "Product created");
            print_row(&created)?;
        }
        ProductsAction::Update { id, fields } => {
            require(&products, id).await?;
            let updated = products
                .update_async(Some(into_product(fields)), id)
                .await?
                .ok_or_not_found()?;
            tracing::info!(id, "Product updated");
            print_row(&updated)?;
        }
        ProductsAction::Delete { id } => {
            let existing = require(&products, id).await?;
            products.delete_async(Some(existing.clone()), id).await?;
            tracing::info!(id, "Product deleted");
            print_row(&existing)?;
        }
        ProductsAction::Find { name } => {
            let product = products.find_async(&named(name)).await?.ok_or_not_found()?;
            print_row(&product)?;
        }
        ProductsAction::Exists { name } => {
            println!("{}", products.exist_async(&named(name)).await?);
        }
        ProductsAction::Search { contains } => {
            let label = format!("name contains {}", contains);
            let predicate = Predicate::labeled(label, move |p: &Product| p.name.contains(&contains));
            let rows = products.find_all_async(&predicate).await?;
            print_rows(&rows)?;
        }
    }

    Ok(())
}

async fn require(products: &Facade<Product>, id: EntityId) -> AppResult<Product> {
    products.get_async(id).await?.ok_or_not_found()
}

fn named(name: String) -> Predicate<Product> {
    let label = format!("name == {}", name);
    Predicate::labeled(label, move |p: &Product| p.name == name)
}

fn into_product(fields: ProductFields) -> Product {
    let date = fields.date.unwrap_or_else(|| Local::now().date_naive());
    Product::new(fields.name, date).with_status(fields.status)
}

pub(crate) fn print_row<T: Serialize>(row: &T) -> AppResult<()> {
    let line = serde_json::to_string(row).map_err(|e| AppError::internal(e.to_string()))?;
    println!("{}", line);
    Ok(())
}

pub(crate) fn print_rows<T: Serialize>(rows: &[T]) -> AppResult<()> {
    rows.iter().try_for_each(print_row)
}
