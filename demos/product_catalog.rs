//! Maps database rows of a small product catalog into API models.
//!
//! Run with `RUST_LOG=debug cargo run --example product_catalog` to see the
//! registration and field-skipping logs.

use chrono::{DateTime, TimeZone, Utc};
use sovran_mapper::{Mappable, MapperConfig, MapperError};
use std::collections::HashMap;

#[derive(Debug, Default, Mappable)]
struct ProductRow {
    pub product_id: String,
    #[mapper(tag = "title")]
    pub display_name: String,
    pub price_cents: i64,
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
    pub supplier: Option<SupplierRow>,
    internal_notes: String,
}

#[derive(Debug, Default, Mappable)]
#[mapper(methods(contact))]
struct SupplierRow {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl SupplierRow {
    fn contact(&self) -> String {
        format!("{} <{}>, {}", self.name, self.email, self.phone)
    }
}

#[allow(non_snake_case)]
#[derive(Debug, Default, Mappable)]
struct Product {
    pub productId: String,
    pub title: String,
    pub priceCents: i64,
    pub tags: Vec<String>,
    pub updatedAt: String,
    pub supplier: Option<Supplier>,
}

#[derive(Debug, Default, Mappable)]
struct Supplier {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Default, Mappable)]
struct CatalogRow {
    pub products: Vec<ProductRow>,
    pub categories: HashMap<String, Vec<String>>,
}

#[derive(Debug, Default, Mappable)]
struct Catalog {
    pub products: Vec<Product>,
    pub categories: HashMap<String, Vec<String>>,
}

#[derive(Debug, Default, PartialEq, Mappable)]
struct Rfc3339 {
    pub value: String,
}

fn register() -> Result<(), MapperError> {
    sovran_mapper::configure(MapperConfig::new())?;
    sovran_mapper::create_map::<CatalogRow, Catalog>()?;
    sovran_mapper::create_map::<Option<ProductRow>, Option<Product>>()?;
    sovran_mapper::create_map::<SupplierRow, Supplier>()?;
    sovran_mapper::create_custom_map(|at: &DateTime<Utc>| {
        Ok::<_, MapperError>(Rfc3339 {
            value: at.to_rfc3339(),
        })
    })?;
    sovran_mapper::freeze()
}

fn sample() -> CatalogRow {
    let updated_at = Utc
        .with_ymd_and_hms(2024, 5, 17, 9, 30, 0)
        .single()
        .unwrap_or_default();

    let mut categories = HashMap::new();
    categories.insert("tools".to_string(), vec!["p-100".to_string()]);
    categories.insert("fasteners".to_string(), vec!["p-200".to_string()]);

    CatalogRow {
        products: vec![
            ProductRow {
                product_id: "p-100".to_string(),
                display_name: "Claw Hammer".to_string(),
                price_cents: 1899,
                tags: vec!["steel".to_string(), "16oz".to_string()],
                updated_at,
                supplier: Some(SupplierRow {
                    name: "Forge & Co".to_string(),
                    email: "sales@forge.example".to_string(),
                    phone: "555-0100".to_string(),
                }),
                internal_notes: "reorder in Q3".to_string(),
            },
            ProductRow {
                product_id: "p-200".to_string(),
                display_name: "Wood Screws (100)".to_string(),
                price_cents: 649,
                tags: vec!["zinc".to_string()],
                updated_at,
                supplier: None,
                internal_notes: String::new(),
            },
        ],
        categories,
    }
}

fn main() -> Result<(), MapperError> {
    env_logger::init();
    register()?;

    let rows = sample();
    log::info!(
        "mapping {} products ({} with notes)",
        rows.products.len(),
        rows.products
            .iter()
            .filter(|row| !row.internal_notes.is_empty())
            .count()
    );

    let catalog: Catalog = sovran_mapper::map(&rows)?;
    for product in &catalog.products {
        println!(
            "{:<8} {:<20} {:>6.2}  [{}]",
            product.productId,
            product.title,
            product.priceCents as f64 / 100.0,
            product.tags.join(", ")
        );
        match &product.supplier {
            Some(supplier) => println!("         supplied by {}", supplier.contact),
            None => println!("         no supplier on record"),
        }
    }

    // Timestamps only map through the custom function when the destination
    // type matches its output.
    let stamp: Rfc3339 = sovran_mapper::map(&rows.products[0].updated_at)?;
    println!("catalog updated {}", stamp.value);

    let mut names: Vec<_> = catalog.categories.keys().cloned().collect();
    names.sort();
    println!("categories: {}", names.join(", "));

    Ok(())
}
