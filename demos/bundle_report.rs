//! Availability report for every product in a fixture catalog.
//!
//! Resolves each product's effective availability window, criteria, hidden
//! state and sellable quantity, and prints them as a table.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use tabled::{Table, Tabled};

use arbor::{
    bundles::traversal,
    fixtures::CatalogFixture,
    inventory::InventoryCalculator,
};

/// Arguments for the bundle report demo
#[derive(Debug, Parser)]
struct Args {
    /// Fixture file to report on instead of the built-in camera shop
    #[clap(short, long)]
    fixture: Option<String>,
}

const CAMERA_SHOP: &str = r"
currency: USD
warehouse: 1
products:
  - code: CAMERA_BODY
    availability: available-when-in-stock
    start-date: 2026-03-01T00:00:00Z
    end-date: 2026-12-01T00:00:00Z
    skus: [CAM-BODY-1]
  - code: PRIME_LENS
    availability: available-for-back-order
    start-date: 2026-01-15T00:00:00Z
    release-date: 2026-06-01T00:00:00Z
    skus: [LENS-50]
  - code: STRAP
    skus: [STRAP-1]
bundles:
  - code: PRIME_KIT
    constituents:
      - product: CAMERA_BODY
      - product: PRIME_LENS
    skus: [PRIME-KIT-1]
  - code: TRAVEL_KIT
    constituents:
      - product: PRIME_KIT
      - product: STRAP
        quantity: 2
    skus: [TRAVEL-KIT-1]
inventory:
  CAM-BODY-1: 14
  LENS-50: 9
";

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Product")]
    code: String,

    #[tabled(rename = "Kind")]
    kind: &'static str,

    #[tabled(rename = "From")]
    start: String,

    #[tabled(rename = "Until")]
    end: String,

    #[tabled(rename = "Criteria")]
    criteria: String,

    #[tabled(rename = "Hidden")]
    hidden: bool,

    #[tabled(rename = "Sellable")]
    sellable: String,
}

fn day(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let fixture = match &args.fixture {
        Some(path) => CatalogFixture::from_path(path)
            .with_context(|| format!("loading fixture {path}"))?,
        None => CatalogFixture::parse(CAMERA_SHOP).context("parsing built-in fixture")?,
    };

    let catalog = fixture.catalog();

    let mut codes: Vec<&str> = fixture.product_codes().collect();
    codes.sort_unstable();

    let mut rows = Vec::with_capacity(codes.len());

    for code in codes {
        let key = fixture.product_key(code)?;
        let product = catalog.product(key)?;

        let sellable = match product.default_sku() {
            Some(sku) => {
                let details = InventoryCalculator::inventory_details(
                    fixture.inventory(),
                    catalog,
                    sku,
                    fixture.warehouse(),
                )?;

                if details.is_unbounded() {
                    "unbounded".to_string()
                } else {
                    details.available_quantity_in_stock().to_string()
                }
            }
            None => "-".to_string(),
        };

        rows.push(Row {
            code: code.to_string(),
            kind: if product.is_bundle() { "bundle" } else { "product" },
            start: day(traversal::effective_start_date(catalog, key)?),
            end: day(traversal::effective_end_date(catalog, key)?),
            criteria: format!("{:?}", traversal::availability_criteria(catalog, key)?),
            hidden: traversal::is_hidden(catalog, key)?,
            sellable,
        });
    }

    println!("{}", Table::new(rows));

    Ok(())
}
