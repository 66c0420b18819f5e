//! Fixtures
//!
//! YAML-described catalog sets for tests and demos: products, bundles,
//! warehouse stock and schedule prices, built into a [`Catalog`] with
//! code-based lookups.

use std::{collections::BTreeMap, fs, path::Path};

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    bundles::{Bundle, BundleConstituent, ConstituentItem, SelectionRule},
    catalog::{Catalog, CatalogError},
    inventory::{FixedInventory, WarehouseId},
    pricing::{
        PaymentSchedule, Price, PriceSchedule, PriceScheduleType, PricingError, PricingScheme,
    },
    products::{AvailabilityCriteria, Product, ProductKey},
    skus::{ProductSku, SkuKey},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Product code referenced before being defined
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// SKU code referenced before being defined
    #[error("SKU not found: {0}")]
    SkuNotFound(String),

    /// A constituent must name exactly one of `product` or `sku`
    #[error("Constituent of {0} must wrap exactly one of product or sku")]
    InvalidConstituent(String),

    /// A recurring schedule was given without a payment schedule
    #[error("Recurring schedule for {0} needs a payment schedule")]
    MissingPaymentSchedule(String),

    /// Catalog wiring failed while building the fixture
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Price construction failed while building the fixture
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

fn default_warehouse() -> u64 {
    1
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct FixtureSpec {
    currency: String,

    #[serde(default = "default_warehouse")]
    warehouse: u64,

    #[serde(default)]
    products: Vec<ProductSpec>,

    #[serde(default)]
    bundles: Vec<BundleSpec>,

    #[serde(default)]
    inventory: BTreeMap<String, u64>,

    #[serde(default)]
    prices: Vec<PriceSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct ProductSpec {
    code: String,

    #[serde(default)]
    availability: AvailabilityCriteria,

    #[serde(default)]
    hidden: bool,

    #[serde(default)]
    skus: Vec<String>,

    #[serde(default)]
    start_date: Option<DateTime<Utc>>,

    #[serde(default)]
    end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    release_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct BundleSpec {
    code: String,

    #[serde(default)]
    hidden: bool,

    #[serde(default)]
    selection_rule: Option<u32>,

    constituents: Vec<ConstituentSpec>,

    #[serde(default)]
    skus: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct ConstituentSpec {
    #[serde(default)]
    product: Option<String>,

    #[serde(default)]
    sku: Option<String>,

    #[serde(default = "default_quantity")]
    quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PriceSpec {
    code: String,
    schedules: Vec<ScheduleSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct ScheduleSpec {
    #[serde(rename = "type")]
    schedule_type: PriceScheduleType,

    #[serde(default)]
    payment: Option<String>,

    tiers: Vec<TierSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct TierSpec {
    min_qty: u32,

    #[serde(default)]
    list: Option<String>,

    #[serde(default)]
    sale: Option<String>,
}

/// A catalog built from a YAML fixture description.
///
/// Bundles may reference products and previously defined bundles by code;
/// prices attach schedule/tier tables to product codes.
#[derive(Debug)]
pub struct CatalogFixture {
    catalog: Catalog,
    products: FxHashMap<String, ProductKey>,
    skus: FxHashMap<String, SkuKey>,
    warehouse: WarehouseId,
    inventory: FixedInventory,
    schemes: FxHashMap<String, PricingScheme<'static>>,
}

impl CatalogFixture {
    /// Parse and build a fixture from YAML text.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] on malformed YAML, unknown currency or
    /// code references, or invalid prices.
    pub fn parse(yaml: &str) -> Result<Self, FixtureError> {
        let spec: FixtureSpec = serde_norway::from_str(yaml)?;
        Self::build(&spec)
    }

    /// Parse and build a fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// As [`CatalogFixture::parse`], plus IO failures reading the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    fn build(spec: &FixtureSpec) -> Result<Self, FixtureError> {
        let currency = iso::find(&spec.currency)
            .ok_or_else(|| FixtureError::UnknownCurrency(spec.currency.clone()))?;

        let mut catalog = Catalog::new();
        let mut products: FxHashMap<String, ProductKey> = FxHashMap::default();
        let mut skus: FxHashMap<String, SkuKey> = FxHashMap::default();

        for product_spec in &spec.products {
            let mut product = Product::new(&product_spec.code);
            product.set_availability(product_spec.availability);
            product.set_hidden(product_spec.hidden);
            product.set_start_date(product_spec.start_date);
            product.set_end_date(product_spec.end_date);
            product.set_expected_release_date(product_spec.release_date);

            let key = catalog.add_product(product);
            products.insert(product_spec.code.clone(), key);

            for sku_code in &product_spec.skus {
                let sku_key = catalog.add_sku(key, ProductSku::new(sku_code))?;
                skus.insert(sku_code.clone(), sku_key);
            }
        }

        for bundle_spec in &spec.bundles {
            let mut bundle = Bundle::new();

            for constituent_spec in &bundle_spec.constituents {
                let item = match (&constituent_spec.product, &constituent_spec.sku) {
                    (Some(code), None) => ConstituentItem::Product(
                        *products
                            .get(code)
                            .ok_or_else(|| FixtureError::ProductNotFound(code.clone()))?,
                    ),
                    (None, Some(code)) => ConstituentItem::Sku(
                        *skus
                            .get(code)
                            .ok_or_else(|| FixtureError::SkuNotFound(code.clone()))?,
                    ),
                    _ => return Err(FixtureError::InvalidConstituent(bundle_spec.code.clone())),
                };

                bundle.add_constituent(BundleConstituent::with_quantity(
                    item,
                    constituent_spec.quantity,
                ));
            }

            bundle.set_selection_rule(bundle_spec.selection_rule.map(SelectionRule::new));

            let mut product = Product::with_bundle(&bundle_spec.code, bundle);
            product.set_hidden(bundle_spec.hidden);

            let key = catalog.add_product(product);
            products.insert(bundle_spec.code.clone(), key);

            for sku_code in &bundle_spec.skus {
                let sku_key = catalog.add_sku(key, ProductSku::new(sku_code))?;
                skus.insert(sku_code.clone(), sku_key);
            }
        }

        let warehouse = WarehouseId::new(spec.warehouse);
        let mut inventory = FixedInventory::new();

        for (sku_code, quantity) in &spec.inventory {
            inventory.set(warehouse, sku_code, *quantity);
        }

        let schemes = build_schemes(spec, currency, &products)?;

        Ok(Self {
            catalog,
            products,
            skus,
            warehouse,
            inventory,
            schemes,
        })
    }

    /// The built catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The key of a product by its fixture code.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::ProductNotFound`] for unknown codes.
    pub fn product_key(&self, code: &str) -> Result<ProductKey, FixtureError> {
        self.products
            .get(code)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(code.to_string()))
    }

    /// The key of a SKU by its fixture code.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::SkuNotFound`] for unknown codes.
    pub fn sku_key(&self, code: &str) -> Result<SkuKey, FixtureError> {
        self.skus
            .get(code)
            .copied()
            .ok_or_else(|| FixtureError::SkuNotFound(code.to_string()))
    }

    /// All product codes defined by the fixture, in no particular order.
    pub fn product_codes(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    /// The warehouse the fixture's stock levels describe.
    pub fn warehouse(&self) -> WarehouseId {
        self.warehouse
    }

    /// The fixture's stock levels as an inventory reader.
    pub fn inventory(&self) -> &FixedInventory {
        &self.inventory
    }

    /// The pricing scheme attached to a product code, if any.
    pub fn scheme(&self, code: &str) -> Option<&PricingScheme<'static>> {
        self.schemes.get(code)
    }

    /// All (product code, scheme) pairs.
    pub fn schemes(&self) -> impl Iterator<Item = (&str, &PricingScheme<'static>)> {
        self.schemes
            .iter()
            .map(|(code, scheme)| (code.as_str(), scheme))
    }
}

fn build_schemes(
    spec: &FixtureSpec,
    currency: &'static iso::Currency,
    products: &FxHashMap<String, ProductKey>,
) -> Result<FxHashMap<String, PricingScheme<'static>>, FixtureError> {
    let mut schemes: FxHashMap<String, PricingScheme<'static>> = FxHashMap::default();

    for price_spec in &spec.prices {
        if !products.contains_key(&price_spec.code) {
            return Err(FixtureError::ProductNotFound(price_spec.code.clone()));
        }

        let mut scheme = PricingScheme::new();

        for schedule_spec in &price_spec.schedules {
            let schedule = match schedule_spec.schedule_type {
                PriceScheduleType::PurchaseTime => PriceSchedule::purchase_time(),
                PriceScheduleType::Recurring => {
                    let payment = schedule_spec.payment.clone().ok_or_else(|| {
                        FixtureError::MissingPaymentSchedule(price_spec.code.clone())
                    })?;
                    PriceSchedule::recurring(PaymentSchedule::new(payment))
                }
            };

            let mut price = Price::with_currency(currency);

            for tier_spec in &schedule_spec.tiers {
                if let Some(list) = &tier_spec.list {
                    price.set_list_price(parse_money(list, currency)?, tier_spec.min_qty)?;
                }
                if let Some(sale) = &tier_spec.sale {
                    price.set_sale_price(parse_money(sale, currency)?, tier_spec.min_qty)?;
                }
            }

            scheme.set_price_for_schedule(schedule, price);
        }

        schemes.insert(price_spec.code.clone(), scheme);
    }

    Ok(schemes)
}

fn parse_money(
    text: &str,
    currency: &'static iso::Currency,
) -> Result<Money<'static, iso::Currency>, FixtureError> {
    let amount = text
        .parse::<Decimal>()
        .map_err(|error| FixtureError::InvalidPrice(format!("{text}: {error}")))?;

    let scale = Decimal::from(10i64.pow(currency.exponent));

    let minor_units = amount
        .checked_mul(scale)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(text.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}
