//! Inventory
//!
//! Flattens a bundle tree into the leaf SKU quantities one bundle unit
//! requires, then reduces warehouse stock to the sellable bundle count: the
//! bottleneck across all required SKUs.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::{
    bundles::{
        constituent::ConstituentItem,
        traversal::{self, TraversalError},
    },
    catalog::{Catalog, CatalogError},
    products::{AvailabilityCriteria, ProductKey},
    skus::SkuKey,
};

/// Identifies the warehouse an inventory lookup runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WarehouseId(u64);

impl WarehouseId {
    /// Create a warehouse identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warehouse {}", self.0)
    }
}

/// Errors raised while computing inventory details.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// The inventory source could not answer the batched lookup.
    #[error("inventory source unavailable: {0}")]
    SourceUnavailable(String),

    /// Walking the bundle tree failed.
    #[error(transparent)]
    Traversal(#[from] TraversalError),
}

impl From<CatalogError> for InventoryError {
    fn from(error: CatalogError) -> Self {
        Self::Traversal(TraversalError::Catalog(error))
    }
}

/// Stock levels for one SKU in one warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryRecord {
    quantity_on_hand: u64,
}

impl InventoryRecord {
    /// Create a record with the given on-hand quantity.
    pub fn new(quantity_on_hand: u64) -> Self {
        Self { quantity_on_hand }
    }

    /// Units currently on hand.
    pub fn quantity_on_hand(&self) -> u64 {
        self.quantity_on_hand
    }
}

/// Source of warehouse stock levels.
///
/// An external, possibly network-backed collaborator; a failed lookup is
/// fatal to the calculation and propagates, there is no retry at this layer.
pub trait InventoryReader {
    /// Batched stock lookup for a set of SKU codes in one warehouse.
    ///
    /// Codes with no record may be omitted from the result; missing entries
    /// mean zero stock.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::SourceUnavailable`] when the source cannot
    /// be reached.
    fn inventories_for_skus_in_warehouse(
        &self,
        sku_codes: &BTreeSet<String>,
        warehouse: WarehouseId,
    ) -> Result<FxHashMap<String, InventoryRecord>, InventoryError>;
}

/// An in-memory [`InventoryReader`] over fixed per-warehouse stock levels.
#[derive(Debug, Clone, Default)]
pub struct FixedInventory {
    records: FxHashMap<WarehouseId, FxHashMap<String, InventoryRecord>>,
}

impl FixedInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the on-hand quantity for a SKU code in a warehouse.
    pub fn set(&mut self, warehouse: WarehouseId, sku_code: impl Into<String>, quantity: u64) {
        self.records
            .entry(warehouse)
            .or_default()
            .insert(sku_code.into(), InventoryRecord::new(quantity));
    }
}

impl InventoryReader for FixedInventory {
    fn inventories_for_skus_in_warehouse(
        &self,
        sku_codes: &BTreeSet<String>,
        warehouse: WarehouseId,
    ) -> Result<FxHashMap<String, InventoryRecord>, InventoryError> {
        let Some(stock) = self.records.get(&warehouse) else {
            return Ok(FxHashMap::default());
        };

        Ok(sku_codes
            .iter()
            .filter_map(|code| stock.get(code).map(|record| (code.clone(), *record)))
            .collect())
    }
}

/// How many units of a SKU's product can currently be sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryDetails {
    available_quantity_in_stock: u64,
}

impl InventoryDetails {
    /// A stock-limited quantity.
    pub fn bounded(available_quantity_in_stock: u64) -> Self {
        Self {
            available_quantity_in_stock,
        }
    }

    /// No stock constraint at all (every required leaf is always
    /// available).
    pub fn unbounded() -> Self {
        Self {
            available_quantity_in_stock: u64::MAX,
        }
    }

    /// Units sellable from current stock.
    pub fn available_quantity_in_stock(&self) -> u64 {
        self.available_quantity_in_stock
    }

    /// Whether stock does not constrain this product at all.
    pub fn is_unbounded(&self) -> bool {
        self.available_quantity_in_stock == u64::MAX
    }
}

/// Computes sellable quantities for products and bundles.
///
/// A single-pass recursive flattening with no caching; every call recomputes
/// from scratch against the given catalog and reader.
#[derive(Debug)]
pub struct InventoryCalculator;

impl InventoryCalculator {
    /// Sellable quantity of the given SKU's product in a warehouse.
    ///
    /// For a bundle, one bundle unit requires every (recursively flattened)
    /// constituent leaf SKU at its accumulated quantity; the sellable count
    /// is the minimum of `floor(on_hand / required)` across those SKUs, with
    /// absent stock records counting as zero. Leaves whose availability
    /// criteria is always-available place no requirement; when nothing
    /// requires stock the result is unbounded.
    ///
    /// # Errors
    ///
    /// Fails on dangling keys, a cyclic bundle graph, or an unreachable
    /// inventory source.
    pub fn inventory_details(
        reader: &dyn InventoryReader,
        catalog: &Catalog,
        root_sku: SkuKey,
        warehouse: WarehouseId,
    ) -> Result<InventoryDetails, InventoryError> {
        let mut requirements: FxHashMap<String, u64> = FxHashMap::default();
        let root_product = catalog.sku(root_sku)?.product();

        Self::accumulate(
            catalog,
            root_product,
            Some(root_sku),
            1,
            &mut requirements,
            &mut FxHashSet::default(),
        )?;

        if requirements.is_empty() {
            return Ok(InventoryDetails::unbounded());
        }

        let codes: BTreeSet<String> = requirements.keys().cloned().collect();
        let stock = reader.inventories_for_skus_in_warehouse(&codes, warehouse)?;

        let mut sellable = u64::MAX;

        for (code, required) in &requirements {
            let on_hand = stock
                .get(code)
                .map_or(0, InventoryRecord::quantity_on_hand);

            sellable = sellable.min(on_hand / required.max(&1));
        }

        Ok(InventoryDetails::bounded(sellable))
    }

    fn accumulate(
        catalog: &Catalog,
        product_key: ProductKey,
        sku_key: Option<SkuKey>,
        multiplier: u64,
        requirements: &mut FxHashMap<String, u64>,
        visiting: &mut FxHashSet<ProductKey>,
    ) -> Result<(), InventoryError> {
        let product = catalog.product(product_key)?;

        if let Some(bundle) = product.bundle() {
            // A bundle's own SKU never requires stock; only its leaves do.
            if !visiting.insert(product_key) {
                return Err(TraversalError::CyclicBundle(product_key).into());
            }

            for constituent in bundle.constituents() {
                let child = traversal::resolved_product(catalog, constituent.item())?;

                if traversal::availability_criteria(catalog, child)?
                    == AvailabilityCriteria::AlwaysAvailable
                {
                    continue;
                }

                let child_sku = match constituent.item() {
                    ConstituentItem::Sku(sku) => Some(sku),
                    ConstituentItem::Product(child) => catalog.product(child)?.default_sku(),
                };

                Self::accumulate(
                    catalog,
                    child,
                    child_sku,
                    multiplier.saturating_mul(u64::from(constituent.quantity())),
                    requirements,
                    visiting,
                )?;
            }

            visiting.remove(&product_key);
        } else if product.availability() != AvailabilityCriteria::AlwaysAvailable {
            let Some(sku_key) = sku_key else {
                return Ok(());
            };

            let code = catalog.sku(sku_key)?.code().to_string();
            let entry = requirements.entry(code).or_insert(0);
            *entry = entry.saturating_add(multiplier);
        }

        Ok(())
    }
}
