//! Bundle Constituents

use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::{products::ProductKey, skus::SkuKey};

/// What a bundle slot wraps: a whole product, or one specific SKU.
///
/// Exactly one of the two — a slot never wraps both. Traversal code
/// pattern-matches on the variant to resolve the underlying product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstituentItem {
    /// The slot offers a product; the buyer gets its default SKU unless the
    /// product is multi-SKU, in which case a SKU must be chosen.
    Product(ProductKey),

    /// The slot pins one specific SKU.
    Sku(SkuKey),
}

/// A price-list-scoped adjustment to a constituent's price within a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceAdjustment {
    price_list_guid: String,
    amount: Decimal,
}

impl PriceAdjustment {
    /// Create an adjustment for the given price list.
    pub fn new(price_list_guid: impl Into<String>, amount: Decimal) -> Self {
        Self {
            price_list_guid: price_list_guid.into(),
            amount,
        }
    }

    /// GUID of the price list this adjustment applies to.
    pub fn price_list_guid(&self) -> &str {
        &self.price_list_guid
    }

    /// Adjustment amount, in the price list's currency.
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// One slot of a bundle: an item, a quantity, and optional per-price-list
/// adjustments.
#[derive(Debug, Clone)]
pub struct BundleConstituent {
    item: ConstituentItem,
    quantity: u32,
    price_adjustments: SmallVec<[PriceAdjustment; 2]>,
}

impl BundleConstituent {
    /// Create a constituent for the given item with quantity one.
    pub fn new(item: ConstituentItem) -> Self {
        Self::with_quantity(item, 1)
    }

    /// Create a constituent with an explicit quantity.
    ///
    /// Quantities are at least one; zero is clamped up.
    pub fn with_quantity(item: ConstituentItem, quantity: u32) -> Self {
        Self {
            item,
            quantity: quantity.max(1),
            price_adjustments: SmallVec::new(),
        }
    }

    /// The wrapped item.
    pub fn item(&self) -> ConstituentItem {
        self.item
    }

    /// How many units of the item one bundle unit requires.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Set the quantity. Zero is clamped up to one.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
    }

    /// All price adjustments on this constituent.
    pub fn price_adjustments(&self) -> &[PriceAdjustment] {
        &self.price_adjustments
    }

    /// Add an adjustment, replacing any existing one for the same price
    /// list.
    pub fn add_price_adjustment(&mut self, adjustment: PriceAdjustment) {
        self.remove_price_adjustment(adjustment.price_list_guid());
        self.price_adjustments.push(adjustment);
    }

    /// Remove the adjustment for the given price list, if present.
    pub fn remove_price_adjustment(&mut self, price_list_guid: &str) {
        self.price_adjustments
            .retain(|adjustment| adjustment.price_list_guid() != price_list_guid);
    }

    /// The adjustment for the given price list, if present.
    pub fn price_adjustment_for_price_list(
        &self,
        price_list_guid: &str,
    ) -> Option<&PriceAdjustment> {
        self.price_adjustments
            .iter()
            .find(|adjustment| adjustment.price_list_guid() == price_list_guid)
    }
}
