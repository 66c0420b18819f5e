//! Products

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::{bundles::Bundle, skus::SkuKey};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// How a product is made available for sale relative to its stock.
///
/// The declaration order doubles as the resolution priority used when a
/// bundle derives its criteria from its constituents: pre-order outranks
/// back-order, which outranks when-in-stock, which outranks
/// always-available.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AvailabilityCriteria {
    /// The product can always be sold, regardless of stock.
    #[default]
    AlwaysAvailable,

    /// The product can be sold only while stock is on hand.
    AvailableWhenInStock,

    /// The product can be sold against future stock.
    AvailableForBackOrder,

    /// The product can be sold before its release date.
    AvailableForPreOrder,
}

/// A sellable catalog product.
///
/// A product that carries a [`Bundle`] payload is a product bundle; its
/// effective dates, hidden state and availability criteria are then derived
/// from its constituents by [`crate::bundles::traversal`].
#[derive(Debug, Clone)]
pub struct Product {
    code: String,
    hidden: bool,
    not_sold_separately: bool,
    availability: AvailabilityCriteria,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    expected_release_date: Option<DateTime<Utc>>,
    skus: SmallVec<[SkuKey; 2]>,
    bundle: Option<Bundle>,
}

impl Product {
    /// Create a standard (non-bundle) product.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            hidden: false,
            not_sold_separately: false,
            availability: AvailabilityCriteria::default(),
            start_date: None,
            end_date: None,
            expected_release_date: None,
            skus: SmallVec::new(),
            bundle: None,
        }
    }

    /// Create a product bundle with the given constituent structure.
    pub fn with_bundle(code: impl Into<String>, bundle: Bundle) -> Self {
        let mut product = Self::new(code);
        product.bundle = Some(bundle);
        product
    }

    /// Return the product code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Return the stored hidden flag.
    ///
    /// For bundles this is only the bundle's own flag; the effective hidden
    /// state also folds in the constituents, see
    /// [`crate::bundles::traversal::is_hidden`].
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Set the stored hidden flag.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Whether the product may only be sold as part of a bundle.
    pub fn not_sold_separately(&self) -> bool {
        self.not_sold_separately
    }

    /// Set whether the product may only be sold as part of a bundle.
    pub fn set_not_sold_separately(&mut self, not_sold_separately: bool) {
        self.not_sold_separately = not_sold_separately;
    }

    /// Return the stored availability criteria.
    ///
    /// For bundles the effective criteria are derived from the constituents
    /// instead, see [`crate::bundles::traversal::availability_criteria`].
    pub fn availability(&self) -> AvailabilityCriteria {
        self.availability
    }

    /// Set the stored availability criteria.
    pub fn set_availability(&mut self, availability: AvailabilityCriteria) {
        self.availability = availability;
    }

    /// Return the stored start date.
    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Set the stored start date.
    pub fn set_start_date(&mut self, start_date: Option<DateTime<Utc>>) {
        self.start_date = start_date;
    }

    /// Return the stored end date.
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    /// Set the stored end date.
    pub fn set_end_date(&mut self, end_date: Option<DateTime<Utc>>) {
        self.end_date = end_date;
    }

    /// Return the stored expected release date.
    pub fn expected_release_date(&self) -> Option<DateTime<Utc>> {
        self.expected_release_date
    }

    /// Set the stored expected release date.
    pub fn set_expected_release_date(&mut self, date: Option<DateTime<Utc>>) {
        self.expected_release_date = date;
    }

    /// Keys of the SKUs defined for this product, in insertion order.
    ///
    /// The first SKU is the default SKU.
    pub fn skus(&self) -> &[SkuKey] {
        &self.skus
    }

    /// The default SKU, if any SKU is defined.
    pub fn default_sku(&self) -> Option<SkuKey> {
        self.skus.first().copied()
    }

    pub(crate) fn push_sku(&mut self, sku: SkuKey) {
        self.skus.push(sku);
    }

    /// Whether this product is a bundle.
    pub fn is_bundle(&self) -> bool {
        self.bundle.is_some()
    }

    /// The bundle payload, when this product is a bundle.
    pub fn bundle(&self) -> Option<&Bundle> {
        self.bundle.as_ref()
    }

    /// The bundle payload, mutably.
    pub fn bundle_mut(&mut self) -> Option<&mut Bundle> {
        self.bundle.as_mut()
    }
}
