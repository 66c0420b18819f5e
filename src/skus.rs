//! Product SKUs

use chrono::{DateTime, Utc};
use slotmap::new_key_type;

use crate::products::ProductKey;

new_key_type! {
    /// SKU Key
    pub struct SkuKey;
}

/// A stock-keeping unit of a product.
///
/// A SKU's start and end dates, when set, constrain the SKU independently of
/// its owning product and take precedence over the product's dates in bundle
/// date resolution.
#[derive(Debug, Clone)]
pub struct ProductSku {
    code: String,
    product: ProductKey,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

impl ProductSku {
    /// Create a SKU with the given code.
    ///
    /// The owning product is assigned when the SKU is added to a catalog
    /// via [`crate::catalog::Catalog::add_sku`].
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            product: ProductKey::default(),
            start_date: None,
            end_date: None,
        }
    }

    /// Return the SKU code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Key of the owning product.
    pub fn product(&self) -> ProductKey {
        self.product
    }

    pub(crate) fn set_product(&mut self, product: ProductKey) {
        self.product = product;
    }

    /// Return the SKU's own start date.
    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Set the SKU's own start date.
    pub fn set_start_date(&mut self, start_date: Option<DateTime<Utc>>) {
        self.start_date = start_date;
    }

    /// Return the SKU's own end date.
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    /// Set the SKU's own end date.
    pub fn set_end_date(&mut self, end_date: Option<DateTime<Utc>>) {
        self.end_date = end_date;
    }
}
