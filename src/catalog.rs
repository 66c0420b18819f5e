//! Catalog

use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    products::{Product, ProductKey},
    skus::{ProductSku, SkuKey},
};

/// Errors raised by catalog lookups.
///
/// A dangling key indicates caller misuse (a key from another catalog or a
/// removed entry), not sparse data, so lookups fail fast instead of
/// degrading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The product key does not resolve in this catalog.
    #[error("product {0:?} is not in the catalog")]
    MissingProduct(ProductKey),

    /// The SKU key does not resolve in this catalog.
    #[error("SKU {0:?} is not in the catalog")]
    MissingSku(SkuKey),
}

/// Arena of products and SKUs.
///
/// Products and SKUs are stored once and referenced everywhere else by key;
/// bundle constituents hold keys rather than owning their wrapped product or
/// SKU.
#[derive(Debug, Default)]
pub struct Catalog {
    products: SlotMap<ProductKey, Product>,
    skus: SlotMap<SkuKey, ProductSku>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product, returning its key.
    pub fn add_product(&mut self, product: Product) -> ProductKey {
        self.products.insert(product)
    }

    /// Add a SKU under the given product, wiring both sides of the
    /// relationship.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingProduct`] if the product key does not
    /// resolve.
    pub fn add_sku(
        &mut self,
        product: ProductKey,
        mut sku: ProductSku,
    ) -> Result<SkuKey, CatalogError> {
        if !self.products.contains_key(product) {
            return Err(CatalogError::MissingProduct(product));
        }

        sku.set_product(product);
        let key = self.skus.insert(sku);

        if let Some(owner) = self.products.get_mut(product) {
            owner.push_sku(key);
        }

        Ok(key)
    }

    /// Look up a product by key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingProduct`] if the key does not resolve.
    pub fn product(&self, key: ProductKey) -> Result<&Product, CatalogError> {
        self.products
            .get(key)
            .ok_or(CatalogError::MissingProduct(key))
    }

    /// Look up a product by key, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingProduct`] if the key does not resolve.
    pub fn product_mut(&mut self, key: ProductKey) -> Result<&mut Product, CatalogError> {
        self.products
            .get_mut(key)
            .ok_or(CatalogError::MissingProduct(key))
    }

    /// Look up a SKU by key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingSku`] if the key does not resolve.
    pub fn sku(&self, key: SkuKey) -> Result<&ProductSku, CatalogError> {
        self.skus.get(key).ok_or(CatalogError::MissingSku(key))
    }

    /// Look up a SKU by key, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingSku`] if the key does not resolve.
    pub fn sku_mut(&mut self, key: SkuKey) -> Result<&mut ProductSku, CatalogError> {
        self.skus.get_mut(key).ok_or(CatalogError::MissingSku(key))
    }

    /// Number of products in the catalog.
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Number of SKUs in the catalog.
    pub fn sku_count(&self) -> usize {
        self.skus.len()
    }

    /// Whether the catalog holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
