//! Bundle Traversal
//!
//! Recursive computations over a bundle's constituent tree: effective
//! availability windows, hidden state, availability criteria, expected
//! release dates, descendant membership and auto-selectability.
//!
//! Every walk carries a path-scoped visited set and fails with
//! [`TraversalError::CyclicBundle`] on a back-edge. The same sub-bundle may
//! legally appear under several constituents of one bundle; only a bundle
//! reachable from itself is an error.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    bundles::constituent::ConstituentItem,
    catalog::{Catalog, CatalogError},
    products::{AvailabilityCriteria, ProductKey},
};

/// Errors raised while walking a bundle tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraversalError {
    /// A bundle is reachable from itself through its constituents.
    #[error("bundle constituent graph contains a cycle at product {0:?}")]
    CyclicBundle(ProductKey),

    /// A constituent references a key that does not resolve.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// The product a constituent ultimately stands for: the wrapped product, or
/// the owning product of the wrapped SKU.
pub fn resolved_product(
    catalog: &Catalog,
    item: ConstituentItem,
) -> Result<ProductKey, TraversalError> {
    match item {
        ConstituentItem::Product(product) => Ok(product),
        ConstituentItem::Sku(sku) => Ok(catalog.sku(sku)?.product()),
    }
}

/// Effective hidden state of a product.
///
/// A bundle is hidden when its own flag is set or when any direct
/// constituent's resolved product is hidden. Because a nested bundle answers
/// with this same computation, a hidden product anywhere along a chain of
/// bundles hides every bundle above it. Non-bundles report their own flag.
///
/// # Errors
///
/// Fails on dangling keys or a cyclic bundle graph.
pub fn is_hidden(catalog: &Catalog, product: ProductKey) -> Result<bool, TraversalError> {
    is_hidden_inner(catalog, product, &mut FxHashSet::default())
}

fn is_hidden_inner(
    catalog: &Catalog,
    key: ProductKey,
    visiting: &mut FxHashSet<ProductKey>,
) -> Result<bool, TraversalError> {
    let product = catalog.product(key)?;

    if product.hidden() {
        return Ok(true);
    }

    let Some(bundle) = product.bundle() else {
        return Ok(false);
    };

    if !visiting.insert(key) {
        return Err(TraversalError::CyclicBundle(key));
    }

    for constituent in bundle.constituents() {
        let child = resolved_product(catalog, constituent.item())?;

        if is_hidden_inner(catalog, child, visiting)? {
            return Ok(true);
        }
    }

    visiting.remove(&key);

    Ok(false)
}

/// Effective start date of a product: the latest of its own start date and
/// every constituent's start date, recursing through nested bundles.
///
/// A SKU constituent contributes the SKU's own start date, not its product's.
/// Missing dates mean "no constraint" and are skipped, never treated as the
/// distant past.
///
/// # Errors
///
/// Fails on dangling keys or a cyclic bundle graph.
pub fn effective_start_date(
    catalog: &Catalog,
    product: ProductKey,
) -> Result<Option<DateTime<Utc>>, TraversalError> {
    start_date_inner(catalog, product, &mut FxHashSet::default())
}

fn start_date_inner(
    catalog: &Catalog,
    key: ProductKey,
    visiting: &mut FxHashSet<ProductKey>,
) -> Result<Option<DateTime<Utc>>, TraversalError> {
    let product = catalog.product(key)?;

    let Some(bundle) = product.bundle() else {
        return Ok(product.start_date());
    };

    if !visiting.insert(key) {
        return Err(TraversalError::CyclicBundle(key));
    }

    let mut latest = product.start_date();

    for constituent in bundle.constituents() {
        let date = match constituent.item() {
            ConstituentItem::Sku(sku) => catalog.sku(sku)?.start_date(),
            ConstituentItem::Product(child) => start_date_inner(catalog, child, visiting)?,
        };

        latest = later(latest, date);
    }

    visiting.remove(&key);

    Ok(latest)
}

/// Effective end date of a product: the earliest of its own end date and
/// every constituent's end date, recursing through nested bundles.
///
/// Together with [`effective_start_date`] this makes a bundle's availability
/// window the intersection of the windows across its whole subtree.
///
/// # Errors
///
/// Fails on dangling keys or a cyclic bundle graph.
pub fn effective_end_date(
    catalog: &Catalog,
    product: ProductKey,
) -> Result<Option<DateTime<Utc>>, TraversalError> {
    end_date_inner(catalog, product, &mut FxHashSet::default())
}

fn end_date_inner(
    catalog: &Catalog,
    key: ProductKey,
    visiting: &mut FxHashSet<ProductKey>,
) -> Result<Option<DateTime<Utc>>, TraversalError> {
    let product = catalog.product(key)?;

    let Some(bundle) = product.bundle() else {
        return Ok(product.end_date());
    };

    if !visiting.insert(key) {
        return Err(TraversalError::CyclicBundle(key));
    }

    let mut earliest = product.end_date();

    for constituent in bundle.constituents() {
        let date = match constituent.item() {
            ConstituentItem::Sku(sku) => catalog.sku(sku)?.end_date(),
            ConstituentItem::Product(child) => end_date_inner(catalog, child, visiting)?,
        };

        earliest = earlier(earliest, date);
    }

    visiting.remove(&key);

    Ok(earliest)
}

/// Expected release date of a product.
///
/// For a bundle this is the latest release date found among its
/// constituents across the entire subtree; the bundle's own stored date is
/// excluded at every bundle level, so a bundle releases when its last
/// constituent does. Non-bundles report their own date.
///
/// # Errors
///
/// Fails on dangling keys or a cyclic bundle graph.
pub fn expected_release_date(
    catalog: &Catalog,
    product: ProductKey,
) -> Result<Option<DateTime<Utc>>, TraversalError> {
    release_date_inner(catalog, product, &mut FxHashSet::default())
}

fn release_date_inner(
    catalog: &Catalog,
    key: ProductKey,
    visiting: &mut FxHashSet<ProductKey>,
) -> Result<Option<DateTime<Utc>>, TraversalError> {
    let product = catalog.product(key)?;

    let Some(bundle) = product.bundle() else {
        return Ok(product.expected_release_date());
    };

    if !visiting.insert(key) {
        return Err(TraversalError::CyclicBundle(key));
    }

    let mut latest = None;

    for constituent in bundle.constituents() {
        let child = resolved_product(catalog, constituent.item())?;
        latest = later(latest, release_date_inner(catalog, child, visiting)?);
    }

    visiting.remove(&key);

    Ok(latest)
}

/// Effective availability criteria of a product.
///
/// For a bundle, the highest-priority criterion among its constituents'
/// resolved criteria (nested bundles contribute their own resolved value),
/// defaulting to [`AvailabilityCriteria::AlwaysAvailable`] when there are no
/// constituents. The bundle's own stored criterion is ignored. Non-bundles
/// report their stored criterion.
///
/// # Errors
///
/// Fails on dangling keys or a cyclic bundle graph.
pub fn availability_criteria(
    catalog: &Catalog,
    product: ProductKey,
) -> Result<AvailabilityCriteria, TraversalError> {
    criteria_inner(catalog, product, &mut FxHashSet::default())
}

fn criteria_inner(
    catalog: &Catalog,
    key: ProductKey,
    visiting: &mut FxHashSet<ProductKey>,
) -> Result<AvailabilityCriteria, TraversalError> {
    let product = catalog.product(key)?;

    let Some(bundle) = product.bundle() else {
        return Ok(product.availability());
    };

    if !visiting.insert(key) {
        return Err(TraversalError::CyclicBundle(key));
    }

    let mut resolved = AvailabilityCriteria::AlwaysAvailable;

    for constituent in bundle.constituents() {
        let child = resolved_product(catalog, constituent.item())?;
        resolved = resolved.max(criteria_inner(catalog, child, visiting)?);
    }

    visiting.remove(&key);

    Ok(resolved)
}

/// Whether `target` appears anywhere in the constituent tree under `node`
/// (or is `node` itself).
///
/// Used as a self-containment check before wiring a constituent into a
/// bundle.
///
/// # Errors
///
/// Fails on dangling keys or a cyclic bundle graph.
pub fn has_descendant(
    catalog: &Catalog,
    node: ProductKey,
    target: ProductKey,
) -> Result<bool, TraversalError> {
    has_descendant_inner(catalog, node, target, &mut FxHashSet::default())
}

fn has_descendant_inner(
    catalog: &Catalog,
    node: ProductKey,
    target: ProductKey,
    visiting: &mut FxHashSet<ProductKey>,
) -> Result<bool, TraversalError> {
    if node == target {
        return Ok(true);
    }

    let product = catalog.product(node)?;

    let Some(bundle) = product.bundle() else {
        return Ok(false);
    };

    if !visiting.insert(node) {
        return Err(TraversalError::CyclicBundle(node));
    }

    for constituent in bundle.constituents() {
        let child = resolved_product(catalog, constituent.item())?;

        if has_descendant_inner(catalog, child, target, visiting)? {
            return Ok(true);
        }
    }

    visiting.remove(&node);

    Ok(false)
}

/// Whether the constituent at `index` of the given bundle product is
/// selected automatically rather than chosen by the buyer.
///
/// A constituent is auto-selectable when the bundle's selection rule keeps
/// every slot (no rule, "select all", or "select N" with N equal to the
/// constituent count) and the slot resolves to exactly one SKU: a bare SKU
/// constituent, or a product constituent whose product has a single SKU
/// defined.
///
/// Non-bundle products and out-of-range indices answer `false`.
///
/// # Errors
///
/// Fails on dangling keys.
pub fn is_constituent_auto_selectable(
    catalog: &Catalog,
    product: ProductKey,
    index: usize,
) -> Result<bool, TraversalError> {
    let product = catalog.product(product)?;

    let Some(bundle) = product.bundle() else {
        return Ok(false);
    };

    let Some(constituent) = bundle.constituent(index) else {
        return Ok(false);
    };

    let rule_keeps_every_slot = bundle.selection_rule().is_none_or(|rule| {
        rule.selects_all()
            || usize::try_from(rule.parameter()).is_ok_and(|n| n == bundle.constituent_count())
    });

    if !rule_keeps_every_slot {
        return Ok(false);
    }

    match constituent.item() {
        ConstituentItem::Sku(_) => Ok(true),
        ConstituentItem::Product(child) => Ok(catalog.product(child)?.skus().len() == 1),
    }
}

fn later(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

fn earlier(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
