//! Scenario tests for nested bundle resolution.
//!
//! Models a small photography catalog:
//!
//! - CAMERA: sold while in stock, available Mar 1 – Dec 1 2026
//! - LENS: back-orderable, available from Jan 15 2026, releases Jun 1 2026
//! - STRAP: always available, no date constraints
//! - `PRIME_KIT` = CAMERA + LENS, own start Jan 1 2026
//! - `TRAVEL_KIT` = `PRIME_KIT` + 2×STRAP, own end Nov 1 2026
//!
//! Expected resolution:
//!
//! - `PRIME_KIT` window: start Mar 1 (camera, latest wins), end Dec 1
//! - `TRAVEL_KIT` window: start Mar 1 (through the nested kit), end Nov 1
//!   (its own end is earlier than the camera's)
//! - Criteria: back-order (the lens) everywhere above it
//! - Release: Jun 1 (the lens), lifted through both kit levels

use arbor::{
    bundles::{Bundle, BundleConstituent, ConstituentItem, SelectionRule, TraversalError, traversal},
    catalog::Catalog,
    products::{AvailabilityCriteria, Product, ProductKey},
    skus::ProductSku,
};
use chrono::{DateTime, TimeZone, Utc};
use testresult::TestResult;

fn date(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()
}

struct Shop {
    catalog: Catalog,
    camera: ProductKey,
    lens: ProductKey,
    strap: ProductKey,
    prime_kit: ProductKey,
    travel_kit: ProductKey,
}

fn shop() -> TestResult<Shop> {
    let mut catalog = Catalog::new();

    let mut camera = Product::new("CAMERA");
    camera.set_availability(AvailabilityCriteria::AvailableWhenInStock);
    camera.set_start_date(date(2026, 3, 1));
    camera.set_end_date(date(2026, 12, 1));
    let camera = catalog.add_product(camera);
    catalog.add_sku(camera, ProductSku::new("CAM-1"))?;

    let mut lens = Product::new("LENS");
    lens.set_availability(AvailabilityCriteria::AvailableForBackOrder);
    lens.set_start_date(date(2026, 1, 15));
    lens.set_expected_release_date(date(2026, 6, 1));
    let lens = catalog.add_product(lens);
    catalog.add_sku(lens, ProductSku::new("LENS-50"))?;

    let strap = catalog.add_product(Product::new("STRAP"));
    catalog.add_sku(strap, ProductSku::new("STRAP-1"))?;

    let mut prime = Bundle::new();
    prime.add_constituent(BundleConstituent::new(ConstituentItem::Product(camera)));
    prime.add_constituent(BundleConstituent::new(ConstituentItem::Product(lens)));
    let mut prime_kit = Product::with_bundle("PRIME_KIT", prime);
    prime_kit.set_start_date(date(2026, 1, 1));
    let prime_kit = catalog.add_product(prime_kit);

    let mut travel = Bundle::new();
    travel.add_constituent(BundleConstituent::new(ConstituentItem::Product(prime_kit)));
    travel.add_constituent(BundleConstituent::with_quantity(
        ConstituentItem::Product(strap),
        2,
    ));
    let mut travel_kit = Product::with_bundle("TRAVEL_KIT", travel);
    travel_kit.set_end_date(date(2026, 11, 1));
    let travel_kit = catalog.add_product(travel_kit);

    Ok(Shop {
        catalog,
        camera,
        lens,
        strap,
        prime_kit,
        travel_kit,
    })
}

#[test]
fn availability_window_is_the_subtree_intersection() -> TestResult {
    let shop = shop()?;

    assert_eq!(
        traversal::effective_start_date(&shop.catalog, shop.prime_kit)?,
        date(2026, 3, 1),
        "the camera starts latest"
    );
    assert_eq!(
        traversal::effective_end_date(&shop.catalog, shop.prime_kit)?,
        date(2026, 12, 1),
        "only the camera has an end date"
    );

    assert_eq!(
        traversal::effective_start_date(&shop.catalog, shop.travel_kit)?,
        date(2026, 3, 1),
        "the nested kit's start lifts into the outer kit"
    );
    assert_eq!(
        traversal::effective_end_date(&shop.catalog, shop.travel_kit)?,
        date(2026, 11, 1),
        "the outer kit's own end is the earliest"
    );

    Ok(())
}

#[test]
fn criteria_resolve_by_priority_through_nesting() -> TestResult {
    let shop = shop()?;

    assert_eq!(
        traversal::availability_criteria(&shop.catalog, shop.prime_kit)?,
        AvailabilityCriteria::AvailableForBackOrder
    );
    assert_eq!(
        traversal::availability_criteria(&shop.catalog, shop.travel_kit)?,
        AvailabilityCriteria::AvailableForBackOrder,
        "the lens's back-order criterion outranks everything else in the tree"
    );

    Ok(())
}

#[test]
fn release_date_gates_on_the_latest_constituent() -> TestResult {
    let mut shop = shop()?;

    assert_eq!(
        traversal::expected_release_date(&shop.catalog, shop.travel_kit)?,
        date(2026, 6, 1)
    );

    // The kit's own stored release date never participates.
    shop.catalog
        .product_mut(shop.travel_kit)?
        .set_expected_release_date(date(2026, 9, 1));

    assert_eq!(
        traversal::expected_release_date(&shop.catalog, shop.travel_kit)?,
        date(2026, 6, 1)
    );

    Ok(())
}

#[test]
fn hiding_a_leaf_hides_every_kit_above_it() -> TestResult {
    let mut shop = shop()?;

    assert!(!traversal::is_hidden(&shop.catalog, shop.travel_kit)?);

    shop.catalog.product_mut(shop.camera)?.set_hidden(true);

    assert!(traversal::is_hidden(&shop.catalog, shop.prime_kit)?);
    assert!(traversal::is_hidden(&shop.catalog, shop.travel_kit)?);
    assert!(
        !shop.catalog.product(shop.travel_kit)?.hidden(),
        "the outer kit's own flag is untouched"
    );

    Ok(())
}

#[test]
fn sku_dates_take_precedence_over_product_dates() -> TestResult {
    let mut shop = shop()?;

    let mut winter_sku = ProductSku::new("CAM-WINTER");
    winter_sku.set_start_date(date(2026, 5, 1));
    let winter_sku = shop.catalog.add_sku(shop.camera, winter_sku)?;

    let mut seasonal = Bundle::new();
    seasonal.add_constituent(BundleConstituent::new(ConstituentItem::Sku(winter_sku)));
    let seasonal = shop
        .catalog
        .add_product(Product::with_bundle("SEASONAL_KIT", seasonal));

    assert_eq!(
        traversal::effective_start_date(&shop.catalog, seasonal)?,
        date(2026, 5, 1),
        "the SKU's own start date wins over the camera's Mar 1"
    );

    Ok(())
}

#[test]
fn constituent_ordering_survives_removal_and_moves() -> TestResult {
    let mut shop = shop()?;

    let kit = shop.catalog.product_mut(shop.travel_kit)?;
    let Some(bundle) = kit.bundle_mut() else {
        unreachable!("the travel kit was built as a bundle")
    };

    bundle.add_constituent(BundleConstituent::with_quantity(
        ConstituentItem::Product(shop.lens),
        1,
    ));
    assert_eq!(bundle.constituent_count(), 3);

    bundle.remove_constituent(1);
    let items: Vec<ConstituentItem> = bundle
        .constituents()
        .iter()
        .map(BundleConstituent::item)
        .collect();
    assert_eq!(
        items,
        [
            ConstituentItem::Product(shop.prime_kit),
            ConstituentItem::Product(shop.lens),
        ],
        "removal closes the gap in order"
    );

    bundle.move_constituent_down(0);
    let items: Vec<ConstituentItem> = bundle
        .constituents()
        .iter()
        .map(BundleConstituent::item)
        .collect();
    assert_eq!(
        items,
        [
            ConstituentItem::Product(shop.lens),
            ConstituentItem::Product(shop.prime_kit),
        ]
    );

    Ok(())
}

#[test]
fn descendants_are_found_at_any_depth() -> TestResult {
    let shop = shop()?;

    assert!(traversal::has_descendant(
        &shop.catalog,
        shop.travel_kit,
        shop.camera
    )?);
    assert!(traversal::has_descendant(
        &shop.catalog,
        shop.travel_kit,
        shop.prime_kit
    )?);
    assert!(!traversal::has_descendant(
        &shop.catalog,
        shop.prime_kit,
        shop.strap
    )?);

    Ok(())
}

#[test]
fn auto_selection_needs_a_keep_everything_rule_and_a_single_sku() -> TestResult {
    let mut shop = shop()?;

    // No rule: every single-SKU constituent auto-selects.
    assert!(traversal::is_constituent_auto_selectable(
        &shop.catalog,
        shop.travel_kit,
        0
    )?);

    // Pick-one rule: nothing auto-selects.
    if let Some(bundle) = shop.catalog.product_mut(shop.travel_kit)?.bundle_mut() {
        bundle.set_selection_rule(Some(SelectionRule::new(1)));
    }
    assert!(!traversal::is_constituent_auto_selectable(
        &shop.catalog,
        shop.travel_kit,
        0
    )?);

    // Select-all rule with a multi-SKU camera: only the camera slot is out.
    shop.catalog
        .add_sku(shop.camera, ProductSku::new("CAM-2"))?;
    if let Some(bundle) = shop.catalog.product_mut(shop.prime_kit)?.bundle_mut() {
        bundle.set_selection_rule(Some(SelectionRule::new(0)));
    }
    assert!(!traversal::is_constituent_auto_selectable(
        &shop.catalog,
        shop.prime_kit,
        0
    )?);
    assert!(traversal::is_constituent_auto_selectable(
        &shop.catalog,
        shop.prime_kit,
        1
    )?);

    Ok(())
}

#[test]
fn a_cycle_surfaces_as_an_error_everywhere() -> TestResult {
    let mut shop = shop()?;

    // Misconfigure: PRIME_KIT swallows TRAVEL_KIT, closing a loop.
    if let Some(bundle) = shop.catalog.product_mut(shop.prime_kit)?.bundle_mut() {
        bundle.add_constituent(BundleConstituent::new(ConstituentItem::Product(
            shop.travel_kit,
        )));
    }

    assert!(matches!(
        traversal::effective_start_date(&shop.catalog, shop.travel_kit),
        Err(TraversalError::CyclicBundle(_))
    ));
    assert!(matches!(
        traversal::is_hidden(&shop.catalog, shop.travel_kit),
        Err(TraversalError::CyclicBundle(_))
    ));
    assert!(matches!(
        traversal::expected_release_date(&shop.catalog, shop.travel_kit),
        Err(TraversalError::CyclicBundle(_))
    ));
    assert!(matches!(
        traversal::has_descendant(&shop.catalog, shop.travel_kit, shop.strap),
        Err(TraversalError::CyclicBundle(_))
    ));

    Ok(())
}
