//! Prices

use std::collections::BTreeMap;

use rusty_money::{Money, iso::Currency};

use crate::pricing::{PricingError, tier::PriceTier};

/// A price made of quantity-break tiers.
///
/// Tiers are keyed and sorted by minimum quantity; a lookup for quantity `q`
/// resolves to the tier with the greatest minimum quantity at or below `q`.
/// The currency is pinned either up front or by the first price written;
/// every later write must match it.
#[derive(Debug, Clone, Default)]
pub struct Price<'a> {
    currency: Option<&'a Currency>,
    tiers: BTreeMap<u32, PriceTier<'a>>,
}

impl<'a> Price<'a> {
    /// Create a price whose currency is pinned by the first write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a price pinned to the given currency, as when the price is
    /// owned by a scheme that dictates it.
    pub fn with_currency(currency: &'a Currency) -> Self {
        Self {
            currency: Some(currency),
            tiers: BTreeMap::new(),
        }
    }

    /// The pinned currency, once one is known.
    pub fn currency(&self) -> Option<&'a Currency> {
        self.currency
    }

    /// The tier applying to the given quantity: the greatest minimum
    /// quantity at or below `qty`, or `None` when the quantity is below
    /// every tier (or no tiers exist).
    pub fn tier_by_qty(&self, qty: u32) -> Option<&PriceTier<'a>> {
        self.tiers.range(..=qty).next_back().map(|(_, tier)| tier)
    }

    /// The tier at exactly the given minimum quantity, with no fallback.
    pub fn tier_by_exact_min_qty(&self, min_qty: u32) -> Option<&PriceTier<'a>> {
        self.tiers.get(&min_qty)
    }

    /// Set the list price for the tier at `min_qty`, creating the tier on
    /// demand.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] when the amount's currency
    /// differs from the price's recorded currency.
    pub fn set_list_price(
        &mut self,
        price: Money<'a, Currency>,
        min_qty: u32,
    ) -> Result<(), PricingError> {
        self.check_currency(&price)?;
        self.tier_entry(min_qty).set_list_price(price);
        Ok(())
    }

    /// Set the sale price for the tier at `min_qty`, creating the tier on
    /// demand.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] when the amount's currency
    /// differs from the price's recorded currency.
    pub fn set_sale_price(
        &mut self,
        price: Money<'a, Currency>,
        min_qty: u32,
    ) -> Result<(), PricingError> {
        self.check_currency(&price)?;
        self.tier_entry(min_qty).set_sale_price(price);
        Ok(())
    }

    /// Record a computed price for the tier at `min_qty` if it undercuts
    /// the tier's current computed price, creating the tier on demand.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] when the amount's currency
    /// differs from the price's recorded currency.
    pub fn set_computed_price_if_lower(
        &mut self,
        price: Money<'a, Currency>,
        min_qty: u32,
    ) -> Result<(), PricingError> {
        self.check_currency(&price)?;
        self.tier_entry(min_qty).set_computed_price_if_lower(price);
        Ok(())
    }

    /// Clear the computed price on every tier.
    pub fn clear_computed_prices(&mut self) {
        for tier in self.tiers.values_mut() {
            tier.clear_computed_price();
        }
    }

    /// The list price at the tier resolved for `qty`.
    pub fn list_price(&self, qty: u32) -> Option<Money<'a, Currency>> {
        self.tier_by_qty(qty).and_then(PriceTier::list_price)
    }

    /// The sale price at the tier resolved for `qty`.
    pub fn sale_price(&self, qty: u32) -> Option<Money<'a, Currency>> {
        self.tier_by_qty(qty).and_then(PriceTier::sale_price)
    }

    /// The computed price at the tier resolved for `qty`.
    pub fn computed_price(&self, qty: u32) -> Option<Money<'a, Currency>> {
        self.tier_by_qty(qty).and_then(PriceTier::computed_price)
    }

    /// The lowest price at the tier resolved for `qty`; `None` when no tier
    /// applies or the tier has no price set.
    pub fn lowest_price(&self, qty: u32) -> Option<Money<'a, Currency>> {
        self.tier_by_qty(qty).and_then(PriceTier::lowest_price)
    }

    /// Whether the lowest price at `qty` strictly undercuts the list price
    /// at `qty`; `false` when either is absent.
    pub fn is_lowest_less_than_list(&self, qty: u32) -> bool {
        match (self.lowest_price(qty), self.list_price(qty)) {
            (Some(lowest), Some(list)) => lowest.to_minor_units() < list.to_minor_units(),
            _ => false,
        }
    }

    /// Whether the price carries a non-trivial quantity break: more than
    /// one tier, or a single tier starting above quantity one.
    pub fn has_price_tiers(&self) -> bool {
        self.tiers.len() > 1 || self.tiers.keys().next().is_some_and(|&min_qty| min_qty > 1)
    }

    /// The smallest tier minimum quantity, when any tier exists.
    pub fn first_tier_min_qty(&self) -> Option<u32> {
        self.tiers.keys().next().copied()
    }

    /// The tier minimum quantities in ascending order.
    pub fn tier_min_quantities(&self) -> impl Iterator<Item = u32> + '_ {
        self.tiers.keys().copied()
    }

    /// Number of tiers.
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    fn tier_entry(&mut self, min_qty: u32) -> &mut PriceTier<'a> {
        let min_qty = min_qty.max(1);
        self.tiers
            .entry(min_qty)
            .or_insert_with(|| PriceTier::new(min_qty))
    }

    fn check_currency(&mut self, price: &Money<'a, Currency>) -> Result<(), PricingError> {
        match self.currency {
            None => {
                self.currency = Some(price.currency());
                Ok(())
            }
            Some(expected) if expected.iso_alpha_code == price.currency().iso_alpha_code => Ok(()),
            Some(expected) => Err(PricingError::CurrencyMismatch {
                expected: expected.iso_alpha_code,
                found: price.currency().iso_alpha_code,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, USD};
    use testresult::TestResult;

    use super::*;

    fn tiered_price() -> Result<Price<'static>, PricingError> {
        let mut price = Price::new();
        price.set_list_price(Money::from_minor(1000, USD), 1)?;
        price.set_list_price(Money::from_minor(800, USD), 5)?;
        price.set_list_price(Money::from_minor(600, USD), 10)?;
        Ok(price)
    }

    #[test]
    fn tier_by_qty_uses_price_break_semantics() -> TestResult {
        let price = tiered_price()?;

        assert_eq!(price.list_price(1), Some(Money::from_minor(1000, USD)));
        assert_eq!(price.list_price(4), Some(Money::from_minor(1000, USD)));
        assert_eq!(price.list_price(7), Some(Money::from_minor(800, USD)));
        assert_eq!(price.list_price(10), Some(Money::from_minor(600, USD)));
        assert_eq!(price.list_price(250), Some(Money::from_minor(600, USD)));

        Ok(())
    }

    #[test]
    fn tier_by_qty_below_smallest_tier_is_none() -> TestResult {
        let price = tiered_price()?;

        assert!(price.tier_by_qty(0).is_none());
        assert!(Price::new().tier_by_qty(5).is_none());

        Ok(())
    }

    #[test]
    fn tier_by_exact_min_qty_has_no_fallback() -> TestResult {
        let price = tiered_price()?;

        assert!(price.tier_by_exact_min_qty(5).is_some());
        assert!(price.tier_by_exact_min_qty(7).is_none());

        Ok(())
    }

    #[test]
    fn first_write_pins_the_currency() -> TestResult {
        let mut price = Price::new();
        assert_eq!(price.currency(), None);

        price.set_list_price(Money::from_minor(1000, USD), 1)?;
        assert_eq!(
            price.currency().map(|c| c.iso_alpha_code),
            Some(USD.iso_alpha_code)
        );

        let result = price.set_sale_price(Money::from_minor(900, EUR), 1);
        assert_eq!(
            result,
            Err(PricingError::CurrencyMismatch {
                expected: "USD",
                found: "EUR",
            })
        );

        Ok(())
    }

    #[test]
    fn explicit_currency_rejects_mismatched_first_write() {
        let mut price = Price::with_currency(USD);

        let result = price.set_list_price(Money::from_minor(1000, EUR), 1);

        assert!(matches!(
            result,
            Err(PricingError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn lowest_price_picks_cheapest_of_set_prices() -> TestResult {
        let mut price = Price::new();
        price.set_list_price(Money::from_minor(1000, USD), 1)?;
        price.set_sale_price(Money::from_minor(700, USD), 1)?;
        price.set_computed_price_if_lower(Money::from_minor(850, USD), 1)?;

        assert_eq!(price.lowest_price(1), Some(Money::from_minor(700, USD)));
        assert!(price.is_lowest_less_than_list(1));

        Ok(())
    }

    #[test]
    fn is_lowest_less_than_list_is_false_without_both_sides() -> TestResult {
        let mut price = Price::new();
        assert!(!price.is_lowest_less_than_list(1));

        price.set_list_price(Money::from_minor(1000, USD), 1)?;
        assert!(!price.is_lowest_less_than_list(1), "lowest equals list");

        Ok(())
    }

    #[test]
    fn has_price_tiers_detects_quantity_breaks() -> TestResult {
        let mut flat = Price::new();
        flat.set_list_price(Money::from_minor(1000, USD), 1)?;
        assert!(!flat.has_price_tiers());

        let mut breaking = Price::new();
        breaking.set_list_price(Money::from_minor(800, USD), 5)?;
        assert!(breaking.has_price_tiers(), "single tier above quantity one");

        assert!(tiered_price()?.has_price_tiers());

        Ok(())
    }

    #[test]
    fn clear_computed_prices_covers_all_tiers() -> TestResult {
        let mut price = Price::new();
        price.set_computed_price_if_lower(Money::from_minor(500, USD), 1)?;
        price.set_computed_price_if_lower(Money::from_minor(400, USD), 5)?;

        price.clear_computed_prices();

        assert_eq!(price.computed_price(1), None);
        assert_eq!(price.computed_price(5), None);

        Ok(())
    }

    #[test]
    fn set_price_for_zero_min_qty_lands_on_tier_one() -> TestResult {
        let mut price = Price::new();
        price.set_list_price(Money::from_minor(1000, USD), 0)?;

        assert_eq!(price.first_tier_min_qty(), Some(1));
        assert_eq!(price.list_price(1), Some(Money::from_minor(1000, USD)));

        Ok(())
    }
}
