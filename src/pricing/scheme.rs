//! Pricing Schemes

use std::collections::{BTreeMap, BTreeSet};

use rusty_money::{Money, iso::Currency};

use crate::pricing::{price::Price, schedule::PriceSchedule};

/// A product's prices across payment schedules.
///
/// Each schedule (one-time purchase, monthly, yearly, ...) carries its own
/// tiered price; the scheme answers which schedule is cheapest overall.
/// Schedules iterate in their natural order (type, then payment schedule).
#[derive(Debug, Clone, Default)]
pub struct PricingScheme<'a> {
    schedules: BTreeMap<PriceSchedule, Price<'a>>,
}

impl<'a> PricingScheme<'a> {
    /// Create an empty scheme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price for a schedule, replacing any existing one.
    pub fn set_price_for_schedule(&mut self, schedule: PriceSchedule, price: Price<'a>) {
        self.schedules.insert(schedule, price);
    }

    /// The price for a schedule, if one is set.
    pub fn price_for_schedule(&self, schedule: &PriceSchedule) -> Option<&Price<'a>> {
        self.schedules.get(schedule)
    }

    /// All (schedule, price) pairs in schedule order.
    pub fn schedules(&self) -> impl Iterator<Item = (&PriceSchedule, &Price<'a>)> {
        self.schedules.iter()
    }

    /// Number of schedules.
    pub fn schedule_count(&self) -> usize {
        self.schedules.len()
    }

    /// Whether the scheme has no schedules.
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// The schedule whose price is lowest, evaluated at each price's own
    /// first-tier minimum quantity.
    ///
    /// Ties keep the first schedule in schedule order. Schedules without a
    /// priced tier do not compete. `None` when no schedule qualifies.
    pub fn schedule_for_lowest_price(&self) -> Option<&PriceSchedule> {
        let mut best: Option<(&PriceSchedule, Money<'a, Currency>)> = None;

        for (schedule, price) in &self.schedules {
            let Some(min_qty) = price.first_tier_min_qty() else {
                continue;
            };
            let Some(lowest) = price.lowest_price(min_qty) else {
                continue;
            };

            let undercuts = best
                .as_ref()
                .is_none_or(|(_, current)| lowest.to_minor_units() < current.to_minor_units());

            if undercuts {
                best = Some((schedule, lowest));
            }
        }

        best.map(|(schedule, _)| schedule)
    }

    /// The lowest price across all schedules, evaluated at the winning
    /// schedule's first-tier minimum quantity.
    pub fn lowest_price(&self) -> Option<Money<'a, Currency>> {
        let schedule = self.schedule_for_lowest_price()?;
        let price = self.schedules.get(schedule)?;

        price.lowest_price(price.first_tier_min_qty()?)
    }

    /// The deduplicated, ascending union of every schedule's tier minimum
    /// quantities.
    pub fn price_tiers_min_quantities(&self) -> BTreeSet<u32> {
        self.schedules
            .values()
            .flat_map(Price::tier_min_quantities)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::pricing::schedule::PaymentSchedule;

    use super::*;

    fn priced(list_minor: i64, min_qty: u32) -> TestResult<Price<'static>> {
        let mut price = Price::new();
        price.set_list_price(Money::from_minor(list_minor, USD), min_qty)?;
        Ok(price)
    }

    #[test]
    fn lowest_schedule_wins_across_schedules() -> TestResult {
        let mut scheme = PricingScheme::new();
        scheme.set_price_for_schedule(PriceSchedule::purchase_time(), priced(2_000, 1)?);
        scheme.set_price_for_schedule(
            PriceSchedule::recurring(PaymentSchedule::new("per month")),
            priced(1_500, 1)?,
        );

        let winner = scheme.schedule_for_lowest_price();

        assert_eq!(
            winner,
            Some(&PriceSchedule::recurring(PaymentSchedule::new("per month")))
        );
        assert_eq!(scheme.lowest_price(), Some(Money::from_minor(1_500, USD)));

        Ok(())
    }

    #[test]
    fn each_schedule_is_evaluated_at_its_own_first_tier() -> TestResult {
        // The one-time price starts at quantity 3, where it is cheaper than
        // the monthly price's first tier at quantity 1.
        let mut scheme = PricingScheme::new();
        scheme.set_price_for_schedule(PriceSchedule::purchase_time(), priced(1_000, 3)?);
        scheme.set_price_for_schedule(
            PriceSchedule::recurring(PaymentSchedule::new("per month")),
            priced(1_200, 1)?,
        );

        assert_eq!(
            scheme.schedule_for_lowest_price(),
            Some(&PriceSchedule::purchase_time())
        );

        Ok(())
    }

    #[test]
    fn ties_keep_the_first_schedule_in_order() -> TestResult {
        let mut scheme = PricingScheme::new();
        scheme.set_price_for_schedule(
            PriceSchedule::recurring(PaymentSchedule::new("per month")),
            priced(1_000, 1)?,
        );
        scheme.set_price_for_schedule(PriceSchedule::purchase_time(), priced(1_000, 1)?);

        assert_eq!(
            scheme.schedule_for_lowest_price(),
            Some(&PriceSchedule::purchase_time()),
            "purchase-time sorts first and keeps the tie"
        );

        Ok(())
    }

    #[test]
    fn empty_scheme_has_no_winner() {
        let scheme = PricingScheme::new();

        assert_eq!(scheme.schedule_for_lowest_price(), None);
        assert_eq!(scheme.lowest_price(), None);
    }

    #[test]
    fn priceless_schedules_do_not_compete() -> TestResult {
        let mut scheme = PricingScheme::new();
        scheme.set_price_for_schedule(PriceSchedule::purchase_time(), Price::new());
        scheme.set_price_for_schedule(
            PriceSchedule::recurring(PaymentSchedule::new("per month")),
            priced(900, 1)?,
        );

        assert_eq!(
            scheme.schedule_for_lowest_price(),
            Some(&PriceSchedule::recurring(PaymentSchedule::new("per month")))
        );

        Ok(())
    }

    #[test]
    fn min_quantities_union_is_deduplicated_and_sorted() -> TestResult {
        let mut one_time = Price::new();
        one_time.set_list_price(Money::from_minor(1_000, USD), 1)?;
        one_time.set_list_price(Money::from_minor(800, USD), 5)?;

        let mut monthly = Price::new();
        monthly.set_list_price(Money::from_minor(300, USD), 1)?;
        monthly.set_list_price(Money::from_minor(250, USD), 10)?;

        let mut scheme = PricingScheme::new();
        scheme.set_price_for_schedule(PriceSchedule::purchase_time(), one_time);
        scheme.set_price_for_schedule(
            PriceSchedule::recurring(PaymentSchedule::new("per month")),
            monthly,
        );

        let quantities: Vec<u32> = scheme.price_tiers_min_quantities().into_iter().collect();

        assert_eq!(quantities, [1, 5, 10]);

        Ok(())
    }
}
