//! Price Tiers

use log::warn;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

/// A promotion rule's contribution to a computed price, kept for display
/// alongside the price it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountRecord {
    rule_id: u64,
    action_id: u64,
    discount_amount: Decimal,
    quantity_applied_to: u32,
}

impl DiscountRecord {
    /// Create a record of a rule action's discount.
    pub fn new(rule_id: u64, action_id: u64, discount_amount: Decimal, quantity_applied_to: u32) -> Self {
        Self {
            rule_id,
            action_id,
            discount_amount,
            quantity_applied_to,
        }
    }

    /// Identifier of the promotion rule.
    pub fn rule_id(&self) -> u64 {
        self.rule_id
    }

    /// Identifier of the rule action.
    pub fn action_id(&self) -> u64 {
        self.action_id
    }

    /// The amount discounted.
    pub fn discount_amount(&self) -> Decimal {
        self.discount_amount
    }

    /// How many units the discount applied to.
    pub fn quantity_applied_to(&self) -> u32 {
        self.quantity_applied_to
    }
}

/// Prices at one minimum-quantity break.
///
/// Prices are never negative: a negative input clamps to zero (logged at
/// warn level rather than rejected). The computed price only ever moves
/// down once assigned, until explicitly cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTier<'a> {
    min_qty: u32,
    list_price: Option<Money<'a, Currency>>,
    sale_price: Option<Money<'a, Currency>>,
    computed_price: Option<Money<'a, Currency>>,
    discount_records: SmallVec<[DiscountRecord; 2]>,
}

impl<'a> PriceTier<'a> {
    /// Create an empty tier at the given minimum quantity (at least one;
    /// zero is clamped up).
    pub fn new(min_qty: u32) -> Self {
        Self {
            min_qty: min_qty.max(1),
            list_price: None,
            sale_price: None,
            computed_price: None,
            discount_records: SmallVec::new(),
        }
    }

    /// The minimum quantity this tier applies from.
    pub fn min_qty(&self) -> u32 {
        self.min_qty
    }

    /// The list price, if set.
    pub fn list_price(&self) -> Option<Money<'a, Currency>> {
        self.list_price
    }

    /// Set the list price, clamping negative amounts to zero.
    pub fn set_list_price(&mut self, price: Money<'a, Currency>) {
        self.list_price = Some(clamped_non_negative(price));
    }

    /// The sale price, if set.
    pub fn sale_price(&self) -> Option<Money<'a, Currency>> {
        self.sale_price
    }

    /// Set the sale price, clamping negative amounts to zero.
    pub fn set_sale_price(&mut self, price: Money<'a, Currency>) {
        self.sale_price = Some(clamped_non_negative(price));
    }

    /// The computed (promotion-derived) price, if set.
    pub fn computed_price(&self) -> Option<Money<'a, Currency>> {
        self.computed_price
    }

    /// Record a computed price if it undercuts the current one.
    ///
    /// The stored computed price is monotonically non-increasing: a higher
    /// candidate leaves it untouched, a lower one replaces it. Negative
    /// candidates clamp to zero first.
    pub fn set_computed_price_if_lower(&mut self, price: Money<'a, Currency>) {
        let candidate = clamped_non_negative(price);

        let lower = self
            .computed_price
            .is_none_or(|current| candidate.to_minor_units() < current.to_minor_units());

        if lower {
            self.computed_price = Some(candidate);
        }
    }

    /// Clear the computed price, allowing it to be re-derived from scratch.
    pub fn clear_computed_price(&mut self) {
        self.computed_price = None;
        self.discount_records.clear();
    }

    /// The lowest of the prices set on this tier.
    ///
    /// Absent prices are excluded from the comparison; `None` when no price
    /// is set at all.
    pub fn lowest_price(&self) -> Option<Money<'a, Currency>> {
        [self.sale_price, self.list_price, self.computed_price]
            .into_iter()
            .flatten()
            .min_by_key(Money::to_minor_units)
    }

    /// Discount records attached to the computed price.
    pub fn discount_records(&self) -> &[DiscountRecord] {
        &self.discount_records
    }

    /// Attach a discount record.
    pub fn add_discount_record(&mut self, record: DiscountRecord) {
        self.discount_records.push(record);
    }
}

fn clamped_non_negative<'a>(price: Money<'a, Currency>) -> Money<'a, Currency> {
    if price.to_minor_units() < 0 {
        warn!("clamping negative price {price} to zero");
        Money::from_minor(0, price.currency())
    } else {
        price
    }
}
