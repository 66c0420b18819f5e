//! Pricing
//!
//! Tiered prices with price-break lookup by quantity, and pricing schemes
//! that map payment schedules (one-time vs recurring) to prices and select
//! the globally cheapest schedule.

use thiserror::Error;

pub mod price;
pub mod schedule;
pub mod scheme;
pub mod tier;

pub use price::Price;
pub use schedule::{PaymentSchedule, PriceSchedule, PriceScheduleType};
pub use scheme::PricingScheme;
pub use tier::{DiscountRecord, PriceTier};

/// Errors raised by pricing mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A price was set in a currency different from the one already
    /// recorded on the price.
    #[error("price currency {found} does not match {expected}")]
    CurrencyMismatch {
        /// Currency already recorded on the price.
        expected: &'static str,

        /// Currency of the rejected amount.
        found: &'static str,
    },
}
