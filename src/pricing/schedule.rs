//! Price Schedules

use serde::{Deserialize, Serialize};

/// When a price is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceScheduleType {
    /// Charged once, at purchase time.
    PurchaseTime,

    /// Charged repeatedly on a payment schedule.
    Recurring,
}

/// A named payment cadence for recurring prices, such as "per month".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaymentSchedule {
    name: String,
}

impl PaymentSchedule {
    /// Create a payment schedule with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The schedule name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Identifies one pricing cadence within a scheme.
///
/// Schedules order naturally by type and then by payment schedule, which is
/// also the iteration order of a [`crate::pricing::PricingScheme`] and the
/// tie-break order when several schedules share the lowest price.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriceSchedule {
    schedule_type: PriceScheduleType,
    payment_schedule: Option<PaymentSchedule>,
}

impl PriceSchedule {
    /// The one-time, charged-at-purchase schedule.
    pub fn purchase_time() -> Self {
        Self {
            schedule_type: PriceScheduleType::PurchaseTime,
            payment_schedule: None,
        }
    }

    /// A recurring schedule on the given payment cadence.
    pub fn recurring(payment_schedule: PaymentSchedule) -> Self {
        Self {
            schedule_type: PriceScheduleType::Recurring,
            payment_schedule: Some(payment_schedule),
        }
    }

    /// The schedule type.
    pub fn schedule_type(&self) -> PriceScheduleType {
        self.schedule_type
    }

    /// The payment cadence, present on recurring schedules.
    pub fn payment_schedule(&self) -> Option<&PaymentSchedule> {
        self.payment_schedule.as_ref()
    }
}
