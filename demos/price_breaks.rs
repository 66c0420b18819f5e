//! Quantity-break and schedule resolution for a priced fixture.
//!
//! Prints every schedule's tier table and the schedule a buyer would be
//! quoted from.

use anyhow::Context;
use clap::Parser;
use rusty_money::{Money, iso::Currency};
use tabled::{Table, Tabled};

use arbor::{
    fixtures::CatalogFixture,
    pricing::{PriceSchedule, PricingScheme},
};

/// Arguments for the price breaks demo
#[derive(Debug, Parser)]
struct Args {
    /// Fixture file to price instead of the built-in subscription example
    #[clap(short, long)]
    fixture: Option<String>,
}

const SUBSCRIPTIONS: &str = r#"
currency: USD
products:
  - code: PHOTO_SUITE
    skus: [SUITE-1]
prices:
  - code: PHOTO_SUITE
    schedules:
      - type: purchase-time
        tiers:
          - min-qty: 1
            list: "999.00"
            sale: "899.00"
          - min-qty: 5
            list: "899.00"
      - type: recurring
        payment: per month
        tiers:
          - min-qty: 1
            list: "99.00"
      - type: recurring
        payment: per year
        tiers:
          - min-qty: 1
            list: "990.00"
          - min-qty: 10
            list: "890.00"
"#;

#[derive(Tabled)]
struct TierRow {
    #[tabled(rename = "Schedule")]
    schedule: String,

    #[tabled(rename = "Min qty")]
    min_qty: u32,

    #[tabled(rename = "List")]
    list: String,

    #[tabled(rename = "Sale")]
    sale: String,

    #[tabled(rename = "Lowest")]
    lowest: String,
}

fn schedule_label(schedule: &PriceSchedule) -> String {
    schedule
        .payment_schedule()
        .map_or_else(|| "one-time".to_string(), |p| p.name().to_string())
}

fn amount(money: Option<Money<'_, Currency>>) -> String {
    money.map_or_else(|| "-".to_string(), |m| m.to_string())
}

fn report(code: &str, scheme: &PricingScheme<'_>) {
    let mut rows = Vec::new();

    for (schedule, price) in scheme.schedules() {
        for min_qty in price.tier_min_quantities() {
            rows.push(TierRow {
                schedule: schedule_label(schedule),
                min_qty,
                list: amount(price.list_price(min_qty)),
                sale: amount(price.sale_price(min_qty)),
                lowest: amount(price.lowest_price(min_qty)),
            });
        }
    }

    println!("{code}");
    println!("{}", Table::new(rows));

    match scheme.schedule_for_lowest_price() {
        Some(winner) => println!(
            "cheapest schedule: {} at {}",
            schedule_label(winner),
            amount(scheme.lowest_price()),
        ),
        None => println!("no priced schedule"),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let fixture = match &args.fixture {
        Some(path) => CatalogFixture::from_path(path)
            .with_context(|| format!("loading fixture {path}"))?,
        None => CatalogFixture::parse(SUBSCRIPTIONS).context("parsing built-in fixture")?,
    };

    let mut schemes: Vec<(&str, &PricingScheme<'_>)> = fixture.schemes().collect();
    schemes.sort_unstable_by_key(|(code, _)| *code);

    for (code, scheme) in schemes {
        report(code, scheme);
    }

    Ok(())
}
