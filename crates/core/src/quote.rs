use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::rates::RateTable;

pub const POINTS_PER_RATE_UNIT: u64 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub estimated_value: Decimal,
    pub rate_used: Decimal,
}

impl QuoteResult {
    /// Estimate rounded to cents, half away from zero, always two decimals.
    pub fn display_value(&self) -> Decimal {
        to_cents(self.estimated_value)
    }
}

pub trait QuoteCalculator: Send + Sync {
    fn quote(&self, points: u64, airline: &str) -> QuoteResult;
}

/// Quotes straight from a [`RateTable`]. Unknown airlines quote at zero.
#[derive(Clone, Debug)]
pub struct RateTableCalculator {
    rates: RateTable,
}

impl RateTableCalculator {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }
}

impl QuoteCalculator for RateTableCalculator {
    fn quote(&self, points: u64, airline: &str) -> QuoteResult {
        quote_with_rates(points, airline, &self.rates)
    }
}

pub fn compute_estimate(points: u64, rate: Decimal) -> Decimal {
    Decimal::from(points) / Decimal::from(POINTS_PER_RATE_UNIT) * rate
}

pub fn quote_with_rates(points: u64, airline: &str, rates: &RateTable) -> QuoteResult {
    let rate_used = rates.rate_for(airline).unwrap_or(Decimal::ZERO);
    QuoteResult { estimated_value: compute_estimate(points, rate_used), rate_used }
}

pub fn to_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Brazilian real formatting, e.g. `R$ 2.500,00`.
pub fn format_brl(value: Decimal) -> String {
    let cents = to_cents(value);
    let negative = cents.is_sign_negative() && !cents.is_zero();
    let text = cents.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {},{fraction}", group_thousands(whole))
}

/// Groups digits with `.` the way pt-BR displays point balances (`100.000`).
pub fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}
