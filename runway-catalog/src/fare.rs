use runway_core::{Bill, CoreError, CoreResult, Seat};
use serde::{Deserialize, Serialize};

use crate::seat::seat_row;

pub const PREMIUM_SEAT_SURCHARGE_CENTS: i64 = 3_000;
pub const BAGGAGE_RATE_PER_KG_CENTS: i64 = 500;
/// 12%
pub const TAX_RATE_BPS: i64 = 1_200;

/// Largest accepted meal price, 1,000,000.00 in minor units.
pub const MAX_MEAL_PRICE_CENTS: i64 = 100_000_000;
/// Largest accepted checked-baggage weight. Well inside a 32-bit column.
pub const MAX_BAGGAGE_KG: u32 = 10_000;

const BPS_DENOMINATOR: i64 = 10_000;

/// Tariff for ancillaries and tax. Loaded from config, optionally overridden by `business_rules`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FareRules {
    pub premium_seat_surcharge_cents: i64,
    pub baggage_rate_per_kg_cents: i64,
    pub tax_rate_bps: i64,
    pub premium_row_first: u32,
    pub premium_row_last: u32,
}

impl Default for FareRules {
    fn default() -> Self {
        Self {
            premium_seat_surcharge_cents: PREMIUM_SEAT_SURCHARGE_CENTS,
            baggage_rate_per_kg_cents: BAGGAGE_RATE_PER_KG_CENTS,
            tax_rate_bps: TAX_RATE_BPS,
            premium_row_first: 1,
            premium_row_last: 4,
        }
    }
}

impl FareRules {
    pub fn is_premium_row(&self, row: u32) -> bool {
        (self.premium_row_first..=self.premium_row_last).contains(&row)
    }
}

/// Deterministic fare engine: reservation selections in, itemized bill out.
#[derive(Debug, Clone, Default)]
pub struct FareCalculator {
    rules: FareRules,
}

impl FareCalculator {
    pub fn new(rules: FareRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &FareRules {
        &self.rules
    }

    /// Row 1-4 is premium. A code without leading digits is row 0.
    pub fn is_premium_seat(&self, seat_code: &str) -> bool {
        self.rules.is_premium_row(seat_row(seat_code))
    }

    /// Expects an already-normalized seat code.
    pub fn seat(&self, seat_code: &str) -> Seat {
        Seat {
            code: seat_code.to_string(),
            is_premium: self.is_premium_seat(seat_code),
        }
    }

    /// Negative inputs are treated as zero so the bill can never go below the base fare.
    /// Meal prices and baggage beyond the accepted maxima, or totals that do not fit
    /// in an i64, are rejected rather than wrapped.
    pub fn compute_bill(
        &self,
        base_fare_cents: i64,
        is_premium_seat: bool,
        meal_price_cents: i64,
        baggage_kg: u32,
    ) -> CoreResult<Bill> {
        if meal_price_cents > MAX_MEAL_PRICE_CENTS {
            return Err(CoreError::ValidationError(format!(
                "Meal price cannot exceed {} cents.",
                MAX_MEAL_PRICE_CENTS
            )));
        }
        if baggage_kg > MAX_BAGGAGE_KG {
            return Err(CoreError::ValidationError(format!(
                "Baggage cannot exceed {} kg.",
                MAX_BAGGAGE_KG
            )));
        }

        let base_fare_cents = base_fare_cents.max(0);
        let seat_fee_cents = if is_premium_seat {
            self.rules.premium_seat_surcharge_cents
        } else {
            0
        };
        let meal_fee_cents = meal_price_cents.max(0);
        let baggage_fee_cents = i64::from(baggage_kg)
            .checked_mul(self.rules.baggage_rate_per_kg_cents)
            .ok_or_else(out_of_range)?;

        let subtotal_cents = base_fare_cents
            .checked_add(seat_fee_cents)
            .and_then(|v| v.checked_add(meal_fee_cents))
            .and_then(|v| v.checked_add(baggage_fee_cents))
            .ok_or_else(out_of_range)?;
        let tax_cents = apply_rate(subtotal_cents, self.rules.tax_rate_bps).ok_or_else(out_of_range)?;
        let total_cents = subtotal_cents.checked_add(tax_cents).ok_or_else(out_of_range)?;

        Ok(Bill {
            base_fare_cents,
            seat_fee_cents,
            meal_fee_cents,
            baggage_fee_cents,
            subtotal_cents,
            tax_cents,
            total_cents,
        })
    }
}

fn out_of_range() -> CoreError {
    CoreError::ValidationError("Bill amount is out of range.".to_string())
}

/// amount * bps / 10_000, rounded half up. None on overflow.
fn apply_rate(amount_cents: i64, rate_bps: i64) -> Option<i64> {
    amount_cents
        .checked_mul(rate_bps)?
        .checked_add(BPS_DENOMINATOR / 2)
        .map(|v| v / BPS_DENOMINATOR)
}
