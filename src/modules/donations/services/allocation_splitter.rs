// Largest-remainder apportionment of one payment across many recipients.
//
// Everything downstream (ledger persistence, aggregate counters, reports)
// depends on the exact-sum guarantee established here: for any accepted
// input, the output cents sum to the donation total with no leakage.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::donations::models::AllocationTarget;

/// Allowed drift of the percentage sum away from 100, absorbing client-side
/// floating-point rounding. Tolerance applies to the input only; the output
/// always sums exactly to the total.
pub const PERCENT_SUM_TOLERANCE: f64 = 0.02;

/// One requested slice of a donation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRequest {
    #[serde(flatten)]
    pub target: AllocationTarget,
    pub percentage: f64,
}

/// One computed slice: the request plus its exact cent amount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedShare {
    #[serde(flatten)]
    pub target: AllocationTarget,
    pub percentage: f64,
    pub amount_cents: i64,
}

/// Splits a positive cent total across recipients with no rounding leakage
pub struct AllocationSplitter;

impl AllocationSplitter {
    /// Apportion `total_amount_cents` across `shares` by largest remainder.
    ///
    /// Per row, the base share is `floor(total * pct / 100)` computed in
    /// exact decimal arithmetic. Leftover cents go one at a time to the rows
    /// with the largest fractional remainder, ties broken by input order.
    /// Because the input tolerance admits sums slightly off 100, the leftover
    /// can exceed the row count (distribution cycles) or be negative (cents
    /// are recovered from the smallest remainders, never driving a share
    /// negative). One output row per input row, in input order.
    ///
    /// # Errors
    /// `Validation` on an empty list, a non-positive total, a negative or
    /// non-finite percentage, or a percentage sum outside `100 ± 0.02`.
    pub fn split(total_amount_cents: i64, shares: &[ShareRequest]) -> Result<Vec<ComputedShare>> {
        if shares.is_empty() {
            return Err(AppError::validation(
                "Donation must have at least one allocation",
            ));
        }

        if total_amount_cents <= 0 {
            return Err(AppError::validation(format!(
                "Donation amount must be positive, got {} cents",
                total_amount_cents
            )));
        }

        for (idx, share) in shares.iter().enumerate() {
            if !share.percentage.is_finite() || share.percentage < 0.0 {
                return Err(AppError::validation(format!(
                    "Allocation {} has invalid percentage {}",
                    idx, share.percentage
                )));
            }
        }

        let pct_sum: f64 = shares.iter().map(|s| s.percentage).sum();
        if (pct_sum - 100.0).abs() > PERCENT_SUM_TOLERANCE {
            return Err(AppError::validation(format!(
                "Allocation percentages must sum to 100 (±{}), got {}",
                PERCENT_SUM_TOLERANCE, pct_sum
            )));
        }

        let total = Decimal::from(total_amount_cents);
        let hundred = Decimal::from(100);

        let mut amounts: Vec<i64> = Vec::with_capacity(shares.len());
        let mut remainders: Vec<Decimal> = Vec::with_capacity(shares.len());

        for (idx, share) in shares.iter().enumerate() {
            let pct = Decimal::from_f64(share.percentage).ok_or_else(|| {
                AppError::validation(format!(
                    "Allocation {} percentage {} is not representable",
                    idx, share.percentage
                ))
            })?;

            let raw = total * pct / hundred;
            let floor = raw.floor();
            let cents = floor.to_i64().ok_or_else(|| {
                AppError::internal(format!("Allocation share overflow for {} cents", raw))
            })?;

            amounts.push(cents);
            remainders.push(raw - floor);
        }

        let mut leftover = total_amount_cents - amounts.iter().sum::<i64>();

        // Stable sort keeps input order for equal remainders.
        let mut order: Vec<usize> = (0..shares.len()).collect();
        order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]));

        let mut step = 0usize;
        while leftover > 0 {
            amounts[order[step % order.len()]] += 1;
            leftover -= 1;
            step += 1;
        }

        // Percentage sums below 100 within tolerance can overshoot the floors;
        // recover cents from the smallest remainders without going negative.
        let mut step = 0usize;
        while leftover < 0 {
            let idx = order[order.len() - 1 - (step % order.len())];
            if amounts[idx] > 0 {
                amounts[idx] -= 1;
                leftover += 1;
            }
            step += 1;
        }

        Ok(shares
            .iter()
            .zip(amounts)
            .map(|(share, amount_cents)| ComputedShare {
                target: share.target.clone(),
                percentage: share.percentage,
                amount_cents,
            })
            .collect())
    }
}
