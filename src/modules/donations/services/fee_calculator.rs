// Processor fee schedule. Pure and side-effect-free; no I/O, no shared state.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Payment rails supported at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Ach,
    Wire,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Ach => write!(f, "ach"),
            PaymentMethod::Wire => write!(f, "wire"),
        }
    }
}

const CARD_RATE: Decimal = Decimal::from_parts(29, 0, 0, false, 3); // 0.029
const CARD_FIXED_CENTS: i64 = 30;
const ACH_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 3); // 0.008
const ACH_CAP_CENTS: i64 = 500;
const WIRE_FLAT_CENTS: i64 = 800;
const COVER_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 2); // 0.03

/// Fee schedule calculator
pub struct FeeCalculator;

impl FeeCalculator {
    /// Processor fee for one charge.
    ///
    /// Card: `round(amount * 0.029) + 30`. ACH: `min(round(amount * 0.008),
    /// 500)`. Wire: flat 800. Rounding is half-away-from-zero on the cent.
    pub fn processor_fee(amount_cents: i64, method: PaymentMethod) -> Result<i64> {
        if amount_cents <= 0 {
            return Err(AppError::validation(format!(
                "Fee amount must be positive, got {} cents",
                amount_cents
            )));
        }

        let amount = Decimal::from(amount_cents);
        let fee = match method {
            PaymentMethod::Card => Self::round_cents(amount * CARD_RATE)? + CARD_FIXED_CENTS,
            PaymentMethod::Ach => Self::round_cents(amount * ACH_RATE)?.min(ACH_CAP_CENTS),
            PaymentMethod::Wire => WIRE_FLAT_CENTS,
        };

        Ok(fee)
    }

    /// Donor-covered surcharge, widget flow only: `ceil(amount * 0.03)`.
    /// Raises the charged amount; never changes the allocated amount.
    pub fn cover_fee_surcharge(amount_cents: i64) -> Result<i64> {
        if amount_cents <= 0 {
            return Err(AppError::validation(format!(
                "Surcharge amount must be positive, got {} cents",
                amount_cents
            )));
        }

        let raw = Decimal::from(amount_cents) * COVER_RATE;
        raw.ceil()
            .to_i64()
            .ok_or_else(|| AppError::internal(format!("Surcharge overflow for {} cents", raw)))
    }

    fn round_cents(raw: Decimal) -> Result<i64> {
        raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| AppError::internal(format!("Fee overflow for {} cents", raw)))
    }
}
