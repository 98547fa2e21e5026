// Property-based tests for the processor fee schedule and the donor-covered
// surcharge.

use proptest::prelude::*;

use givesplit::modules::donations::services::{FeeCalculator, PaymentMethod};

proptest! {
    #[test]
    fn card_fee_matches_schedule(amount in 1i64..100_000_000) {
        let fee = FeeCalculator::processor_fee(amount, PaymentMethod::Card).unwrap();

        // round(amount * 0.029) + 30, half away from zero on the cent;
        // computed in integers to avoid float midpoint drift
        let expected = (amount * 29 + 500) / 1000 + 30;
        prop_assert_eq!(fee, expected);
    }

    #[test]
    fn ach_fee_never_exceeds_cap(amount in 1i64..100_000_000) {
        let fee = FeeCalculator::processor_fee(amount, PaymentMethod::Ach).unwrap();
        prop_assert!(fee <= 500);
        prop_assert!(fee >= 0);
    }

    #[test]
    fn wire_fee_is_amount_independent(amount in 1i64..100_000_000) {
        let fee = FeeCalculator::processor_fee(amount, PaymentMethod::Wire).unwrap();
        prop_assert_eq!(fee, 800);
    }

    #[test]
    fn surcharge_covers_at_least_three_percent(amount in 1i64..100_000_000) {
        let surcharge = FeeCalculator::cover_fee_surcharge(amount).unwrap();

        // ceil never under-collects: surcharge * 100 >= amount * 3
        prop_assert!(surcharge * 100 >= amount * 3);
        // and never overshoots by a full cent
        prop_assert!((surcharge - 1) * 100 < amount * 3);
    }
}

#[test]
fn test_schedule_on_100_dollars() {
    assert_eq!(
        FeeCalculator::processor_fee(10_000, PaymentMethod::Card).unwrap(),
        320
    );
    assert_eq!(
        FeeCalculator::processor_fee(10_000, PaymentMethod::Ach).unwrap(),
        80
    );
    assert_eq!(
        FeeCalculator::processor_fee(10_000, PaymentMethod::Wire).unwrap(),
        800
    );
    assert_eq!(FeeCalculator::cover_fee_surcharge(10_000).unwrap(), 300);
}

#[test]
fn test_ach_cap_kicks_in_above_625_dollars() {
    // 0.8% of $625.00 is exactly $5.00
    assert_eq!(
        FeeCalculator::processor_fee(62_500, PaymentMethod::Ach).unwrap(),
        500
    );
    assert_eq!(
        FeeCalculator::processor_fee(62_501, PaymentMethod::Ach).unwrap(),
        500
    );
    assert_eq!(
        FeeCalculator::processor_fee(62_400, PaymentMethod::Ach).unwrap(),
        499
    );
}

#[test]
fn test_card_fee_rounds_half_away_from_zero() {
    // 0.029 * 2500 = 72.5, a midpoint: away-from-zero gives 73, plus 30
    assert_eq!(
        FeeCalculator::processor_fee(2_500, PaymentMethod::Card).unwrap(),
        103
    );
}

#[test]
fn test_surcharge_rounds_up_to_whole_cent() {
    // 3% of 33 cents = 0.99 cents, charged as 1 cent
    assert_eq!(FeeCalculator::cover_fee_surcharge(33).unwrap(), 1);
    // 3% of 1 cent = 0.03 cents, still 1 cent
    assert_eq!(FeeCalculator::cover_fee_surcharge(1).unwrap(), 1);
}

#[test]
fn test_rejects_non_positive_amounts() {
    for method in [PaymentMethod::Card, PaymentMethod::Ach, PaymentMethod::Wire] {
        assert!(FeeCalculator::processor_fee(0, method).is_err());
        assert!(FeeCalculator::processor_fee(-1, method).is_err());
    }
    assert!(FeeCalculator::cover_fee_surcharge(0).is_err());
}
