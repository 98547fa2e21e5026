// End-to-end donation lifecycle against a real (in-memory) database:
// validated atomic creation, exactly-once completion with aggregate fan-out,
// terminal failure, and the cover-fee surcharge on the live path.

#[path = "../helpers/mod.rs"]
mod helpers;

use givesplit::core::AppError;
use givesplit::modules::aggregates::models::AggregateKind;
use givesplit::modules::donations::models::DonationStatus;

use helpers::test_data::*;
use helpers::test_database::count_rows;

#[tokio::test]
async fn test_checkout_persists_pending_donation_with_exact_allocations() {
    let h = build_harness().await;
    seed_nonprofit(&h.pool, "np-a", "Food Bank").await;
    seed_nonprofit(&h.pool, "np-b", "Tree Trust").await;
    seed_nonprofit(&h.pool, "np-c", "Open Shelter").await;

    let request = checkout_request(
        1_000,
        vec![
            allocation("nonprofit", "np-a", 33.33),
            allocation("nonprofit", "np-b", 33.33),
            allocation("nonprofit", "np-c", 33.34),
        ],
    );

    let donation = h.ledger.create_pending_donation(&request, false).await.unwrap();
    assert_eq!(donation.status, DonationStatus::Pending);
    assert_eq!(donation.total_amount_cents, 1_000);
    // card: round(1000 * 0.029) + 30
    assert_eq!(donation.fee_cents, 59);
    assert!(!donation.is_simulated);

    let allocations = h
        .ledger
        .repository()
        .find_allocations(&donation.id)
        .await
        .unwrap();
    assert_eq!(allocations.len(), 3);
    let sum: i64 = allocations.iter().map(|a| a.amount_cents).sum();
    assert_eq!(sum, 1_000);
    assert_eq!(allocations[2].amount_cents, 334);
}

#[tokio::test]
async fn test_rejected_checkout_writes_nothing() {
    let h = build_harness().await;
    seed_nonprofit(&h.pool, "np-a", "Food Bank").await;

    // percentages sum to 90, outside tolerance
    let request = checkout_request(1_000, vec![allocation("nonprofit", "np-a", 90.0)]);

    let err = h
        .ledger
        .create_pending_donation(&request, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(count_rows(&h.pool, "donations").await, 0);
    assert_eq!(count_rows(&h.pool, "allocations").await, 0);
}

#[tokio::test]
async fn test_unknown_recipient_and_campaign_rejected() {
    let h = build_harness().await;
    seed_nonprofit(&h.pool, "np-a", "Food Bank").await;

    let request = single_nonprofit_checkout(1_000, "np-missing");
    let err = h
        .ledger
        .create_pending_donation(&request, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut request = single_nonprofit_checkout(1_000, "np-a");
    request.campaign_id = Some("campaign-missing".to_string());
    let err = h
        .ledger
        .create_pending_donation(&request, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(count_rows(&h.pool, "donations").await, 0);
}

#[tokio::test]
async fn test_completion_updates_every_reachable_aggregate() {
    let h = build_harness().await;
    seed_nonprofit(&h.pool, "np-a", "Food Bank").await;
    let campaign_id = seed_campaign_chain(&h.pool).await;

    let mut request = single_nonprofit_checkout(1_000, "np-a");
    request.campaign_id = Some(campaign_id.clone());
    request.widget_token = Some("widget-1".to_string());

    let donation = h.ledger.create_pending_donation(&request, false).await.unwrap();
    let donation = h.ledger.complete_donation(&donation.id, "charge-1").await.unwrap();

    assert_eq!(donation.status, DonationStatus::Completed);
    assert_eq!(donation.external_reference.as_deref(), Some("charge-1"));
    assert!(donation.completed_at.is_some());

    for (kind, id) in [
        (AggregateKind::Nonprofit, "np-a"),
        (AggregateKind::Campaign, "campaign-1"),
        (AggregateKind::Fundraiser, "fundraiser-1"),
        (AggregateKind::Team, "team-1"),
        (AggregateKind::WidgetToken, "widget-1"),
    ] {
        let totals = h.aggregates.get_totals(kind, id).await.unwrap();
        assert_eq!(totals.raised_cents, 1_000, "raised for {} {}", kind, id);
        assert_eq!(totals.donation_count, 1, "count for {} {}", kind, id);
    }
}

#[tokio::test]
async fn test_completion_is_idempotent() {
    let h = build_harness().await;
    seed_nonprofit(&h.pool, "np-a", "Food Bank").await;

    let request = single_nonprofit_checkout(2_500, "np-a");
    let donation = h.ledger.create_pending_donation(&request, false).await.unwrap();

    let first = h.ledger.complete_donation(&donation.id, "charge-1").await.unwrap();
    let second = h.ledger.complete_donation(&donation.id, "charge-2").await.unwrap();

    // duplicate signal is a no-op: original reference kept, counters and
    // event publication untouched
    assert_eq!(second.external_reference.as_deref(), Some("charge-1"));
    assert_eq!(second.completed_at, first.completed_at);
    assert_eq!(h.notifier.published_count(), 1);

    let totals = h
        .aggregates
        .get_totals(AggregateKind::Nonprofit, "np-a")
        .await
        .unwrap();
    assert_eq!(totals.raised_cents, 2_500);
    assert_eq!(totals.donation_count, 1);
}

#[tokio::test]
async fn test_split_allocations_to_one_recipient_count_once() {
    let h = build_harness().await;
    seed_nonprofit(&h.pool, "np-a", "Food Bank").await;

    let request = checkout_request(
        1_000,
        vec![
            allocation("nonprofit", "np-a", 50.0),
            allocation("nonprofit", "np-a", 50.0),
        ],
    );

    let donation = h.ledger.create_pending_donation(&request, false).await.unwrap();
    h.ledger.complete_donation(&donation.id, "charge-1").await.unwrap();

    let totals = h
        .aggregates
        .get_totals(AggregateKind::Nonprofit, "np-a")
        .await
        .unwrap();
    assert_eq!(totals.raised_cents, 1_000);
    assert_eq!(totals.donation_count, 1);
}

#[tokio::test]
async fn test_failed_donation_is_terminal() {
    let h = build_harness().await;
    seed_nonprofit(&h.pool, "np-a", "Food Bank").await;

    let request = single_nonprofit_checkout(1_000, "np-a");
    let donation = h.ledger.create_pending_donation(&request, false).await.unwrap();

    let failed = h
        .ledger
        .fail_donation(&donation.id, "card declined")
        .await
        .unwrap();
    assert_eq!(failed.status, DonationStatus::Failed);
    assert_eq!(failed.failure_reason.as_deref(), Some("card declined"));

    // duplicate failure is a no-op
    let again = h.ledger.fail_donation(&donation.id, "other").await.unwrap();
    assert_eq!(again.failure_reason.as_deref(), Some("card declined"));

    // completing a failed donation is a conflict, never a late settlement
    let err = h
        .ledger
        .complete_donation(&donation.id, "charge-late")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // the failed donation never touched the counters
    let totals = h
        .aggregates
        .get_totals(AggregateKind::Nonprofit, "np-a")
        .await
        .unwrap();
    assert_eq!(totals.raised_cents, 0);
    assert_eq!(h.notifier.published_count(), 0);
}

#[tokio::test]
async fn test_failing_a_completed_donation_is_conflict() {
    let h = build_harness().await;
    seed_nonprofit(&h.pool, "np-a", "Food Bank").await;

    let request = single_nonprofit_checkout(1_000, "np-a");
    let donation = h.ledger.create_pending_donation(&request, false).await.unwrap();
    h.ledger.complete_donation(&donation.id, "charge-1").await.unwrap();

    let err = h
        .ledger
        .fail_donation(&donation.id, "too late")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_gateway_error_leaves_donation_pending() {
    let h = build_harness().await;
    seed_nonprofit(&h.pool, "np-a", "Food Bank").await;
    h.gateway.set_failing(true);

    let request = single_nonprofit_checkout(1_000, "np-a");
    let err = h.gate.route_checkout(&request).await.unwrap_err();
    assert!(matches!(err, AppError::Gateway(_)));

    // the donation exists and stays pending; a retry is a fresh donation
    assert_eq!(count_rows(&h.pool, "donations").await, 1);
    let pending: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM donations WHERE status = 'pending'")
            .fetch_one(&h.pool)
            .await
            .unwrap();
    assert_eq!(pending, 1);
}

#[tokio::test]
async fn test_cover_fee_surcharge_raises_charge_not_allocations() {
    let h = build_harness().await;
    seed_nonprofit(&h.pool, "np-a", "Food Bank").await;

    let mut request = single_nonprofit_checkout(1_000, "np-a");
    request.widget_token = Some("widget-1".to_string());
    request.cover_fees = true;

    let outcome = h.gate.route_checkout(&request).await.unwrap();
    assert!(outcome.session.is_some());

    // charged amount carries ceil(3%) on top; allocations keep the raw total
    assert_eq!(h.gateway.last_charge_amount(), Some(1_030));
    let allocations = h
        .ledger
        .repository()
        .find_allocations(&outcome.donation.id)
        .await
        .unwrap();
    assert_eq!(allocations.iter().map(|a| a.amount_cents).sum::<i64>(), 1_000);
}

#[tokio::test]
async fn test_cover_fees_without_widget_charges_raw_total() {
    let h = build_harness().await;
    seed_nonprofit(&h.pool, "np-a", "Food Bank").await;

    let mut request = single_nonprofit_checkout(1_000, "np-a");
    request.cover_fees = true;

    h.gate.route_checkout(&request).await.unwrap();
    assert_eq!(h.gateway.last_charge_amount(), Some(1_000));
}
