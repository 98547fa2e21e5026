// Settlement routing and the reversible simulated path.
//
// In SIMULATED mode a new donation never reaches the payment gateway: it is
// marked is_simulated and completed immediately with a synthetic reference.
// Disabling simulation flips the flag first, then reverses every simulated
// donation's aggregate contribution and deletes it; a donation whose
// reversal cannot be applied is kept and reported, never silently dropped.

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::aggregates::services::AggregateCounterService;
use crate::modules::donations::models::{Donation, DonationStatus};
use crate::modules::donations::services::donation_ledger::{CheckoutRequest, DonationLedger};
use crate::modules::donations::services::fee_calculator::FeeCalculator;
use crate::modules::gateways::{ChargeRequest, ChargeSession, PaymentGateway};
use crate::modules::settlement::repositories::SettingsRepository;

/// Result of routing one checkout
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub donation: Donation,

    /// Present on the live path only; the donor completes payment there
    pub session: Option<ChargeSession>,
}

/// Result of flipping the simulation toggle
#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub enabled: bool,

    /// Present when the flip disabled simulation and ran cleanup
    pub cleanup: Option<CleanupReport>,
}

/// Cleanup summary. Skipped donations kept their rows and their aggregate
/// contributions; partial failure is visible, not swallowed.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub deleted_count: usize,
    pub skipped_donation_ids: Vec<String>,
}

pub struct SettlementModeGate {
    settings_repo: SettingsRepository,
    ledger: Arc<DonationLedger>,
    counter_service: AggregateCounterService,
    gateway: Arc<dyn PaymentGateway>,
}

impl SettlementModeGate {
    pub fn new(
        settings_repo: SettingsRepository,
        ledger: Arc<DonationLedger>,
        counter_service: AggregateCounterService,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            settings_repo,
            ledger,
            counter_service,
            gateway,
        }
    }

    pub fn ledger(&self) -> &Arc<DonationLedger> {
        &self.ledger
    }

    pub async fn simulation_enabled(&self) -> Result<bool> {
        Ok(self.settings_repo.get().await?.enabled)
    }

    /// Route a checkout to the live gateway or the simulated no-op path
    pub async fn route_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutOutcome> {
        let simulated = self.simulation_enabled().await?;

        if simulated {
            let donation = self.ledger.create_pending_donation(request, true).await?;
            let reference = format!("sim-{}", Uuid::new_v4());
            let donation = self.ledger.complete_donation(&donation.id, &reference).await?;

            tracing::info!(
                donation_id = %donation.id,
                "Checkout settled through simulated path"
            );

            return Ok(CheckoutOutcome {
                donation,
                session: None,
            });
        }

        let donation = self.ledger.create_pending_donation(request, false).await?;

        // Widget donors can opt to cover fees; the surcharge raises the
        // charged amount without touching the allocations.
        let mut charge_amount_cents = donation.total_amount_cents;
        if request.cover_fees && request.widget_token.is_some() {
            charge_amount_cents += FeeCalculator::cover_fee_surcharge(donation.total_amount_cents)?;
        }

        // A gateway error leaves the donation pending; any retry goes
        // through a fresh donation so a double charge is impossible.
        let session = self
            .gateway
            .initiate_charge(ChargeRequest {
                amount_cents: charge_amount_cents,
                donation_id: donation.id.clone(),
                description: format!("Donation {}", donation.id),
            })
            .await?;

        tracing::info!(
            donation_id = %donation.id,
            gateway = self.gateway.name(),
            session_handle = %session.session_handle,
            "Checkout handed off to gateway"
        );

        Ok(CheckoutOutcome {
            donation,
            session: Some(session),
        })
    }

    /// Flip the simulation toggle through a version compare-and-set.
    ///
    /// Disabling runs cleanup after the flip commits; enabling is just the
    /// flip. A lost CAS surfaces as a conflict so two concurrent admin
    /// actions cannot interleave.
    pub async fn toggle_simulation(&self, updated_by: &str) -> Result<ToggleOutcome> {
        let current = self.settings_repo.get().await?;
        let target = !current.enabled;

        let applied = self
            .settings_repo
            .compare_and_set(current.version, target, updated_by)
            .await?;

        if !applied {
            return Err(AppError::conflict(
                "Simulation setting changed concurrently; retry the toggle",
            ));
        }

        tracing::info!(
            enabled = target,
            updated_by = %updated_by,
            "Simulation mode toggled"
        );

        let cleanup = if target {
            None
        } else {
            Some(self.cleanup_simulated().await?)
        };

        Ok(ToggleOutcome {
            enabled: target,
            cleanup,
        })
    }

    /// Remove every simulated donation, reversing its aggregate contribution
    /// first. Each donation is one transaction: reversal failure rolls the
    /// whole donation back and reports it.
    async fn cleanup_simulated(&self) -> Result<CleanupReport> {
        let repo = self.ledger.repository();
        let donations = repo.list_simulated().await?;

        let mut deleted_count = 0usize;
        let mut skipped_donation_ids = Vec::new();

        for donation in donations {
            let allocations = repo.find_allocations(&donation.id).await?;

            // Resolve the touched-target set (including the campaign chain,
            // which reads the pool) before taking a transaction connection.
            let targets = self
                .counter_service
                .touched_targets(&donation, &allocations)
                .await?;

            let mut tx = repo.pool().begin().await?;

            // Only completed donations ever touched the aggregates.
            if donation.status == DonationStatus::Completed {
                match self
                    .counter_service
                    .reverse_targets_with_tx(&mut tx, &targets)
                    .await
                {
                    Ok(()) => {}
                    Err(AppError::Conflict(msg)) => {
                        tx.rollback().await?;
                        tracing::warn!(
                            donation_id = %donation.id,
                            reason = %msg,
                            "Simulated donation kept; aggregate reversal not applicable"
                        );
                        skipped_donation_ids.push(donation.id.clone());
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            repo.delete_with_tx(&mut tx, &donation.id).await?;
            tx.commit().await?;
            deleted_count += 1;
        }

        tracing::info!(
            deleted_count,
            skipped = skipped_donation_ids.len(),
            "Simulated donation cleanup finished"
        );

        Ok(CleanupReport {
            deleted_count,
            skipped_donation_ids,
        })
    }
}
