// Donation lifecycle owner: validated atomic creation, exactly-once
// completion, terminal failure.
//
// Completion idempotence is mandatory here: a donor reloading a confirmation
// page or a gateway callback firing twice must never double-process. The
// gate is the conditional UPDATE in the repository; only the caller that
// wins it runs the aggregate counters and publishes the completion event.

use chrono::Utc;
use std::sync::Arc;

use crate::core::{AppError, Result};
use crate::modules::aggregates::services::AggregateCounterService;
use crate::modules::donations::models::{
    Allocation, AllocationTarget, Donation, DonationStatus, RecurringInterval,
};
use crate::modules::donations::repositories::DonationRepository;
use crate::modules::donations::services::allocation_splitter::{
    AllocationSplitter, ShareRequest,
};
use crate::modules::donations::services::events::{CompletionNotifier, DonationCompletedEvent};
use crate::modules::donations::services::fee_calculator::{FeeCalculator, PaymentMethod};
use serde::Deserialize;

/// Inbound checkout request
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub total_amount_cents: i64,
    pub allocations: Vec<AllocationRequest>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub cover_fees: bool,
    #[serde(default)]
    pub is_anonymous: bool,
    pub donor_id: Option<String>,
    pub campaign_id: Option<String>,
    pub widget_token: Option<String>,
    pub recurring_interval: Option<RecurringInterval>,
    pub dedication: Option<String>,
    pub display_name: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllocationRequest {
    pub target_id: String,
    pub target_type: String,
    pub percentage: f64,
}

impl AllocationRequest {
    fn to_target(&self) -> Result<AllocationTarget> {
        match self.target_type.as_str() {
            "nonprofit" => Ok(AllocationTarget::Nonprofit(self.target_id.clone())),
            "category" => Ok(AllocationTarget::Category(self.target_id.clone())),
            other => Err(AppError::validation(format!(
                "Unknown target type '{}', expected 'nonprofit' or 'category'",
                other
            ))),
        }
    }
}

pub struct DonationLedger {
    repo: DonationRepository,
    counter_service: AggregateCounterService,
    notifier: Arc<dyn CompletionNotifier>,
}

impl DonationLedger {
    pub fn new(
        repo: DonationRepository,
        counter_service: AggregateCounterService,
        notifier: Arc<dyn CompletionNotifier>,
    ) -> Self {
        Self {
            repo,
            counter_service,
            notifier,
        }
    }

    pub fn repository(&self) -> &DonationRepository {
        &self.repo
    }

    /// Validate a checkout request and persist the donation with its
    /// allocations in one transaction.
    ///
    /// All validation (splitter, fees, directory lookups) happens before any
    /// write, so a rejected request never leaves a partial donation behind.
    pub async fn create_pending_donation(
        &self,
        request: &CheckoutRequest,
        is_simulated: bool,
    ) -> Result<Donation> {
        let share_requests: Vec<ShareRequest> = request
            .allocations
            .iter()
            .map(|a| {
                Ok(ShareRequest {
                    target: a.to_target()?,
                    percentage: a.percentage,
                })
            })
            .collect::<Result<_>>()?;

        let shares = AllocationSplitter::split(request.total_amount_cents, &share_requests)?;

        let fee_cents =
            FeeCalculator::processor_fee(request.total_amount_cents, request.payment_method)?;

        for share in &shares {
            if !self.repo.recipient_exists(&share.target).await? {
                return Err(AppError::validation(format!(
                    "Unknown {} '{}'",
                    share.target.target_type(),
                    share.target.target_id()
                )));
            }
        }

        if let Some(campaign_id) = &request.campaign_id {
            if !self.repo.campaign_exists(campaign_id).await? {
                return Err(AppError::validation(format!(
                    "Unknown campaign '{}'",
                    campaign_id
                )));
            }
        }

        let donation = Donation::new_pending(
            request.donor_id.clone(),
            request.total_amount_cents,
            fee_cents,
            request.cover_fees,
            request.recurring_interval,
            is_simulated,
            request.campaign_id.clone(),
            request.widget_token.clone(),
            request.dedication.clone(),
        );

        let allocations: Vec<Allocation> = shares
            .into_iter()
            .map(|share| {
                Allocation::new(
                    donation.id.clone(),
                    share.target,
                    share.percentage,
                    share.amount_cents,
                    request.is_anonymous,
                    request.display_name.clone(),
                    request.comment.clone(),
                )
            })
            .collect();

        self.repo.create(&donation, &allocations).await?;

        tracing::info!(
            donation_id = %donation.id,
            total_amount_cents = donation.total_amount_cents,
            allocations = allocations.len(),
            is_simulated = donation.is_simulated,
            "Pending donation created"
        );

        Ok(donation)
    }

    /// Transition a donation to completed exactly once.
    ///
    /// The winning call updates aggregates and publishes the completion
    /// event. A duplicate call on an already-completed donation returns the
    /// existing record unchanged. Completing a failed donation is a conflict.
    pub async fn complete_donation(
        &self,
        donation_id: &str,
        external_reference: &str,
    ) -> Result<Donation> {
        let won = self
            .repo
            .mark_completed(donation_id, external_reference, Utc::now())
            .await?;

        let donation = self
            .repo
            .find_by_id(donation_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Donation '{}'", donation_id)))?;

        if !won {
            return match donation.status {
                DonationStatus::Completed => {
                    tracing::info!(
                        donation_id = %donation_id,
                        "Duplicate completion signal ignored (idempotent)"
                    );
                    Ok(donation)
                }
                DonationStatus::Failed => Err(AppError::conflict(format!(
                    "Donation '{}' already failed and cannot be completed",
                    donation_id
                ))),
                // mark_completed only loses when the row left pending
                DonationStatus::Pending => Err(AppError::internal(format!(
                    "Donation '{}' still pending after completion attempt",
                    donation_id
                ))),
            };
        }

        let allocations = self.repo.find_allocations(donation_id).await?;
        self.counter_service
            .on_donation_completed(&donation, &allocations)
            .await?;

        self.notifier
            .publish(DonationCompletedEvent {
                donation_id: donation_id.to_string(),
            })
            .await?;

        tracing::info!(
            donation_id = %donation_id,
            external_reference = %external_reference,
            "Donation completed"
        );

        Ok(donation)
    }

    /// Transition a donation to failed. Terminal; a retry attempt is a fresh
    /// donation, never a re-charge of this one. Duplicate failure signals
    /// are no-ops, failing a completed donation is a conflict.
    pub async fn fail_donation(&self, donation_id: &str, reason: &str) -> Result<Donation> {
        let won = self.repo.mark_failed(donation_id, reason).await?;

        let donation = self
            .repo
            .find_by_id(donation_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Donation '{}'", donation_id)))?;

        if !won {
            return match donation.status {
                DonationStatus::Failed => {
                    tracing::info!(
                        donation_id = %donation_id,
                        "Duplicate failure signal ignored (idempotent)"
                    );
                    Ok(donation)
                }
                DonationStatus::Completed => Err(AppError::conflict(format!(
                    "Donation '{}' already completed and cannot be failed",
                    donation_id
                ))),
                DonationStatus::Pending => Err(AppError::internal(format!(
                    "Donation '{}' still pending after failure attempt",
                    donation_id
                ))),
            };
        }

        tracing::warn!(
            donation_id = %donation_id,
            reason = %reason,
            "Donation failed"
        );

        Ok(donation)
    }

    pub async fn get_donation(&self, donation_id: &str) -> Result<Donation> {
        self.repo
            .find_by_id(donation_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Donation '{}'", donation_id)))
    }
}
