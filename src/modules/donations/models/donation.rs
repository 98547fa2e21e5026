// Donation lifecycle model.
//
// A donation is created together with its allocations in the pending state,
// then transitions exactly once to completed or failed. Both end states are
// terminal; a retry after failure is a brand-new donation, never an in-place
// re-charge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Result};

/// Donation status lifecycle: pending -> {completed, failed}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    /// Created, awaiting settlement
    Pending,

    /// Settled exactly once, aggregates updated
    Completed,

    /// Charge failed or was abandoned; terminal
    Failed,
}

impl std::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DonationStatus::Pending => write!(f, "pending"),
            DonationStatus::Completed => write!(f, "completed"),
            DonationStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for DonationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DonationStatus::Pending),
            "completed" => Ok(DonationStatus::Completed),
            "failed" => Ok(DonationStatus::Failed),
            _ => Err(format!("Invalid donation status: {}", s)),
        }
    }
}

/// Cadence for recurring gifts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringInterval {
    Monthly,
    Quarterly,
    Annually,
}

impl std::fmt::Display for RecurringInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurringInterval::Monthly => write!(f, "monthly"),
            RecurringInterval::Quarterly => write!(f, "quarterly"),
            RecurringInterval::Annually => write!(f, "annually"),
        }
    }
}

impl std::str::FromStr for RecurringInterval {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(RecurringInterval::Monthly),
            "quarterly" => Ok(RecurringInterval::Quarterly),
            "annually" => Ok(RecurringInterval::Annually),
            _ => Err(format!("Invalid recurring interval: {}", s)),
        }
    }
}

/// One donor payment, split across recipients by its allocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    /// Unique donation ID (UUID)
    pub id: String,

    /// Donor reference; None for anonymous/widget-originated gifts
    pub donor_id: Option<String>,

    /// Total donated amount; allocations sum to this exactly
    pub total_amount_cents: i64,

    /// Processor fee for the chosen payment method
    pub fee_cents: i64,

    /// Donor opted to cover fees (widget flow only)
    pub cover_fees: bool,

    pub recurring: bool,
    pub recurring_interval: Option<RecurringInterval>,

    pub status: DonationStatus,

    /// Routed through the simulated settlement path; removable via cleanup
    pub is_simulated: bool,

    /// Linked campaign, if the gift came through one
    pub campaign_id: Option<String>,

    /// Originating embeddable widget, if any
    pub widget_token: Option<String>,

    /// Gateway reference set at completion (synthetic for simulated gifts)
    pub external_reference: Option<String>,

    pub failure_reason: Option<String>,
    pub dedication: Option<String>,

    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Donation {
    /// Create a new pending donation
    pub fn new_pending(
        donor_id: Option<String>,
        total_amount_cents: i64,
        fee_cents: i64,
        cover_fees: bool,
        recurring_interval: Option<RecurringInterval>,
        is_simulated: bool,
        campaign_id: Option<String>,
        widget_token: Option<String>,
        dedication: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            donor_id,
            total_amount_cents,
            fee_cents,
            cover_fees,
            recurring: recurring_interval.is_some(),
            recurring_interval,
            status: DonationStatus::Pending,
            is_simulated,
            campaign_id,
            widget_token,
            external_reference: None,
            failure_reason: None,
            dedication,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            DonationStatus::Completed | DonationStatus::Failed
        )
    }

    /// Check a status transition without applying it.
    ///
    /// The actual transition happens in the repository as a conditional
    /// single-statement UPDATE; this mirrors the same rules for callers that
    /// need to classify a stale read.
    pub fn check_transition(&self, new_status: DonationStatus) -> Result<()> {
        match (self.status, new_status) {
            (DonationStatus::Pending, DonationStatus::Completed)
            | (DonationStatus::Pending, DonationStatus::Failed) => Ok(()),
            _ => Err(AppError::conflict(format!(
                "Invalid status transition from {} to {}",
                self.status, new_status
            ))),
        }
    }
}
