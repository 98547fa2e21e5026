// Running-total maintenance for every aggregate touched by a donation.
//
// Invoked exactly once per donation, guarded by the ledger's exactly-once
// completion transition. There is deliberately no idempotence check here: a
// double invocation would double-count and is a caller-side invariant
// violation, not something to tolerate silently.

use sqlx::{Sqlite, Transaction};

use crate::core::{AppError, Result};
use crate::modules::aggregates::models::{AggregateKind, TouchedTarget};
use crate::modules::aggregates::repositories::{AggregateRepository, CampaignChain};
use crate::modules::donations::models::{Allocation, AllocationTarget, Donation};

#[derive(Clone)]
pub struct AggregateCounterService {
    repo: AggregateRepository,
}

impl AggregateCounterService {
    pub fn new(repo: AggregateRepository) -> Self {
        Self { repo }
    }

    /// Apply a completed donation to every reachable aggregate target.
    ///
    /// Each allocation's nonprofit/category receives its allocated share;
    /// the linked campaign, that campaign's fundraiser, the fundraiser's
    /// team, and the originating widget each receive the donation total.
    /// Every update is an atomic single-statement increment.
    pub async fn on_donation_completed(
        &self,
        donation: &Donation,
        allocations: &[Allocation],
    ) -> Result<()> {
        let targets = self.touched_targets(donation, allocations).await?;

        for target in &targets {
            self.repo
                .increment(target.kind, &target.target_id, target.share_cents)
                .await?;
        }

        tracing::debug!(
            donation_id = %donation.id,
            targets = targets.len(),
            "Aggregate totals incremented"
        );

        Ok(())
    }

    /// Reverse a donation's earlier contribution inside the caller's
    /// transaction. The caller resolves the target set via
    /// `touched_targets` before opening the transaction; the chain lookup
    /// reads the pool and must not run while the transaction holds a
    /// connection. Any target that cannot absorb its decrement aborts the
    /// whole reversal so the caller can roll back and keep the donation.
    pub async fn reverse_targets_with_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        targets: &[TouchedTarget],
    ) -> Result<()> {
        for target in targets {
            let applied = self
                .repo
                .try_decrement_with_tx(tx, target.kind, &target.target_id, target.share_cents)
                .await?;

            if !applied {
                return Err(AppError::conflict(format!(
                    "Cannot reverse {} cents from {} '{}'",
                    target.share_cents, target.kind, target.target_id
                )));
            }
        }

        Ok(())
    }

    /// Distinct aggregate targets reachable from a donation, with the share
    /// attributed to each. Allocations hitting the same recipient merge into
    /// one entry so the target's donation_count moves by exactly 1.
    pub async fn touched_targets(
        &self,
        donation: &Donation,
        allocations: &[Allocation],
    ) -> Result<Vec<TouchedTarget>> {
        let mut targets: Vec<TouchedTarget> = Vec::new();

        for allocation in allocations {
            let (kind, target_id) = match &allocation.target {
                AllocationTarget::Nonprofit(id) => (AggregateKind::Nonprofit, id.clone()),
                AllocationTarget::Category(id) => (AggregateKind::Category, id.clone()),
            };
            push_share(&mut targets, kind, target_id, allocation.amount_cents);
        }

        if let Some(campaign_id) = &donation.campaign_id {
            push_share(
                &mut targets,
                AggregateKind::Campaign,
                campaign_id.clone(),
                donation.total_amount_cents,
            );

            let CampaignChain {
                fundraiser_id,
                team_id,
            } = self.repo.find_campaign_chain(campaign_id).await?;

            if let Some(fundraiser_id) = fundraiser_id {
                push_share(
                    &mut targets,
                    AggregateKind::Fundraiser,
                    fundraiser_id,
                    donation.total_amount_cents,
                );
            }

            if let Some(team_id) = team_id {
                push_share(
                    &mut targets,
                    AggregateKind::Team,
                    team_id,
                    donation.total_amount_cents,
                );
            }
        }

        if let Some(widget_token) = &donation.widget_token {
            push_share(
                &mut targets,
                AggregateKind::WidgetToken,
                widget_token.clone(),
                donation.total_amount_cents,
            );
        }

        Ok(targets)
    }
}

fn push_share(targets: &mut Vec<TouchedTarget>, kind: AggregateKind, target_id: String, cents: i64) {
    if let Some(existing) = targets
        .iter_mut()
        .find(|t| t.kind == kind && t.target_id == target_id)
    {
        existing.share_cents += cents;
    } else {
        targets.push(TouchedTarget {
            kind,
            target_id,
            share_cents: cents,
        });
    }
}
