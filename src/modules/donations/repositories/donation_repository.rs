// SQLite persistence for donations and their allocations.
//
// A donation and its allocations are written in one transaction, so the
// allocation rows are durable before any completion transition can happen.
// Status transitions are conditional single-statement UPDATEs; the caller
// learns from rows_affected whether it won the transition.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

use crate::core::{AppError, Result};
use crate::modules::donations::models::{
    Allocation, AllocationTarget, Donation, DonationStatus, RecurringInterval,
};

/// Repository for donation database operations
#[derive(Clone)]
pub struct DonationRepository {
    pool: SqlitePool,
}

impl DonationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Persist a pending donation with its allocations atomically
    pub async fn create(&self, donation: &Donation, allocations: &[Allocation]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO donations (
                id, donor_id, total_amount_cents, fee_cents, cover_fees,
                recurring, recurring_interval, status, is_simulated,
                campaign_id, widget_token, external_reference, failure_reason,
                dedication, created_at, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&donation.id)
        .bind(&donation.donor_id)
        .bind(donation.total_amount_cents)
        .bind(donation.fee_cents)
        .bind(donation.cover_fees)
        .bind(donation.recurring)
        .bind(donation.recurring_interval.map(|i| i.to_string()))
        .bind(donation.status.to_string())
        .bind(donation.is_simulated)
        .bind(&donation.campaign_id)
        .bind(&donation.widget_token)
        .bind(&donation.external_reference)
        .bind(&donation.failure_reason)
        .bind(&donation.dedication)
        .bind(donation.created_at)
        .bind(donation.completed_at)
        .execute(&mut *tx)
        .await?;

        for allocation in allocations {
            sqlx::query(
                r#"
                INSERT INTO allocations (
                    id, donation_id, target_type, target_id, percentage,
                    amount_cents, is_anonymous, display_name, comment
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&allocation.id)
            .bind(&allocation.donation_id)
            .bind(allocation.target.target_type())
            .bind(allocation.target.target_id())
            .bind(allocation.percentage)
            .bind(allocation.amount_cents)
            .bind(allocation.is_anonymous)
            .bind(&allocation.display_name)
            .bind(&allocation.comment)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Donation>> {
        let row: Option<DonationRow> = sqlx::query_as(
            r#"
            SELECT id, donor_id, total_amount_cents, fee_cents, cover_fees,
                   recurring, recurring_interval, status, is_simulated,
                   campaign_id, widget_token, external_reference,
                   failure_reason, dedication, created_at, completed_at
            FROM donations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DonationRow::into_donation).transpose()
    }

    pub async fn find_allocations(&self, donation_id: &str) -> Result<Vec<Allocation>> {
        let rows: Vec<AllocationRow> = sqlx::query_as(
            r#"
            SELECT id, donation_id, target_type, target_id, percentage,
                   amount_cents, is_anonymous, display_name, comment
            FROM allocations
            WHERE donation_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(donation_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AllocationRow::into_allocation).collect()
    }

    /// Attempt the pending -> completed transition.
    ///
    /// Returns true when this call won the transition; false when the
    /// donation was no longer pending (the caller re-reads to classify).
    pub async fn mark_completed(
        &self,
        id: &str,
        external_reference: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE donations
            SET status = 'completed', external_reference = ?, completed_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(external_reference)
        .bind(completed_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Attempt the pending -> failed transition. Same contract as
    /// `mark_completed`.
    pub async fn mark_failed(&self, id: &str, reason: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE donations
            SET status = 'failed', failure_reason = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(reason)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// All donations routed through the simulated settlement path, oldest
    /// first, for cleanup when simulation is disabled
    pub async fn list_simulated(&self) -> Result<Vec<Donation>> {
        let rows: Vec<DonationRow> = sqlx::query_as(
            r#"
            SELECT id, donor_id, total_amount_cents, fee_cents, cover_fees,
                   recurring, recurring_interval, status, is_simulated,
                   campaign_id, widget_token, external_reference,
                   failure_reason, dedication, created_at, completed_at
            FROM donations
            WHERE is_simulated = 1
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DonationRow::into_donation).collect()
    }

    /// Delete a donation and its allocations inside the caller's transaction
    pub async fn delete_with_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        donation_id: &str,
    ) -> Result<()> {
        sqlx::query("DELETE FROM allocations WHERE donation_id = ?")
            .bind(donation_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query("DELETE FROM donations WHERE id = ?")
            .bind(donation_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Check an allocation recipient against the directory tables
    pub async fn recipient_exists(&self, target: &AllocationTarget) -> Result<bool> {
        let query = match target {
            AllocationTarget::Nonprofit(_) => "SELECT COUNT(*) FROM nonprofits WHERE id = ?",
            AllocationTarget::Category(_) => "SELECT COUNT(*) FROM categories WHERE id = ?",
        };

        let count: i64 = sqlx::query_scalar(query)
            .bind(target.target_id())
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    pub async fn campaign_exists(&self, campaign_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM campaigns WHERE id = ?")
            .bind(campaign_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}

// Helper structs for database mapping

#[derive(Debug, sqlx::FromRow)]
struct DonationRow {
    id: String,
    donor_id: Option<String>,
    total_amount_cents: i64,
    fee_cents: i64,
    cover_fees: bool,
    recurring: bool,
    recurring_interval: Option<String>,
    status: String,
    is_simulated: bool,
    campaign_id: Option<String>,
    widget_token: Option<String>,
    external_reference: Option<String>,
    failure_reason: Option<String>,
    dedication: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl DonationRow {
    fn into_donation(self) -> Result<Donation> {
        let status = DonationStatus::from_str(&self.status)
            .map_err(|e| AppError::internal(format!("Invalid status in database: {}", e)))?;

        let recurring_interval = self
            .recurring_interval
            .as_deref()
            .map(RecurringInterval::from_str)
            .transpose()
            .map_err(|e| AppError::internal(format!("Invalid interval in database: {}", e)))?;

        Ok(Donation {
            id: self.id,
            donor_id: self.donor_id,
            total_amount_cents: self.total_amount_cents,
            fee_cents: self.fee_cents,
            cover_fees: self.cover_fees,
            recurring: self.recurring,
            recurring_interval,
            status,
            is_simulated: self.is_simulated,
            campaign_id: self.campaign_id,
            widget_token: self.widget_token,
            external_reference: self.external_reference,
            failure_reason: self.failure_reason,
            dedication: self.dedication,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AllocationRow {
    id: String,
    donation_id: String,
    target_type: String,
    target_id: String,
    percentage: f64,
    amount_cents: i64,
    is_anonymous: bool,
    display_name: Option<String>,
    comment: Option<String>,
}

impl AllocationRow {
    fn into_allocation(self) -> Result<Allocation> {
        let target = AllocationTarget::from_parts(&self.target_type, self.target_id)?;

        Ok(Allocation {
            id: self.id,
            donation_id: self.donation_id,
            target,
            percentage: self.percentage,
            amount_cents: self.amount_cents,
            is_anonymous: self.is_anonymous,
            display_name: self.display_name,
            comment: self.comment,
        })
    }
}
