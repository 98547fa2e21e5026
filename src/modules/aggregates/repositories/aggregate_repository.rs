// Counter storage. Every increment is a single upsert statement so that
// concurrent completions against the same target cannot lose updates; there
// is no read-then-write anywhere in this file.

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::core::Result;
use crate::modules::aggregates::models::{AggregateKind, AggregateTotals};

#[derive(Clone)]
pub struct AggregateRepository {
    pool: SqlitePool,
}

/// Campaign linkage resolved from the directory tables
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct CampaignChain {
    pub fundraiser_id: Option<String>,
    pub team_id: Option<String>,
}

impl AggregateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Atomically add a completed donation's share to one target
    pub async fn increment(
        &self,
        kind: AggregateKind,
        target_id: &str,
        share_cents: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO aggregate_totals (target_type, target_id, raised_cents, donation_count)
            VALUES (?, ?, ?, 1)
            ON CONFLICT (target_type, target_id) DO UPDATE SET
                raised_cents = raised_cents + excluded.raised_cents,
                donation_count = donation_count + 1
            "#,
        )
        .bind(kind.as_str())
        .bind(target_id)
        .bind(share_cents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Guarded decrement inside the caller's transaction.
    ///
    /// Returns false (without touching the row) when the target does not hold
    /// at least the amount being reversed; the caller must then roll back.
    pub async fn try_decrement_with_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        kind: AggregateKind,
        target_id: &str,
        share_cents: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE aggregate_totals
            SET raised_cents = raised_cents - ?,
                donation_count = donation_count - 1
            WHERE target_type = ? AND target_id = ?
              AND raised_cents >= ? AND donation_count >= 1
            "#,
        )
        .bind(share_cents)
        .bind(kind.as_str())
        .bind(target_id)
        .bind(share_cents)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn get_totals(
        &self,
        kind: AggregateKind,
        target_id: &str,
    ) -> Result<AggregateTotals> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT raised_cents, donation_count
            FROM aggregate_totals
            WHERE target_type = ? AND target_id = ?
            "#,
        )
        .bind(kind.as_str())
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await?;

        let (raised_cents, donation_count) = row.unwrap_or((0, 0));
        Ok(AggregateTotals {
            kind,
            target_id: target_id.to_string(),
            raised_cents,
            donation_count,
        })
    }

    /// Resolve campaign -> fundraiser -> team linkage for aggregate fan-out
    pub async fn find_campaign_chain(&self, campaign_id: &str) -> Result<CampaignChain> {
        let chain: Option<CampaignChain> = sqlx::query_as(
            r#"
            SELECT c.fundraiser_id AS fundraiser_id, f.team_id AS team_id
            FROM campaigns c
            LEFT JOIN fundraisers f ON f.id = c.fundraiser_id
            WHERE c.id = ?
            "#,
        )
        .bind(campaign_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chain.unwrap_or_default())
    }
}
