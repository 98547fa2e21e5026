// Read-only aggregation queries behind the quarterly report. Only
// completed, non-simulated donations are visible here.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::core::Result;
use crate::modules::reports::models::ImpactUpdate;

#[derive(Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

/// Per-recipient totals over a window
#[derive(Debug, sqlx::FromRow)]
pub struct AllocationBreakdownRow {
    pub target_type: String,
    pub target_id: String,
    pub name: Option<String>,
    pub amount_cents: i64,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Donor's completed, non-simulated total and count within [start, end)
    pub async fn donor_window_summary(
        &self,
        donor_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(i64, i64)> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount_cents), 0), COUNT(*)
            FROM donations
            WHERE donor_id = ?
              AND status = 'completed'
              AND is_simulated = 0
              AND completed_at >= ? AND completed_at < ?
            "#,
        )
        .bind(donor_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Allocation cents grouped by recipient target, largest first
    pub async fn allocation_breakdown(
        &self,
        donor_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AllocationBreakdownRow>> {
        let rows: Vec<AllocationBreakdownRow> = sqlx::query_as(
            r#"
            SELECT a.target_type AS target_type,
                   a.target_id AS target_id,
                   COALESCE(n.name, c.name) AS name,
                   SUM(a.amount_cents) AS amount_cents
            FROM donations d
            JOIN allocations a ON a.donation_id = d.id
            LEFT JOIN nonprofits n ON a.target_type = 'nonprofit' AND n.id = a.target_id
            LEFT JOIN categories c ON a.target_type = 'category' AND c.id = a.target_id
            WHERE d.donor_id = ?
              AND d.status = 'completed'
              AND d.is_simulated = 0
              AND d.completed_at >= ? AND d.completed_at < ?
            GROUP BY a.target_type, a.target_id
            ORDER BY amount_cents DESC, a.target_id
            "#,
        )
        .bind(donor_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Impact publications from the given nonprofits within [start, end)
    pub async fn impact_updates(
        &self,
        nonprofit_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ImpactUpdate>> {
        if nonprofit_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; nonprofit_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT id, nonprofit_id, title, body, published_at
            FROM impact_updates
            WHERE nonprofit_id IN ({})
              AND published_at >= ? AND published_at < ?
            ORDER BY published_at DESC
            "#,
            placeholders
        );

        let mut query =
            sqlx::query_as::<_, (String, String, String, Option<String>, DateTime<Utc>)>(&sql);
        for id in nonprofit_ids {
            query = query.bind(id);
        }
        let rows = query.bind(start).bind(end).fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|(id, nonprofit_id, title, body, published_at)| ImpactUpdate {
                id,
                nonprofit_id,
                title,
                body,
                published_at,
            })
            .collect())
    }
}
