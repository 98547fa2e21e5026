use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::Result;
use crate::modules::settlement::models::SimulationModeSetting;

/// Storage for the single simulation-mode row
#[derive(Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<SimulationModeSetting> {
        let (enabled, version, updated_by, updated_at): (
            bool,
            i64,
            Option<String>,
            Option<chrono::DateTime<Utc>>,
        ) = sqlx::query_as(
            "SELECT enabled, version, updated_by, updated_at FROM simulation_mode WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(SimulationModeSetting {
            enabled,
            version,
            updated_by,
            updated_at,
        })
    }

    /// Compare-and-set on the version counter.
    ///
    /// Returns false without changing anything when another writer got there
    /// first; the caller surfaces that as a conflict rather than retrying
    /// blindly.
    pub async fn compare_and_set(
        &self,
        expected_version: i64,
        enabled: bool,
        updated_by: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE simulation_mode
            SET enabled = ?, version = version + 1, updated_by = ?, updated_at = ?
            WHERE id = 1 AND version = ?
            "#,
        )
        .bind(enabled)
        .bind(updated_by)
        .bind(Utc::now())
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
