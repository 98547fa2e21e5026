use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::core::money::format_cents;
use crate::core::{AppError, Result};

/// One calendar quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quarter {
    pub year: i32,
    pub quarter: u8,
}

impl Quarter {
    pub fn new(year: i32, quarter: u8) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(AppError::validation(format!(
                "Quarter must be 1-4, got {}",
                quarter
            )));
        }
        Ok(Self { year, quarter })
    }

    /// Half-open UTC window [start, end) covering the quarter
    pub fn window(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let start_month = u32::from(self.quarter - 1) * 3 + 1;
        let (end_year, end_month) = if self.quarter == 4 {
            (self.year + 1, 1)
        } else {
            (self.year, start_month + 3)
        };

        let start = Utc
            .with_ymd_and_hms(self.year, start_month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| AppError::validation(format!("Invalid quarter start: {:?}", self)))?;
        let end = Utc
            .with_ymd_and_hms(end_year, end_month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| AppError::validation(format!("Invalid quarter end: {:?}", self)))?;

        Ok((start, end))
    }
}

/// Aggregated giving to one recipient over the quarter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    pub target_type: String,
    pub target_id: String,
    pub name: Option<String>,
    pub amount_cents: i64,
    pub amount_display: String,

    /// Informational share of the donor's quarterly total. Integer floor;
    /// drift is acceptable here because this is a display summary, not a
    /// balance.
    pub percent_of_total: i64,
}

impl ReportLine {
    pub fn new(
        target_type: String,
        target_id: String,
        name: Option<String>,
        amount_cents: i64,
        total_cents: i64,
    ) -> Self {
        let percent_of_total = if total_cents > 0 {
            amount_cents * 100 / total_cents
        } else {
            0
        };

        Self {
            target_type,
            target_id,
            name,
            amount_display: format_cents(amount_cents),
            amount_cents,
            percent_of_total,
        }
    }
}

/// An impact publication from a recipient the donor supported this quarter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactUpdate {
    pub id: String,
    pub nonprofit_id: String,
    pub title: String,
    pub body: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Periodic summary of a donor's completed, non-simulated giving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterlyReport {
    pub donor_id: String,
    pub year: i32,
    pub quarter: u8,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub total_donated_cents: i64,
    pub total_display: String,
    pub donation_count: i64,
    pub lines: Vec<ReportLine>,
    pub impact_updates: Vec<ImpactUpdate>,
}
