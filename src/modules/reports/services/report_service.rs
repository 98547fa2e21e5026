use tracing::info;

use crate::core::money::format_cents;
use crate::core::Result;
use crate::modules::reports::models::{Quarter, QuarterlyReport, ReportLine};
use crate::modules::reports::repositories::ReportRepository;

/// Read-only aggregation of a donor's completed donations into periodic
/// summaries. Safe under arbitrary concurrent invocation.
pub struct ReportService {
    report_repo: ReportRepository,
}

impl ReportService {
    pub fn new(report_repo: ReportRepository) -> Self {
        Self { report_repo }
    }

    /// Build a donor's quarterly giving summary.
    ///
    /// Reads completed, non-simulated donations in the quarter window,
    /// groups allocation cents by recipient, and merges impact publications
    /// from the touched nonprofits. A donor with zero qualifying donations
    /// yields `Ok(None)`, not an error.
    pub async fn generate_quarterly_report(
        &self,
        donor_id: &str,
        quarter: u8,
        year: i32,
    ) -> Result<Option<QuarterlyReport>> {
        let quarter = Quarter::new(year, quarter)?;
        let (start, end) = quarter.window()?;

        let (total_donated_cents, donation_count) = self
            .report_repo
            .donor_window_summary(donor_id, start, end)
            .await?;

        if donation_count == 0 {
            info!(
                donor_id = %donor_id,
                year,
                quarter = quarter.quarter,
                "No qualifying donations for quarterly report"
            );
            return Ok(None);
        }

        let breakdown = self
            .report_repo
            .allocation_breakdown(donor_id, start, end)
            .await?;

        let lines: Vec<ReportLine> = breakdown
            .into_iter()
            .map(|row| {
                ReportLine::new(
                    row.target_type,
                    row.target_id,
                    row.name,
                    row.amount_cents,
                    total_donated_cents,
                )
            })
            .collect();

        let nonprofit_ids: Vec<String> = lines
            .iter()
            .filter(|l| l.target_type == "nonprofit")
            .map(|l| l.target_id.clone())
            .collect();

        let impact_updates = self
            .report_repo
            .impact_updates(&nonprofit_ids, start, end)
            .await?;

        info!(
            donor_id = %donor_id,
            year,
            quarter = quarter.quarter,
            donation_count,
            recipients = lines.len(),
            impact_updates = impact_updates.len(),
            "Quarterly report generated"
        );

        Ok(Some(QuarterlyReport {
            donor_id: donor_id.to_string(),
            year,
            quarter: quarter.quarter,
            period_start: start,
            period_end: end,
            total_display: format_cents(total_donated_cents),
            total_donated_cents,
            donation_count,
            lines,
            impact_updates,
        }))
    }
}
