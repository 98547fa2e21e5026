use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::Result;
use crate::modules::reports::services::ReportService;

#[derive(Debug, Deserialize)]
pub struct QuarterlyReportQuery {
    pub donor_id: String,
    pub quarter: u8,
    pub year: i32,
}

/// GET /reports/quarterly
///
/// 204 (not an error) when the donor has no qualifying donations in the
/// window.
pub async fn get_quarterly_report(
    service: web::Data<ReportService>,
    query: web::Query<QuarterlyReportQuery>,
) -> Result<HttpResponse> {
    let report = service
        .generate_quarterly_report(&query.donor_id, query.quarter, query.year)
        .await?;

    Ok(match report {
        Some(report) => HttpResponse::Ok().json(report),
        None => HttpResponse::NoContent().finish(),
    })
}
