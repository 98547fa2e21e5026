use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::{AppError, Result};
use crate::modules::settlement::services::SettlementModeGate;

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub updated_by: String,
}

/// POST /admin/simulation/toggle
///
/// Authorization of the caller is an upstream collaborator concern; this
/// endpoint only serializes the flip and reports the cleanup outcome.
pub async fn toggle_simulation(
    gate: web::Data<SettlementModeGate>,
    request: web::Json<ToggleRequest>,
) -> Result<HttpResponse> {
    match gate.toggle_simulation(&request.updated_by).await {
        Ok(outcome) => {
            let skipped = outcome
                .cleanup
                .as_ref()
                .map(|c| c.skipped_donation_ids.clone())
                .unwrap_or_default();

            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": skipped.is_empty(),
                "enabled": outcome.enabled,
                "deleted_count": outcome.cleanup.as_ref().map(|c| c.deleted_count),
                "skipped_donation_ids": skipped,
                "error": if skipped.is_empty() {
                    None
                } else {
                    Some(format!(
                        "{} simulated donation(s) kept; aggregate reversal failed",
                        skipped.len()
                    ))
                },
            })))
        }
        Err(AppError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(serde_json::json!({
            "success": false,
            "error": msg,
        }))),
        Err(e) => Err(e),
    }
}

/// GET /admin/simulation
pub async fn get_simulation_mode(gate: web::Data<SettlementModeGate>) -> Result<HttpResponse> {
    let enabled = gate.simulation_enabled().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "enabled": enabled })))
}
