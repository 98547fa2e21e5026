use actix_web::{web, HttpResponse};

use crate::core::Result;
use crate::modules::donations::services::donation_ledger::CheckoutRequest;
use crate::modules::settlement::services::SettlementModeGate;

/// POST /checkout
///
/// Validates and persists the donation, then routes it to the live gateway
/// or the simulated settlement path depending on the platform toggle.
pub async fn create_checkout(
    gate: web::Data<SettlementModeGate>,
    request: web::Json<CheckoutRequest>,
) -> Result<HttpResponse> {
    let outcome = gate.route_checkout(&request).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "donation": outcome.donation,
        "checkout_url": outcome.session.as_ref().map(|s| s.checkout_url.clone()),
        "session_handle": outcome.session.as_ref().map(|s| s.session_handle.clone()),
    })))
}

/// GET /donations/{id}
pub async fn get_donation(
    gate: web::Data<SettlementModeGate>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let donation = gate.ledger().get_donation(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(donation))
}
