use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::core::{AppError, Result};
use crate::modules::donations::services::donation_ledger::DonationLedger;
use crate::modules::gateways::{CallbackStatus, GatewayCallback, PaymentGateway};

const SIGNATURE_HEADER: &str = "X-Gateway-Signature";

/// POST /webhooks/gateway
///
/// Gateway settlement callback. Duplicate deliveries are expected, not
/// exceptional: the ledger absorbs them as no-ops, so this handler can
/// always acknowledge a signal it has already processed.
pub async fn handle_gateway_callback(
    ledger: web::Data<Arc<DonationLedger>>,
    gateway: web::Data<Arc<dyn PaymentGateway>>,
    http_request: HttpRequest,
    body: String,
) -> Result<HttpResponse> {
    let signature = http_request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::validation("Missing webhook signature header"))?;

    if !gateway.verify_webhook(signature, &body)? {
        tracing::warn!("Rejected gateway callback with bad signature");
        return Err(AppError::validation("Invalid webhook signature"));
    }

    let callback: GatewayCallback = serde_json::from_str(&body)?;

    let donation = match callback.status {
        CallbackStatus::Completed => {
            ledger
                .complete_donation(&callback.donation_id, &callback.external_reference)
                .await?
        }
        CallbackStatus::Failed => {
            let reason = callback
                .failure_reason
                .as_deref()
                .unwrap_or("Gateway reported failure");
            ledger.fail_donation(&callback.donation_id, reason).await?
        }
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "received": true,
        "donation_id": donation.id,
        "status": donation.status,
    })))
}
