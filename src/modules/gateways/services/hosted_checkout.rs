use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::gateway_trait::{ChargeRequest, ChargeSession, PaymentGateway};
use crate::core::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Hosted-checkout gateway client. Creates a checkout session over HTTP and
/// verifies webhook callbacks with an HMAC-SHA256 signature over the raw
/// body.
pub struct HostedCheckoutGateway {
    client: Client,
    api_key: String,
    base_url: String,
    webhook_secret: String,
}

impl HostedCheckoutGateway {
    pub fn new(api_key: String, webhook_secret: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            webhook_secret,
        }
    }
}

#[async_trait]
impl PaymentGateway for HostedCheckoutGateway {
    async fn initiate_charge(&self, request: ChargeRequest) -> Result<ChargeSession> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);

        #[derive(Serialize)]
        struct SessionRequest<'a> {
            amount_cents: i64,
            reference: &'a str,
            description: &'a str,
        }

        #[derive(Deserialize)]
        struct SessionResponse {
            id: String,
            checkout_url: String,
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&SessionRequest {
                amount_cents: request.amount_cents,
                reference: &request.donation_id,
                description: &request.description,
            })
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Charge initiation failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(AppError::Gateway(format!(
                "Charge initiation rejected {}: {}",
                status, error_body
            )));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("Invalid session response: {}", e)))?;

        Ok(ChargeSession {
            session_handle: session.id,
            checkout_url: session.checkout_url,
        })
    }

    fn verify_webhook(&self, signature: &str, payload: &str) -> Result<bool> {
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|e| AppError::internal(format!("Invalid webhook secret: {}", e)))?;
        mac.update(payload.as_bytes());

        let expected = hex::encode(mac.finalize().into_bytes());
        Ok(expected == signature.trim().to_lowercase())
    }

    fn name(&self) -> &str {
        "hosted_checkout"
    }
}
