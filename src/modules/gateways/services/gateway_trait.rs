use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::Result;

/// Payment gateway seam. The live implementation talks HTTP; the simulated
/// settlement path bypasses this trait entirely.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Initiate a charge and return a session the donor is redirected to.
    /// The gateway later reports the outcome through the webhook callback.
    async fn initiate_charge(&self, request: ChargeRequest) -> Result<ChargeSession>;

    /// Verify a webhook signature against the raw payload
    fn verify_webhook(&self, signature: &str, payload: &str) -> Result<bool>;

    /// Gateway name for logging
    fn name(&self) -> &str;
}

/// Outbound charge request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequest {
    /// Amount to charge, including any donor-covered surcharge
    pub amount_cents: i64,

    /// Donation this charge settles; echoed back in the webhook
    pub donation_id: String,

    pub description: String,
}

/// Charge session returned by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeSession {
    /// Gateway session reference
    pub session_handle: String,

    /// Hosted page the donor completes the payment on
    pub checkout_url: String,
}

/// Parsed webhook callback body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCallback {
    pub donation_id: String,
    pub status: CallbackStatus,
    pub external_reference: String,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Completed,
    Failed,
}
