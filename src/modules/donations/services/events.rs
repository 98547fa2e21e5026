use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::Result;

/// Emitted exactly once per donation, after the completion transition commits
/// and aggregates are updated. Receipt and notification formatting happen in
/// downstream collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationCompletedEvent {
    pub donation_id: String,
}

/// Seam for receipt/notification collaborators
#[async_trait]
pub trait CompletionNotifier: Send + Sync {
    async fn publish(&self, event: DonationCompletedEvent) -> Result<()>;
}

/// Default notifier: structured log only. Real deployments plug in a
/// queue-backed implementation here.
pub struct LogNotifier;

#[async_trait]
impl CompletionNotifier for LogNotifier {
    async fn publish(&self, event: DonationCompletedEvent) -> Result<()> {
        tracing::info!(donation_id = %event.donation_id, "Donation completed event published");
        Ok(())
    }
}
