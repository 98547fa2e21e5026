// Allocation model: the portion of one donation routed to one recipient.
//
// The recipient is a closed tagged variant (nonprofit or category, never
// both), so the splitter and the aggregate service can match exhaustively
// instead of null-checking a pair of foreign keys.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Result};

/// Recipient of one allocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target_type", content = "target_id", rename_all = "lowercase")]
pub enum AllocationTarget {
    Nonprofit(String),
    Category(String),
}

impl AllocationTarget {
    pub fn target_type(&self) -> &'static str {
        match self {
            AllocationTarget::Nonprofit(_) => "nonprofit",
            AllocationTarget::Category(_) => "category",
        }
    }

    pub fn target_id(&self) -> &str {
        match self {
            AllocationTarget::Nonprofit(id) | AllocationTarget::Category(id) => id,
        }
    }

    /// Reconstruct a target from its persisted (type, id) pair
    pub fn from_parts(target_type: &str, target_id: String) -> Result<Self> {
        match target_type {
            "nonprofit" => Ok(AllocationTarget::Nonprofit(target_id)),
            "category" => Ok(AllocationTarget::Category(target_id)),
            other => Err(AppError::internal(format!(
                "Invalid allocation target type in database: {}",
                other
            ))),
        }
    }
}

/// One slice of a donation. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub id: String,
    pub donation_id: String,
    #[serde(flatten)]
    pub target: AllocationTarget,

    /// Requested share of the total, as given by the donor
    pub percentage: f64,

    /// Exact cents assigned by the splitter; per donation these sum to the
    /// donation total with no leakage
    pub amount_cents: i64,

    pub is_anonymous: bool,
    pub display_name: Option<String>,
    pub comment: Option<String>,
}

impl Allocation {
    pub fn new(
        donation_id: String,
        target: AllocationTarget,
        percentage: f64,
        amount_cents: i64,
        is_anonymous: bool,
        display_name: Option<String>,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            donation_id,
            target,
            percentage,
            amount_cents,
            is_anonymous,
            display_name,
            comment,
        }
    }
}
