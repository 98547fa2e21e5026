use serde::{Deserialize, Serialize};

/// Kinds of entities that accumulate running donation totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Campaign,
    Fundraiser,
    Team,
    Nonprofit,
    Category,
    WidgetToken,
}

impl AggregateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::Campaign => "campaign",
            AggregateKind::Fundraiser => "fundraiser",
            AggregateKind::Team => "team",
            AggregateKind::Nonprofit => "nonprofit",
            AggregateKind::Category => "category",
            AggregateKind::WidgetToken => "widget_token",
        }
    }
}

impl std::fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running totals for one aggregate target. Rows only grow through completed
/// donations and only shrink through simulation cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateTotals {
    pub kind: AggregateKind,
    pub target_id: String,
    pub raised_cents: i64,
    pub donation_count: i64,
}

/// One touched target with the share of a donation attributed to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchedTarget {
    pub kind: AggregateKind,
    pub target_id: String,
    pub share_cents: i64,
}
