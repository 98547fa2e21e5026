pub mod settlement_gate;

pub use settlement_gate::{CheckoutOutcome, CleanupReport, SettlementModeGate, ToggleOutcome};
