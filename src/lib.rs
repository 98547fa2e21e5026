//! GiveSplit donation allocation & settlement engine
//!
//! One payment, split across many recipients: exact-cent apportionment,
//! exactly-once settlement, lost-update-free running totals, a reversible
//! platform-wide simulation mode, and quarterly donor reporting.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use modules::aggregates;
pub use modules::donations;
pub use modules::gateways;
pub use modules::reports;
pub use modules::settlement;
