pub mod aggregates;
pub mod donations;
pub mod gateways;
pub mod health;
pub mod reports;
pub mod settlement;
