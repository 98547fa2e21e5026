pub mod aggregate_target;

pub use aggregate_target::{AggregateKind, AggregateTotals, TouchedTarget};
