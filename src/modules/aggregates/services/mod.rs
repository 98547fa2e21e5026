pub mod counter_service;

pub use counter_service::AggregateCounterService;
