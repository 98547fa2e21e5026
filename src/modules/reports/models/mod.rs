pub mod quarterly_report;

pub use quarterly_report::{ImpactUpdate, Quarter, QuarterlyReport, ReportLine};
