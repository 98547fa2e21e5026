pub mod allocation;
pub mod donation;

pub use allocation::{Allocation, AllocationTarget};
pub use donation::{Donation, DonationStatus, RecurringInterval};
