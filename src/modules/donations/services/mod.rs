pub mod allocation_splitter;
pub mod donation_ledger;
pub mod events;
pub mod fee_calculator;

pub use allocation_splitter::{AllocationSplitter, ComputedShare, ShareRequest};
pub use donation_ledger::{AllocationRequest, CheckoutRequest, DonationLedger};
pub use events::{CompletionNotifier, DonationCompletedEvent, LogNotifier};
pub use fee_calculator::{FeeCalculator, PaymentMethod};
