pub mod donation_repository;

pub use donation_repository::DonationRepository;
