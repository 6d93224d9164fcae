pub mod access;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod context;
pub mod directory;
pub mod ledger;
pub mod log;
pub mod notify;
pub mod occupancy;

pub use booking::BookingCoordinator;
pub use catalog::TrainingCatalog;
pub use context::{GymContext, GymRules};
pub use directory::Directory;
pub use ledger::MembershipLedger;
pub use occupancy::OccupancyAggregator;
