pub mod membership;
pub mod membership_type;
pub mod notification;
pub mod participation;
pub mod payment;
pub mod role;
pub mod schedule;
pub mod user;
pub mod visit;
