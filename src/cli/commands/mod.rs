pub mod book;
pub mod config;
pub mod init;
pub mod log;
pub mod member;
pub mod mtype;
pub mod notifications;
pub mod occupancy;
pub mod payment;
pub mod report;
pub mod slot;
pub mod user;
pub mod visit;
