//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

/// Coarse classification of an [`AppError`], used by callers that only care
/// about the category of a failure (and by the CLI for exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    ConstraintViolation,
    PreconditionFailed,
    PermissionDenied,
    InvalidInput,
    Internal,
}

impl ErrorKind {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Internal => 1,
            ErrorKind::NotFound => 2,
            ErrorKind::InvalidState => 3,
            ErrorKind::ConstraintViolation => 4,
            ErrorKind::PreconditionFailed => 5,
            ErrorKind::PermissionDenied => 6,
            ErrorKind::InvalidInput => 7,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid hour of day: {0} (expected 0-23)")]
    InvalidHour(u32),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ---------------------------
    // Not found
    // ---------------------------
    #[error("Membership {0} not found")]
    MembershipNotFound(i64),

    #[error("Active membership {0} not found")]
    ActiveMembershipNotFound(i64),

    #[error("Frozen membership {0} not found")]
    FrozenMembershipNotFound(i64),

    #[error("Membership type '{0}' not found")]
    TypeNotFound(String),

    #[error("Schedule slot {0} not found")]
    SlotNotFound(i64),

    #[error("Visit {0} not found")]
    VisitNotFound(i64),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Trainer {0} not found")]
    TrainerNotFound(i64),

    #[error("Payment {0} not found")]
    PaymentNotFound(i64),

    // ---------------------------
    // Invalid state
    // ---------------------------
    #[error("User {user_id} is already booked on slot {schedule_id}")]
    AlreadyBooked { user_id: i64, schedule_id: i64 },

    #[error("User {user_id} has no confirmed booking on slot {schedule_id}")]
    NotBooked { user_id: i64, schedule_id: i64 },

    #[error("User {0} is already inside the gym")]
    AlreadyInside(i64),

    #[error("Visit {0} is already checked out")]
    AlreadyCheckedOut(i64),

    #[error("Schedule slot {0} is not available")]
    SlotUnavailable(i64),

    #[error("User {0} has no eligible membership (active, started, with visits left)")]
    NoEligibleMembership(i64),

    #[error("Membership {0} is not the user's active membership")]
    MembershipNotActive(i64),

    #[error("Membership {id} is {status}")]
    InvalidMembershipState { id: i64, status: String },

    #[error("Payment {id} is already {status}")]
    PaymentAlreadySettled { id: i64, status: String },

    // ---------------------------
    // Constraint violations
    // ---------------------------
    #[error("Group slot {schedule_id} is full ({max} participants)")]
    GroupFull { schedule_id: i64, max: i64 },

    #[error("Personal slot {0} is already taken")]
    SlotTaken(i64),

    #[error("Membership {0} has no visits left")]
    NoVisitsLeft(i64),

    #[error("Freeze of {days} days exceeds the maximum of {max} days")]
    FreezeTooLong { days: i64, max: i64 },

    #[error("Freeze duration must be at least one day (got {0})")]
    InvalidFreezeDays(i64),

    #[error("Invalid group configuration: {0}")]
    InvalidGroupConfig(String),

    #[error("End time {end} must be later than start time {start}")]
    InvalidTimeRange { start: String, end: String },

    // ---------------------------
    // Preconditions
    // ---------------------------
    #[error("Too late to cancel: slot {schedule_id} starts at {starts_at} (cutoff {cutoff_hours}h)")]
    TooLateToCancel {
        schedule_id: i64,
        starts_at: String,
        cutoff_hours: i64,
    },

    #[error("Trainer {trainer_id} already has a slot overlapping {date} {start}-{end}")]
    ScheduleOverlap {
        trainer_id: i64,
        date: String,
        start: String,
        end: String,
    },

    #[error("Payment {0} is not confirmed")]
    PaymentNotConfirmed(i64),

    // ---------------------------
    // Access
    // ---------------------------
    #[error("Permission denied: role '{role}' cannot {action}")]
    PermissionDenied { role: String, action: String },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        use AppError::*;
        match self {
            MembershipNotFound(_)
            | ActiveMembershipNotFound(_)
            | FrozenMembershipNotFound(_)
            | TypeNotFound(_)
            | SlotNotFound(_)
            | VisitNotFound(_)
            | UserNotFound(_)
            | TrainerNotFound(_)
            | PaymentNotFound(_) => ErrorKind::NotFound,

            AlreadyBooked { .. }
            | NotBooked { .. }
            | AlreadyInside(_)
            | AlreadyCheckedOut(_)
            | SlotUnavailable(_)
            | NoEligibleMembership(_)
            | MembershipNotActive(_)
            | InvalidMembershipState { .. }
            | PaymentAlreadySettled { .. } => ErrorKind::InvalidState,

            GroupFull { .. }
            | SlotTaken(_)
            | NoVisitsLeft(_)
            | FreezeTooLong { .. }
            | InvalidFreezeDays(_)
            | InvalidGroupConfig(_)
            | InvalidTimeRange { .. } => ErrorKind::ConstraintViolation,

            TooLateToCancel { .. } | ScheduleOverlap { .. } | PaymentNotConfirmed(_) => {
                ErrorKind::PreconditionFailed
            }

            PermissionDenied { .. } => ErrorKind::PermissionDenied,

            InvalidDate(_) | InvalidTime(_) | InvalidHour(_) | InvalidRole(_)
            | InvalidArgument(_) => ErrorKind::InvalidInput,

            Io(_) | Db(_) | Migration(_) | Config(_) | ConfigLoad | ConfigSave | Export(_)
            | Other(_) => ErrorKind::Internal,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_taxonomy() {
        assert_eq!(AppError::SlotNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(AppError::AlreadyInside(1).kind(), ErrorKind::InvalidState);
        assert_eq!(
            AppError::GroupFull {
                schedule_id: 1,
                max: 1
            }
            .kind(),
            ErrorKind::ConstraintViolation
        );
        assert_eq!(
            AppError::FreezeTooLong { days: 31, max: 30 }.kind(),
            ErrorKind::ConstraintViolation
        );
        assert_eq!(
            AppError::PaymentNotConfirmed(3).kind(),
            ErrorKind::PreconditionFailed
        );
        assert_eq!(AppError::Export("x".into()).kind().exit_code(), 1);
    }
}
