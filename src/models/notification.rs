use serde::Serialize;

/// Kinds of notification emitted by the engine (`notifications.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    MembershipCreated,
    MembershipExtended,
    MembershipFrozen,
    MembershipUnfrozen,
    MembershipCancelled,
    MembershipExpiring,
    TrainingReminder,
    TrainingCancelled,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::MembershipCreated => "membership_created",
            NotificationKind::MembershipExtended => "membership_extended",
            NotificationKind::MembershipFrozen => "membership_frozen",
            NotificationKind::MembershipUnfrozen => "membership_unfrozen",
            NotificationKind::MembershipCancelled => "membership_cancelled",
            NotificationKind::MembershipExpiring => "membership_expiring",
            NotificationKind::TrainingReminder => "training_reminder",
            NotificationKind::TrainingCancelled => "training_cancelled",
        }
    }
}

/// Outgoing notification: `{user_id, type, title, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(user_id: i64, kind: NotificationKind, title: &str, message: String) -> Self {
        Self {
            user_id,
            kind,
            title: title.to_string(),
            message,
        }
    }
}

/// Stored notification row, as listed by `notifications <user_id>`.
#[derive(Debug, Clone, Serialize)]
pub struct StoredNotification {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}
