//! Notification sink: where `{user_id, type, title, message}` records go.

use crate::db::log::ttlog;
use crate::db::queries::insert_notification;
use crate::errors::AppResult;
use crate::models::notification::{Notification, NotificationKind};
use crate::utils::date::fmt_ts;
use chrono::NaiveDateTime;
use rusqlite::Connection;

pub trait NotificationSink {
    fn deliver(&self, conn: &Connection, note: &Notification, at: NaiveDateTime) -> AppResult<()>;
}

/// Stores notifications in the `notifications` table. Training reminders and
/// cancellations also get an e-mail stub line in the internal log.
pub struct DbNotifier;

impl NotificationSink for DbNotifier {
    fn deliver(&self, conn: &Connection, note: &Notification, at: NaiveDateTime) -> AppResult<()> {
        insert_notification(conn, note, &fmt_ts(&at))?;

        if matches!(
            note.kind,
            NotificationKind::TrainingReminder | NotificationKind::TrainingCancelled
        ) {
            send_email_stub(conn, note.user_id, &note.title, &note.message)?;
        }
        Ok(())
    }
}

/// Drops everything.
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn deliver(&self, _conn: &Connection, _note: &Notification, _at: NaiveDateTime) -> AppResult<()> {
        Ok(())
    }
}

/// No mail transport is wired in: the message is only recorded in the log table.
pub fn send_email_stub(conn: &Connection, user_id: i64, subject: &str, body: &str) -> AppResult<()> {
    ttlog(
        conn,
        "email",
        &format!("user {}", user_id),
        &format!("[EMAIL STUB] Subject: {} | {}", subject, body),
    )
}
