//! Per-request environment shared by every engine operation.

use crate::config::Config;
use crate::core::notify::{DbNotifier, NotificationSink};
use crate::db::log::ttlog_soft;
use crate::models::notification::Notification;
use crate::ui::messages::warning;
use crate::utils::date::{Clock, fmt_ts};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

/// Business limits read from the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GymRules {
    pub max_freeze_days: i64,
    pub cancel_cutoff_hours: i64,
    pub gym_capacity: i64,
    pub peak_window_days: i64,
    pub expiring_notice_days: i64,
}

impl Default for GymRules {
    fn default() -> Self {
        Self {
            max_freeze_days: 30,
            cancel_cutoff_hours: 24,
            gym_capacity: 50,
            peak_window_days: 30,
            expiring_notice_days: 7,
        }
    }
}

impl From<&Config> for GymRules {
    fn from(cfg: &Config) -> Self {
        Self {
            max_freeze_days: cfg.max_freeze_days,
            cancel_cutoff_hours: cfg.cancel_cutoff_hours,
            gym_capacity: cfg.gym_capacity,
            peak_window_days: cfg.peak_window_days,
            expiring_notice_days: cfg.expiring_notice_days,
        }
    }
}

pub struct GymContext {
    pub clock: Clock,
    pub rules: GymRules,
    pub sink: Box<dyn NotificationSink>,
}

impl GymContext {
    pub fn new(clock: Clock, rules: GymRules, sink: Box<dyn NotificationSink>) -> Self {
        Self { clock, rules, sink }
    }

    /// Context used by the CLI: rules from the config file, notifications stored in the DB.
    pub fn from_config(cfg: &Config, clock: Clock) -> Self {
        Self::new(clock, GymRules::from(cfg), Box::new(DbNotifier))
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now_str(&self) -> String {
        fmt_ts(&self.now())
    }

    /// Fire-and-forget delivery. Must be called after the triggering write has
    /// committed; a failure is reported but never propagated.
    pub fn notify(&self, conn: &Connection, note: Notification) {
        if let Err(e) = self.sink.deliver(conn, &note, self.now()) {
            warning(format!(
                "Notification '{}' for user {} not delivered: {}",
                note.kind.as_str(),
                note.user_id,
                e
            ));
            ttlog_soft(conn, "notify_failed", note.kind.as_str(), &e.to_string());
        }
    }
}
