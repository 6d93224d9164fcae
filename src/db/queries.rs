//! Row-level SQL for every table. No business rules live here: callers decide
//! what is allowed, these functions only read and write rows.

use crate::errors::AppError;
use crate::models::membership::{Membership, MembershipStatus};
use crate::models::membership_type::MembershipType;
use crate::models::notification::{Notification, StoredNotification};
use crate::models::participation::{Participation, ParticipationStatus};
use crate::models::payment::{Payment, PaymentStatus};
use crate::models::role::Role;
use crate::models::schedule::{NewSlot, ScheduleSlot, TrainingType};
use crate::models::user::User;
use crate::models::visit::VisitEvent;
use crate::utils::date::{DATE_FMT, TS_FMT, fmt_date, fmt_ts};
use crate::utils::time::{TIME_FMT, fmt_time};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

// ------------------------------------------------
// Column conversion helpers
// ------------------------------------------------

fn conversion_error(err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn get_date(row: &Row, col: &str) -> Result<NaiveDate> {
    let raw: String = row.get(col)?;
    NaiveDate::parse_from_str(&raw, DATE_FMT)
        .map_err(|_| conversion_error(AppError::InvalidDate(raw.clone())))
}

fn get_opt_date(row: &Row, col: &str) -> Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, DATE_FMT)
            .map(Some)
            .map_err(|_| conversion_error(AppError::InvalidDate(s.clone()))),
    }
}

fn get_time(row: &Row, col: &str) -> Result<NaiveTime> {
    let raw: String = row.get(col)?;
    NaiveTime::parse_from_str(&raw, TIME_FMT)
        .map_err(|_| conversion_error(AppError::InvalidTime(raw.clone())))
}

fn get_ts(row: &Row, col: &str) -> Result<NaiveDateTime> {
    let raw: String = row.get(col)?;
    NaiveDateTime::parse_from_str(&raw, TS_FMT)
        .map_err(|_| conversion_error(AppError::InvalidDate(raw.clone())))
}

fn get_opt_ts(row: &Row, col: &str) -> Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(s) => NaiveDateTime::parse_from_str(&s, TS_FMT)
            .map(Some)
            .map_err(|_| conversion_error(AppError::InvalidDate(s.clone()))),
    }
}

fn get_bool(row: &Row, col: &str) -> Result<bool> {
    Ok(row.get::<_, i64>(col)? != 0)
}

fn collect<T>(rows: impl Iterator<Item = Result<T>>) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ------------------------------------------------
// Users
// ------------------------------------------------

fn map_user(row: &Row) -> Result<User> {
    let role_str: String = row.get("role")?;
    let role = Role::from_db_str(&role_str)
        .ok_or_else(|| conversion_error(AppError::InvalidRole(role_str.clone())))?;

    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        role,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_user(
    conn: &Connection,
    username: &str,
    email: &str,
    role: Role,
    created_at: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (username, email, role, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![username, email, role.to_db_str(), created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    conn.query_row("SELECT * FROM users WHERE id = ?1", [id], map_user)
        .optional()
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_user)?;
    collect(rows)
}

// ------------------------------------------------
// Membership types
// ------------------------------------------------

fn map_type(row: &Row) -> Result<MembershipType> {
    Ok(MembershipType {
        id: row.get("id")?,
        name: row.get("name")?,
        duration_days: row.get("duration_days")?,
        visits_limit: row.get("visits_limit")?,
        price_cents: row.get("price_cents")?,
        has_pool: get_bool(row, "has_pool")?,
        has_sauna: get_bool(row, "has_sauna")?,
    })
}

pub fn insert_type(conn: &Connection, t: &MembershipType) -> Result<i64> {
    conn.execute(
        "INSERT INTO membership_types (name, duration_days, visits_limit, price_cents, has_pool, has_sauna)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            t.name,
            t.duration_days,
            t.visits_limit,
            t.price_cents,
            t.has_pool as i64,
            t.has_sauna as i64
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_type_by_name(conn: &Connection, name: &str) -> Result<Option<MembershipType>> {
    conn.query_row(
        "SELECT * FROM membership_types WHERE name = ?1",
        [name],
        map_type,
    )
    .optional()
}

pub fn list_types(conn: &Connection) -> Result<Vec<MembershipType>> {
    let mut stmt = conn.prepare("SELECT * FROM membership_types ORDER BY name ASC")?;
    let rows = stmt.query_map([], map_type)?;
    collect(rows)
}

// ------------------------------------------------
// Payments
// ------------------------------------------------

fn map_payment(row: &Row) -> Result<Payment> {
    let status_str: String = row.get("status")?;
    let status = PaymentStatus::from_db_str(&status_str).ok_or_else(|| {
        conversion_error(AppError::Other(format!("Invalid payment status: {}", status_str)))
    })?;

    Ok(Payment {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        amount_cents: row.get("amount_cents")?,
        status,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        completed_at: row.get("completed_at")?,
    })
}

pub fn insert_payment(
    conn: &Connection,
    user_id: i64,
    amount_cents: i64,
    description: &str,
    created_at: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO payments (user_id, amount_cents, status, description, created_at)
         VALUES (?1, ?2, 'pending', ?3, ?4)",
        params![user_id, amount_cents, description, created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_payment(conn: &Connection, id: i64) -> Result<Option<Payment>> {
    conn.query_row("SELECT * FROM payments WHERE id = ?1", [id], map_payment)
        .optional()
}

pub fn set_payment_status(
    conn: &Connection,
    id: i64,
    status: PaymentStatus,
    completed_at: Option<&str>,
) -> Result<usize> {
    conn.execute(
        "UPDATE payments SET status = ?1, completed_at = ?2 WHERE id = ?3",
        params![status.to_db_str(), completed_at, id],
    )
}

pub fn list_payments(conn: &Connection, user_id: Option<i64>) -> Result<Vec<Payment>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM payments
         WHERE (?1 IS NULL OR user_id = ?1)
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([user_id], map_payment)?;
    collect(rows)
}

// ------------------------------------------------
// Memberships
// ------------------------------------------------

pub fn map_membership(row: &Row) -> Result<Membership> {
    let status_str: String = row.get("status")?;
    let status = MembershipStatus::from_db_str(&status_str).ok_or_else(|| {
        conversion_error(AppError::Other(format!("Invalid membership status: {}", status_str)))
    })?;

    Ok(Membership {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        membership_type: row.get("membership_type")?,
        start_date: get_date(row, "start_date")?,
        end_date: get_date(row, "end_date")?,
        visits_left: row.get("visits_left")?,
        status,
        freeze_start: get_opt_date(row, "freeze_start")?,
        freeze_end: get_opt_date(row, "freeze_end")?,
        freeze_reason: row.get("freeze_reason")?,
        payment_id: row.get("payment_id")?,
        has_pool: get_bool(row, "has_pool")?,
        has_sauna: get_bool(row, "has_sauna")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_membership(conn: &Connection, m: &Membership) -> Result<i64> {
    conn.execute(
        "INSERT INTO memberships
            (user_id, membership_type, start_date, end_date, visits_left, status,
             freeze_start, freeze_end, freeze_reason, payment_id, has_pool, has_sauna, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            m.user_id,
            m.membership_type,
            fmt_date(&m.start_date),
            fmt_date(&m.end_date),
            m.visits_left,
            m.status.to_db_str(),
            m.freeze_start.as_ref().map(fmt_date),
            m.freeze_end.as_ref().map(fmt_date),
            m.freeze_reason,
            m.payment_id,
            m.has_pool as i64,
            m.has_sauna as i64,
            m.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update the mutable lifecycle fields of a membership (dates, status, freeze window).
/// `visits_left` is not touched: credits only move through
/// [`decrement_visits`] / [`increment_visits`] / [`add_visits`].
pub fn update_membership(conn: &Connection, m: &Membership) -> Result<usize> {
    conn.execute(
        "UPDATE memberships
         SET start_date = ?1, end_date = ?2, status = ?3,
             freeze_start = ?4, freeze_end = ?5, freeze_reason = ?6
         WHERE id = ?7",
        params![
            fmt_date(&m.start_date),
            fmt_date(&m.end_date),
            m.status.to_db_str(),
            m.freeze_start.as_ref().map(fmt_date),
            m.freeze_end.as_ref().map(fmt_date),
            m.freeze_reason,
            m.id,
        ],
    )
}

pub fn get_membership(conn: &Connection, id: i64) -> Result<Option<Membership>> {
    conn.query_row(
        "SELECT * FROM memberships WHERE id = ?1",
        [id],
        map_membership,
    )
    .optional()
}

/// `status = 'active' AND end_date >= today`, earliest start first.
pub fn active_memberships(
    conn: &Connection,
    user_id: i64,
    today: &NaiveDate,
) -> Result<Vec<Membership>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM memberships
         WHERE user_id = ?1 AND status = 'active' AND end_date >= ?2
         ORDER BY start_date ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![user_id, fmt_date(today)], map_membership)?;
    collect(rows)
}

pub fn list_memberships(conn: &Connection, user_id: Option<i64>) -> Result<Vec<Membership>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM memberships
         WHERE (?1 IS NULL OR user_id = ?1)
         ORDER BY user_id ASC, start_date ASC, id ASC",
    )?;
    let rows = stmt.query_map([user_id], map_membership)?;
    collect(rows)
}

pub fn memberships_ending_on(conn: &Connection, date: &NaiveDate) -> Result<Vec<Membership>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM memberships
         WHERE status = 'active' AND end_date = ?1
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([fmt_date(date)], map_membership)?;
    collect(rows)
}

/// Compare-and-set credit deduction: only succeeds while `visits_left > 0`.
/// Returns the number of rows changed (0 or 1).
pub fn decrement_visits(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute(
        "UPDATE memberships SET visits_left = visits_left - 1
         WHERE id = ?1 AND visits_left > 0",
        [id],
    )
}

pub fn increment_visits(conn: &Connection, id: i64) -> Result<usize> {
    add_visits(conn, id, 1)
}

pub fn add_visits(conn: &Connection, id: i64, n: i64) -> Result<usize> {
    conn.execute(
        "UPDATE memberships SET visits_left = visits_left + ?1 WHERE id = ?2",
        params![n, id],
    )
}

/// Mark every `active` membership that ended before `today` as `expired`.
pub fn expire_overdue(conn: &Connection, today: &NaiveDate) -> Result<usize> {
    conn.execute(
        "UPDATE memberships SET status = 'expired'
         WHERE status = 'active' AND end_date < ?1",
        [fmt_date(today)],
    )
}

// ------------------------------------------------
// Schedule slots
// ------------------------------------------------

fn map_slot(row: &Row) -> Result<ScheduleSlot> {
    let kind_str: String = row.get("training_type")?;
    let training_type = TrainingType::from_db_str(&kind_str).ok_or_else(|| {
        conversion_error(AppError::Other(format!("Invalid training type: {}", kind_str)))
    })?;

    Ok(ScheduleSlot {
        id: row.get("id")?,
        trainer_id: row.get("trainer_id")?,
        name: row.get("name")?,
        date: get_date(row, "date")?,
        start_time: get_time(row, "start_time")?,
        end_time: get_time(row, "end_time")?,
        training_type,
        max_participants: row.get("max_participants")?,
        is_available: get_bool(row, "is_available")?,
    })
}

pub fn insert_slot(conn: &Connection, s: &NewSlot) -> Result<i64> {
    conn.execute(
        "INSERT INTO schedules
            (trainer_id, name, date, start_time, end_time, training_type, max_participants, is_available)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)",
        params![
            s.trainer_id,
            s.name,
            fmt_date(&s.date),
            fmt_time(&s.start_time),
            fmt_time(&s.end_time),
            s.training_type.to_db_str(),
            s.max_participants,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_slot(conn: &Connection, id: i64) -> Result<Option<ScheduleSlot>> {
    conn.query_row("SELECT * FROM schedules WHERE id = ?1", [id], map_slot)
        .optional()
}

pub fn slots_for_trainer(
    conn: &Connection,
    trainer_id: i64,
    from: &NaiveDate,
    to: &NaiveDate,
) -> Result<Vec<ScheduleSlot>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM schedules
         WHERE trainer_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date ASC, start_time ASC",
    )?;
    let rows = stmt.query_map(
        params![trainer_id, fmt_date(from), fmt_date(to)],
        map_slot,
    )?;
    collect(rows)
}

pub fn slots_on(conn: &Connection, date: &NaiveDate) -> Result<Vec<ScheduleSlot>> {
    let mut stmt =
        conn.prepare("SELECT * FROM schedules WHERE date = ?1 ORDER BY start_time ASC, id ASC")?;
    let rows = stmt.query_map([fmt_date(date)], map_slot)?;
    collect(rows)
}

pub fn set_slot_available(conn: &Connection, id: i64, available: bool) -> Result<usize> {
    conn.execute(
        "UPDATE schedules SET is_available = ?1 WHERE id = ?2",
        params![available as i64, id],
    )
}

// ------------------------------------------------
// Participations
// ------------------------------------------------

fn map_participation(row: &Row) -> Result<Participation> {
    let status_str: String = row.get("status")?;
    let status = ParticipationStatus::from_db_str(&status_str).ok_or_else(|| {
        conversion_error(AppError::Other(format!("Invalid participation status: {}", status_str)))
    })?;

    Ok(Participation {
        id: row.get("id")?,
        schedule_id: row.get("schedule_id")?,
        user_id: row.get("user_id")?,
        membership_id: row.get("membership_id")?,
        credit_debited: get_bool(row, "credit_debited")?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn find_participation(
    conn: &Connection,
    schedule_id: i64,
    user_id: i64,
) -> Result<Option<Participation>> {
    conn.query_row(
        "SELECT * FROM participations WHERE schedule_id = ?1 AND user_id = ?2",
        params![schedule_id, user_id],
        map_participation,
    )
    .optional()
}

pub fn get_participation(conn: &Connection, id: i64) -> Result<Option<Participation>> {
    conn.query_row(
        "SELECT * FROM participations WHERE id = ?1",
        [id],
        map_participation,
    )
    .optional()
}

/// Insert a new `confirmed` participation holding a debited credit.
pub fn insert_participation(
    conn: &Connection,
    schedule_id: i64,
    user_id: i64,
    membership_id: i64,
    now: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO participations
            (schedule_id, user_id, membership_id, credit_debited, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, 1, 'confirmed', ?4, ?4)",
        params![schedule_id, user_id, membership_id, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_participation(
    conn: &Connection,
    id: i64,
    status: ParticipationStatus,
    credit_debited: bool,
    now: &str,
) -> Result<usize> {
    conn.execute(
        "UPDATE participations
         SET status = ?1, credit_debited = ?2, updated_at = ?3
         WHERE id = ?4",
        params![status.to_db_str(), credit_debited as i64, now, id],
    )
}

pub fn count_confirmed(conn: &Connection, schedule_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM participations WHERE schedule_id = ?1 AND status = 'confirmed'",
        [schedule_id],
        |row| row.get(0),
    )
}

pub fn participations_for_slot(
    conn: &Connection,
    schedule_id: i64,
    confirmed_only: bool,
) -> Result<Vec<Participation>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM participations
         WHERE schedule_id = ?1 AND (?2 = 0 OR status = 'confirmed')
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(
        params![schedule_id, confirmed_only as i64],
        map_participation,
    )?;
    collect(rows)
}

pub fn participations_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Participation>> {
    let mut stmt =
        conn.prepare("SELECT * FROM participations WHERE user_id = ?1 ORDER BY id ASC")?;
    let rows = stmt.query_map([user_id], map_participation)?;
    collect(rows)
}

// ------------------------------------------------
// Visits
// ------------------------------------------------

fn map_visit(row: &Row) -> Result<VisitEvent> {
    Ok(VisitEvent {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        membership_id: row.get("membership_id")?,
        check_in: get_ts(row, "check_in")?,
        check_out: get_opt_ts(row, "check_out")?,
    })
}

pub fn open_visit_for_user(conn: &Connection, user_id: i64) -> Result<Option<VisitEvent>> {
    conn.query_row(
        "SELECT * FROM visits WHERE user_id = ?1 AND check_out IS NULL LIMIT 1",
        [user_id],
        map_visit,
    )
    .optional()
}

pub fn insert_visit(
    conn: &Connection,
    user_id: i64,
    membership_id: i64,
    check_in: &NaiveDateTime,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO visits (user_id, membership_id, check_in) VALUES (?1, ?2, ?3)",
        params![user_id, membership_id, fmt_ts(check_in)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_visit(conn: &Connection, id: i64) -> Result<Option<VisitEvent>> {
    conn.query_row("SELECT * FROM visits WHERE id = ?1", [id], map_visit)
        .optional()
}

/// Close an open visit. Returns 0 when the visit was already closed.
pub fn set_check_out(conn: &Connection, id: i64, at: &NaiveDateTime) -> Result<usize> {
    conn.execute(
        "UPDATE visits SET check_out = ?1 WHERE id = ?2 AND check_out IS NULL",
        params![fmt_ts(at), id],
    )
}

pub fn count_open_visits(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM visits WHERE check_out IS NULL",
        [],
        |row| row.get(0),
    )
}

/// Visits whose stay intersects `[start, end)`:
/// `check_in < end AND (check_out IS NULL OR check_out > start)`.
pub fn count_visits_overlapping(
    conn: &Connection,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "SELECT COUNT(*) FROM visits
         WHERE check_in < ?1 AND (check_out IS NULL OR check_out > ?2)",
    )?;
    stmt.query_row(params![fmt_ts(end), fmt_ts(start)], |row| row.get(0))
}

pub fn visits_for_user(
    conn: &Connection,
    user_id: i64,
    from: Option<&NaiveDateTime>,
    to: Option<&NaiveDateTime>,
) -> Result<Vec<VisitEvent>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM visits
         WHERE user_id = ?1
           AND (?2 IS NULL OR check_in >= ?2)
           AND (?3 IS NULL OR check_in <= ?3)
         ORDER BY check_in DESC",
    )?;
    let rows = stmt.query_map(
        params![user_id, from.map(fmt_ts), to.map(fmt_ts)],
        map_visit,
    )?;
    collect(rows)
}

// ------------------------------------------------
// Notifications
// ------------------------------------------------

pub fn insert_notification(conn: &Connection, n: &Notification, created_at: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO notifications (user_id, type, title, message, is_read, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        params![n.user_id, n.kind.as_str(), n.title, n.message, created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_notifications(
    conn: &Connection,
    user_id: i64,
    unread_only: bool,
) -> Result<Vec<StoredNotification>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM notifications
         WHERE user_id = ?1 AND (?2 = 0 OR is_read = 0)
         ORDER BY id DESC",
    )?;
    let rows = stmt.query_map(params![user_id, unread_only as i64], |row| {
        Ok(StoredNotification {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            kind: row.get("type")?,
            title: row.get("title")?,
            message: row.get("message")?,
            is_read: get_bool(row, "is_read")?,
            created_at: row.get("created_at")?,
        })
    })?;
    collect(rows)
}

pub fn mark_notifications_read(conn: &Connection, user_id: i64) -> Result<usize> {
    conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
        [user_id],
    )
}
