use chrono::{NaiveDate, NaiveDateTime};
use gymledger::core::context::{GymContext, GymRules};
use gymledger::core::notify::{NotificationSink, NullNotifier};
use gymledger::core::{Directory, MembershipLedger};
use gymledger::db::queries;
use gymledger::errors::{AppError, AppResult, ErrorKind};
use gymledger::models::membership::MembershipStatus;
use gymledger::models::notification::Notification;
use gymledger::models::role::Role;
use gymledger::utils::date::Clock;
use rusqlite::Connection;

mod common;
use common::{add_type, add_user, ctx_at, member, open_pool, paid, visits_left};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn create_sets_window_credits_and_notifies() {
    let (mut pool, _) = open_pool("member_create");
    let ctx = ctx_at("2025-03-10 10:00");
    let u = add_user(&mut pool, &ctx, "anna", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);

    let m = member(&mut pool, &ctx, u, "Monthly");
    assert_eq!(m.start_date, d("2025-03-10"));
    assert_eq!(m.end_date, d("2025-04-09"));
    assert_eq!(m.visits_left, 12);
    assert_eq!(m.status, MembershipStatus::Active);

    let notes = queries::list_notifications(&pool.conn, u, false).unwrap();
    assert!(notes.iter().any(|n| n.kind == "membership_created"));
}

#[test]
fn create_rejects_unknown_type_and_unpaid_payment() {
    let (mut pool, _) = open_pool("member_create_errors");
    let ctx = ctx_at("2025-03-10 10:00");
    let u = add_user(&mut pool, &ctx, "ben", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);

    let payment = paid(&mut pool, &ctx, u);
    let err = MembershipLedger::create(&mut pool, &ctx, u, "Yearly", payment).unwrap_err();
    assert!(matches!(err, AppError::TypeNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let pending = Directory::record_payment(&mut pool, &ctx, u, 100, "pending").unwrap();
    let err = MembershipLedger::create(&mut pool, &ctx, u, "Monthly", pending.id).unwrap_err();
    assert!(matches!(err, AppError::PaymentNotConfirmed(_)));
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);

    let err = MembershipLedger::create(&mut pool, &ctx, u, "Monthly", 999).unwrap_err();
    assert!(matches!(err, AppError::PaymentNotConfirmed(999)));
}

#[test]
fn second_membership_is_stacked_after_the_first() {
    let (mut pool, _) = open_pool("member_stacking");
    let ctx = ctx_at("2025-03-10 10:00");
    let u = add_user(&mut pool, &ctx, "carl", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);

    let first = member(&mut pool, &ctx, u, "Monthly");
    let second = member(&mut pool, &ctx, u, "Monthly");
    assert_eq!(second.start_date, d("2025-04-10"));
    assert_eq!(second.end_date, d("2025-05-10"));

    let active = MembershipLedger::get_active(&pool.conn, u, ctx.today())
        .unwrap()
        .unwrap();
    assert_eq!(active.id, first.id);
}

#[test]
fn freeze_moves_end_date_and_respects_limit() {
    let (mut pool, _) = open_pool("member_freeze");
    let ctx = ctx_at("2025-03-10 10:00");
    let u = add_user(&mut pool, &ctx, "dora", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    let m = member(&mut pool, &ctx, u, "Monthly");

    let err = MembershipLedger::freeze(&mut pool, &ctx, m.id, 31, "travel").unwrap_err();
    assert!(matches!(err, AppError::FreezeTooLong { days: 31, max: 30 }));
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);

    let err = MembershipLedger::freeze(&mut pool, &ctx, m.id, 0, "nothing").unwrap_err();
    assert!(matches!(err, AppError::InvalidFreezeDays(0)));

    let frozen = MembershipLedger::freeze(&mut pool, &ctx, m.id, 10, "travel").unwrap();
    assert_eq!(frozen.status, MembershipStatus::Frozen);
    assert_eq!(frozen.end_date, m.end_date + chrono::Duration::days(10));
    assert_eq!(frozen.freeze_start, Some(d("2025-03-10")));
    assert_eq!(frozen.freeze_end, Some(d("2025-03-20")));
    assert_eq!(frozen.freeze_reason.as_deref(), Some("travel"));

    let err = MembershipLedger::freeze(&mut pool, &ctx, m.id, 5, "again").unwrap_err();
    assert!(matches!(err, AppError::ActiveMembershipNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn early_unfreeze_keeps_extended_end_date() {
    let (mut pool, _) = open_pool("member_unfreeze");
    let ctx = ctx_at("2025-03-10 10:00");
    let later = ctx_at("2025-03-13 09:00");
    let u = add_user(&mut pool, &ctx, "emil", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    let m = member(&mut pool, &ctx, u, "Monthly");

    let err = MembershipLedger::unfreeze(&mut pool, &ctx, m.id).unwrap_err();
    assert!(matches!(err, AppError::FrozenMembershipNotFound(_)));

    MembershipLedger::freeze(&mut pool, &ctx, m.id, 10, "injury").unwrap();
    let back = MembershipLedger::unfreeze(&mut pool, &later, m.id).unwrap();
    assert_eq!(back.status, MembershipStatus::Active);
    assert_eq!(back.freeze_end, Some(d("2025-03-13")));
    assert_eq!(back.end_date, d("2025-04-19"));

    let notes = queries::list_notifications(&pool.conn, u, false).unwrap();
    assert!(notes.iter().any(|n| n.kind == "membership_frozen"));
    assert!(notes.iter().any(|n| n.kind == "membership_unfrozen"));
}

#[test]
fn extend_revives_an_expired_membership() {
    let (mut pool, _) = open_pool("member_extend");
    let ctx = ctx_at("2025-03-10 10:00");
    let after = ctx_at("2025-04-20 10:00");
    let u = add_user(&mut pool, &ctx, "fred", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    let m = member(&mut pool, &ctx, u, "Monthly");

    assert_eq!(MembershipLedger::expire_overdue(&mut pool, &after).unwrap(), 1);
    let expired = MembershipLedger::get(&pool.conn, m.id).unwrap();
    assert_eq!(expired.status, MembershipStatus::Expired);
    assert!(
        MembershipLedger::get_active(&pool.conn, u, after.today())
            .unwrap()
            .is_none()
    );

    let payment = paid(&mut pool, &after, u);
    let renewed = MembershipLedger::extend(&mut pool, &after, m.id, payment).unwrap();
    assert_eq!(renewed.status, MembershipStatus::Active);
    assert_eq!(renewed.end_date, d("2025-05-09"));
    assert_eq!(renewed.visits_left, 24);

    let err = MembershipLedger::extend(&mut pool, &after, 404, payment).unwrap_err();
    assert!(matches!(err, AppError::MembershipNotFound(404)));
}

#[test]
fn cancel_is_one_way() {
    let (mut pool, _) = open_pool("member_cancel");
    let ctx = ctx_at("2025-03-10 10:00");
    let u = add_user(&mut pool, &ctx, "gina", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    let m = member(&mut pool, &ctx, u, "Monthly");

    let c = MembershipLedger::cancel(&mut pool, &ctx, m.id).unwrap();
    assert_eq!(c.status, MembershipStatus::Cancelled);

    let err = MembershipLedger::cancel(&mut pool, &ctx, m.id).unwrap_err();
    assert!(matches!(err, AppError::InvalidMembershipState { .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn credits_never_go_below_zero() {
    let (mut pool, _) = open_pool("member_credits");
    let ctx = ctx_at("2025-03-10 10:00");
    let u = add_user(&mut pool, &ctx, "hugo", Role::Client);
    add_type(&mut pool, "Duo", 30, 2);
    let m = member(&mut pool, &ctx, u, "Duo");

    MembershipLedger::deduct_visit(&pool.conn, m.id).unwrap();
    MembershipLedger::deduct_visit(&pool.conn, m.id).unwrap();
    let err = MembershipLedger::deduct_visit(&pool.conn, m.id).unwrap_err();
    assert!(matches!(err, AppError::NoVisitsLeft(_)));
    assert_eq!(visits_left(&pool, m.id), 0);

    let err = MembershipLedger::deduct_visit(&pool.conn, 9_999).unwrap_err();
    assert!(matches!(err, AppError::MembershipNotFound(9_999)));

    MembershipLedger::restore_visit(&pool.conn, m.id).unwrap();
    assert_eq!(visits_left(&pool, m.id), 1);
}

#[test]
fn expiring_memberships_are_notified_once_per_run() {
    let (mut pool, _) = open_pool("member_expiring");
    let ctx = ctx_at("2025-03-10 10:00");
    let week_before_end = ctx_at("2025-04-02 08:00");
    let u = add_user(&mut pool, &ctx, "ivy", Role::Client);
    let v = add_user(&mut pool, &ctx, "jon", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    add_type(&mut pool, "Quarter", 90, 36);
    member(&mut pool, &ctx, u, "Monthly");
    member(&mut pool, &ctx, v, "Quarter");

    let n = MembershipLedger::notify_expiring(&mut pool, &week_before_end, 7).unwrap();
    assert_eq!(n, 1);

    let notes = queries::list_notifications(&pool.conn, u, true).unwrap();
    assert!(notes.iter().any(|n| n.kind == "membership_expiring"));
    let notes = queries::list_notifications(&pool.conn, v, true).unwrap();
    assert!(!notes.iter().any(|n| n.kind == "membership_expiring"));
}

/// A sink whose transport is always down.
struct Unreachable;

impl NotificationSink for Unreachable {
    fn deliver(&self, _conn: &Connection, _note: &Notification, _at: NaiveDateTime) -> AppResult<()> {
        Err(AppError::Other("smtp down".into()))
    }
}

fn ctx_with(now: &str, sink: Box<dyn NotificationSink>) -> GymContext {
    GymContext::new(
        Clock::from_override(Some(now)).unwrap(),
        GymRules::default(),
        sink,
    )
}

fn log_count(conn: &Connection, operation: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM log WHERE operation = ?1",
        [operation],
        |r| r.get(0),
    )
    .unwrap()
}

#[test]
fn failed_delivery_keeps_the_committed_change() {
    let (mut pool, _) = open_pool("member_notify_failed");
    let ok = ctx_at("2025-03-10 10:00");
    let down = ctx_with("2025-03-10 10:00", Box::new(Unreachable));
    let u = add_user(&mut pool, &ok, "lea", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);

    let payment = paid(&mut pool, &ok, u);
    let m = MembershipLedger::create(&mut pool, &down, u, "Monthly", payment).unwrap();
    assert_eq!(MembershipLedger::get(&pool.conn, m.id).unwrap().end_date, d("2025-04-09"));

    let frozen = MembershipLedger::freeze(&mut pool, &down, m.id, 5, "flu").unwrap();
    assert_eq!(frozen.status, MembershipStatus::Frozen);
    assert_eq!(
        MembershipLedger::get(&pool.conn, m.id).unwrap().status,
        MembershipStatus::Frozen
    );

    assert_eq!(log_count(&pool.conn, "notify_failed"), 2);
    assert!(queries::list_notifications(&pool.conn, u, false).unwrap().is_empty());
}

#[test]
fn null_sink_records_no_notifications() {
    let (mut pool, _) = open_pool("member_null_sink");
    let ctx = ctx_with("2025-03-10 10:00", Box::new(NullNotifier));
    let u = add_user(&mut pool, &ctx, "max", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);

    let m = member(&mut pool, &ctx, u, "Monthly");
    MembershipLedger::freeze(&mut pool, &ctx, m.id, 3, "trip").unwrap();

    assert!(queries::list_notifications(&pool.conn, u, false).unwrap().is_empty());
    assert_eq!(log_count(&pool.conn, "notify_failed"), 0);
}

#[test]
fn out_of_range_dates_are_refused_without_writing() {
    let (mut pool, _) = open_pool("member_date_overflow");
    let ctx = ctx_at("2025-03-10 10:00");
    let u = add_user(&mut pool, &ctx, "ola", Role::Client);
    add_type(&mut pool, "Forever", 999_999_999_999, 1);

    let payment = paid(&mut pool, &ctx, u);
    let err = MembershipLedger::create(&mut pool, &ctx, u, "Forever", payment).unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(MembershipLedger::get_active(&pool.conn, u, ctx.today()).unwrap().is_none());

    let err = MembershipLedger::notify_expiring(&mut pool, &ctx, 999_999_999_999).unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[test]
fn a_completed_payment_is_not_consumed() {
    let (mut pool, _) = open_pool("member_payment_reuse");
    let ctx = ctx_at("2025-03-10 10:00");
    let u = add_user(&mut pool, &ctx, "pia", Role::Client);
    let other = add_user(&mut pool, &ctx, "quin", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);

    let payment = paid(&mut pool, &ctx, u);
    let m = MembershipLedger::create(&mut pool, &ctx, u, "Monthly", payment).unwrap();
    let m = MembershipLedger::extend(&mut pool, &ctx, m.id, payment).unwrap();
    assert_eq!(m.end_date, d("2025-05-09"));

    let theirs = MembershipLedger::create(&mut pool, &ctx, other, "Monthly", payment).unwrap();
    assert_eq!(theirs.payment_id, payment);
}
