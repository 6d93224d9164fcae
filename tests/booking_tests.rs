use gymledger::core::{BookingCoordinator, MembershipLedger, TrainingCatalog};
use gymledger::db::pool::DbPool;
use gymledger::errors::{AppError, ErrorKind};
use gymledger::models::participation::ParticipationStatus;
use gymledger::models::role::Role;
use gymledger::models::schedule::{NewSlot, TrainingType};
use gymledger::utils::date::parse_date_arg;
use gymledger::utils::time::parse_time_arg;

mod common;
use common::{add_type, add_user, ctx_at, member, open_pool, visits_left};

const NOW: &str = "2025-03-10 10:00";

fn slot(pool: &mut DbPool, trainer: i64, start: &str, group: Option<i64>) -> i64 {
    TrainingCatalog::create_slot(
        pool,
        NewSlot {
            trainer_id: trainer,
            date: parse_date_arg("2025-03-12").unwrap(),
            start_time: parse_time_arg(start).unwrap(),
            end_time: parse_time_arg(&format!("{}:59", &start[..2])).unwrap(),
            training_type: if group.is_some() {
                TrainingType::Group
            } else {
                TrainingType::Personal
            },
            max_participants: group,
            name: group.map(|_| "Circuit".to_string()),
        },
    )
    .unwrap()
    .id
}

#[test]
fn join_takes_one_credit_and_refuses_duplicates() {
    let (mut pool, _) = open_pool("book_join");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let u = add_user(&mut pool, &ctx, "anna", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    let m = member(&mut pool, &ctx, u, "Monthly");
    let s = slot(&mut pool, trainer, "18:00", Some(10));

    let p = BookingCoordinator::join(&mut pool, &ctx, u, s).unwrap();
    assert_eq!(p.status, ParticipationStatus::Confirmed);
    assert_eq!(p.membership_id, m.id);
    assert!(p.credit_debited);
    assert_eq!(visits_left(&pool, m.id), 11);

    let err = BookingCoordinator::join(&mut pool, &ctx, u, s).unwrap_err();
    assert!(matches!(err, AppError::AlreadyBooked { .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(visits_left(&pool, m.id), 11);
}

#[test]
fn join_cancel_join_is_credit_neutral() {
    let (mut pool, _) = open_pool("book_rejoin");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let u = add_user(&mut pool, &ctx, "ben", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    let m = member(&mut pool, &ctx, u, "Monthly");
    let s = slot(&mut pool, trainer, "18:00", Some(10));

    BookingCoordinator::join(&mut pool, &ctx, u, s).unwrap();
    let c = BookingCoordinator::cancel(&mut pool, &ctx, u, s).unwrap();
    assert_eq!(c.status, ParticipationStatus::Cancelled);
    assert!(!c.credit_debited);
    assert_eq!(visits_left(&pool, m.id), 12);

    let again = BookingCoordinator::join(&mut pool, &ctx, u, s).unwrap();
    assert_eq!(again.status, ParticipationStatus::Confirmed);
    assert_eq!(again.id, c.id);
    assert_eq!(visits_left(&pool, m.id), 12);

    // a second cancel has nothing to give back
    BookingCoordinator::cancel(&mut pool, &ctx, u, s).unwrap();
    assert_eq!(visits_left(&pool, m.id), 12);
}

#[test]
fn last_credit_fills_single_place_group() {
    let (mut pool, _) = open_pool("book_group_full");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let a = add_user(&mut pool, &ctx, "carl", Role::Client);
    let b = add_user(&mut pool, &ctx, "dora", Role::Client);
    add_type(&mut pool, "Single", 30, 1);
    let ma = member(&mut pool, &ctx, a, "Single");
    member(&mut pool, &ctx, b, "Single");
    let s = slot(&mut pool, trainer, "18:00", Some(1));

    BookingCoordinator::join(&mut pool, &ctx, a, s).unwrap();
    assert_eq!(visits_left(&pool, ma.id), 0);

    let err = BookingCoordinator::join(&mut pool, &ctx, b, s).unwrap_err();
    assert!(matches!(err, AppError::GroupFull { max: 1, .. }));
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    assert_eq!(TrainingCatalog::count_confirmed(&pool.conn, s).unwrap(), 1);
}

#[test]
fn rejoin_still_respects_capacity() {
    let (mut pool, _) = open_pool("book_rejoin_capacity");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let a = add_user(&mut pool, &ctx, "emil", Role::Client);
    let b = add_user(&mut pool, &ctx, "fred", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    member(&mut pool, &ctx, a, "Monthly");
    member(&mut pool, &ctx, b, "Monthly");
    let s = slot(&mut pool, trainer, "18:00", Some(1));

    BookingCoordinator::join(&mut pool, &ctx, a, s).unwrap();
    BookingCoordinator::cancel(&mut pool, &ctx, a, s).unwrap();
    BookingCoordinator::join(&mut pool, &ctx, b, s).unwrap();

    let err = BookingCoordinator::join(&mut pool, &ctx, a, s).unwrap_err();
    assert!(matches!(err, AppError::GroupFull { .. }));
}

#[test]
fn personal_slot_takes_one_client() {
    let (mut pool, _) = open_pool("book_personal");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let a = add_user(&mut pool, &ctx, "gina", Role::Client);
    let b = add_user(&mut pool, &ctx, "hugo", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    member(&mut pool, &ctx, a, "Monthly");
    member(&mut pool, &ctx, b, "Monthly");
    let s = slot(&mut pool, trainer, "07:00", None);

    BookingCoordinator::join(&mut pool, &ctx, a, s).unwrap();
    let err = BookingCoordinator::join(&mut pool, &ctx, b, s).unwrap_err();
    assert!(matches!(err, AppError::SlotTaken(_)));
}

#[test]
fn join_preconditions_fail_in_order() {
    let (mut pool, _) = open_pool("book_preconditions");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let u = add_user(&mut pool, &ctx, "ivy", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    let s = slot(&mut pool, trainer, "18:00", Some(5));

    let err = BookingCoordinator::join(&mut pool, &ctx, u, 999).unwrap_err();
    assert!(matches!(err, AppError::SlotNotFound(999)));

    // no membership at all
    let err = BookingCoordinator::join(&mut pool, &ctx, u, s).unwrap_err();
    assert!(matches!(err, AppError::NoEligibleMembership(_)));

    // closed slot wins over the missing membership
    TrainingCatalog::set_availability(&mut pool, s, false).unwrap();
    let err = BookingCoordinator::join(&mut pool, &ctx, u, s).unwrap_err();
    assert!(matches!(err, AppError::SlotUnavailable(_)));
    TrainingCatalog::set_availability(&mut pool, s, true).unwrap();

    // frozen membership is not eligible
    let m = member(&mut pool, &ctx, u, "Monthly");
    MembershipLedger::freeze(&mut pool, &ctx, m.id, 5, "flu").unwrap();
    let err = BookingCoordinator::join(&mut pool, &ctx, u, s).unwrap_err();
    assert!(matches!(err, AppError::NoEligibleMembership(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn empty_membership_is_not_eligible() {
    let (mut pool, _) = open_pool("book_no_credit");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let u = add_user(&mut pool, &ctx, "jon", Role::Client);
    add_type(&mut pool, "Single", 30, 1);
    member(&mut pool, &ctx, u, "Single");
    let s1 = slot(&mut pool, trainer, "08:00", Some(5));
    let s2 = slot(&mut pool, trainer, "09:00", Some(5));

    BookingCoordinator::join(&mut pool, &ctx, u, s1).unwrap();
    let err = BookingCoordinator::join(&mut pool, &ctx, u, s2).unwrap_err();
    assert!(matches!(err, AppError::NoEligibleMembership(_)));
}

#[test]
fn cancel_needs_booking_and_cutoff() {
    let (mut pool, _) = open_pool("book_cancel_rules");
    let ctx = ctx_at(NOW);
    let late = ctx_at("2025-03-11 19:00");
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let u = add_user(&mut pool, &ctx, "kim", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    let m = member(&mut pool, &ctx, u, "Monthly");
    let s = slot(&mut pool, trainer, "18:00", Some(5));

    let err = BookingCoordinator::cancel(&mut pool, &ctx, u, s).unwrap_err();
    assert!(matches!(err, AppError::NotBooked { .. }));

    BookingCoordinator::join(&mut pool, &ctx, u, s).unwrap();
    let err = BookingCoordinator::cancel(&mut pool, &late, u, s).unwrap_err();
    assert!(matches!(err, AppError::TooLateToCancel { cutoff_hours: 24, .. }));
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(visits_left(&pool, m.id), 11);

    // exactly at the cutoff is still allowed
    let edge = ctx_at("2025-03-11 18:00");
    BookingCoordinator::cancel(&mut pool, &edge, u, s).unwrap();
    assert_eq!(visits_left(&pool, m.id), 12);
}

#[test]
fn oversized_cutoff_is_an_input_error() {
    let (mut pool, _) = open_pool("book_cutoff_overflow");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let u = add_user(&mut pool, &ctx, "lou", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    let m = member(&mut pool, &ctx, u, "Monthly");
    let s = slot(&mut pool, trainer, "18:00", Some(5));
    BookingCoordinator::join(&mut pool, &ctx, u, s).unwrap();

    let mut strict = ctx_at(NOW);
    strict.rules.cancel_cutoff_hours = i64::MAX;
    let err = BookingCoordinator::cancel(&mut pool, &strict, u, s).unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(visits_left(&pool, m.id), 11);
    assert_eq!(TrainingCatalog::count_confirmed(&pool.conn, s).unwrap(), 1);
}

#[test]
fn cancel_refunds_the_membership_that_paid() {
    let (mut pool, _) = open_pool("book_refund_target");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let u = add_user(&mut pool, &ctx, "leo", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    let first = member(&mut pool, &ctx, u, "Monthly");
    let stacked = member(&mut pool, &ctx, u, "Monthly");
    let s = slot(&mut pool, trainer, "18:00", Some(5));

    BookingCoordinator::join(&mut pool, &ctx, u, s).unwrap();
    assert_eq!(visits_left(&pool, first.id), 11);

    MembershipLedger::cancel(&mut pool, &ctx, first.id).unwrap();
    BookingCoordinator::cancel(&mut pool, &ctx, u, s).unwrap();

    assert_eq!(visits_left(&pool, first.id), 12);
    assert_eq!(visits_left(&pool, stacked.id), 12);
}

#[test]
fn bookings_are_listed_per_user_and_slot() {
    let (mut pool, _) = open_pool("book_listing");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let a = add_user(&mut pool, &ctx, "mia", Role::Client);
    let b = add_user(&mut pool, &ctx, "ned", Role::Client);
    add_type(&mut pool, "Monthly", 30, 12);
    member(&mut pool, &ctx, a, "Monthly");
    member(&mut pool, &ctx, b, "Monthly");
    let s = slot(&mut pool, trainer, "18:00", Some(5));

    BookingCoordinator::join(&mut pool, &ctx, a, s).unwrap();
    BookingCoordinator::join(&mut pool, &ctx, b, s).unwrap();
    BookingCoordinator::cancel(&mut pool, &ctx, b, s).unwrap();

    let confirmed = BookingCoordinator::participants(&mut pool, s).unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].user_id, a);

    let of_b = BookingCoordinator::bookings_for_user(&mut pool, b).unwrap();
    assert_eq!(of_b.len(), 1);
    assert_eq!(of_b[0].status, ParticipationStatus::Cancelled);
}
