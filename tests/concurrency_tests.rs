use gymledger::core::{BookingCoordinator, OccupancyAggregator, TrainingCatalog};
use gymledger::db::pool::DbPool;
use gymledger::errors::{AppError, AppResult};
use gymledger::models::role::Role;
use gymledger::models::schedule::{NewSlot, TrainingType};
use gymledger::utils::date::parse_date_arg;
use gymledger::utils::time::parse_time_arg;
use std::sync::{Arc, Barrier};
use std::thread;

mod common;
use common::{add_type, add_user, ctx_at, member, open_pool, visits_left};

const NOW: &str = "2025-03-10 10:00";

/// Run `op` for every client on its own thread and connection, all released at once.
fn race<T, F>(db_path: &str, clients: &[i64], op: F) -> Vec<AppResult<T>>
where
    T: Send + 'static,
    F: Fn(&mut DbPool, i64) -> AppResult<T> + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(clients.len()));
    let op = Arc::new(op);
    let handles: Vec<_> = clients
        .iter()
        .map(|&user| {
            let barrier = Arc::clone(&barrier);
            let op = Arc::clone(&op);
            let path = db_path.to_string();
            thread::spawn(move || {
                let mut pool = DbPool::with_busy_timeout(&path, 30_000).unwrap();
                barrier.wait();
                op(&mut pool, user)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

fn clients(pool: &mut DbPool, n: usize) -> Vec<(i64, i64)> {
    let ctx = ctx_at(NOW);
    add_type(pool, "Monthly", 30, 12);
    (0..n)
        .map(|i| {
            let u = add_user(pool, &ctx, &format!("client{i}"), Role::Client);
            (u, member(pool, &ctx, u, "Monthly").id)
        })
        .collect()
}

fn slot(pool: &mut DbPool, trainer: i64, group: Option<i64>) -> i64 {
    TrainingCatalog::create_slot(
        pool,
        NewSlot {
            trainer_id: trainer,
            date: parse_date_arg("2025-03-12").unwrap(),
            start_time: parse_time_arg("18:00").unwrap(),
            end_time: parse_time_arg("19:00").unwrap(),
            training_type: if group.is_some() {
                TrainingType::Group
            } else {
                TrainingType::Personal
            },
            max_participants: group,
            name: group.map(|_| "Bootcamp".to_string()),
        },
    )
    .unwrap()
    .id
}

#[test]
fn group_slot_never_exceeds_its_capacity() {
    let (mut pool, db_path) = open_pool("race_group");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let members = clients(&mut pool, 6);
    let s = slot(&mut pool, trainer, Some(3));

    let users: Vec<i64> = members.iter().map(|(u, _)| *u).collect();
    let results = race(&db_path, &users, move |pool, user| {
        BookingCoordinator::join(pool, &ctx_at(NOW), user, s)
    });

    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 3);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, AppError::GroupFull { .. }))
    );
    assert_eq!(TrainingCatalog::count_confirmed(&pool.conn, s).unwrap(), 3);

    // only the winners paid
    let spent: i64 = members.iter().map(|(_, m)| 12 - visits_left(&pool, *m)).sum();
    assert_eq!(spent, 3);
}

#[test]
fn personal_slot_goes_to_exactly_one_client() {
    let (mut pool, db_path) = open_pool("race_personal");
    let ctx = ctx_at(NOW);
    let trainer = add_user(&mut pool, &ctx, "tara", Role::Trainer);
    let members = clients(&mut pool, 4);
    let s = slot(&mut pool, trainer, None);

    let users: Vec<i64> = members.iter().map(|(u, _)| *u).collect();
    let results = race(&db_path, &users, move |pool, user| {
        BookingCoordinator::join(pool, &ctx_at(NOW), user, s)
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, AppError::SlotTaken(_)))
    );
    assert_eq!(TrainingCatalog::count_confirmed(&pool.conn, s).unwrap(), 1);
}

#[test]
fn parallel_check_ins_spend_each_credit_once() {
    let (mut pool, db_path) = open_pool("race_check_in");
    let ctx = ctx_at(NOW);
    add_type(&mut pool, "Duo", 30, 2);
    let u = add_user(&mut pool, &ctx, "anna", Role::Client);
    let m = member(&mut pool, &ctx, u, "Duo").id;

    // same user at several turnstiles at once: one entry only
    let results = race(&db_path, &[u, u, u, u], move |pool, user| {
        OccupancyAggregator::check_in(pool, &ctx_at(NOW), user, m)
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, AppError::AlreadyInside(_)))
    );
    assert_eq!(visits_left(&pool, m), 1);
    assert_eq!(OccupancyAggregator::current_occupancy(&pool.conn).unwrap(), 1);
}
