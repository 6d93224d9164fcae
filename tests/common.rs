#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use gymledger::core::context::{GymContext, GymRules};
use gymledger::core::notify::DbNotifier;
use gymledger::core::{Directory, MembershipLedger};
use gymledger::db::initialize::init_db;
use gymledger::db::pool::DbPool;
use gymledger::models::membership::Membership;
use gymledger::models::membership_type::MembershipType;
use gymledger::models::role::Role;
use gymledger::utils::date::Clock;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn gym() -> Command {
    cargo_bin_cmd!("gymledger")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_gymledger.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize a DB through the CLI (schema + migrations, no config file).
pub fn init_cli_db(db_path: &str) {
    gym()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Fresh migrated database for library-level tests.
pub fn open_pool(name: &str) -> (DbPool, String) {
    let db_path = setup_test_db(name);
    let pool = DbPool::new(&db_path).expect("open db");
    init_db(&pool.conn).expect("init db");
    (pool, db_path)
}

/// Context with the clock pinned to `now` ("YYYY-MM-DD HH:MM") and default rules.
pub fn ctx_at(now: &str) -> GymContext {
    let clock = Clock::from_override(Some(now)).expect("valid clock");
    GymContext::new(clock, GymRules::default(), Box::new(DbNotifier))
}

pub fn add_user(pool: &mut DbPool, ctx: &GymContext, name: &str, role: Role) -> i64 {
    Directory::add_user(pool, ctx, name, &format!("{name}@gym.test"), role)
        .expect("add user")
        .id
}

pub fn add_type(pool: &mut DbPool, name: &str, days: i64, visits: i64) {
    Directory::add_type(
        pool,
        &MembershipType {
            id: 0,
            name: name.to_string(),
            duration_days: days,
            visits_limit: visits,
            price_cents: 4_900,
            has_pool: false,
            has_sauna: false,
        },
    )
    .expect("add type");
}

/// A completed payment for `user_id`.
pub fn paid(pool: &mut DbPool, ctx: &GymContext, user_id: i64) -> i64 {
    let p = Directory::record_payment(pool, ctx, user_id, 4_900, "test").expect("payment");
    Directory::complete_payment(pool, ctx, p.id).expect("complete").id
}

/// Pay for and open a membership of `type_name`.
pub fn member(pool: &mut DbPool, ctx: &GymContext, user_id: i64, type_name: &str) -> Membership {
    let payment = paid(pool, ctx, user_id);
    MembershipLedger::create(pool, ctx, user_id, type_name, payment).expect("create membership")
}

pub fn visits_left(pool: &DbPool, membership_id: i64) -> i64 {
    MembershipLedger::get(&pool.conn, membership_id)
        .expect("membership")
        .visits_left
}
