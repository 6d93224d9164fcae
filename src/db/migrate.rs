use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// One versioned schema step. Applied steps are recorded in `log`
/// as `operation = 'migration_applied', target = version`.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_core_schema",
        description: "Created users, membership types, payments and memberships",
        sql: r#"
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL UNIQUE,
            role        TEXT NOT NULL DEFAULT 'client'
                        CHECK(role IN ('admin','manager','trainer','client')),
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS membership_types (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            name           TEXT NOT NULL UNIQUE,
            duration_days  INTEGER NOT NULL CHECK(duration_days > 0),
            visits_limit   INTEGER NOT NULL CHECK(visits_limit >= 0),
            price_cents    INTEGER NOT NULL DEFAULT 0,
            has_pool       INTEGER NOT NULL DEFAULT 0,
            has_sauna      INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS payments (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       INTEGER NOT NULL REFERENCES users(id),
            amount_cents  INTEGER NOT NULL CHECK(amount_cents >= 0),
            status        TEXT NOT NULL DEFAULT 'pending'
                          CHECK(status IN ('pending','completed','failed')),
            description   TEXT NOT NULL DEFAULT '',
            created_at    TEXT NOT NULL,
            completed_at  TEXT
        );

        CREATE TABLE IF NOT EXISTS memberships (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id          INTEGER NOT NULL REFERENCES users(id),
            membership_type  TEXT NOT NULL,
            start_date       TEXT NOT NULL,
            end_date         TEXT NOT NULL,
            visits_left      INTEGER NOT NULL CHECK(visits_left >= 0),
            status           TEXT NOT NULL DEFAULT 'active'
                             CHECK(status IN ('active','frozen','expired','cancelled')),
            freeze_start     TEXT,
            freeze_end       TEXT,
            freeze_reason    TEXT,
            payment_id       INTEGER NOT NULL REFERENCES payments(id),
            has_pool         INTEGER NOT NULL DEFAULT 0,
            has_sauna        INTEGER NOT NULL DEFAULT 0,
            created_at       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_memberships_user_status
            ON memberships(user_id, status, end_date);
        "#,
    },
    Migration {
        version: "20250301_0002_schedule_and_visits",
        description: "Created schedules, participations and visits",
        sql: r#"
        CREATE TABLE IF NOT EXISTS schedules (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            trainer_id        INTEGER NOT NULL REFERENCES users(id),
            name              TEXT,
            date              TEXT NOT NULL,
            start_time        TEXT NOT NULL,
            end_time          TEXT NOT NULL,
            training_type     TEXT NOT NULL CHECK(training_type IN ('personal','group')),
            max_participants  INTEGER,
            is_available      INTEGER NOT NULL DEFAULT 1,
            CHECK(end_time > start_time),
            CHECK(training_type = 'personal' OR max_participants >= 1)
        );

        CREATE INDEX IF NOT EXISTS idx_schedules_trainer_date
            ON schedules(trainer_id, date);

        CREATE TABLE IF NOT EXISTS participations (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            schedule_id     INTEGER NOT NULL REFERENCES schedules(id) ON DELETE CASCADE,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            membership_id   INTEGER NOT NULL REFERENCES memberships(id),
            credit_debited  INTEGER NOT NULL DEFAULT 0,
            status          TEXT NOT NULL CHECK(status IN ('confirmed','cancelled')),
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL,
            UNIQUE(schedule_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS visits (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id        INTEGER NOT NULL REFERENCES users(id),
            membership_id  INTEGER NOT NULL REFERENCES memberships(id),
            check_in       TEXT NOT NULL,
            check_out      TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_visits_check_in ON visits(check_in);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_visits_one_open_per_user
            ON visits(user_id) WHERE check_out IS NULL;
        "#,
    },
    Migration {
        version: "20250318_0003_notifications",
        description: "Created notifications",
        sql: r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL,
            type        TEXT NOT NULL,
            title       TEXT NOT NULL,
            message     TEXT NOT NULL,
            is_read     INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read);
        "#,
    },
];

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> Result<()> {
    // Schema + marker in one transaction: a half-applied step is never recorded.
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(m.sql)?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [m.version, m.description],
    )?;
    tx.commit()?;

    success(format!("Migration applied: {} → {}", m.version, m.description));
    Ok(())
}

/// Versions already recorded in `log`, oldest first.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect()
}

/// Public entry point: run all pending migrations.
///
/// Called by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            apply(conn, m)?;
        }
    }

    Ok(())
}
