use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log::ttlog_soft;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

/// Handle the `init` command
///
/// Creates the config directory and file (skipped with `--test`), the
/// SQLite database and runs every pending migration.
pub fn handle(cli: &Cli) -> AppResult<()> {
    let db_path = Config::init_all(cli.db.as_deref(), cli.test)?;
    let db_str = db_path.to_string_lossy().to_string();

    info("Initializing gymledger…");
    if !cli.test {
        info(format!("Config file : {}", Config::config_file().display()));
    }
    info(format!("Database    : {}", db_str));

    let pool = DbPool::new(&db_str)?;
    init_db(&pool.conn)?;

    ttlog_soft(
        &pool.conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", db_str),
    );

    success(format!("Database initialized at {}", db_str));
    Ok(())
}
