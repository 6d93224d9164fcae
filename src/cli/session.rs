//! Everything a command handler needs for one invocation.

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::access::{authorize, authorize_for_user, resolve_actor};
use crate::core::context::GymContext;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::role::Capability;
use crate::models::user::Actor;
use crate::utils::date::Clock;

pub struct Session {
    pub pool: DbPool,
    pub ctx: GymContext,
    pub actor: Actor,
}

impl Session {
    /// Open the configured database (running pending migrations), pin the
    /// clock if `--now` was given and resolve `--as` to an actor.
    pub fn open(cli: &Cli, cfg: &Config) -> AppResult<Self> {
        let clock = Clock::from_override(cli.now.as_deref())?;
        let pool = DbPool::with_busy_timeout(&cfg.database, cfg.busy_timeout_ms)?;
        init_db(&pool.conn)?;

        let actor = resolve_actor(&pool.conn, cli.as_user)?;
        let ctx = GymContext::from_config(cfg, clock);

        Ok(Self { pool, ctx, actor })
    }

    pub fn require(&self, cap: Capability) -> AppResult<()> {
        authorize(&self.actor, cap)
    }

    pub fn require_for_user(&self, user_id: i64, cap: Capability) -> AppResult<()> {
        authorize_for_user(&self.actor, user_id, cap)
    }
}
