//! Role-based capability checks. Every CLI operation calls exactly one of
//! these before touching the engine.

use crate::db::queries::get_user;
use crate::errors::{AppError, AppResult};
use crate::models::role::Capability;
use crate::models::user::Actor;
use rusqlite::Connection;

pub fn authorize(actor: &Actor, cap: Capability) -> AppResult<()> {
    if cap.granted_to().contains(&actor.role) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied {
            role: actor.role.to_db_str().to_string(),
            action: cap.describe().to_string(),
        })
    }
}

/// Acting on one's own record only needs `BookOwn`; acting on someone else
/// needs `cap`.
pub fn authorize_for_user(actor: &Actor, target_user: i64, cap: Capability) -> AppResult<()> {
    if actor.user_id == Some(target_user) {
        authorize(actor, Capability::BookOwn)
    } else {
        authorize(actor, cap)
    }
}

/// Identity lookup: `--as <user_id>` becomes that user's `(id, role)`;
/// no override means the local operator.
pub fn resolve_actor(conn: &Connection, as_user: Option<i64>) -> AppResult<Actor> {
    match as_user {
        None => Ok(Actor::operator()),
        Some(id) => {
            let user = get_user(conn, id)?.ok_or(AppError::UserNotFound(id))?;
            Ok(Actor::user(&user))
        }
    }
}
