use crate::cli::parser::Commands;
use crate::cli::session::Session;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::role::Capability;
use crate::ui::messages::info;
use crate::utils::colors::{BLUE, GREY, RESET};

pub fn handle(cmd: &Commands, s: &mut Session) -> AppResult<()> {
    let Commands::Notifications { user_id, unread } = cmd else {
        return Ok(());
    };
    s.require_for_user(*user_id, Capability::ManageUsers)?;

    let conn = &s.pool.conn;
    queries::get_user(conn, *user_id)?.ok_or(AppError::UserNotFound(*user_id))?;

    let list = queries::list_notifications(conn, *user_id, *unread)?;
    if list.is_empty() {
        info(format!("No notifications for user {}.", user_id));
        return Ok(());
    }

    for n in &list {
        let mark = if n.is_read { GREY } else { BLUE };
        println!(
            "{}{} [{}]{} {}: {}",
            mark, n.created_at, n.kind, RESET, n.title, n.message
        );
    }
    queries::mark_notifications_read(conn, *user_id)?;
    Ok(())
}
