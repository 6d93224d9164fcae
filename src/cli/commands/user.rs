use crate::cli::parser::{Commands, UserCmd};
use crate::cli::session::Session;
use crate::core::Directory;
use crate::errors::{AppError, AppResult};
use crate::models::role::{Capability, Role};
use crate::ui::messages::{info, success};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, s: &mut Session) -> AppResult<()> {
    let Commands::User { action } = cmd else {
        return Ok(());
    };
    s.require(Capability::ManageUsers)?;

    match action {
        UserCmd::Add {
            username,
            email,
            role,
        } => {
            let role = Role::from_code(role).ok_or_else(|| AppError::InvalidRole(role.clone()))?;
            let user = Directory::add_user(&mut s.pool, &s.ctx, username, email, role)?;
            success(format!(
                "User {} created: {} <{}> ({})",
                user.id,
                user.username,
                user.email,
                user.role.to_db_str()
            ));
        }
        UserCmd::List => {
            let users = Directory::list_users(&mut s.pool)?;
            if users.is_empty() {
                info("No users.");
                return Ok(());
            }
            let mut t = Table::new(vec![
                Column::new("id", 4),
                Column::new("username", 16),
                Column::new("email", 28),
                Column::new("role", 8),
            ]);
            for u in users {
                t.add_row(vec![
                    u.id.to_string(),
                    u.username,
                    u.email,
                    u.role.to_db_str().to_string(),
                ]);
            }
            print!("{}", t.render());
        }
    }
    Ok(())
}
