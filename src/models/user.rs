use super::role::Role;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

/// Identity an operation is performed on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// `None` for the local operator (no `--as`).
    pub user_id: Option<i64>,
    pub role: Role,
}

impl Actor {
    pub fn operator() -> Self {
        Self {
            user_id: None,
            role: Role::Admin,
        }
    }

    pub fn user(user: &User) -> Self {
        Self {
            user_id: Some(user.id),
            role: user.role,
        }
    }
}
