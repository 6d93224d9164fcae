//! Reference records the engine reads: users, membership types and payments.

use crate::core::context::GymContext;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::membership_type::MembershipType;
use crate::models::payment::{Payment, PaymentStatus};
use crate::models::role::Role;
use crate::models::user::User;

pub struct Directory;

impl Directory {
    pub fn add_user(
        pool: &mut DbPool,
        ctx: &GymContext,
        username: &str,
        email: &str,
        role: Role,
    ) -> AppResult<User> {
        if username.trim().is_empty() || !email.contains('@') {
            return Err(AppError::InvalidArgument(format!(
                "invalid user '{}' <{}>",
                username, email
            )));
        }

        let id = queries::insert_user(&pool.conn, username, email, role, &ctx.now_str())?;
        ttlog(
            &pool.conn,
            "user_add",
            &format!("user {}", id),
            &format!("{} <{}> as {}", username, email, role.to_db_str()),
        )?;

        Self::get_user(pool, id)
    }

    pub fn get_user(pool: &mut DbPool, id: i64) -> AppResult<User> {
        queries::get_user(&pool.conn, id)?.ok_or(AppError::UserNotFound(id))
    }

    pub fn list_users(pool: &mut DbPool) -> AppResult<Vec<User>> {
        Ok(queries::list_users(&pool.conn)?)
    }

    pub fn add_type(pool: &mut DbPool, t: &MembershipType) -> AppResult<MembershipType> {
        if t.duration_days < 1 || t.visits_limit < 0 || t.price_cents < 0 {
            return Err(AppError::InvalidArgument(format!(
                "membership type '{}' needs duration ≥ 1 day and non-negative visits/price",
                t.name
            )));
        }

        queries::insert_type(&pool.conn, t)?;
        ttlog(
            &pool.conn,
            "type_add",
            &t.name,
            &format!("{} days, {} visits", t.duration_days, t.visits_limit),
        )?;

        queries::get_type_by_name(&pool.conn, &t.name)?
            .ok_or_else(|| AppError::TypeNotFound(t.name.clone()))
    }

    pub fn list_types(pool: &mut DbPool) -> AppResult<Vec<MembershipType>> {
        Ok(queries::list_types(&pool.conn)?)
    }

    /// Record a pending payment. Gateway integration is outside the engine:
    /// an operator later marks it completed or failed.
    pub fn record_payment(
        pool: &mut DbPool,
        ctx: &GymContext,
        user_id: i64,
        amount_cents: i64,
        description: &str,
    ) -> AppResult<Payment> {
        if amount_cents < 0 {
            return Err(AppError::InvalidArgument(format!(
                "negative payment amount: {}",
                amount_cents
            )));
        }
        queries::get_user(&pool.conn, user_id)?.ok_or(AppError::UserNotFound(user_id))?;

        let id =
            queries::insert_payment(&pool.conn, user_id, amount_cents, description, &ctx.now_str())?;
        ttlog(
            &pool.conn,
            "payment_add",
            &format!("payment {}", id),
            &format!("user {} amount {}", user_id, amount_cents),
        )?;

        Self::get_payment(pool, id)
    }

    pub fn complete_payment(pool: &mut DbPool, ctx: &GymContext, id: i64) -> AppResult<Payment> {
        Self::settle(pool, ctx, id, PaymentStatus::Completed)
    }

    pub fn fail_payment(pool: &mut DbPool, ctx: &GymContext, id: i64) -> AppResult<Payment> {
        Self::settle(pool, ctx, id, PaymentStatus::Failed)
    }

    fn settle(
        pool: &mut DbPool,
        ctx: &GymContext,
        id: i64,
        status: PaymentStatus,
    ) -> AppResult<Payment> {
        let payment = Self::get_payment(pool, id)?;
        if payment.status != PaymentStatus::Pending {
            return Err(AppError::PaymentAlreadySettled {
                id,
                status: payment.status.to_db_str().to_string(),
            });
        }

        let completed_at = ctx.now_str();
        let at = (status == PaymentStatus::Completed).then_some(completed_at.as_str());
        queries::set_payment_status(&pool.conn, id, status, at)?;
        ttlog(
            &pool.conn,
            "payment_settle",
            &format!("payment {}", id),
            status.to_db_str(),
        )?;

        Self::get_payment(pool, id)
    }

    pub fn get_payment(pool: &mut DbPool, id: i64) -> AppResult<Payment> {
        queries::get_payment(&pool.conn, id)?.ok_or(AppError::PaymentNotFound(id))
    }

    pub fn list_payments(pool: &mut DbPool, user_id: Option<i64>) -> AppResult<Vec<Payment>> {
        Ok(queries::list_payments(&pool.conn, user_id)?)
    }
}
