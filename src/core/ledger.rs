//! Membership Ledger: membership records, their date window, visit credits
//! and freeze state.

use crate::core::context::GymContext;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::membership::{Membership, MembershipStatus};
use crate::models::membership_type::MembershipType;
use crate::models::notification::{Notification, NotificationKind};
use crate::utils::date::add_days;
use chrono::NaiveDate;
use rusqlite::Connection;

pub struct MembershipLedger;

/// Payment must exist and be completed. It is not marked as spent: the same
/// payment may back several `create`/`extend` calls, for any user.
fn require_completed_payment(conn: &Connection, payment_id: i64) -> AppResult<()> {
    match queries::get_payment(conn, payment_id)? {
        Some(p) if p.is_completed() => Ok(()),
        _ => Err(AppError::PaymentNotConfirmed(payment_id)),
    }
}

fn require_type(conn: &Connection, name: &str) -> AppResult<MembershipType> {
    queries::get_type_by_name(conn, name)?.ok_or_else(|| AppError::TypeNotFound(name.to_string()))
}

impl MembershipLedger {
    /// Open a membership paid by `payment_id`.
    ///
    /// If the user still has active memberships, the new one starts the day
    /// after the last of them ends, so validity windows never overlap.
    /// The payment is only checked for completion and can be reused.
    pub fn create(
        pool: &mut DbPool,
        ctx: &GymContext,
        user_id: i64,
        membership_type: &str,
        payment_id: i64,
    ) -> AppResult<Membership> {
        let today = ctx.today();
        let tx = pool.immediate()?;

        let mtype = require_type(&tx, membership_type)?;
        require_completed_payment(&tx, payment_id)?;
        queries::get_user(&tx, user_id)?.ok_or(AppError::UserNotFound(user_id))?;

        queries::expire_overdue(&tx, &today)?;
        let start_date = match queries::active_memberships(&tx, user_id, &today)?
            .iter()
            .map(|m| m.end_date)
            .max()
        {
            Some(last_end) => add_days(last_end, 1)?,
            None => today,
        };

        let mut membership = Membership {
            id: 0,
            user_id,
            membership_type: mtype.name.clone(),
            start_date,
            end_date: add_days(start_date, mtype.duration_days)?,
            visits_left: mtype.visits_limit,
            status: MembershipStatus::Active,
            freeze_start: None,
            freeze_end: None,
            freeze_reason: None,
            payment_id,
            has_pool: mtype.has_pool,
            has_sauna: mtype.has_sauna,
            created_at: ctx.now_str(),
        };
        membership.id = queries::insert_membership(&tx, &membership)?;

        ttlog(
            &tx,
            "member_create",
            &format!("membership {}", membership.id),
            &format!(
                "user {} {} {} → {} ({} visits)",
                user_id,
                membership.membership_type,
                membership.start_date,
                membership.end_date,
                membership.visits_left
            ),
        )?;
        tx.commit()?;

        ctx.notify(
            &pool.conn,
            Notification::new(
                user_id,
                NotificationKind::MembershipCreated,
                "Membership activated",
                format!(
                    "Your new membership is active and valid until {}",
                    membership.end_date
                ),
            ),
        );

        Ok(membership)
    }

    /// Renew with another period of the same type.
    ///
    /// Status is reset to `active` whatever it was, expired memberships included.
    /// As with `create`, a completed payment is not consumed.
    pub fn extend(
        pool: &mut DbPool,
        ctx: &GymContext,
        membership_id: i64,
        payment_id: i64,
    ) -> AppResult<Membership> {
        let tx = pool.immediate()?;

        let mut m = Self::get(&tx, membership_id)?;
        require_completed_payment(&tx, payment_id)?;
        let mtype = require_type(&tx, &m.membership_type)?;

        m.end_date = add_days(m.end_date, mtype.duration_days)?;
        m.status = MembershipStatus::Active;
        queries::update_membership(&tx, &m)?;
        queries::add_visits(&tx, m.id, mtype.visits_limit)?;

        ttlog(
            &tx,
            "member_extend",
            &format!("membership {}", m.id),
            &format!(
                "until {} (+{} visits, payment {})",
                m.end_date, mtype.visits_limit, payment_id
            ),
        )?;
        tx.commit()?;

        let m = Self::get(&pool.conn, membership_id)?;
        ctx.notify(
            &pool.conn,
            Notification::new(
                m.user_id,
                NotificationKind::MembershipExtended,
                "Membership extended",
                format!("Your membership has been extended until {}", m.end_date),
            ),
        );
        Ok(m)
    }

    /// Suspend an active membership for `days`; the end date moves forward by
    /// the same amount.
    pub fn freeze(
        pool: &mut DbPool,
        ctx: &GymContext,
        membership_id: i64,
        days: i64,
        reason: &str,
    ) -> AppResult<Membership> {
        let max = ctx.rules.max_freeze_days;
        if days > max {
            return Err(AppError::FreezeTooLong { days, max });
        }
        if days < 1 {
            return Err(AppError::InvalidFreezeDays(days));
        }

        let today = ctx.today();
        let tx = pool.immediate()?;

        let mut m = queries::get_membership(&tx, membership_id)?
            .filter(|m| m.status == MembershipStatus::Active)
            .ok_or(AppError::ActiveMembershipNotFound(membership_id))?;

        m.status = MembershipStatus::Frozen;
        m.end_date = add_days(m.end_date, days)?;
        m.freeze_reason = Some(reason.to_string());
        m.freeze_start = Some(today);
        m.freeze_end = Some(add_days(today, days)?);
        queries::update_membership(&tx, &m)?;

        ttlog(
            &tx,
            "member_freeze",
            &format!("membership {}", m.id),
            &format!("{} days: {}", days, reason),
        )?;
        tx.commit()?;

        ctx.notify(
            &pool.conn,
            Notification::new(
                m.user_id,
                NotificationKind::MembershipFrozen,
                "Membership frozen",
                format!(
                    "Your membership is frozen until {}",
                    m.freeze_end.unwrap_or(today)
                ),
            ),
        );
        Ok(m)
    }

    /// Reactivate a frozen membership. The end date keeps the full freeze
    /// extension even when unfreezing early.
    pub fn unfreeze(
        pool: &mut DbPool,
        ctx: &GymContext,
        membership_id: i64,
    ) -> AppResult<Membership> {
        let today = ctx.today();
        let tx = pool.immediate()?;

        let mut m = queries::get_membership(&tx, membership_id)?
            .filter(|m| m.status == MembershipStatus::Frozen)
            .ok_or(AppError::FrozenMembershipNotFound(membership_id))?;

        m.status = MembershipStatus::Active;
        m.freeze_end = Some(today);
        queries::update_membership(&tx, &m)?;

        ttlog(&tx, "member_unfreeze", &format!("membership {}", m.id), "active again")?;
        tx.commit()?;

        ctx.notify(
            &pool.conn,
            Notification::new(
                m.user_id,
                NotificationKind::MembershipUnfrozen,
                "Membership unfrozen",
                "Your membership is active again".to_string(),
            ),
        );
        Ok(m)
    }

    pub fn cancel(
        pool: &mut DbPool,
        ctx: &GymContext,
        membership_id: i64,
    ) -> AppResult<Membership> {
        let tx = pool.immediate()?;

        let mut m = Self::get(&tx, membership_id)?;
        if m.status == MembershipStatus::Cancelled {
            return Err(AppError::InvalidMembershipState {
                id: membership_id,
                status: m.status.to_db_str().to_string(),
            });
        }

        m.status = MembershipStatus::Cancelled;
        queries::update_membership(&tx, &m)?;
        ttlog(&tx, "member_cancel", &format!("membership {}", m.id), "cancelled")?;
        tx.commit()?;

        ctx.notify(
            &pool.conn,
            Notification::new(
                m.user_id,
                NotificationKind::MembershipCancelled,
                "Membership cancelled",
                format!("Your {} membership has been cancelled", m.membership_type),
            ),
        );
        Ok(m)
    }

    pub fn get(conn: &Connection, membership_id: i64) -> AppResult<Membership> {
        queries::get_membership(conn, membership_id)?
            .ok_or(AppError::MembershipNotFound(membership_id))
    }

    /// The user's active membership: `status = active` and `end_date ≥ today`.
    ///
    /// Several rows can match when memberships are stacked; the one with the
    /// earliest start (then lowest id) wins, i.e. the one currently in effect.
    pub fn get_active(
        conn: &Connection,
        user_id: i64,
        today: NaiveDate,
    ) -> AppResult<Option<Membership>> {
        Ok(queries::active_memberships(conn, user_id, &today)?
            .into_iter()
            .next())
    }

    pub fn list(pool: &mut DbPool, user_id: Option<i64>) -> AppResult<Vec<Membership>> {
        Ok(queries::list_memberships(&pool.conn, user_id)?)
    }

    /// Persist lazily detected expiry. Returns the number of memberships marked.
    pub fn expire_overdue(pool: &mut DbPool, ctx: &GymContext) -> AppResult<usize> {
        let n = queries::expire_overdue(&pool.conn, &ctx.today())?;
        if n > 0 {
            ttlog(
                &pool.conn,
                "member_expire",
                "",
                &format!("{} membership(s) expired", n),
            )?;
        }
        Ok(n)
    }

    /// Remind users whose membership ends exactly `days_ahead` days from today.
    pub fn notify_expiring(
        pool: &mut DbPool,
        ctx: &GymContext,
        days_ahead: i64,
    ) -> AppResult<usize> {
        let target = add_days(ctx.today(), days_ahead)?;
        let expiring = queries::memberships_ending_on(&pool.conn, &target)?;

        for m in &expiring {
            ctx.notify(
                &pool.conn,
                Notification::new(
                    m.user_id,
                    NotificationKind::MembershipExpiring,
                    "Membership expiring soon",
                    format!(
                        "Your membership expires on {}. Don't forget to renew it!",
                        m.end_date
                    ),
                ),
            );
        }
        Ok(expiring.len())
    }

    /// Take one visit credit. Fails with `NoVisitsLeft` at zero.
    pub fn deduct_visit(conn: &Connection, membership_id: i64) -> AppResult<()> {
        if queries::decrement_visits(conn, membership_id)? == 1 {
            return Ok(());
        }
        match queries::get_membership(conn, membership_id)? {
            None => Err(AppError::MembershipNotFound(membership_id)),
            Some(_) => Err(AppError::NoVisitsLeft(membership_id)),
        }
    }

    pub fn restore_visit(conn: &Connection, membership_id: i64) -> AppResult<()> {
        if queries::increment_visits(conn, membership_id)? == 0 {
            return Err(AppError::MembershipNotFound(membership_id));
        }
        Ok(())
    }
}
