//! Occupancy Aggregator: check-in/check-out events and headcount statistics.

use crate::core::context::GymContext;
use crate::core::ledger::MembershipLedger;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::visit::{HourlyStat, VisitEvent};
use crate::utils::date::{add_days, fmt_ts, hour_window};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

pub struct OccupancyAggregator;

fn load_visit(conn: &Connection, id: i64) -> AppResult<VisitEvent> {
    queries::get_visit(conn, id)?.ok_or(AppError::VisitNotFound(id))
}

impl OccupancyAggregator {
    /// Open a visit and take one credit from `membership_id` in the same transaction.
    pub fn check_in(
        pool: &mut DbPool,
        ctx: &GymContext,
        user_id: i64,
        membership_id: i64,
    ) -> AppResult<VisitEvent> {
        let now = ctx.now();
        let today = now.date();
        let tx = pool.immediate()?;

        if queries::open_visit_for_user(&tx, user_id)?.is_some() {
            return Err(AppError::AlreadyInside(user_id));
        }

        let membership = queries::get_membership(&tx, membership_id)?
            .filter(|m| m.user_id == user_id)
            .ok_or(AppError::MembershipNotFound(membership_id))?;

        let active = MembershipLedger::get_active(&tx, user_id, today)?;
        let in_effect = active.is_some_and(|a| a.id == membership.id) && membership.is_in_effect(today);
        if !in_effect {
            return Err(AppError::MembershipNotActive(membership_id));
        }
        if membership.visits_left <= 0 {
            return Err(AppError::NoVisitsLeft(membership_id));
        }

        let id = queries::insert_visit(&tx, user_id, membership_id, &now)?;
        MembershipLedger::deduct_visit(&tx, membership_id)?;
        ttlog(
            &tx,
            "visit_in",
            &format!("visit {}", id),
            &format!("user {} (membership {})", user_id, membership_id),
        )?;

        let visit = load_visit(&tx, id)?;
        tx.commit()?;
        Ok(visit)
    }

    pub fn check_out(pool: &mut DbPool, ctx: &GymContext, visit_id: i64) -> AppResult<VisitEvent> {
        let now = ctx.now();
        load_visit(&pool.conn, visit_id)?;

        if queries::set_check_out(&pool.conn, visit_id, &now)? == 0 {
            return Err(AppError::AlreadyCheckedOut(visit_id));
        }
        ttlog(&pool.conn, "visit_out", &format!("visit {}", visit_id), &fmt_ts(&now))?;

        load_visit(&pool.conn, visit_id)
    }

    /// People inside right now (open visits).
    pub fn current_occupancy(conn: &Connection) -> AppResult<i64> {
        Ok(queries::count_open_visits(conn)?)
    }

    /// Visits whose stay intersects `[date hour:00, date hour+1:00)`.
    pub fn hourly_occupancy(conn: &Connection, date: NaiveDate, hour: u32) -> AppResult<i64> {
        let (start, end) = hour_window(date, hour)?;
        Ok(queries::count_visits_overlapping(conn, &start, &end)?)
    }

    /// Per hour-of-day totals over the `window_days` days ending today,
    /// busiest first (ties by hour). Always 24 entries.
    pub fn peak_hours(
        conn: &Connection,
        ctx: &GymContext,
        window_days: i64,
    ) -> AppResult<Vec<(u32, i64)>> {
        let today = ctx.today();
        let mut totals: Vec<(u32, i64)> = (0..24).map(|h| (h, 0)).collect();

        for back in 0..window_days.max(0) {
            let day = add_days(today, -back)?;
            for entry in totals.iter_mut() {
                entry.1 += Self::hourly_occupancy(conn, day, entry.0)?;
            }
        }

        totals.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(totals)
    }

    pub fn daily_stats(
        conn: &Connection,
        ctx: &GymContext,
        date: NaiveDate,
    ) -> AppResult<Vec<HourlyStat>> {
        let mut stats = Vec::with_capacity(24);
        for hour in 0..24 {
            let (timestamp, _) = hour_window(date, hour)?;
            stats.push(HourlyStat {
                timestamp,
                visitors: Self::hourly_occupancy(conn, date, hour)?,
                max_capacity: ctx.rules.gym_capacity,
            });
        }
        Ok(stats)
    }

    /// Seven days of [`Self::daily_stats`] starting at `week_start`.
    pub fn weekly_stats(
        conn: &Connection,
        ctx: &GymContext,
        week_start: NaiveDate,
    ) -> AppResult<Vec<Vec<HourlyStat>>> {
        (0..7)
            .map(|d| Self::daily_stats(conn, ctx, add_days(week_start, d)?))
            .collect()
    }

    pub fn visits_for_user(
        pool: &mut DbPool,
        user_id: i64,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> AppResult<Vec<VisitEvent>> {
        Ok(queries::visits_for_user(
            &pool.conn,
            user_id,
            from.as_ref(),
            to.as_ref(),
        )?)
    }
}
