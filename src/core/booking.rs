//! Booking Coordinator.
//!
//! Per (user, slot) a participation moves `none → confirmed → cancelled →
//! confirmed`. Every transition runs inside one immediate transaction so the
//! capacity check, the participation write and the credit movement are a
//! single critical section.

use crate::core::catalog::TrainingCatalog;
use crate::core::context::GymContext;
use crate::core::ledger::MembershipLedger;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::participation::{Participation, ParticipationStatus};
use crate::models::schedule::{ScheduleSlot, TrainingType};
use crate::utils::date::fmt_ts;
use chrono::Duration;
use rusqlite::Connection;

pub struct BookingCoordinator;

/// One more confirmed participant must still fit on `slot`.
fn ensure_capacity(conn: &Connection, slot: &ScheduleSlot) -> AppResult<()> {
    let confirmed = queries::count_confirmed(conn, slot.id)?;
    match slot.training_type {
        TrainingType::Group => {
            let max = slot.max_participants.unwrap_or(0);
            if confirmed >= max {
                return Err(AppError::GroupFull {
                    schedule_id: slot.id,
                    max,
                });
            }
        }
        TrainingType::Personal => {
            if confirmed > 0 {
                return Err(AppError::SlotTaken(slot.id));
            }
        }
    }
    Ok(())
}

fn load_participation(conn: &Connection, id: i64) -> AppResult<Participation> {
    queries::get_participation(conn, id)?
        .ok_or_else(|| AppError::Other(format!("participation {} vanished", id)))
}

impl BookingCoordinator {
    pub fn join(
        pool: &mut DbPool,
        ctx: &GymContext,
        user_id: i64,
        schedule_id: i64,
    ) -> AppResult<Participation> {
        let today = ctx.today();
        let now = ctx.now_str();
        let tx = pool.immediate()?;

        let slot = TrainingCatalog::get_slot(&tx, schedule_id)?;
        if !slot.is_available {
            return Err(AppError::SlotUnavailable(schedule_id));
        }

        let membership = MembershipLedger::get_active(&tx, user_id, today)?
            .filter(|m| m.is_bookable(today))
            .ok_or(AppError::NoEligibleMembership(user_id))?;

        let participation_id = match queries::find_participation(&tx, schedule_id, user_id)? {
            Some(p) if p.is_confirmed() => {
                return Err(AppError::AlreadyBooked {
                    user_id,
                    schedule_id,
                });
            }
            Some(p) => {
                // Re-join: no new deduction, the flag stays as cancel left it.
                ensure_capacity(&tx, &slot)?;
                queries::update_participation(
                    &tx,
                    p.id,
                    ParticipationStatus::Confirmed,
                    p.credit_debited,
                    &now,
                )?;
                ttlog(
                    &tx,
                    "book_rejoin",
                    &format!("slot {}", schedule_id),
                    &format!("user {}", user_id),
                )?;
                p.id
            }
            None => {
                ensure_capacity(&tx, &slot)?;
                let id = queries::insert_participation(
                    &tx,
                    schedule_id,
                    user_id,
                    membership.id,
                    &now,
                )?;
                MembershipLedger::deduct_visit(&tx, membership.id)?;
                ttlog(
                    &tx,
                    "book_join",
                    &format!("slot {}", schedule_id),
                    &format!("user {} (membership {})", user_id, membership.id),
                )?;
                id
            }
        };

        let participation = load_participation(&tx, participation_id)?;
        tx.commit()?;
        Ok(participation)
    }

    pub fn cancel(
        pool: &mut DbPool,
        ctx: &GymContext,
        user_id: i64,
        schedule_id: i64,
    ) -> AppResult<Participation> {
        let now = ctx.now();
        let tx = pool.immediate()?;

        let p = queries::find_participation(&tx, schedule_id, user_id)?
            .filter(Participation::is_confirmed)
            .ok_or(AppError::NotBooked {
                user_id,
                schedule_id,
            })?;

        let slot = TrainingCatalog::get_slot(&tx, schedule_id)?;
        let cutoff_hours = ctx.rules.cancel_cutoff_hours;
        let deadline = Duration::try_hours(cutoff_hours)
            .and_then(|cutoff| slot.starts_at().checked_sub_signed(cutoff))
            .ok_or_else(|| {
                AppError::InvalidArgument(format!(
                    "cancel cutoff of {} hours is out of range",
                    cutoff_hours
                ))
            })?;
        if now > deadline {
            return Err(AppError::TooLateToCancel {
                schedule_id,
                starts_at: fmt_ts(&slot.starts_at()),
                cutoff_hours,
            });
        }

        if p.credit_debited {
            MembershipLedger::restore_visit(&tx, p.membership_id)?;
        }
        queries::update_participation(
            &tx,
            p.id,
            ParticipationStatus::Cancelled,
            false,
            &fmt_ts(&now),
        )?;
        ttlog(
            &tx,
            "book_cancel",
            &format!("slot {}", schedule_id),
            &format!(
                "user {}{}",
                user_id,
                if p.credit_debited {
                    format!(", credit back to membership {}", p.membership_id)
                } else {
                    String::new()
                }
            ),
        )?;

        let participation = load_participation(&tx, p.id)?;
        tx.commit()?;
        Ok(participation)
    }

    /// Confirmed participants of a slot.
    pub fn participants(pool: &mut DbPool, schedule_id: i64) -> AppResult<Vec<Participation>> {
        TrainingCatalog::get_slot(&pool.conn, schedule_id)?;
        Ok(queries::participations_for_slot(&pool.conn, schedule_id, true)?)
    }

    /// Every booking of a user, cancelled ones included.
    pub fn bookings_for_user(pool: &mut DbPool, user_id: i64) -> AppResult<Vec<Participation>> {
        Ok(queries::participations_for_user(&pool.conn, user_id)?)
    }
}
