//! Training Catalog: trainer-authored slots, their availability and the
//! notifications sent to their participants.

use crate::core::context::GymContext;
use crate::core::ledger::MembershipLedger;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::notification::{Notification, NotificationKind};
use crate::models::participation::ParticipationStatus;
use crate::models::role::Role;
use crate::models::schedule::{NewSlot, ScheduleSlot, TrainingType};
use crate::utils::date::{add_days, fmt_date};
use crate::utils::time::{fmt_time, overlaps};
use chrono::NaiveDate;
use rusqlite::Connection;

pub struct TrainingCatalog;

/// Shape checks that need no database access.
fn validate_new_slot(slot: &NewSlot) -> AppResult<()> {
    if slot.training_type == TrainingType::Group {
        match (slot.max_participants, slot.name.as_deref()) {
            (None, _) => {
                return Err(AppError::InvalidGroupConfig(
                    "group training needs max_participants".into(),
                ));
            }
            (_, None) | (_, Some("")) => {
                return Err(AppError::InvalidGroupConfig("group training needs a name".into()));
            }
            (Some(n), _) if n < 1 => {
                return Err(AppError::InvalidGroupConfig(format!(
                    "max_participants must be at least 1 (got {})",
                    n
                )));
            }
            _ => {}
        }
    }

    if slot.end_time <= slot.start_time {
        return Err(AppError::InvalidTimeRange {
            start: fmt_time(&slot.start_time),
            end: fmt_time(&slot.end_time),
        });
    }
    Ok(())
}

impl TrainingCatalog {
    pub fn create_slot(pool: &mut DbPool, slot: NewSlot) -> AppResult<ScheduleSlot> {
        validate_new_slot(&slot)?;

        let mut slot = slot;
        if slot.training_type == TrainingType::Personal {
            slot.max_participants = None;
        }

        let tx = pool.immediate()?;

        match queries::get_user(&tx, slot.trainer_id)? {
            Some(u) if u.role == Role::Trainer => {}
            _ => return Err(AppError::TrainerNotFound(slot.trainer_id)),
        }

        let clash = queries::slots_for_trainer(&tx, slot.trainer_id, &slot.date, &slot.date)?
            .into_iter()
            .any(|e| overlaps(slot.start_time, slot.end_time, e.start_time, e.end_time));
        if clash {
            return Err(AppError::ScheduleOverlap {
                trainer_id: slot.trainer_id,
                date: fmt_date(&slot.date),
                start: fmt_time(&slot.start_time),
                end: fmt_time(&slot.end_time),
            });
        }

        let id = queries::insert_slot(&tx, &slot)?;
        ttlog(
            &tx,
            "slot_create",
            &format!("slot {}", id),
            &format!(
                "trainer {} {} {}-{} {}",
                slot.trainer_id,
                slot.date,
                fmt_time(&slot.start_time),
                fmt_time(&slot.end_time),
                slot.training_type.to_db_str()
            ),
        )?;
        tx.commit()?;

        Self::get_slot(&pool.conn, id)
    }

    pub fn get_slot(conn: &Connection, schedule_id: i64) -> AppResult<ScheduleSlot> {
        queries::get_slot(conn, schedule_id)?.ok_or(AppError::SlotNotFound(schedule_id))
    }

    pub fn count_confirmed(conn: &Connection, schedule_id: i64) -> AppResult<i64> {
        Ok(queries::count_confirmed(conn, schedule_id)?)
    }

    /// A trainer's slots between `from` and `to` (both inclusive).
    pub fn list_for_trainer(
        pool: &mut DbPool,
        trainer_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<ScheduleSlot>> {
        if to < from {
            return Err(AppError::InvalidArgument(format!(
                "period end {} is before start {}",
                to, from
            )));
        }
        Ok(queries::slots_for_trainer(&pool.conn, trainer_id, &from, &to)?)
    }

    pub fn set_availability(
        pool: &mut DbPool,
        schedule_id: i64,
        available: bool,
    ) -> AppResult<ScheduleSlot> {
        if queries::set_slot_available(&pool.conn, schedule_id, available)? == 0 {
            return Err(AppError::SlotNotFound(schedule_id));
        }
        ttlog(
            &pool.conn,
            "slot_availability",
            &format!("slot {}", schedule_id),
            if available { "open" } else { "closed" },
        )?;
        Self::get_slot(&pool.conn, schedule_id)
    }

    /// Close the slot and cancel every confirmed booking on it, returning
    /// held credits. Returns the number of bookings cancelled.
    pub fn cancel_slot(pool: &mut DbPool, ctx: &GymContext, schedule_id: i64) -> AppResult<usize> {
        let now = ctx.now_str();
        let tx = pool.immediate()?;

        let slot = Self::get_slot(&tx, schedule_id)?;
        let booked = queries::participations_for_slot(&tx, schedule_id, true)?;

        queries::set_slot_available(&tx, schedule_id, false)?;
        for p in &booked {
            if p.credit_debited {
                MembershipLedger::restore_visit(&tx, p.membership_id)?;
            }
            queries::update_participation(&tx, p.id, ParticipationStatus::Cancelled, false, &now)?;
        }

        ttlog(
            &tx,
            "slot_cancel",
            &format!("slot {}", schedule_id),
            &format!("{} booking(s) cancelled", booked.len()),
        )?;
        tx.commit()?;

        for p in &booked {
            ctx.notify(
                &pool.conn,
                Notification::new(
                    p.user_id,
                    NotificationKind::TrainingCancelled,
                    "Training cancelled",
                    format!(
                        "Unfortunately, your training {} has been cancelled",
                        slot.label()
                    ),
                ),
            );
        }

        Ok(booked.len())
    }

    /// Remind every confirmed participant of the slots on `date`
    /// (tomorrow when not given). Returns the number of reminders sent.
    pub fn send_reminders(
        pool: &mut DbPool,
        ctx: &GymContext,
        date: Option<NaiveDate>,
    ) -> AppResult<usize> {
        let date = match date {
            Some(d) => d,
            None => add_days(ctx.today(), 1)?,
        };
        let mut sent = 0;

        for slot in queries::slots_on(&pool.conn, &date)? {
            if !slot.is_available {
                continue;
            }
            for p in queries::participations_for_slot(&pool.conn, slot.id, true)? {
                ctx.notify(
                    &pool.conn,
                    Notification::new(
                        p.user_id,
                        NotificationKind::TrainingReminder,
                        "Training reminder",
                        format!(
                            "Reminder: you have a training on {} at {}",
                            slot.date,
                            fmt_time(&slot.start_time)
                        ),
                    ),
                );
                sent += 1;
            }
        }

        ttlog(
            &pool.conn,
            "slot_remind",
            &fmt_date(&date),
            &format!("{} reminder(s) sent", sent),
        )?;
        Ok(sent)
    }
}
