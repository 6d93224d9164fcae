use crate::cli::parser::{Commands, SlotCmd};
use crate::cli::session::Session;
use crate::core::TrainingCatalog;
use crate::errors::AppResult;
use crate::models::role::Capability;
use crate::models::schedule::{NewSlot, ScheduleSlot, TrainingType};
use crate::ui::messages::{header, info, success};
use crate::utils::colors::{GREEN, RED, RESET, colorize_optional};
use crate::utils::date::{add_days, parse_date_arg};
use crate::utils::time::{fmt_time, parse_time_arg};
use crate::utils::table::{Column, Table};

fn print_slots(s: &Session, slots: &[ScheduleSlot]) -> AppResult<()> {
    let mut t = Table::new(vec![
        Column::new("id", 4),
        Column::new("date", 10),
        Column::new("time", 11),
        Column::new("type", 8),
        Column::new("name", 16),
        Column::new("booked", 7),
        Column::new("state", 6),
    ]);
    for slot in slots {
        let booked = TrainingCatalog::count_confirmed(&s.pool.conn, slot.id)?;
        let places = match slot.max_participants {
            Some(max) => format!("{}/{}", booked, max),
            None => format!("{}/1", booked),
        };
        let state = if slot.is_available {
            format!("{GREEN}open{RESET}")
        } else {
            format!("{RED}closed{RESET}")
        };
        t.add_row(vec![
            slot.id.to_string(),
            slot.date.to_string(),
            format!("{}-{}", fmt_time(&slot.start_time), fmt_time(&slot.end_time)),
            slot.training_type.to_db_str().to_string(),
            colorize_optional(slot.name.as_deref()),
            places,
            state,
        ]);
    }
    print!("{}", t.render());
    Ok(())
}

pub fn handle(cmd: &Commands, s: &mut Session) -> AppResult<()> {
    let Commands::Slot { action } = cmd else {
        return Ok(());
    };

    match action {
        SlotCmd::Create {
            trainer_id,
            date,
            start,
            end,
            group,
            name,
        } => {
            s.require(Capability::ManageSchedule)?;
            let training_type = if group.is_some() {
                TrainingType::Group
            } else {
                TrainingType::Personal
            };
            let slot = TrainingCatalog::create_slot(
                &mut s.pool,
                NewSlot {
                    trainer_id: *trainer_id,
                    date: parse_date_arg(date)?,
                    start_time: parse_time_arg(start)?,
                    end_time: parse_time_arg(end)?,
                    training_type,
                    max_participants: *group,
                    name: name.clone(),
                },
            )?;
            success(format!("Slot {} created: {}", slot.id, slot.label()));
        }
        SlotCmd::List {
            trainer_id,
            from,
            to,
        } => {
            s.require(Capability::ViewOccupancy)?;
            let today = s.ctx.today();
            let from = match from {
                Some(d) => parse_date_arg(d)?,
                None => today,
            };
            let to = match to {
                Some(d) => parse_date_arg(d)?,
                None => add_days(from, 6)?,
            };
            let slots = TrainingCatalog::list_for_trainer(&mut s.pool, *trainer_id, from, to)?;
            if slots.is_empty() {
                info(format!("No slots for trainer {} from {} to {}.", trainer_id, from, to));
            } else {
                header(format!("Trainer {} · {} → {}", trainer_id, from, to));
                print_slots(s, &slots)?;
            }
        }
        SlotCmd::Cancel { id } => {
            s.require(Capability::ManageSchedule)?;
            let n = TrainingCatalog::cancel_slot(&mut s.pool, &s.ctx, *id)?;
            success(format!("Slot {} cancelled, {} booking(s) released", id, n));
        }
        SlotCmd::Remind { date } => {
            s.require(Capability::ManageSchedule)?;
            let date = date.as_deref().map(parse_date_arg).transpose()?;
            let n = TrainingCatalog::send_reminders(&mut s.pool, &s.ctx, date)?;
            success(format!("{} reminder(s) sent", n));
        }
        SlotCmd::Open { id } => {
            s.require(Capability::ManageSchedule)?;
            TrainingCatalog::set_availability(&mut s.pool, *id, true)?;
            success(format!("Slot {} open for booking", id));
        }
        SlotCmd::Close { id } => {
            s.require(Capability::ManageSchedule)?;
            TrainingCatalog::set_availability(&mut s.pool, *id, false)?;
            success(format!("Slot {} closed for booking", id));
        }
    }
    Ok(())
}
