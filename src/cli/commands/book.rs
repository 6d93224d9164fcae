use crate::cli::parser::{BookCmd, Commands};
use crate::cli::session::Session;
use crate::core::BookingCoordinator;
use crate::errors::AppResult;
use crate::models::participation::Participation;
use crate::models::role::Capability;
use crate::ui::messages::{info, success};
use crate::utils::colors::colorize_status;
use crate::utils::table::{Column, Table};

fn print_bookings(list: &[Participation]) {
    let mut t = Table::new(vec![
        Column::new("id", 4),
        Column::new("slot", 5),
        Column::new("user", 5),
        Column::new("membership", 10),
        Column::new("status", 10),
        Column::new("credit", 6),
        Column::new("updated", 19),
    ]);
    for p in list {
        t.add_row(vec![
            p.id.to_string(),
            p.schedule_id.to_string(),
            p.user_id.to_string(),
            p.membership_id.to_string(),
            colorize_status(p.status.to_db_str()),
            if p.credit_debited { "held" } else { "-" }.to_string(),
            p.updated_at.clone(),
        ]);
    }
    print!("{}", t.render());
}

pub fn handle(cmd: &Commands, s: &mut Session) -> AppResult<()> {
    let Commands::Book { action } = cmd else {
        return Ok(());
    };

    match action {
        BookCmd::Join { user_id, slot_id } => {
            s.require_for_user(*user_id, Capability::ManageBookings)?;
            let p = BookingCoordinator::join(&mut s.pool, &s.ctx, *user_id, *slot_id)?;
            success(format!("User {} booked on slot {} (booking {})", user_id, slot_id, p.id));
        }
        BookCmd::Cancel { user_id, slot_id } => {
            s.require_for_user(*user_id, Capability::ManageBookings)?;
            BookingCoordinator::cancel(&mut s.pool, &s.ctx, *user_id, *slot_id)?;
            success(format!("Booking of user {} on slot {} cancelled", user_id, slot_id));
        }
        BookCmd::List { user_id, slot_id } => {
            let list = match (user_id, slot_id) {
                (Some(u), _) => {
                    s.require_for_user(*u, Capability::ManageBookings)?;
                    BookingCoordinator::bookings_for_user(&mut s.pool, *u)?
                }
                (None, Some(slot)) => {
                    s.require(Capability::ManageSchedule)
                        .or_else(|_| s.require(Capability::ManageBookings))?;
                    BookingCoordinator::participants(&mut s.pool, *slot)?
                }
                (None, None) => match s.actor.user_id {
                    Some(me) => BookingCoordinator::bookings_for_user(&mut s.pool, me)?,
                    None => {
                        info("Use --user <id> or --slot <id>.");
                        return Ok(());
                    }
                },
            };
            if list.is_empty() {
                info("No bookings.");
            } else {
                print_bookings(&list);
            }
        }
    }
    Ok(())
}
