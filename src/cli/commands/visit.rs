use crate::cli::parser::{Commands, VisitCmd};
use crate::cli::session::Session;
use crate::core::OccupancyAggregator;
use crate::errors::AppResult;
use crate::models::role::Capability;
use crate::ui::messages::{info, success};
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::date::fmt_ts;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, s: &mut Session) -> AppResult<()> {
    let Commands::Visit { action } = cmd else {
        return Ok(());
    };

    match action {
        VisitCmd::In {
            user_id,
            membership_id,
        } => {
            s.require(Capability::RecordVisits)?;
            let v = OccupancyAggregator::check_in(&mut s.pool, &s.ctx, *user_id, *membership_id)?;
            success(format!(
                "Visit {}: user {} checked in at {}",
                v.id,
                v.user_id,
                fmt_ts(&v.check_in)
            ));
        }
        VisitCmd::Out { visit_id } => {
            s.require(Capability::RecordVisits)?;
            let v = OccupancyAggregator::check_out(&mut s.pool, &s.ctx, *visit_id)?;
            success(format!(
                "Visit {}: user {} checked out after {} min",
                v.id,
                v.user_id,
                v.duration_minutes().unwrap_or(0)
            ));
        }
        VisitCmd::List { user_id } => {
            s.require_for_user(*user_id, Capability::RecordVisits)?;
            let visits = OccupancyAggregator::visits_for_user(&mut s.pool, *user_id, None, None)?;
            if visits.is_empty() {
                info(format!("No visits for user {}.", user_id));
                return Ok(());
            }
            let mut t = Table::new(vec![
                Column::new("id", 4),
                Column::new("membership", 10),
                Column::new("check in", 19),
                Column::new("check out", 19),
                Column::new("min", 4),
                Column::new("state", 6),
            ]);
            for v in visits {
                let out = v.check_out.map(|o| fmt_ts(&o));
                t.add_row(vec![
                    v.id.to_string(),
                    v.membership_id.to_string(),
                    fmt_ts(&v.check_in),
                    colorize_optional(out.as_deref()),
                    v.duration_minutes().map(|m| m.to_string()).unwrap_or_default(),
                    colorize_status(if v.is_inside() { "inside" } else { "left" }),
                ]);
            }
            print!("{}", t.render());
        }
    }
    Ok(())
}
