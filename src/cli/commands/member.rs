use crate::cli::parser::{Commands, MemberCmd};
use crate::cli::session::Session;
use crate::core::MembershipLedger;
use crate::errors::AppResult;
use crate::models::membership::Membership;
use crate::models::role::Capability;
use crate::ui::messages::{info, success};
use crate::utils::colors::{RESET, color_for_credits, colorize_optional, colorize_status};
use crate::utils::date::fmt_date;
use crate::utils::table::{Column, Table};
use chrono::NaiveDate;

fn print_memberships(list: &[Membership], today: NaiveDate) {
    let mut t = Table::new(vec![
        Column::new("id", 4),
        Column::new("user", 5),
        Column::new("type", 14),
        Column::new("start", 10),
        Column::new("end", 10),
        Column::new("visits", 6),
        Column::new("status", 9),
        Column::new("freeze", 23),
    ]);
    for m in list {
        let freeze = match (m.freeze_start, m.freeze_end) {
            (Some(a), Some(b)) => Some(format!("{} → {}", fmt_date(&a), fmt_date(&b))),
            _ => None,
        };
        t.add_row(vec![
            m.id.to_string(),
            m.user_id.to_string(),
            m.membership_type.clone(),
            fmt_date(&m.start_date),
            fmt_date(&m.end_date),
            format!("{}{}{}", color_for_credits(m.visits_left), m.visits_left, RESET),
            colorize_status(m.effective_status(today).to_db_str()),
            colorize_optional(freeze.as_deref()),
        ]);
    }
    print!("{}", t.render());
}

fn report(verb: &str, m: &Membership) {
    success(format!(
        "Membership {} {}: {} → {}, {} visits left ({})",
        m.id,
        verb,
        m.start_date,
        m.end_date,
        m.visits_left,
        m.status.to_db_str()
    ));
}

pub fn handle(cmd: &Commands, s: &mut Session) -> AppResult<()> {
    let Commands::Member { action } = cmd else {
        return Ok(());
    };
    let today = s.ctx.today();

    match action {
        MemberCmd::Create {
            user_id,
            membership_type,
            payment_id,
        } => {
            s.require(Capability::ManageMemberships)?;
            let m = MembershipLedger::create(
                &mut s.pool,
                &s.ctx,
                *user_id,
                membership_type,
                *payment_id,
            )?;
            report("created", &m);
        }
        MemberCmd::Extend { id, payment_id } => {
            s.require(Capability::ManageMemberships)?;
            let m = MembershipLedger::extend(&mut s.pool, &s.ctx, *id, *payment_id)?;
            report("extended", &m);
        }
        MemberCmd::Freeze { id, days, reason } => {
            s.require(Capability::ManageMemberships)?;
            let m = MembershipLedger::freeze(&mut s.pool, &s.ctx, *id, *days, reason)?;
            report("frozen", &m);
        }
        MemberCmd::Unfreeze { id } => {
            s.require(Capability::ManageMemberships)?;
            let m = MembershipLedger::unfreeze(&mut s.pool, &s.ctx, *id)?;
            report("unfrozen", &m);
        }
        MemberCmd::Cancel { id } => {
            s.require(Capability::ManageMemberships)?;
            let m = MembershipLedger::cancel(&mut s.pool, &s.ctx, *id)?;
            report("cancelled", &m);
        }
        MemberCmd::Active { user_id } => {
            s.require_for_user(*user_id, Capability::ManageMemberships)?;
            match MembershipLedger::get_active(&s.pool.conn, *user_id, today)? {
                Some(m) => print_memberships(&[m], today),
                None => info(format!("User {} has no active membership.", user_id)),
            }
        }
        MemberCmd::List { user_id } => {
            match user_id {
                Some(u) => s.require_for_user(*u, Capability::ManageMemberships)?,
                None => s.require(Capability::ManageMemberships)?,
            }
            let list = MembershipLedger::list(&mut s.pool, *user_id)?;
            if list.is_empty() {
                info("No memberships.");
            } else {
                print_memberships(&list, today);
            }
        }
        MemberCmd::Expiring { days } => {
            s.require(Capability::ManageMemberships)?;
            let expired = MembershipLedger::expire_overdue(&mut s.pool, &s.ctx)?;
            let days = days.unwrap_or(s.ctx.rules.expiring_notice_days);
            let notified = MembershipLedger::notify_expiring(&mut s.pool, &s.ctx, days)?;
            success(format!(
                "{} membership(s) expired, {} expiring in {} days notified",
                expired, notified, days
            ));
        }
    }
    Ok(())
}
