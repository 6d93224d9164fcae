use crate::cli::parser::{Commands, TypeCmd};
use crate::cli::session::Session;
use crate::core::Directory;
use crate::errors::AppResult;
use crate::models::membership_type::MembershipType;
use crate::models::role::Capability;
use crate::ui::messages::{info, success};
use crate::utils::table::{Column, Table};

fn yes_no(b: bool) -> String {
    if b { "yes".into() } else { "-".into() }
}

pub fn handle(cmd: &Commands, s: &mut Session) -> AppResult<()> {
    let Commands::Type { action } = cmd else {
        return Ok(());
    };

    match action {
        TypeCmd::Add {
            name,
            days,
            visits,
            price,
            pool,
            sauna,
        } => {
            s.require(Capability::ManageMemberships)?;
            let t = Directory::add_type(
                &mut s.pool,
                &MembershipType {
                    id: 0,
                    name: name.clone(),
                    duration_days: *days,
                    visits_limit: *visits,
                    price_cents: *price,
                    has_pool: *pool,
                    has_sauna: *sauna,
                },
            )?;
            success(format!(
                "Membership type '{}' added: {} days, {} visits",
                t.name, t.duration_days, t.visits_limit
            ));
        }
        TypeCmd::List => {
            let types = Directory::list_types(&mut s.pool)?;
            if types.is_empty() {
                info("No membership types.");
                return Ok(());
            }
            let mut t = Table::new(vec![
                Column::new("name", 16),
                Column::new("days", 5),
                Column::new("visits", 6),
                Column::new("price", 9),
                Column::new("pool", 4),
                Column::new("sauna", 5),
            ]);
            for mt in types {
                t.add_row(vec![
                    mt.name,
                    mt.duration_days.to_string(),
                    mt.visits_limit.to_string(),
                    format!("{}.{:02}", mt.price_cents / 100, mt.price_cents % 100),
                    yes_no(mt.has_pool),
                    yes_no(mt.has_sauna),
                ]);
            }
            print!("{}", t.render());
        }
    }
    Ok(())
}
