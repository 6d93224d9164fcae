use crate::cli::parser::{Commands, PaymentCmd};
use crate::cli::session::Session;
use crate::core::Directory;
use crate::errors::AppResult;
use crate::models::payment::Payment;
use crate::models::role::Capability;
use crate::ui::messages::{info, success};
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::table::{Column, Table};

fn print_payments(payments: Vec<Payment>) {
    let mut t = Table::new(vec![
        Column::new("id", 4),
        Column::new("user", 5),
        Column::new("amount", 9),
        Column::new("status", 10),
        Column::new("created", 19),
        Column::new("completed", 19),
        Column::new("description", 20),
    ]);
    for p in payments {
        t.add_row(vec![
            p.id.to_string(),
            p.user_id.to_string(),
            p.amount_cents.to_string(),
            colorize_status(p.status.to_db_str()),
            p.created_at,
            colorize_optional(p.completed_at.as_deref()),
            colorize_optional(Some(p.description.as_str())),
        ]);
    }
    print!("{}", t.render());
}

pub fn handle(cmd: &Commands, s: &mut Session) -> AppResult<()> {
    let Commands::Payment { action } = cmd else {
        return Ok(());
    };
    s.require(Capability::ManagePayments)?;

    match action {
        PaymentCmd::Add {
            user_id,
            amount_cents,
            desc,
        } => {
            let p = Directory::record_payment(&mut s.pool, &s.ctx, *user_id, *amount_cents, desc)?;
            success(format!("Payment {} recorded (pending)", p.id));
        }
        PaymentCmd::Complete { id } => {
            let p = Directory::complete_payment(&mut s.pool, &s.ctx, *id)?;
            success(format!("Payment {} completed", p.id));
        }
        PaymentCmd::Fail { id } => {
            let p = Directory::fail_payment(&mut s.pool, &s.ctx, *id)?;
            success(format!("Payment {} marked failed", p.id));
        }
        PaymentCmd::List { user_id } => {
            let payments = Directory::list_payments(&mut s.pool, *user_id)?;
            if payments.is_empty() {
                info("No payments.");
            } else {
                print_payments(payments);
            }
        }
    }
    Ok(())
}
