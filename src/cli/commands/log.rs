use crate::cli::parser::Commands;
use crate::cli::session::Session;
use crate::core::log::LogLogic;
use crate::errors::AppResult;
use crate::models::role::Capability;

pub fn handle(cmd: &Commands, s: &mut Session) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        s.require(Capability::ManageUsers)?;
        LogLogic::print_log(&mut s.pool)?;
    }

    Ok(())
}
