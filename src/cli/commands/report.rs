use crate::cli::parser::Commands;
use crate::cli::session::Session;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::models::role::Capability;
use crate::utils::date::parse_date_arg;

pub fn handle(cmd: &Commands, s: &mut Session) -> AppResult<()> {
    if let Commands::Report {
        kind,
        format,
        file,
        date,
        force,
    } = cmd
    {
        s.require(Capability::ViewOccupancy)?;
        let date = date.as_deref().map(parse_date_arg).transpose()?;
        ExportLogic::export(&mut s.pool, &s.ctx, *kind, *format, file, date, *force)?;
    }
    Ok(())
}
