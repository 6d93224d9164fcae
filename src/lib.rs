//! gymledger library root.
//! Exposes the CLI parser, the high-level run() function and the engine modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use cli::session::Session;
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    use cli::commands as c;

    match &cli.command {
        Commands::Init => return c::init::handle(cli),
        Commands::Config { .. } => return c::config::handle(&cli.command, cfg),
        _ => {}
    }

    let mut session = Session::open(cli, cfg)?;
    let s = &mut session;
    match &cli.command {
        Commands::User { .. } => c::user::handle(&cli.command, s),
        Commands::Type { .. } => c::mtype::handle(&cli.command, s),
        Commands::Payment { .. } => c::payment::handle(&cli.command, s),
        Commands::Member { .. } => c::member::handle(&cli.command, s),
        Commands::Slot { .. } => c::slot::handle(&cli.command, s),
        Commands::Book { .. } => c::book::handle(&cli.command, s),
        Commands::Visit { .. } => c::visit::handle(&cli.command, s),
        Commands::Occupancy { .. } => c::occupancy::handle(&cli.command, s),
        Commands::Report { .. } => c::report::handle(&cli.command, s),
        Commands::Notifications { .. } => c::notifications::handle(&cli.command, s),
        Commands::Log { .. } => c::log::handle(&cli.command, s),
        Commands::Init | Commands::Config { .. } => Ok(()),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;

    // --db wins over the configured path for this run
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    cfg.database = utils::path::expand_tilde(&cfg.database)
        .to_string_lossy()
        .to_string();

    dispatch(&cli, &cfg)
}
