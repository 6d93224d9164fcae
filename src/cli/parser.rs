use crate::export::{ExportFormat, ReportKind};
use clap::{Parser, Subcommand};

/// Command-line interface definition for gymledger
#[derive(Parser)]
#[command(
    name = "gymledger",
    version = env!("CARGO_PKG_VERSION"),
    about = "Gym membership & booking engine: memberships, visit credits, training slots and occupancy on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Act as this user (role checks use the user's role)
    #[arg(global = true, long = "as", value_name = "USER_ID")]
    pub as_user: Option<i64>,

    /// Pin the clock to "YYYY-MM-DD HH:MM"
    #[arg(global = true, long = "now", hide = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check the configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields to the configuration file")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", requires = "edit_config")]
        editor: Option<String>,
    },

    /// Users and their roles
    User {
        #[command(subcommand)]
        action: UserCmd,
    },

    /// Membership types (duration, visit credits, extras)
    #[command(name = "type")]
    Type {
        #[command(subcommand)]
        action: TypeCmd,
    },

    /// Payments backing memberships
    Payment {
        #[command(subcommand)]
        action: PaymentCmd,
    },

    /// Membership lifecycle
    Member {
        #[command(subcommand)]
        action: MemberCmd,
    },

    /// Training schedule slots
    Slot {
        #[command(subcommand)]
        action: SlotCmd,
    },

    /// Bookings on training slots
    Book {
        #[command(subcommand)]
        action: BookCmd,
    },

    /// Gym check-in / check-out
    Visit {
        #[command(subcommand)]
        action: VisitCmd,
    },

    /// Occupancy statistics
    Occupancy {
        #[command(subcommand)]
        action: OccupancyCmd,
    },

    /// Write occupancy statistics to a CSV or JSON file
    Report {
        #[arg(long, value_enum, default_value = "daily")]
        kind: ReportKind,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file
        #[arg(long)]
        file: String,

        /// Day (daily) or any day of the week (weekly); default today
        #[arg(long)]
        date: Option<String>,

        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },

    /// Show a user's notifications (and mark them read)
    Notifications {
        user_id: i64,

        #[arg(long)]
        unread: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

#[derive(Subcommand)]
pub enum UserCmd {
    Add {
        username: String,
        email: String,
        /// admin | manager | trainer | client
        #[arg(long, default_value = "client")]
        role: String,
    },
    List,
}

#[derive(Subcommand)]
pub enum TypeCmd {
    Add {
        name: String,
        #[arg(long)]
        days: i64,
        #[arg(long)]
        visits: i64,
        /// Price in cents
        #[arg(long, default_value_t = 0)]
        price: i64,
        #[arg(long)]
        pool: bool,
        #[arg(long)]
        sauna: bool,
    },
    List,
}

#[derive(Subcommand)]
pub enum PaymentCmd {
    /// Record a pending payment
    Add {
        user_id: i64,
        amount_cents: i64,
        #[arg(long, default_value = "")]
        desc: String,
    },
    Complete {
        id: i64,
    },
    Fail {
        id: i64,
    },
    List {
        #[arg(long = "user")]
        user_id: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum MemberCmd {
    Create {
        user_id: i64,
        membership_type: String,
        payment_id: i64,
    },
    Extend {
        id: i64,
        payment_id: i64,
    },
    Freeze {
        id: i64,
        days: i64,
        reason: String,
    },
    Unfreeze {
        id: i64,
    },
    Cancel {
        id: i64,
    },
    /// Show the user's active membership
    Active {
        user_id: i64,
    },
    List {
        #[arg(long = "user")]
        user_id: Option<i64>,
    },
    /// Mark overdue memberships expired and notify those ending soon
    Expiring {
        #[arg(long)]
        days: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum SlotCmd {
    Create {
        trainer_id: i64,
        /// YYYY-MM-DD
        date: String,
        /// HH:MM
        start: String,
        /// HH:MM
        end: String,
        /// Group training with this many places (personal when omitted)
        #[arg(long = "group", requires = "name")]
        group: Option<i64>,
        #[arg(long)]
        name: Option<String>,
    },
    List {
        trainer_id: i64,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    Cancel {
        id: i64,
    },
    /// Send reminders for the slots on a date (default tomorrow)
    Remind {
        #[arg(long)]
        date: Option<String>,
    },
    Open {
        id: i64,
    },
    Close {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BookCmd {
    Join {
        user_id: i64,
        slot_id: i64,
    },
    Cancel {
        user_id: i64,
        slot_id: i64,
    },
    List {
        #[arg(long = "user", conflicts_with = "slot_id")]
        user_id: Option<i64>,
        #[arg(long = "slot")]
        slot_id: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum VisitCmd {
    In {
        user_id: i64,
        membership_id: i64,
    },
    Out {
        visit_id: i64,
    },
    List {
        user_id: i64,
    },
}

#[derive(Subcommand)]
pub enum OccupancyCmd {
    Current,
    Hour {
        date: String,
        hour: u32,
    },
    Daily {
        date: Option<String>,
    },
    Weekly {
        week_start: Option<String>,
    },
    Peak {
        #[arg(long)]
        days: Option<i64>,
    },
}
