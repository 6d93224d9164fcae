use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Trainer,
    Client,
}

impl Role {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Trainer => "trainer",
            Role::Client => "client",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "trainer" => Some(Role::Trainer),
            "client" => Some(Role::Client),
            _ => None,
        }
    }

    /// Helper: convert input code from CLI (lowercase or uppercase)
    pub fn from_code(code: &str) -> Option<Self> {
        Role::from_db_str(&code.to_lowercase())
    }
}

/// Something an operation needs permission to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageMemberships,
    ManageSchedule,
    RecordVisits,
    ManageBookings,
    BookOwn,
    ViewOccupancy,
    ManageUsers,
    ManagePayments,
}

impl Capability {
    pub fn describe(&self) -> &'static str {
        match self {
            Capability::ManageMemberships => "manage memberships",
            Capability::ManageSchedule => "manage the training schedule",
            Capability::RecordVisits => "record gym visits",
            Capability::ManageBookings => "manage other users' bookings",
            Capability::BookOwn => "book trainings",
            Capability::ViewOccupancy => "view occupancy",
            Capability::ManageUsers => "manage users",
            Capability::ManagePayments => "manage payments",
        }
    }

    /// Roles holding this capability.
    pub fn granted_to(&self) -> &'static [Role] {
        use Role::*;
        match self {
            Capability::ManageMemberships => &[Admin, Manager],
            Capability::ManageSchedule => &[Admin, Trainer],
            Capability::RecordVisits => &[Admin, Trainer],
            Capability::ManageBookings => &[Admin, Manager],
            Capability::BookOwn => &[Admin, Manager, Trainer, Client],
            Capability::ViewOccupancy => &[Admin, Manager, Trainer, Client],
            Capability::ManageUsers => &[Admin],
            Capability::ManagePayments => &[Admin, Manager],
        }
    }
}
