use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationStatus {
    Confirmed,
    Cancelled,
}

impl ParticipationStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ParticipationStatus::Confirmed => "confirmed",
            ParticipationStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(ParticipationStatus::Confirmed),
            "cancelled" => Some(ParticipationStatus::Cancelled),
            _ => None,
        }
    }
}

/// A user's booking on a schedule slot.
#[derive(Debug, Clone, Serialize)]
pub struct Participation {
    pub id: i64,
    pub schedule_id: i64,
    pub user_id: i64,
    /// Membership debited when the booking was first confirmed.
    pub membership_id: i64,
    /// The credit taken from `membership_id` has not been given back yet.
    pub credit_debited: bool,
    pub status: ParticipationStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Participation {
    pub fn is_confirmed(&self) -> bool {
        self.status == ParticipationStatus::Confirmed
    }
}
