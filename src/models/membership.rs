use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Frozen,
    Expired,
    Cancelled,
}

impl MembershipStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Frozen => "frozen",
            MembershipStatus::Expired => "expired",
            MembershipStatus::Cancelled => "cancelled",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(MembershipStatus::Active),
            "frozen" => Some(MembershipStatus::Frozen),
            "expired" => Some(MembershipStatus::Expired),
            "cancelled" => Some(MembershipStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Membership {
    pub id: i64,
    pub user_id: i64,
    pub membership_type: String, // ⇔ memberships.membership_type (type name)
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub visits_left: i64,
    pub status: MembershipStatus,
    pub freeze_start: Option<NaiveDate>,
    pub freeze_end: Option<NaiveDate>,
    pub freeze_reason: Option<String>,
    pub payment_id: i64,
    pub has_pool: bool,
    pub has_sauna: bool,
    pub created_at: String,
}

impl Membership {
    /// Status as seen on `today`: an `active` row past its end date reads as expired
    /// even before `expire_overdue` has persisted it.
    pub fn effective_status(&self, today: NaiveDate) -> MembershipStatus {
        if self.status == MembershipStatus::Active && self.end_date < today {
            MembershipStatus::Expired
        } else {
            self.status
        }
    }

    /// `active ∧ start_date ≤ today ≤ end_date`
    pub fn is_in_effect(&self, today: NaiveDate) -> bool {
        self.status == MembershipStatus::Active && self.start_date <= today && today <= self.end_date
    }

    /// In effect and still holding at least one visit credit.
    pub fn is_bookable(&self, today: NaiveDate) -> bool {
        self.is_in_effect(today) && self.visits_left > 0
    }
}
