use chrono::NaiveDateTime;
use serde::Serialize;

/// One physical stay in the gym, from check-in to (optional) check-out.
#[derive(Debug, Clone, Serialize)]
pub struct VisitEvent {
    pub id: i64,
    pub user_id: i64,
    pub membership_id: i64,
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
}

impl VisitEvent {
    pub fn is_inside(&self) -> bool {
        self.check_out.is_none()
    }

    pub fn duration_minutes(&self) -> Option<i64> {
        self.check_out.map(|out| (out - self.check_in).num_minutes())
    }
}

/// Headcount for one hour of one day.
#[derive(Debug, Clone, Serialize)]
pub struct HourlyStat {
    pub timestamp: NaiveDateTime,
    pub visitors: i64,
    pub max_capacity: i64,
}
