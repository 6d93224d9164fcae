use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingType {
    Personal,
    Group,
}

impl TrainingType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TrainingType::Personal => "personal",
            TrainingType::Group => "group",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "personal" => Some(TrainingType::Personal),
            "group" => Some(TrainingType::Group),
            _ => None,
        }
    }
}

/// Trainer-authored bookable time window.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSlot {
    pub id: i64,
    pub trainer_id: i64,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub training_type: TrainingType,
    pub max_participants: Option<i64>, // only for group slots
    pub is_available: bool,
}

impl ScheduleSlot {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn label(&self) -> String {
        match &self.name {
            Some(n) => format!("{} {} {}", n, self.date, self.start_time.format("%H:%M")),
            None => format!(
                "{} training {} {}",
                self.training_type.to_db_str(),
                self.date,
                self.start_time.format("%H:%M")
            ),
        }
    }
}

/// Input for `TrainingCatalog::create_slot`.
#[derive(Debug, Clone)]
pub struct NewSlot {
    pub trainer_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub training_type: TrainingType,
    pub max_participants: Option<i64>,
    pub name: Option<String>,
}
