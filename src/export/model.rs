// src/export/model.rs

use crate::models::visit::HourlyStat;
use crate::utils::date::{fmt_date, fmt_ts};
use chrono::Timelike;
use serde::Serialize;

/// Flat occupancy row, shared by the CSV and JSON writers.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct OccupancyExport {
    pub date: String,
    pub hour: u32,
    pub timestamp: String,
    pub visitors: i64,
    pub max_capacity: i64,
    pub load_percent: i64,
}

impl From<&HourlyStat> for OccupancyExport {
    fn from(s: &HourlyStat) -> Self {
        let load_percent = if s.max_capacity > 0 {
            s.visitors * 100 / s.max_capacity
        } else {
            0
        };
        Self {
            date: fmt_date(&s.timestamp.date()),
            hour: s.timestamp.hour(),
            timestamp: fmt_ts(&s.timestamp),
            visitors: s.visitors,
            max_capacity: s.max_capacity,
            load_percent,
        }
    }
}
