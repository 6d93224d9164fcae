// src/export/mod.rs

mod fs_utils;
mod json_csv;
pub mod logic;
mod model;

pub use logic::ExportLogic;
pub use model::OccupancyExport;

use crate::ui::messages::success;
use clap::ValueEnum;
use std::path::Path;

pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!("{label} report written: {}", path.display()));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Which occupancy statistics a report covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// 24 hourly rows for one day
    Daily,
    /// 7 × 24 hourly rows starting on a Monday
    Weekly,
}
