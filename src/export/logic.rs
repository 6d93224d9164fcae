// src/export/logic.rs

use crate::core::context::GymContext;
use crate::core::occupancy::OccupancyAggregator;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::OccupancyExport;
use crate::export::{ExportFormat, ReportKind};
use crate::ui::messages::info;
use crate::utils::date::{fmt_date, week_start};
use chrono::NaiveDate;
use std::path::Path;

pub struct ExportLogic;

impl ExportLogic {
    /// Write occupancy statistics for `date` (daily) or for the week
    /// containing `date` (weekly). Defaults to today.
    pub fn export(
        pool: &mut DbPool,
        ctx: &GymContext,
        kind: ReportKind,
        format: ExportFormat,
        file: &str,
        date: Option<NaiveDate>,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);
        ensure_writable(path, force)?;

        let rows = Self::collect(pool, ctx, kind, date.unwrap_or_else(|| ctx.today()))?;

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
        }

        ttlog(
            &pool.conn,
            "report",
            file,
            &format!("{:?} {} ({} rows)", kind, format.as_str(), rows.len()),
        )?;
        Ok(rows.len())
    }

    pub fn collect(
        pool: &mut DbPool,
        ctx: &GymContext,
        kind: ReportKind,
        date: NaiveDate,
    ) -> AppResult<Vec<OccupancyExport>> {
        let stats = match kind {
            ReportKind::Daily => OccupancyAggregator::daily_stats(&pool.conn, ctx, date)?,
            ReportKind::Weekly => {
                let monday = week_start(date);
                info(format!("Week starting {}", fmt_date(&monday)));
                OccupancyAggregator::weekly_stats(&pool.conn, ctx, monday)?
                    .into_iter()
                    .flatten()
                    .collect()
            }
        };
        Ok(stats.iter().map(OccupancyExport::from).collect())
    }
}
