use crate::cli::parser::{Commands, OccupancyCmd};
use crate::cli::session::Session;
use crate::core::OccupancyAggregator;
use crate::errors::AppResult;
use crate::models::role::Capability;
use crate::models::visit::HourlyStat;
use crate::ui::messages::{header, info};
use crate::utils::colors::{GREY, RED, RESET, YELLOW};
use crate::utils::date::{fmt_date, parse_date_arg, week_start};
use chrono::Timelike;

/// One line per hour with a small bar; near-full hours stand out.
fn print_hours(stats: &[HourlyStat]) {
    for st in stats {
        let color = if st.visitors == 0 {
            GREY
        } else if st.visitors * 100 >= st.max_capacity * 90 {
            RED
        } else if st.visitors * 100 >= st.max_capacity * 60 {
            YELLOW
        } else {
            RESET
        };
        let bar = "█".repeat(st.visitors.clamp(0, 40) as usize);
        println!(
            "{:02}:00 {}{:>4}/{:<4}{} {}",
            st.timestamp.hour(),
            color,
            st.visitors,
            st.max_capacity,
            RESET,
            bar
        );
    }
}

pub fn handle(cmd: &Commands, s: &mut Session) -> AppResult<()> {
    let Commands::Occupancy { action } = cmd else {
        return Ok(());
    };
    s.require(Capability::ViewOccupancy)?;
    let conn = &s.pool.conn;

    match action {
        OccupancyCmd::Current => {
            let n = OccupancyAggregator::current_occupancy(conn)?;
            info(format!(
                "Currently inside: {} / {}",
                n, s.ctx.rules.gym_capacity
            ));
        }
        OccupancyCmd::Hour { date, hour } => {
            let date = parse_date_arg(date)?;
            let n = OccupancyAggregator::hourly_occupancy(conn, date, *hour)?;
            info(format!("{} {:02}:00-{:02}:59: {} visitor(s)", date, hour, hour, n));
        }
        OccupancyCmd::Daily { date } => {
            let date = match date {
                Some(d) => parse_date_arg(d)?,
                None => s.ctx.today(),
            };
            let stats = OccupancyAggregator::daily_stats(conn, &s.ctx, date)?;
            header(format!("Occupancy {}", fmt_date(&date)));
            print_hours(&stats);
        }
        OccupancyCmd::Weekly { week_start: ws } => {
            let start = match ws {
                Some(d) => parse_date_arg(d)?,
                None => week_start(s.ctx.today()),
            };
            for day in OccupancyAggregator::weekly_stats(conn, &s.ctx, start)? {
                if let Some(first) = day.first() {
                    header(format!("Occupancy {}", first.timestamp.format("%a %Y-%m-%d")));
                }
                print_hours(&day);
                println!();
            }
        }
        OccupancyCmd::Peak { days } => {
            let days = days.unwrap_or(s.ctx.rules.peak_window_days);
            let peaks = OccupancyAggregator::peak_hours(conn, &s.ctx, days)?;
            header(format!("Peak hours over the last {} day(s)", days));
            for (hour, count) in peaks.iter().take(5) {
                println!("{:02}:00  {}", hour, count);
            }
        }
    }
    Ok(())
}
