/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";

/// Status color for memberships, bookings and visits.
pub fn color_for_status(status: &str) -> &'static str {
    match status {
        "active" | "confirmed" | "completed" | "inside" => GREEN,
        "frozen" | "pending" => CYAN,
        "expired" | "left" => GREY,
        "cancelled" | "failed" => RED,
        _ => RESET,
    }
}

/// Remaining-credit color:
/// 0 → red
/// 1..=2 → yellow
/// otherwise → reset
pub fn color_for_credits(value: i64) -> &'static str {
    match value {
        i64::MIN..=0 => RED,
        1..=2 => YELLOW,
        _ => RESET,
    }
}

pub fn colorize_status(status: &str) -> String {
    format!("{}{}{}", color_for_status(status), status, RESET)
}

pub fn colorize_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => format!("{GREY}--{RESET}"),
    }
}
