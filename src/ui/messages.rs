//! Console messages: one colour + icon per channel. Errors go to stderr.

use std::fmt;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

fn line<T: fmt::Display>(color: &str, icon: &str, msg: T) -> String {
    format!("{}{}{} {}{}", color, BOLD, icon, RESET, msg)
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}", line(FG_BLUE, ICON_INFO, msg));
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}", line(FG_GREEN, ICON_OK, msg));
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}", line(FG_YELLOW, ICON_WARN, msg));
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}", line(FG_RED, ICON_ERR, msg));
}

/// Section title above a listing.
pub fn header<T: fmt::Display>(msg: T) {
    println!("{}{}── {} ──{}\n", FG_BLUE, BOLD, msg, RESET);
}
