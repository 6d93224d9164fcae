use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::table::visible_len;
use ansi_term::Colour;

const OP_MAX_WIDTH: usize = 60;

/// Colour of an audit line, by operation family.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        "email" => Colour::Cyan,
        "notify_failed" => Colour::Red,
        "member_cancel" | "book_cancel" | "slot_cancel" => Colour::Red,
        "member_freeze" | "member_expire" => Colour::Yellow,
        "visit_in" | "visit_out" => Colour::Blue,
        other if other.ends_with("_create") || other.ends_with("_add") => Colour::Green,
        other if other.starts_with("book_") => Colour::Green,
        _ => Colour::White,
    }
}

/// `operation (target)`, cut to [`OP_MAX_WIDTH`] visible characters with only
/// the operation word coloured.
fn render_op_target(operation: &str, target: &str) -> String {
    let plain = if target.is_empty() {
        operation.to_string()
    } else {
        format!("{operation} ({target})")
    };

    let visible = if plain.chars().count() > OP_MAX_WIDTH {
        let mut s: String = plain.chars().take(OP_MAX_WIDTH - 3).collect();
        s.push_str("...");
        s
    } else {
        plain
    };

    let color = color_for_operation(operation);
    match visible.split_once(' ') {
        Some((op_word, rest)) => format!("{} {}", color.paint(op_word), rest),
        None => color.paint(visible.as_str()).to_string(),
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &mut DbPool) -> AppResult<()> {
        let mut stmt = pool.conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let raw_date: String = row.get(1)?;
            let operation: String = row.get(2)?;
            let target: Option<String> = row.get(3)?;
            let message: String = row.get(4)?;

            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            let op_target = render_op_target(&operation, target.as_deref().unwrap_or(""));
            Ok((id, date, op_target, message))
        })?;

        let mut entries = Vec::new();
        for r in rows {
            entries.push(r?);
        }

        if entries.is_empty() {
            info("Internal log is empty.");
            return Ok(());
        }

        let op_w = entries
            .iter()
            .map(|(_, _, op, _)| visible_len(op))
            .max()
            .unwrap_or(10)
            .min(OP_MAX_WIDTH);
        let id_w = entries
            .iter()
            .map(|(id, _, _, _)| id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries
            .iter()
            .map(|(_, date, _, _)| date.len())
            .max()
            .unwrap_or(10);

        println!("📜 Internal log:\n");

        for (id, date, op_target, message) in entries {
            let padding = " ".repeat(op_w.saturating_sub(visible_len(&op_target)));
            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                id,
                date,
                op_target,
                padding,
                message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_targets_are_truncated_on_visible_width() {
        let target = "x".repeat(100);
        let rendered = render_op_target("book_join", &target);
        assert_eq!(visible_len(&rendered), OP_MAX_WIDTH);
        assert!(rendered.ends_with("..."));
    }
}
