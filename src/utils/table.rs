//! Table rendering utilities for CLI outputs.

use regex::Regex;
use std::sync::OnceLock;

pub struct Column {
    pub header: String,
    pub width: usize,
}

impl Column {
    pub fn new(header: &str, width: usize) -> Self {
        Self {
            header: header.to_string(),
            width,
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

/// Visible width of a cell, ignoring ANSI colour sequences.
pub fn visible_len(s: &str) -> usize {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    let re = ANSI.get_or_init(|| Regex::new(r"\x1B\[[0-9;]*[mK]").expect("valid ANSI regex"));
    re.replace_all(s, "").chars().count()
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(visible_len(cell));
    format!("{}{} ", cell, " ".repeat(fill))
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        // Header
        for col in &self.columns {
            out.push_str(&pad(&col.header, col.width));
        }
        out.push('\n');

        // Rows
        for row in &self.rows {
            for (i, col) in self.columns.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                out.push_str(&pad(cell, col.width));
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colored_cells_are_padded_by_visible_width() {
        let mut t = Table::new(vec![Column::new("status", 8), Column::new("id", 3)]);
        t.add_row(vec!["\x1b[32mactive\x1b[0m".into(), "1".into()]);
        let rendered = t.render();
        let row = rendered.lines().nth(1).unwrap();
        assert_eq!(visible_len(row), 8 + 1 + 3 + 1);
    }
}
