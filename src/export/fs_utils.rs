// src/export/fs_utils.rs

use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, warning};
use std::io::{self, Write};
use std::path::Path;

/// Whether `path` may be (over)written.
///
/// A missing file or `force` passes; otherwise the user is asked on stdin and
/// anything but `y`/`yes` aborts the export.
pub(crate) fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if !path.exists() || force {
        return Ok(());
    }

    warning(format!("The file '{}' already exists.", path.display()));

    print!("Overwrite? [y/N]: ");
    io::stdout().flush().ok();

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => {
            info("Existing file will be overwritten.");
            Ok(())
        }
        _ => Err(AppError::Export(format!(
            "{} exists and was not overwritten (use --force)",
            path.display()
        ))),
    }
}
