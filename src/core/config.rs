use crate::config::Config;
use crate::config::migrate::{migrate_config_file, missing_keys};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, success, warning};
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    /// Effective configuration (file values plus defaults and `--db` override).
    pub fn print(cfg: &Config) -> AppResult<()> {
        let yaml = serde_yaml::to_string(cfg).map_err(|e| AppError::Config(e.to_string()))?;
        println!("📄 Current configuration:\n");
        println!("{}", yaml);
        Ok(())
    }

    /// Report keys missing from the file. Returns `true` when complete.
    pub fn check(path: &Path) -> AppResult<bool> {
        if !path.exists() {
            warning(format!(
                "No configuration file at {}: defaults are in use. Run `gymledger init`.",
                path.display()
            ));
            return Ok(false);
        }

        let missing = missing_keys(path)?;
        if missing.is_empty() {
            success(format!("{} has every key.", path.display()));
            Ok(true)
        } else {
            warning(format!(
                "{} is missing: {}. Run `gymledger config --migrate`.",
                path.display(),
                missing.join(", ")
            ));
            Ok(false)
        }
    }

    pub fn migrate(path: &Path) -> AppResult<usize> {
        if !path.exists() {
            return Err(AppError::Config(format!(
                "no configuration file at {}",
                path.display()
            )));
        }
        Ok(migrate_config_file(path)?.len())
    }

    /// Open the file in `editor`, then `$EDITOR`/`$VISUAL`, then the platform default.
    pub fn edit(path: &Path, editor: Option<&str>) -> AppResult<()> {
        let default_editor = std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            });
        let requested = editor.map(str::to_string).unwrap_or_else(|| default_editor.clone());

        if matches!(Command::new(&requested).arg(path).status(), Ok(s) if s.success()) {
            success(format!("Configuration file edited with '{}'", requested));
            return Ok(());
        }

        warning(format!(
            "Editor '{}' not available, falling back to '{}'",
            requested, default_editor
        ));
        match Command::new(&default_editor).arg(path).status() {
            Ok(s) if s.success() => {
                success(format!("Configuration file edited with '{}'", default_editor));
                Ok(())
            }
            _ => {
                error(format!("Failed to edit configuration with '{}'", default_editor));
                Err(AppError::Config(format!("cannot run editor '{}'", default_editor)))
            }
        }
    }
}
