use std::path::PathBuf;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{presets, Cell, Table};
use serde_json::json;
use stream_check_config::{Config, PathManager};

use crate::output::Output;
use crate::ConfigCommands;

const SAMPLE_CONFIG: &str = r#"# reelstream configuration

# Watchlist username on the catalog site.
username = ""

# Streaming services you subscribe to, as displayed names.
services = ["Netflix", "Amazon Prime Video", "Hulu", "Max"]

country = "US"
language = "en"

[run]
# Pagination hard stop.
max_pages = 20
# Maximum in-flight availability lookups.
concurrency = 6
# Delay before the single retry of a failed lookup.
retry_delay_ms = 500
# Overall run deadline in seconds; 0 disables it.
deadline_secs = 120
"#;

pub fn run_config(cmd: ConfigCommands, config_path: Option<PathBuf>, output: &Output) -> Result<()> {
    let path = config_path.unwrap_or_else(|| PathManager::default().config_file());

    match cmd {
        ConfigCommands::Show => {
            let config = Config::load(&path)
                .map_err(|e| eyre!("{e}. Run `reelstream config init` to create one."))?;
            if output.is_human() {
                let mut table = Table::new();
                table.load_preset(presets::UTF8_FULL_CONDENSED);
                table.add_row(vec![Cell::new("username"), Cell::new(&config.username)]);
                table.add_row(vec![
                    Cell::new("services"),
                    Cell::new(config.services.join(", ")),
                ]);
                table.add_row(vec![Cell::new("country"), Cell::new(&config.country)]);
                table.add_row(vec![Cell::new("language"), Cell::new(&config.language)]);
                table.add_row(vec![
                    Cell::new("run.max_pages"),
                    Cell::new(config.run.max_pages),
                ]);
                table.add_row(vec![
                    Cell::new("run.concurrency"),
                    Cell::new(config.run.concurrency),
                ]);
                table.add_row(vec![
                    Cell::new("run.retry_delay_ms"),
                    Cell::new(config.run.retry_delay_ms),
                ]);
                table.add_row(vec![
                    Cell::new("run.deadline_secs"),
                    Cell::new(config.run.deadline_secs),
                ]);
                output.info(format!("Configuration at {}", path.display()));
                output.info(table.to_string());
            } else {
                output.json(&json!({
                    "path": path.display().to_string(),
                    "config": serde_json::to_value(&config)?,
                }));
            }
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                return Err(eyre!(
                    "config file already exists at {} (use --force to overwrite)",
                    path.display()
                ));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, SAMPLE_CONFIG)?;
            output.success(format!(
                "Wrote starter config to {} — edit it to set your username and services.",
                path.display()
            ));
        }
        ConfigCommands::Path => {
            output.info(path.display().to_string());
        }
    }

    Ok(())
}
