//! Config command - view and change client settings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use p2pay_core::config::{Config, API_URL_ENV};

use super::get_data_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the payment server URL
    SetUrl {
        /// Base URL, e.g. http://localhost:8000
        url: String,
    },
    /// Set the request timeout in seconds
    SetTimeout {
        /// Timeout in seconds
        seconds: u64,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    let mut config = Config::load(&data_dir)?;

    match command {
        ConfigCommands::Show { json } => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "api_url": config.api_url,
                        "api_url_from_env": config.api_url_from_env,
                        "timeout_secs": config.timeout_secs,
                        "data_dir": data_dir.to_string_lossy(),
                    }))?
                );
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Setting", "Value"]);
            let url_source = if config.api_url_from_env {
                format!("{} (from {})", config.api_url, API_URL_ENV)
            } else {
                config.api_url.clone()
            };
            table.add_row(vec!["API URL".to_string(), url_source]);
            table.add_row(vec!["Timeout".to_string(), format!("{}s", config.timeout_secs)]);
            table.add_row(vec![
                "Data directory".to_string(),
                data_dir.display().to_string(),
            ]);

            println!("{}", "Settings".bold());
            println!("{}", table);
        }
        ConfigCommands::SetUrl { url } => {
            config.set_api_url(&url)?;
            config.save(&data_dir)?;
            output::success(&format!("API URL set to {}", config.api_url));
            if std::env::var(API_URL_ENV).is_ok_and(|v| !v.trim().is_empty()) {
                output::warning(&format!(
                    "{} is set and overrides this value until unset",
                    API_URL_ENV
                ));
            }
        }
        ConfigCommands::SetTimeout { seconds } => {
            config.set_timeout_secs(seconds)?;
            config.save(&data_dir)?;
            output::success(&format!("Timeout set to {}s", seconds));
        }
    }

    Ok(())
}
