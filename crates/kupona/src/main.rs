// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kupona - a Telegram bot for single-use redemption codes.
//!
//! This is the binary entry point for the Kupona bot.

mod serve;

use clap::{Parser, Subcommand};

/// Kupona - a Telegram bot for single-use redemption codes.
#[derive(Parser, Debug)]
#[command(name = "kupona", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot: connect to Telegram and serve dialogues.
    Serve,
    /// Create or migrate the database, then exit.
    InitDb,
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match kupona_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            kupona_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::InitDb) => serve::run_init_db(config).await,
        Some(Commands::Config) => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(kupona_core::KuponaError::Internal(format!(
                    "failed to render config: {e}"
                ))),
            }
        }
        None => {
            println!("kupona: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config =
            kupona_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.agent.name, "kupona");
    }
}
