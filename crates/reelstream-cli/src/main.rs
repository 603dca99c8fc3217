use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use commands::{check, config};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reelstream")]
#[command(about = "Reelstream - find out what's streaming from your watchlist")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Config file path (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write logs to this file (rotated daily)
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the watchlist against current streaming availability
    #[command(long_about = "Fetch the configured user's watchlist, look up streaming availability for every film, and report which entries are available on the selected services.")]
    Check {
        /// Watchlist username (overrides the config file)
        #[arg(long)]
        username: Option<String>,

        /// Comma-separated streaming services to check (overrides the config file)
        #[arg(long, value_name = "SERVICES", value_delimiter = ',')]
        services: Vec<String>,

        /// Country code for availability lookups (e.g. US, GB)
        #[arg(long)]
        country: Option<String>,

        /// Stop paginating the watchlist after this many pages
        #[arg(long, value_name = "N")]
        max_pages: Option<u32>,
    },
    /// Manage configuration
    #[command(long_about = "View or bootstrap the reelstream configuration file. Running without a subcommand shows the current configuration.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Write a starter config file to edit
    Init {
        /// Overwrite an existing config file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },

    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Check {
            username,
            services,
            country,
            max_pages,
        } => {
            let args = check::CheckArgs {
                username,
                services,
                country,
                max_pages,
                config_path: cli.config,
            };
            check::run_check(args, &output).await
        }
        Commands::Config { cmd } => {
            config::run_config(cmd.unwrap_or(ConfigCommands::Show), cli.config, &output)
        }
    }
}
