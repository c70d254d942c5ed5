//! Cricket CLI
//!
//! Full-match and single-over simulation from JSON files.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use cricket_core::models::PlayerId;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "cricket_cli")]
#[command(about = "Simulate limited-overs cricket matches and overs", long_about = None)]
struct Cli {
    /// Engine config file (YAML, or JSON with a .json extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Simulate a full match from a settings JSON file
    Simulate {
        /// Match settings JSON (teams, format, toss, seed)
        #[arg(long)]
        settings: PathBuf,

        /// Batting aggression 0-10
        #[arg(long, default_value_t = 5)]
        aggression: u8,

        /// Player ids to treat as special players
        #[arg(long = "special")]
        specials: Vec<PlayerId>,

        /// Print every over
        #[arg(long, default_value = "false")]
        overs: bool,

        /// Write the full result JSON here
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Simulate the next over from a request JSON file
    Over {
        /// Over request JSON (schema_version, match, aggression, ...)
        #[arg(long)]
        request: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Simulate { settings, aggression, specials, overs, out } => {
            let response =
                cricket_cli::simulate_match_file(&settings, config, aggression, specials)?;
            if overs {
                for report in &response.overs {
                    println!("{}", cricket_cli::format_over(report));
                }
                println!();
            }
            println!("{}", cricket_cli::format_summary(&response));

            if let Some(path) = out {
                let json = serde_json::to_string_pretty(&response)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Result saved to: {}", path.display());
            }
        }

        Commands::Over { request } => {
            let response = cricket_cli::simulate_over_file(&request, config)?;
            let tokens: Vec<&str> = response.deliveries.iter().map(|b| b.display.as_str()).collect();
            println!(
                "Innings {} over {} [{}]: {}  ({} runs, {} wkts)",
                response.innings,
                response.over_number + 1,
                response.strategy,
                tokens.join(" "),
                response.runs,
                response.wickets
            );
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("cricket_cli is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
