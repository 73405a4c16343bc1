#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for neighborhood real-estate analysis.
//!
//! Every engine operation is available as a subcommand; without one, an
//! interactive menu guides the user through them.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use realty_analytics_models::{RankCriterion, TopPicksCriteria};

#[derive(Parser)]
#[command(name = "realty", about = "Neighborhood real-estate analysis")]
struct Cli {
    /// Location table to load instead of the embedded one [env: `REALTY_DATA_PATH`]
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Scoring configuration TOML to use instead of the embedded one
    /// [env: `REALTY_SCORING_CONFIG`]
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Prompt for bind address, port and reports directory
        #[arg(long)]
        interactive: bool,
    },
    /// List all locations
    Locations,
    /// Show a location with its derived metrics
    Info {
        /// Identifier or partial name (e.g. "satellite")
        location: String,
    },
    /// Investment analysis for a location
    Invest {
        /// Identifier or partial name
        location: String,
        /// Amount to invest (defaults to the configured principal)
        #[arg(long)]
        amount: Option<f64>,
        /// Projection horizon in years
        #[arg(long)]
        years: Option<u32>,
    },
    /// Compare two or more locations
    Compare {
        /// Identifiers or partial names
        #[arg(required = true, num_args = 2..)]
        locations: Vec<String>,
    },
    /// Top locations by a ranking criterion
    Top {
        /// Ranking criterion (overall, investment, safety, affordability,
        /// lifestyle, connectivity, livability)
        #[arg(long, default_value = "overall")]
        by: RankCriterion,
        /// Only locations in this city
        #[arg(long)]
        city: Option<String>,
        /// Maximum price per square foot
        #[arg(long)]
        budget: Option<f64>,
        /// Minimum overall score
        #[arg(long)]
        min_score: Option<f64>,
        /// Number of picks
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Market trends, optionally for one city
    Trends {
        /// City name
        #[arg(long)]
        city: Option<String>,
    },
    /// Dataset statistics
    Stats,
    /// Write a full analysis report as JSON
    Export {
        /// Identifier or partial name
        location: String,
        /// Directory to write into [env: `REALTY_REPORTS_DIR`, default: reports]
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// AI narrative for a location
    Ai {
        /// Identifier or partial name
        location: String,
        /// Analysis type (`detailed_analysis`, `investment_focus`, `family_focus`)
        #[arg(long = "type")]
        analysis_type: Option<String>,
        /// Free-text focus instead of a fixed analysis type
        #[arg(long)]
        focus: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let data = cli.data.or_else(|| env_path("REALTY_DATA_PATH"));
    let config = cli.config.or_else(|| env_path("REALTY_SCORING_CONFIG"));

    let Some(command) = cli.command else {
        return interactive::run(data.as_deref(), config.as_deref()).await;
    };

    let analyzer = || commands::load_analyzer(data.as_deref(), config.as_deref());
    let out = commands::Output { json: cli.json };

    match command {
        Commands::Serve { interactive } => commands::serve(interactive).await?,
        Commands::Locations => commands::locations(&analyzer()?, out)?,
        Commands::Info { location } => commands::info(&analyzer()?, &location, out)?,
        Commands::Invest {
            location,
            amount,
            years,
        } => commands::invest(&analyzer()?, &location, amount, years, out)?,
        Commands::Compare { locations } => commands::compare(&analyzer()?, &locations, out)?,
        Commands::Top {
            by,
            city,
            budget,
            min_score,
            limit,
        } => {
            let criteria = TopPicksCriteria {
                budget_max: budget,
                city,
                min_overall_score: min_score,
                limit,
                rank_by: by,
            };
            commands::top(&analyzer()?, &criteria, out)?;
        }
        Commands::Trends { city } => commands::trends(&analyzer()?, city.as_deref())?,
        Commands::Stats => commands::stats(&analyzer()?)?,
        Commands::Export { location, dir } => {
            let dir = dir
                .or_else(|| env_path("REALTY_REPORTS_DIR"))
                .unwrap_or_else(|| PathBuf::from("reports"));
            commands::export(&analyzer()?, &location, &dir)?;
        }
        Commands::Ai {
            location,
            analysis_type,
            focus,
        } => {
            commands::ai(
                &analyzer()?,
                &location,
                analysis_type.as_deref(),
                focus.as_deref(),
                out,
            )
            .await?;
        }
    }

    Ok(())
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_compare_and_top() {
        let cli = Cli::try_parse_from(["realty", "compare", "satellite", "vastrapur"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Compare { ref locations }) if locations.len() == 2
        ));

        let cli = Cli::try_parse_from(["realty", "top", "--by", "Safety", "--limit", "3"]).unwrap();
        match cli.command {
            Some(Commands::Top { by, limit, .. }) => {
                assert_eq!(by, RankCriterion::Safety);
                assert_eq!(limit, Some(3));
            }
            _ => panic!("expected top"),
        }

        assert!(Cli::try_parse_from(["realty", "compare", "satellite"]).is_err());
    }
}
