//! Interactive menu for the CLI.
//!
//! Provides a menu-driven interface using `dialoguer` for running the
//! analysis commands without memorizing flags.

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, MultiSelect, Select};
use realty_analytics_models::{RankCriterion, TopPicksCriteria};

use crate::commands::{self, Output};

/// Top-level actions available in the interactive menu.
enum Action {
    Locations,
    Info,
    Invest,
    Compare,
    Top,
    Trends,
    Stats,
    Export,
    Ai,
    Serve,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Locations,
        Self::Info,
        Self::Invest,
        Self::Compare,
        Self::Top,
        Self::Trends,
        Self::Stats,
        Self::Export,
        Self::Ai,
        Self::Serve,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Locations => "List locations",
            Self::Info => "Location details",
            Self::Invest => "Investment analysis",
            Self::Compare => "Compare locations",
            Self::Top => "Top picks",
            Self::Trends => "Market trends",
            Self::Stats => "Dataset statistics",
            Self::Export => "Export analysis report",
            Self::Ai => "AI narrative",
            Self::Serve => "Start API server",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if loading data or the selected operation fails.
pub async fn run(
    data: Option<&Path>,
    scoring: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Neighborhood Analysis");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let analyzer = commands::load_analyzer(data, scoring)?;
    let out = Output { json: false };
    let names: Vec<String> = analyzer
        .list_identifiers()
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    let pick_location = |prompt: &str| -> Result<String, dialoguer::Error> {
        let i = Select::new()
            .with_prompt(prompt)
            .items(&names)
            .default(0)
            .interact()?;
        Ok(names[i].clone())
    };

    match Action::ALL[idx] {
        Action::Locations => commands::locations(&analyzer, out)?,
        Action::Info => commands::info(&analyzer, &pick_location("Location")?, out)?,
        Action::Invest => {
            let location = pick_location("Location")?;
            let amount: f64 = Input::new()
                .with_prompt("Amount to invest")
                .default(analyzer.config().defaults.principal)
                .interact_text()?;
            let years: u32 = Input::new()
                .with_prompt("Projection horizon (years)")
                .default(analyzer.config().defaults.horizon_years)
                .interact_text()?;
            commands::invest(&analyzer, &location, Some(amount), Some(years), out)?;
        }
        Action::Compare => {
            let chosen = MultiSelect::new()
                .with_prompt("Select two or more locations (space to toggle)")
                .items(&names)
                .interact()?;
            let selected: Vec<String> = chosen.into_iter().map(|i| names[i].clone()).collect();
            commands::compare(&analyzer, &selected, out)?;
        }
        Action::Top => {
            let criteria_labels: Vec<String> =
                RankCriterion::all().iter().map(ToString::to_string).collect();
            let by = Select::new()
                .with_prompt("Rank by")
                .items(&criteria_labels)
                .default(0)
                .interact()?;
            let limit: usize = Input::new()
                .with_prompt("How many")
                .default(analyzer.config().defaults.top_picks_limit)
                .interact_text()?;
            let criteria = TopPicksCriteria {
                limit: Some(limit),
                rank_by: RankCriterion::all()[by],
                ..TopPicksCriteria::default()
            };
            commands::top(&analyzer, &criteria, out)?;
        }
        Action::Trends => {
            let mut options = vec!["All cities".to_string()];
            options.extend(analyzer.dataset().cities());
            let i = Select::new()
                .with_prompt("City")
                .items(&options)
                .default(0)
                .interact()?;
            let city = (i > 0).then(|| options[i].as_str());
            commands::trends(&analyzer, city)?;
        }
        Action::Stats => commands::stats(&analyzer)?,
        Action::Export => {
            let location = pick_location("Location")?;
            let dir: String = Input::new()
                .with_prompt("Reports directory")
                .default("reports".to_string())
                .interact_text()?;
            commands::export(&analyzer, &location, &PathBuf::from(dir))?;
        }
        Action::Ai => {
            let location = pick_location("Location")?;
            let focus = if Confirm::new()
                .with_prompt("Use a custom focus?")
                .default(false)
                .interact()?
            {
                Some(
                    Input::<String>::new()
                        .with_prompt("Focus")
                        .interact_text()?,
                )
            } else {
                None
            };
            commands::ai(&analyzer, &location, None, focus.as_deref(), out).await?;
        }
        Action::Serve => commands::serve(true).await?,
    }

    Ok(())
}
