//! Subcommand implementations.

use std::path::Path;

use realty_ai::{
    AiError,
    narrator::Narrator,
    prompt::{self, AnalysisType, group_thousands},
};
use realty_analytics::{
    Analyzer,
    config,
    report::{report_file_name, write_report},
};
use realty_analytics_models::TopPicksCriteria;
use realty_dataset::Dataset;
use serde::Serialize;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// How results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// Print pretty JSON instead of text.
    pub json: bool,
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn rupees(amount: f64) -> String {
    format!("Rs {}", group_thousands(amount))
}

/// Loads the location table and scoring configuration.
///
/// # Errors
///
/// Returns an error if either fails to load or validate.
pub fn load_analyzer(
    data: Option<&Path>,
    scoring: Option<&Path>,
) -> Result<Analyzer, Box<dyn std::error::Error>> {
    let dataset = Dataset::load_or_embedded(data)?;
    log::debug!("Loaded {} locations", dataset.len());
    let scoring = config::load_or_embedded(scoring)?;
    Ok(Analyzer::new(dataset.into(), scoring)?)
}

/// Runs the API server on its own actix system.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve(interactive: bool) -> CliResult {
    // actix-web runs its own System on a blocking thread.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(async move {
            if interactive {
                realty_server::interactive::run().await
            } else {
                realty_server::run_server().await
            }
        })
    })
    .await??;
    Ok(())
}

/// Prints every location.
///
/// # Errors
///
/// Returns an error if JSON output fails.
pub fn locations(analyzer: &Analyzer, out: Output) -> CliResult {
    let details: Vec<_> = analyzer
        .dataset()
        .iter()
        .map(|r| analyzer.detail(r))
        .collect();
    if out.json {
        return print_json(&details);
    }

    println!(
        "{:<28} {:>12} {:>8} {:>8} {:>10}",
        "LOCATION", "PRICE/SQFT", "SAFETY", "OVERALL", "INVESTMENT"
    );
    println!("{}", "-".repeat(70));
    for d in &details {
        println!(
            "{:<28} {:>12} {:>8.1} {:>8.2} {:>10.2}",
            d.location.as_str(),
            group_thousands(d.record.avg_price_per_sqft),
            d.record.safety_score,
            d.metrics.overall_score,
            d.metrics.investment_score
        );
    }
    Ok(())
}

/// Prints one location with its derived metrics.
///
/// # Errors
///
/// Returns an error if the location does not resolve.
pub fn info(analyzer: &Analyzer, location: &str, out: Output) -> CliResult {
    let detail = analyzer.location_detail(location)?;
    if out.json {
        return print_json(&detail);
    }

    let r = &detail.record;
    let m = &detail.metrics;
    println!("{}", detail.location);
    println!("{}", "=".repeat(detail.location.as_str().len()));
    println!("Overall score:       {:.2}/10", m.overall_score);
    println!("Livability score:    {:.2}/10", m.livability_score);
    println!("Investment score:    {:.2}/10", m.investment_score);
    println!("Affordability index: {:.2}/10", m.affordability_index);
    println!("Risk level:          {}", m.risk_level);
    println!(
        "Price:               {}/sq ft ({}, rank {} of {})",
        rupees(r.avg_price_per_sqft),
        m.price_rank.category,
        m.price_rank.rank,
        m.price_rank.total_locations
    );
    println!(
        "Rental yield:        {}%   Appreciation: {}%",
        r.rental_yield, r.appreciation_rate
    );
    println!(
        "Safety {} | Traffic {} | Connectivity {} | Infrastructure {} | Lifestyle {} | Environment {}",
        r.safety_score,
        r.traffic_score,
        r.connectivity_score,
        r.infrastructure_score,
        r.lifestyle_score,
        r.environment_score
    );
    println!(
        "Schools {} | Hospitals {} | Metro {}",
        r.schools,
        r.hospitals,
        if r.metro.available { "yes" } else { "no" }
    );
    Ok(())
}

/// Prints an investment analysis.
///
/// # Errors
///
/// Returns an error for invalid amounts or horizons or an unresolvable
/// location.
pub fn invest(
    analyzer: &Analyzer,
    location: &str,
    amount: Option<f64>,
    years: Option<u32>,
    out: Output,
) -> CliResult {
    let analysis = analyzer.investment_analysis(location, amount, years)?;
    if out.json {
        return print_json(&analysis);
    }

    let a = &analysis.analysis;
    println!("Investment analysis: {}", analysis.location);
    println!("Investment:          {}", rupees(a.investment_amount));
    println!("Area purchased:      {:.0} sq ft", a.area_purchased_sqft);
    println!(
        "Rental income:       {}/year ({}/month)",
        rupees(a.rental_yield_amount),
        rupees(a.monthly_rental_income)
    );
    println!("Appreciation:        {}/year", rupees(a.appreciation_amount));
    println!("ROI:                 {:.2}%", a.roi_percentage);
    match a.payback_period_years {
        Some(years) => println!("Payback period:      {years:.1} years"),
        None => println!("Payback period:      n/a (no rental yield)"),
    }
    println!("Risk:                {}", a.risk_level);
    for factor in &a.risk_factors {
        println!("  - {factor}");
    }
    println!("Recommendation:      {}", a.recommendation);
    println!(
        "Market outlook:      {} ({})",
        analysis.market_trends.market_outlook, analysis.market_trends.price_growth_forecast
    );

    println!();
    println!("{:>4} {:>18} {:>16} {:>10}", "YEAR", "VALUE", "TOTAL RETURN", "ROI %");
    for year in &analysis.projection {
        println!(
            "{:>4} {:>18} {:>16} {:>10.2}",
            year.year,
            group_thousands(year.property_value),
            group_thousands(year.total_return),
            year.cumulative_roi_percentage
        );
    }
    Ok(())
}

/// Prints a comparison table.
///
/// # Errors
///
/// Returns an error if fewer than two distinct locations resolve.
pub fn compare(analyzer: &Analyzer, names: &[String], out: Output) -> CliResult {
    let result = analyzer.compare_locations(names)?;
    if out.json {
        return print_json(&result);
    }

    print!("{:<22}", "METRIC");
    for id in &result.locations {
        print!(" {:>24}", id.as_str());
    }
    println!("  WINNER");
    for metric in &result.metrics {
        print!("{:<22}", metric.metric.to_string());
        for id in &result.locations {
            let value = metric.values.get(id).copied().unwrap_or_default();
            print!(" {value:>24.2}");
        }
        println!("  {}", metric.winner);
    }
    println!();
    println!("Overall winner: {}", result.overall_winner);
    for (id, tags) in &result.summary.recommendations {
        if !tags.is_empty() {
            println!("{id}: {}", tags.join("; "));
        }
    }
    Ok(())
}

/// Prints top picks.
///
/// # Errors
///
/// Returns an error for invalid criteria.
pub fn top(analyzer: &Analyzer, criteria: &TopPicksCriteria, out: Output) -> CliResult {
    let result = analyzer.top_picks(criteria)?;
    if out.json {
        return print_json(&result);
    }

    println!(
        "Top picks by {} ({} matched)",
        result.criteria, result.total_found
    );
    for (i, pick) in result.locations.iter().enumerate() {
        println!(
            "{:>2}. {:<28} score {:>6.2}  {}/sq ft",
            i + 1,
            pick.location.as_str(),
            pick.score,
            rupees(pick.price_per_sqft)
        );
        for highlight in &pick.key_highlights {
            println!("      - {highlight}");
        }
    }
    Ok(())
}

/// Prints market trends as JSON.
///
/// # Errors
///
/// Returns an error for an unknown city.
pub fn trends(analyzer: &Analyzer, city: Option<&str>) -> CliResult {
    print_json(&analyzer.market_trends_report(city)?)
}

/// Prints dataset statistics as JSON.
///
/// # Errors
///
/// Returns an error if statistics cannot be computed.
pub fn stats(analyzer: &Analyzer) -> CliResult {
    print_json(&analyzer.statistics()?)
}

/// Writes an analysis report into `dir`.
///
/// # Errors
///
/// Returns an error if the location does not resolve or writing fails.
pub fn export(analyzer: &Analyzer, location: &str, dir: &Path) -> CliResult {
    let report = analyzer.analysis_report(location)?;
    let metadata = &report.report_metadata;
    let file_name = report_file_name(metadata.location.as_str(), metadata.generated_at);
    let path = write_report(dir, &file_name, &report)?;
    println!("Report written to {}", path.display());
    Ok(())
}

/// Prints an AI narrative for a location.
///
/// An unavailable provider is reported but is not an error.
///
/// # Errors
///
/// Returns an error if the location does not resolve or the analysis type
/// is unknown.
pub async fn ai(
    analyzer: &Analyzer,
    location: &str,
    analysis_type: Option<&str>,
    focus: Option<&str>,
    out: Output,
) -> CliResult {
    let record = analyzer.resolve(location)?;
    let metrics = analyzer.derived_metrics(record);

    let prompt = match focus.map(str::trim).filter(|f| !f.is_empty()) {
        Some(focus) => prompt::build_custom_prompt(record, Some(&metrics), focus)?,
        None => {
            let analysis_type = analysis_type
                .map(str::parse::<AnalysisType>)
                .transpose()?
                .unwrap_or_default();
            prompt::build_analysis_prompt_with(record, Some(&metrics), analysis_type)
        }
    };

    let narrator = Narrator::from_env();
    let narrative = match narrator.narrate(&prompt).await {
        Ok(text) => Some(text),
        Err(AiError::Unavailable { reason }) => {
            log::warn!("AI narrative unavailable: {reason}");
            None
        }
        Err(e) => return Err(e.into()),
    };

    if out.json {
        return print_json(&serde_json::json!({
            "location": record.id(),
            "metrics": metrics,
            "aiAnalysis": narrative,
        }));
    }

    println!("{}", record.id());
    println!();
    match narrative {
        Some(text) => println!("{text}"),
        None => println!(
            "AI narrative unavailable. Overall score {:.2}/10, investment score {:.2}/10.",
            metrics.overall_score, metrics.investment_score
        ),
    }
    Ok(())
}
