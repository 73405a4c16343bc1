//! Prompt builders for location analysis.
//!
//! Every builder is a pure function of its inputs; nothing here talks to
//! a provider.

use std::fmt::Write as _;

use realty_analytics_models::DerivedMetrics;
use realty_location_models::LocationRecord;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::AiError;

/// System prompt sent with every request.
pub const SYSTEM_PROMPT: &str = "You are an expert real estate analyst and urban planning \
consultant with extensive knowledge of Indian real estate markets, particularly Gujarat. \
Provide detailed, accurate, and actionable insights.";

/// Sampling temperature for single-location analyses.
pub const ANALYSIS_TEMPERATURE: f32 = 0.7;
/// Sampling temperature for comparisons.
pub const COMPARATIVE_TEMPERATURE: f32 = 0.6;
/// Sampling temperature for market insights.
pub const MARKET_TEMPERATURE: f32 = 0.5;
/// Sampling temperature for investment strategies.
pub const STRATEGY_TEMPERATURE: f32 = 0.6;

/// Markets covered when no city is named.
pub const DEFAULT_MARKETS: &str = "Ahmedabad and Gandhinagar";

/// Focus of a single-location analysis.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AnalysisType {
    /// Broad overview for buyers and investors.
    #[default]
    DetailedAnalysis,
    /// Returns, risks and entry/exit strategy.
    InvestmentFocus,
    /// Schools, safety and family amenities.
    FamilyFocus,
}

impl AnalysisType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::DetailedAnalysis, Self::InvestmentFocus, Self::FamilyFocus]
    }
}

/// Formats an amount with thousands separators, e.g. `6500` as `6,500`.
#[must_use]
pub fn group_thousands(amount: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Bulleted facts about a location, one per line.
#[must_use]
pub fn location_facts(record: &LocationRecord, metrics: Option<&DerivedMetrics>) -> String {
    let mut lines = vec![format!("City: {}", record.city), format!("Area: {}", record.area)];
    #[allow(clippy::cast_precision_loss)]
    let (population, density) = (
        record.population as f64,
        record.population_density as f64,
    );
    if record.population > 0 {
        lines.push(format!("Population: {}", group_thousands(population)));
    }
    if record.population_density > 0 {
        lines.push(format!(
            "Population Density: {} per sq km",
            group_thousands(density)
        ));
    }

    lines.push(format!("Safety Score: {}/10", record.safety_score));
    lines.push(format!(
        "Traffic Score: {}/10 (lower is better)",
        record.traffic_score
    ));
    lines.push(format!(
        "Infrastructure Score: {}/10",
        record.infrastructure_score
    ));
    lines.push(format!("Connectivity Score: {}/10", record.connectivity_score));
    lines.push(format!("Lifestyle Score: {}/10", record.lifestyle_score));
    lines.push(format!("Environment Score: {}/10", record.environment_score));
    lines.push(format!("Schools: {}", record.schools));
    lines.push(format!("Hospitals: {}", record.hospitals));

    if record.metro.available {
        let station = record.metro.station.as_deref().unwrap_or("nearby");
        match record.metro.distance_km {
            Some(km) => lines.push(format!("Metro: Yes, {station} station ({km} km away)")),
            None => lines.push(format!("Metro: Yes, {station} station")),
        }
    } else {
        lines.push("Metro: Not available".to_string());
    }

    lines.push(format!(
        "Average Price per Sq Ft: ₹{}",
        group_thousands(record.avg_price_per_sqft)
    ));
    lines.push(format!("Rental Yield: {}%", record.rental_yield));
    lines.push(format!(
        "Historical Appreciation Rate: {}%",
        record.appreciation_rate
    ));
    lines.push(format!("Future Growth Potential: {}", record.future_growth));

    if let Some(m) = metrics {
        lines.push(format!("Overall Rating: {}/10", m.overall_score));
        lines.push(format!("Investment Score: {}/10", m.investment_score));
        lines.push(format!("Affordability Index: {}/10", m.affordability_index));
    }

    if !record.amenities.malls.is_empty() {
        let malls: Vec<&str> = record.amenities.malls.iter().take(3).map(String::as_str).collect();
        lines.push(format!("Major Malls: {}", malls.join(", ")));
    }
    if record.amenities.restaurants > 0 {
        lines.push(format!("Restaurants: {}+", record.amenities.restaurants));
    }
    if !record.amenities.parks.is_empty() {
        let parks: Vec<&str> = record.amenities.parks.iter().take(2).map(String::as_str).collect();
        lines.push(format!("Parks/Recreation: {}", parks.join(", ")));
    }

    lines
        .iter()
        .map(|l| format!("• {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds a single-location prompt without derived metrics.
#[must_use]
pub fn build_analysis_prompt(record: &LocationRecord, analysis_type: AnalysisType) -> String {
    build_analysis_prompt_with(record, None, analysis_type)
}

/// Builds a single-location prompt, including derived metrics when given.
#[must_use]
pub fn build_analysis_prompt_with(
    record: &LocationRecord,
    metrics: Option<&DerivedMetrics>,
    analysis_type: AnalysisType,
) -> String {
    let location = record.id();
    let facts = location_facts(record, metrics);

    match analysis_type {
        AnalysisType::DetailedAnalysis => format!(
            "As a real estate expert and urban planner, provide a comprehensive analysis of {location}.

Location Data:
{facts}

Please provide:
1. **Location Overview**: Brief description and key characteristics
2. **Strengths Analysis**: Top 3-5 advantages of this location
3. **Areas for Improvement**: 2-3 aspects that could be better
4. **Investment Perspective**:
   - Short-term outlook (1-2 years)
   - Long-term potential (5-10 years)
   - Risk assessment
5. **Target Demographics**: Who would benefit most from living here?
6. **Comparison Context**: How does this compare to similar areas?
7. **Actionable Recommendations**: Specific advice for potential buyers/investors

Provide practical, data-driven insights in a professional yet accessible tone."
        ),
        AnalysisType::InvestmentFocus => {
            let mut data = String::new();
            if let Some(m) = metrics {
                let _ = writeln!(data, "• Investment Score: {}/10", m.investment_score);
            }
            let _ = writeln!(
                data,
                "• Current Price: ₹{}/sq ft",
                group_thousands(record.avg_price_per_sqft)
            );
            let _ = writeln!(data, "• Rental Yield: {}%", record.rental_yield);
            let _ = writeln!(data, "• Appreciation Rate: {}%", record.appreciation_rate);
            let _ = writeln!(data, "• Growth Potential: {}", record.future_growth);
            let _ = writeln!(data, "• Connectivity Score: {}/10", record.connectivity_score);
            format!(
                "As an investment advisor specializing in real estate, analyze {location} for investment potential.

Investment Metrics:
{data}{facts}

Focus on:
1. **ROI Analysis**: Expected returns and timeline
2. **Risk Assessment**: Market risks and mitigation strategies
3. **Growth Drivers**: Factors that will drive property value appreciation
4. **Market Positioning**: How this investment compares to alternatives
5. **Entry Strategy**: Best approach for different investment sizes
6. **Exit Strategy**: When and how to realize gains

Provide specific, actionable investment advice."
            )
        }
        AnalysisType::FamilyFocus => format!(
            "As a family relocation specialist, evaluate {location} for families with children.

Family-Relevant Data:
• Safety Score: {safety}/10
• Number of Schools: {schools}
• Number of Hospitals: {hospitals}
• Traffic Conditions: {traffic}/10 (lower is better)
• Environment Quality: {environment}/10
• Lifestyle Amenities: {lifestyle}/10
{facts}

Address:
1. **Education Quality**: Schools and educational opportunities
2. **Safety & Security**: Crime rates, neighborhood safety measures
3. **Community & Lifestyle**: Family-friendly amenities and activities
4. **Healthcare Access**: Medical facilities and emergency services
5. **Transportation**: Commute options and accessibility
6. **Cost of Living**: Budget considerations for families
7. **Long-term Suitability**: Growing with your family's needs

Provide family-centric recommendations and practical advice.",
            safety = record.safety_score,
            schools = record.schools,
            hospitals = record.hospitals,
            traffic = record.traffic_score,
            environment = record.environment_score,
            lifestyle = record.lifestyle_score,
        ),
    }
}

/// Builds a prompt for a free-text focus area.
///
/// # Errors
///
/// Returns [`AiError::InvalidInput`] if `focus` is blank.
pub fn build_custom_prompt(
    record: &LocationRecord,
    metrics: Option<&DerivedMetrics>,
    focus: &str,
) -> Result<String, AiError> {
    let focus = focus.trim();
    if focus.is_empty() {
        return Err(AiError::InvalidInput {
            message: "custom focus must not be empty".to_string(),
        });
    }
    Ok(format!(
        "As a real estate expert, analyze {} with focus on: {focus}

Location Data:
{}

Please provide comprehensive insights addressing the specified focus area.",
        record.id(),
        location_facts(record, metrics)
    ))
}

/// Builds a comparison prompt for two or more locations.
///
/// # Errors
///
/// Returns [`AiError::InvalidInput`] for fewer than two locations.
pub fn build_comparative_prompt(
    locations: &[(&LocationRecord, &DerivedMetrics)],
) -> Result<String, AiError> {
    if locations.len() < 2 {
        return Err(AiError::InvalidInput {
            message: "at least 2 locations are required for comparison".to_string(),
        });
    }

    let summaries = locations
        .iter()
        .map(|(r, m)| {
            format!(
                "**{}:**
• Safety: {}/10
• Price: ₹{}/sq ft
• Investment Score: {}/10
• Growth Potential: {}
• Schools: {}
• Connectivity: {}/10",
                r.id(),
                r.safety_score,
                group_thousands(r.avg_price_per_sqft),
                m.investment_score,
                r.future_growth,
                r.schools,
                r.connectivity_score
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(format!(
        "As a real estate expert, provide a comprehensive comparison of these {} locations:

{summaries}

Please provide:
1. **Comparative Overview**: Key differences and similarities
2. **Best For Investment**: Which location offers the best investment potential and why
3. **Best For Families**: Which location is most suitable for families with children
4. **Best Value for Money**: Which offers the best balance of features vs. cost
5. **Future Outlook**: Which has the strongest growth prospects
6. **Specific Recommendations**: Who should consider each location and why

Provide detailed reasoning for each recommendation.",
        locations.len()
    ))
}

/// Builds a market insights prompt for one city or the default markets.
#[must_use]
pub fn build_market_insights_prompt(city: Option<&str>) -> String {
    let context = match city.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => format!("{c} real estate market"),
        None => format!("{DEFAULT_MARKETS} real estate markets"),
    };
    format!(
        "As a real estate market analyst, provide current insights about the {context}:

1. **Market Trends**: Current state of the property market
2. **Price Movements**: Recent price trends and predictions
3. **Investment Hotspots**: Areas showing strong growth potential
4. **Buyer Preferences**: What buyers are currently looking for
5. **Infrastructure Impact**: How infrastructure development affects property values
6. **Risk Factors**: Potential challenges and how to mitigate them
7. **Future Outlook**: 2-3 year market predictions

Base your analysis on typical Gujarat real estate patterns and provide actionable insights."
    )
}

/// Investor tier by budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
pub enum BudgetCategory {
    /// Above 50,000,000.
    High,
    /// Above 20,000,000.
    Medium,
    /// Everything else.
    #[serde(rename = "Entry Level")]
    #[strum(serialize = "Entry Level")]
    EntryLevel,
}

impl BudgetCategory {
    /// Tier for a budget.
    #[must_use]
    pub fn from_budget(budget: f64) -> Self {
        if budget > 50_000_000.0 {
            Self::High
        } else if budget > 20_000_000.0 {
            Self::Medium
        } else {
            Self::EntryLevel
        }
    }
}

/// Builds a personalized investment strategy prompt.
///
/// # Errors
///
/// Returns [`AiError::InvalidInput`] for a budget that is not a positive
/// number.
pub fn build_investment_strategy_prompt(budget: f64, goals: &str) -> Result<String, AiError> {
    if !(budget.is_finite() && budget > 0.0) {
        return Err(AiError::InvalidInput {
            message: format!("budget must be a positive number (got {budget})"),
        });
    }
    let goals = match goals.trim() {
        "" => "balanced growth",
        g => g,
    };
    let category = BudgetCategory::from_budget(budget);

    Ok(format!(
        "As an investment advisor, create a personalized real estate investment strategy:

**Investment Profile:**
• Budget: ₹{} ({category} investor)
• Goals: {goals}
• Market Focus: {DEFAULT_MARKETS}

Provide:
1. **Strategy Overview**: Recommended approach for this budget and goals
2. **Area Recommendations**: Which neighborhoods to focus on and why
3. **Property Type Suggestions**: Residential vs commercial considerations
4. **Timeline**: Short-term vs long-term investment approach
5. **Risk Management**: How to minimize investment risks
6. **Portfolio Diversification**: If applicable, how to spread investments
7. **Exit Strategy**: When and how to realize returns
8. **Action Plan**: Specific next steps to take

Provide practical, actionable advice tailored to the Indian real estate market.",
        group_thousands(budget)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use realty_location_models::{Amenities, FutureGrowth, Metro};
    use std::str::FromStr as _;

    fn record() -> LocationRecord {
        LocationRecord {
            location: None,
            city: "Ahmedabad".to_string(),
            area: "Satellite".to_string(),
            population: 185_000,
            population_density: 12_500,
            safety_score: 8.5,
            traffic_score: 6.8,
            connectivity_score: 9.1,
            infrastructure_score: 8.7,
            lifestyle_score: 8.8,
            environment_score: 7.5,
            schools: 18,
            hospitals: 12,
            future_growth: FutureGrowth::High,
            avg_price_per_sqft: 6500.0,
            rental_yield: 3.2,
            appreciation_rate: 8.5,
            metro: Metro {
                available: true,
                station: Some("Shyamal".to_string()),
                distance_km: Some(1.2),
            },
            bus_routes: 12,
            amenities: Amenities {
                malls: vec!["Iscon Mall".to_string()],
                parks: vec!["Vastrapur Lake".to_string()],
                restaurants: 150,
            },
        }
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(6500.0), "6,500");
        assert_eq!(group_thousands(10_000_000.0), "10,000,000");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(-1234.0), "-1,234");
    }

    #[test]
    fn analysis_types_parse_from_snake_case() {
        assert_eq!(
            AnalysisType::from_str("investment_focus").unwrap(),
            AnalysisType::InvestmentFocus
        );
        assert_eq!(AnalysisType::FamilyFocus.to_string(), "family_focus");
        assert!(AnalysisType::from_str("horoscope").is_err());
    }

    #[test]
    fn every_prompt_names_the_location_and_key_facts() {
        let r = record();
        for analysis_type in AnalysisType::all() {
            let prompt = build_analysis_prompt(&r, *analysis_type);
            assert!(prompt.contains("Satellite, Ahmedabad"), "{analysis_type}");
            assert!(prompt.contains("Safety Score: 8.5/10"), "{analysis_type}");
            assert!(prompt.contains("₹6,500"), "{analysis_type}");
        }
        let facts = location_facts(&r, None);
        assert!(facts.contains("Metro: Yes, Shyamal station (1.2 km away)"));
        assert!(facts.contains("Restaurants: 150+"));
    }

    #[test]
    fn focus_specific_sections() {
        let r = record();
        assert!(build_analysis_prompt(&r, AnalysisType::InvestmentFocus).contains("Exit Strategy"));
        assert!(build_analysis_prompt(&r, AnalysisType::FamilyFocus).contains("Number of Schools: 18"));
    }

    #[test]
    fn custom_focus_requires_text() {
        let r = record();
        assert!(build_custom_prompt(&r, None, "   ").is_err());
        let prompt = build_custom_prompt(&r, None, "noise levels").unwrap();
        assert!(prompt.contains("with focus on: noise levels"));
    }

    #[test]
    fn budget_categories() {
        assert_eq!(BudgetCategory::from_budget(60_000_000.0), BudgetCategory::High);
        assert_eq!(BudgetCategory::from_budget(30_000_000.0), BudgetCategory::Medium);
        assert_eq!(BudgetCategory::from_budget(20_000_000.0), BudgetCategory::EntryLevel);

        let prompt = build_investment_strategy_prompt(25_000_000.0, "").unwrap();
        assert!(prompt.contains("₹25,000,000 (Medium investor)"));
        assert!(prompt.contains("Goals: balanced growth"));
        assert!(build_investment_strategy_prompt(-1.0, "x").is_err());
    }

    #[test]
    fn market_prompt_defaults_to_both_cities() {
        assert!(build_market_insights_prompt(None).contains("Ahmedabad and Gandhinagar"));
        assert!(build_market_insights_prompt(Some("Gandhinagar")).contains("Gandhinagar real estate market"));
    }
}
