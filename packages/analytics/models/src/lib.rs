#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Input and output types of the neighborhood analytics engine.
//!
//! Everything here is plain data: the engine computes these values on
//! every request and never stores them, so they only need to serialize
//! cleanly for the API, the CLI and exported reports.

pub mod config;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use realty_location_models::{LocationId, LocationRecord};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use config::{
    AnalysisDefaults, CategoryWeights, InvestmentScoreConfig, RecommendationThresholds,
    RiskThresholds, ScoringConfig,
};

/// Categorical investment risk.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RiskLevel {
    /// Few or no risk factors.
    Low,
    /// Some risk factors.
    Medium,
    /// Many risk factors.
    High,
}

/// Investment recommendation derived from ROI and risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
pub enum Recommendation {
    /// Strong returns at low risk.
    #[serde(rename = "Highly Recommended")]
    #[strum(serialize = "Highly Recommended")]
    HighlyRecommended,
    /// Good returns at acceptable risk.
    #[serde(rename = "Recommended")]
    #[strum(serialize = "Recommended")]
    Recommended,
    /// Moderate returns.
    #[serde(rename = "Consider with Caution")]
    #[strum(serialize = "Consider with Caution")]
    ConsiderWithCaution,
    /// Weak returns.
    #[serde(rename = "Not Recommended")]
    #[strum(serialize = "Not Recommended")]
    NotRecommended,
}

/// Price bracket of a location relative to the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
pub enum PriceCategory {
    /// Bottom quartile.
    #[serde(rename = "Budget-friendly")]
    #[strum(serialize = "Budget-friendly")]
    BudgetFriendly,
    /// Second quartile.
    Moderate,
    /// Third quartile.
    Premium,
    /// Top quartile.
    Luxury,
}

/// Where a location's price sits in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRank {
    /// Number of locations priced at or below this one.
    pub rank: usize,
    /// Number of locations in the dataset.
    pub total_locations: usize,
    /// `rank / total * 100`, one decimal.
    pub percentile: f64,
    /// Price bracket.
    pub category: PriceCategory,
}

/// Metrics derived from a record on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Weighted average of the six category scores, `[0, 10]`.
    pub overall_score: f64,
    /// Livability blend of safety, infrastructure, lifestyle, environment
    /// and traffic.
    pub livability_score: f64,
    /// Blend of appreciation, yield and risk, `[0, 10]`.
    pub investment_score: f64,
    /// Investment attractiveness blend.
    pub investment_attractiveness: f64,
    /// Inverse price position in the dataset, `[0, 10]`.
    pub affordability_index: f64,
    /// Risk bucket.
    pub risk_level: RiskLevel,
    /// Price position.
    pub price_rank: PriceRank,
}

/// A record together with its derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetail {
    /// Identifier.
    pub location: LocationId,
    /// The stored record.
    pub record: LocationRecord,
    /// Derived metrics.
    pub metrics: DerivedMetrics,
}

/// Outcome of the risk factor checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Sum of triggered factor points.
    pub points: u32,
    /// Bucket for `points`.
    pub level: RiskLevel,
    /// Human-readable triggered factors.
    pub factors: Vec<String>,
}

/// Core return figures for an investment amount in one location.
///
/// Every currency amount is linear in the principal; percentages are
/// independent of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentReturns {
    /// Amount invested.
    pub investment_amount: f64,
    /// Floor area the principal buys at the average price.
    pub area_purchased_sqft: f64,
    /// Annual rental income.
    pub rental_yield_amount: f64,
    /// Monthly rental income.
    pub monthly_rental_income: f64,
    /// Annual price appreciation.
    pub appreciation_amount: f64,
    /// Rental income plus appreciation for one year.
    pub total_annual_return: f64,
    /// `total_annual_return / principal * 100`.
    pub roi_percentage: f64,
    /// `principal / annual rental income`; absent when yield is zero.
    pub payback_period_years: Option<f64>,
    /// Risk bucket.
    pub risk_level: RiskLevel,
    /// Triggered risk factors.
    pub risk_factors: Vec<String>,
    /// Recommendation for this ROI and risk.
    pub recommendation: Recommendation,
}

/// One year of an investment projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionYear {
    /// Year number, starting at 1.
    pub year: u32,
    /// Property value at the end of the year (appreciation compounded).
    pub property_value: f64,
    /// Rental income earned during the year.
    pub rental_income: f64,
    /// Rental income earned so far.
    pub cumulative_rental_income: f64,
    /// Capital gain plus cumulative rent.
    pub total_return: f64,
    /// `total_return / principal * 100`.
    pub cumulative_roi_percentage: f64,
}

/// Qualitative market outlook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
pub enum MarketOutlook {
    /// Trend score 6 and above.
    #[serde(rename = "Very Positive")]
    #[strum(serialize = "Very Positive")]
    VeryPositive,
    /// Trend score 4-5.
    Positive,
    /// Trend score 2-3.
    Stable,
    /// Trend score below 2.
    Uncertain,
}

/// Market trend assessment for a single location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrends {
    /// Outlook bucket.
    pub market_outlook: MarketOutlook,
    /// Three-year price growth forecast.
    pub price_growth_forecast: String,
    /// Trend points from growth, infrastructure and connectivity.
    pub trend_score: u32,
    /// Factors driving growth.
    pub key_drivers: Vec<String>,
}

/// A similarly priced alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableLocation {
    /// Identifier.
    pub location: LocationId,
    /// Average price per square foot.
    pub price_per_sqft: f64,
    /// Rental yield percent.
    pub rental_yield: f64,
    /// Appreciation rate percent.
    pub appreciation_rate: f64,
    /// Derived investment score.
    pub investment_score: f64,
}

/// Full investment analysis for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentAnalysis {
    /// Identifier.
    pub location: LocationId,
    /// Return figures.
    pub analysis: InvestmentReturns,
    /// Year-by-year projection.
    pub projection: Vec<ProjectionYear>,
    /// Market trends.
    pub market_trends: MarketTrends,
    /// Similarly priced alternatives.
    pub comparable_locations: Vec<ComparableLocation>,
}

/// Metrics compared between locations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComparisonMetric {
    /// Safety score.
    SafetyScore,
    /// Traffic congestion (lower wins).
    TrafficScore,
    /// Connectivity score.
    ConnectivityScore,
    /// Infrastructure score.
    InfrastructureScore,
    /// Lifestyle score.
    LifestyleScore,
    /// Environment score.
    EnvironmentScore,
    /// School count.
    Schools,
    /// Hospital count.
    Hospitals,
    /// Price per square foot (lower wins).
    AvgPricePerSqft,
    /// Rental yield.
    RentalYield,
    /// Appreciation rate.
    AppreciationRate,
    /// Derived investment score.
    InvestmentScore,
    /// Derived overall score.
    OverallScore,
}

impl ComparisonMetric {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::SafetyScore,
            Self::TrafficScore,
            Self::ConnectivityScore,
            Self::InfrastructureScore,
            Self::LifestyleScore,
            Self::EnvironmentScore,
            Self::Schools,
            Self::Hospitals,
            Self::AvgPricePerSqft,
            Self::RentalYield,
            Self::AppreciationRate,
            Self::InvestmentScore,
            Self::OverallScore,
        ]
    }

    /// Whether a larger value is better for this metric.
    #[must_use]
    pub const fn higher_is_better(self) -> bool {
        !matches!(self, Self::TrafficScore | Self::AvgPricePerSqft)
    }
}

/// Comparison of a single metric across locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    /// Metric compared.
    pub metric: ComparisonMetric,
    /// Value per location.
    pub values: BTreeMap<LocationId, f64>,
    /// Location with the best value.
    pub winner: LocationId,
    /// The best value.
    pub best_value: f64,
    /// `value - best_value` per location.
    pub deltas: BTreeMap<LocationId, f64>,
    /// Difference between the largest and smallest value.
    pub spread: f64,
}

/// Headline winners and per-location tags of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    /// Winner on safety.
    pub best_for_safety: LocationId,
    /// Winner on appreciation.
    pub best_for_investment: LocationId,
    /// Winner on price.
    pub most_affordable: LocationId,
    /// Winner on connectivity.
    pub best_connectivity: LocationId,
    /// Winner on lifestyle.
    pub best_lifestyle: LocationId,
    /// Suitability tags per location.
    pub recommendations: BTreeMap<LocationId, Vec<String>>,
}

/// Result of comparing two or more locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Compared locations, sorted by identifier.
    pub locations: Vec<LocationId>,
    /// Per-metric comparison table.
    pub metrics: Vec<MetricComparison>,
    /// Location with the highest overall score.
    pub overall_winner: LocationId,
    /// Headline summary.
    pub summary: ComparisonSummary,
}

/// Score used to rank top picks.
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
pub enum RankCriterion {
    /// Overall score.
    #[default]
    Overall,
    /// Investment attractiveness.
    Investment,
    /// Safety score.
    Safety,
    /// Affordability index.
    Affordability,
    /// Lifestyle score.
    Lifestyle,
    /// Connectivity score.
    Connectivity,
    /// Livability score.
    Livability,
}

impl RankCriterion {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Overall,
            Self::Investment,
            Self::Safety,
            Self::Affordability,
            Self::Lifestyle,
            Self::Connectivity,
            Self::Livability,
        ]
    }
}

/// Filters and limits for top picks. All supplied filters must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPicksCriteria {
    /// Maximum price per square foot.
    #[serde(default)]
    pub budget_max: Option<f64>,
    /// City (case-insensitive).
    #[serde(default)]
    pub city: Option<String>,
    /// Minimum overall score.
    #[serde(default)]
    pub min_overall_score: Option<f64>,
    /// Maximum number of results.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Ranking score.
    #[serde(default)]
    pub rank_by: RankCriterion,
}

/// A single top pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPick {
    /// Identifier.
    pub location: LocationId,
    /// City.
    pub city: String,
    /// Value of the ranking score.
    pub score: f64,
    /// Overall score.
    pub overall_score: f64,
    /// Average price per square foot.
    pub price_per_sqft: f64,
    /// Up to three highlights.
    pub key_highlights: Vec<String>,
}

/// Ranked top picks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPicksResult {
    /// Ranking score used.
    pub criteria: RankCriterion,
    /// Locations passing the filters before the limit.
    pub total_found: usize,
    /// Picks, best first.
    pub locations: Vec<TopPick>,
}

impl TopPicksResult {
    /// Identifiers of the picks, best first.
    #[must_use]
    pub fn identifiers(&self) -> Vec<LocationId> {
        self.locations.iter().map(|p| p.location.clone()).collect()
    }
}

/// Sort key for advanced search.
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
#[strum(serialize_all = "snake_case")]
pub enum SearchSortKey {
    /// Derived investment score.
    #[default]
    InvestmentScore,
    /// Derived overall score.
    OverallScore,
    /// Safety score.
    SafetyScore,
    /// Connectivity score.
    ConnectivityScore,
    /// Rental yield.
    RentalYield,
    /// Appreciation rate.
    AppreciationRate,
    /// School count.
    Schools,
}

/// Advanced search filters. All supplied filters must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Minimum safety score.
    pub min_safety_score: Option<f64>,
    /// Maximum traffic congestion.
    pub max_traffic_score: Option<f64>,
    /// Minimum school count.
    pub min_schools: Option<u32>,
    /// Minimum hospital count.
    pub min_hospitals: Option<u32>,
    /// Maximum price per square foot.
    pub max_price_per_sqft: Option<f64>,
    /// Minimum rental yield.
    pub min_rental_yield: Option<f64>,
    /// Required future growth; `"Any"` or absent disables the filter.
    pub future_growth: Option<String>,
    /// City (case-insensitive).
    pub city: Option<String>,
    /// Only locations with metro access.
    pub metro_required: bool,
    /// Sort key, descending.
    pub sort_by: SearchSortKey,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

/// Advanced search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Matches before the limit.
    pub total_found: usize,
    /// Filters that were applied.
    pub filters_applied: SearchFilters,
    /// Matching locations, sorted.
    pub results: Vec<LocationDetail>,
}

/// A location paired with one value, for "top 3" style listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredLocation {
    /// Identifier.
    pub location: LocationId,
    /// The value ranked on.
    pub value: f64,
}

/// Lowest and highest value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Minimum.
    pub min: f64,
    /// Maximum.
    pub max: f64,
}

/// Headline market figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    /// Locations considered.
    pub total_locations: usize,
    /// Mean price per square foot.
    pub avg_price_per_sqft: f64,
    /// Price range.
    pub price_range: ValueRange,
    /// Mean safety score.
    pub avg_safety_score: f64,
    /// Mean rental yield.
    pub avg_rental_yield: f64,
}

/// Breakdown of expected growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthAnalysis {
    /// Locations with high growth.
    pub high_growth_areas: usize,
    /// Locations with medium growth.
    pub medium_growth_areas: usize,
    /// Locations with low growth.
    pub low_growth_areas: usize,
    /// Mean appreciation rate.
    pub avg_appreciation_rate: f64,
}

/// Market trends across the dataset or one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrendsReport {
    /// City filter, if any.
    pub city: Option<String>,
    /// Headline figures.
    pub market_overview: MarketOverview,
    /// Growth breakdown.
    pub growth_analysis: GrowthAnalysis,
    /// Top three by investment score.
    pub investment_hotspots: Vec<ScoredLocation>,
    /// Three cheapest by price per square foot.
    pub most_affordable: Vec<ScoredLocation>,
    /// Top three by safety score.
    pub safest_areas: Vec<ScoredLocation>,
}

/// Dataset-wide counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataOverview {
    /// Number of locations.
    pub total_locations: usize,
    /// Number of distinct cities.
    pub cities: usize,
    /// Locations per city.
    pub city_breakdown: BTreeMap<String, usize>,
}

/// Price statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStatistics {
    /// Mean price.
    pub average_price_per_sqft: f64,
    /// Median price.
    pub median_price_per_sqft: f64,
    /// Sample standard deviation.
    pub price_std_dev: f64,
    /// Highest priced location.
    pub most_expensive: LocationId,
    /// Lowest priced location.
    pub most_affordable: LocationId,
}

/// Count of locations in each safety band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyDistribution {
    /// Score 9 and above.
    pub excellent_9_plus: usize,
    /// Score 7 up to 9.
    pub good_7_to_9: usize,
    /// Score 5 up to 7.
    pub average_5_to_7: usize,
    /// Score below 5.
    pub below_average_less_5: usize,
}

/// Safety statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyStatistics {
    /// Mean safety score.
    pub average_safety_score: f64,
    /// Safest location.
    pub safest_location: LocationId,
    /// Band counts.
    pub safety_distribution: SafetyDistribution,
}

/// Investment statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentStatistics {
    /// Mean rental yield.
    pub average_rental_yield: f64,
    /// Mean appreciation rate.
    pub average_appreciation_rate: f64,
    /// Location with the best yield.
    pub best_rental_yield: LocationId,
    /// Location with the best appreciation.
    pub best_appreciation: LocationId,
}

/// Infrastructure statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureStatistics {
    /// Locations with metro access.
    pub locations_with_metro: usize,
    /// Mean school count, one decimal.
    pub average_schools: f64,
    /// Mean hospital count, one decimal.
    pub average_hospitals: f64,
    /// Location with the most schools.
    pub most_schools: LocationId,
    /// Location with the most hospitals.
    pub most_hospitals: LocationId,
}

/// Dataset statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Counts.
    pub data_overview: DataOverview,
    /// Prices.
    pub price_statistics: PriceStatistics,
    /// Safety.
    pub safety_statistics: SafetyStatistics,
    /// Investment.
    pub investment_statistics: InvestmentStatistics,
    /// Infrastructure.
    pub infrastructure: InfrastructureStatistics,
}

/// Percentile of a location within its city on three axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileRankings {
    /// Price percentile.
    pub price: f64,
    /// Safety percentile.
    pub safety: f64,
    /// Investment attractiveness percentile.
    pub investment: f64,
}

/// Position of a location within its city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPosition {
    /// City.
    pub city: String,
    /// Locations in the city.
    pub total_locations_in_city: usize,
    /// `"rank/total"` by price.
    pub price_rank: String,
    /// `"rank/total"` by safety.
    pub safety_rank: String,
    /// `"rank/total"` by investment attractiveness.
    pub investment_rank: String,
    /// Percentiles.
    pub percentile_rankings: PercentileRankings,
}

/// Narrative recommendations grouped by audience.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedRecommendations {
    /// Who the location suits.
    pub target_demographics: Vec<String>,
    /// Suggested investment strategies.
    pub investment_strategy: Vec<String>,
    /// Lifestyle advantages.
    pub lifestyle_benefits: Vec<String>,
    /// Things to watch out for.
    pub potential_concerns: Vec<String>,
}

/// Report metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Location the report covers.
    pub location: LocationId,
    /// Generation timestamp.
    pub generated_at: DateTime<Utc>,
    /// Report format version.
    pub report_version: String,
}

/// Comprehensive analysis report for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Metadata.
    pub report_metadata: ReportMetadata,
    /// Record and derived metrics.
    pub location_overview: LocationDetail,
    /// Investment analysis at the default principal.
    pub investment_analysis: InvestmentAnalysis,
    /// Position within the city.
    pub market_position: MarketPosition,
    /// Recommendations.
    pub recommendations: DetailedRecommendations,
}
