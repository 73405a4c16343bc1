#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the neighborhood analysis server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the engine types to allow independent evolution of the API
//! contract; engine results that are already API-shaped are returned
//! as-is.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use realty_analytics_models::{ComparisonResult, DerivedMetrics, LocationDetail};
use realty_location_models::LocationId;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `"healthy"` when the server answers.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Response time.
    pub timestamp: DateTime<Utc>,
    /// Number of records in the table.
    pub locations_loaded: usize,
    /// Whether an AI provider is configured.
    pub ai_available: bool,
}

/// One row of the location list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocationSummary {
    /// Identifier.
    pub location: LocationId,
    /// City.
    pub city: String,
    /// Area.
    pub area: String,
    /// Average price per square foot.
    pub price_per_sqft: f64,
    /// Safety score.
    pub safety_score: f64,
    /// Derived overall score.
    pub overall_score: f64,
    /// Derived investment score.
    pub investment_score: f64,
}

/// Response of `GET /api/locations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocationList {
    /// Number of locations.
    pub total_locations: usize,
    /// Distinct cities, sorted.
    pub cities: Vec<String>,
    /// Locations sorted by city then area.
    pub locations: Vec<ApiLocationSummary>,
}

/// Query parameters carrying a location name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationQueryParams {
    /// Identifier or free-text name.
    pub name: Option<String>,
}

/// Query parameters carrying an optional city.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityQueryParams {
    /// City name.
    pub city: Option<String>,
}

/// Body of `POST /api/investment-analysis`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentAnalysisRequest {
    /// Identifier or free-text name.
    #[serde(default)]
    pub location: String,
    /// Principal; the configured default when absent.
    #[serde(default, alias = "investment_amount")]
    pub investment_amount: Option<f64>,
    /// Projection horizon in years.
    #[serde(default, alias = "horizon_years")]
    pub horizon_years: Option<u32>,
}

/// Body of `POST /api/compare` and `POST /api/ai/compare`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompareRequest {
    /// Names of the locations to compare.
    #[serde(default)]
    pub locations: Vec<String>,
}

/// Body of `POST /api/ai-analysis`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysisRequest {
    /// Identifier or free-text name.
    #[serde(default)]
    pub location: String,
    /// `detailed_analysis`, `investment_focus` or `family_focus`.
    #[serde(default, alias = "analysis_type")]
    pub analysis_type: Option<String>,
    /// Free-text focus; overrides `analysis_type` when present.
    #[serde(default, alias = "custom_focus")]
    pub custom_focus: Option<String>,
}

/// Response of `POST /api/ai-analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAiAnalysis {
    /// Identifier.
    pub location: LocationId,
    /// Analysis type or `custom`.
    pub analysis_type: String,
    /// Narrative text; `null` when the provider is unavailable.
    pub ai_analysis: Option<String>,
    /// Why the narrative is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
    /// Derived metrics of the location.
    pub metrics: DerivedMetrics,
    /// Response time.
    pub generated_at: DateTime<Utc>,
}

/// Response of `POST /api/ai/compare`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAiComparison {
    /// Numeric comparison.
    pub comparison: ComparisonResult,
    /// Narrative text; `null` when the provider is unavailable.
    pub ai_analysis: Option<String>,
    /// Why the narrative is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
    /// Response time.
    pub generated_at: DateTime<Utc>,
}

/// Response of `GET /api/ai/market-insights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAiMarketInsights {
    /// City the insights cover, if restricted.
    pub city: Option<String>,
    /// Narrative text; `null` when the provider is unavailable.
    pub ai_analysis: Option<String>,
    /// Why the narrative is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
    /// Response time.
    pub generated_at: DateTime<Utc>,
}

/// Body of `POST /api/ai/investment-strategy`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InvestmentStrategyRequest {
    /// Total budget.
    #[serde(default)]
    pub budget: Option<f64>,
    /// Free-text goals.
    #[serde(default)]
    pub goals: Option<String>,
}

/// Response of `POST /api/ai/investment-strategy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAiInvestmentStrategy {
    /// Total budget.
    pub budget: f64,
    /// `High`, `Medium` or `Entry Level`.
    pub budget_category: String,
    /// Goals as used in the prompt.
    pub goals: String,
    /// Narrative text; `null` when the provider is unavailable.
    pub ai_analysis: Option<String>,
    /// Why the narrative is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
    /// Response time.
    pub generated_at: DateTime<Utc>,
}

/// Body of `POST /api/export-report`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExportReportRequest {
    /// Identifier or free-text name.
    #[serde(default)]
    pub location: String,
}

/// Response of `POST /api/export-report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiExportReport {
    /// Identifier.
    pub location: LocationId,
    /// File name inside the reports directory.
    pub filename: String,
    /// Path to fetch the report from.
    pub download_url: String,
    /// Report creation time.
    pub generated_at: DateTime<Utc>,
}

/// Response of `POST /api/cache/clear`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCacheCleared {
    /// Human-readable confirmation.
    pub message: String,
    /// Entries dropped.
    pub entries_removed: usize,
}

/// Response of `GET /api/docs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDocs {
    /// API version.
    pub version: String,
    /// Title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// `"METHOD /path"` to description.
    pub endpoints: BTreeMap<String, String>,
    /// Limit name to description.
    pub rate_limits: BTreeMap<String, String>,
}

/// Full location response of `GET /api/location`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocation {
    /// Record and derived metrics.
    #[serde(flatten)]
    pub detail: LocationDetail,
    /// Response time.
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn investment_request_accepts_both_casings() {
        let camel: InvestmentAnalysisRequest =
            serde_json::from_str(r#"{"location":"Satellite","investmentAmount":5000000}"#).unwrap();
        let snake: InvestmentAnalysisRequest =
            serde_json::from_str(r#"{"location":"Satellite","investment_amount":5000000}"#)
                .unwrap();
        assert_eq!(camel.investment_amount, Some(5_000_000.0));
        assert_eq!(snake.investment_amount, Some(5_000_000.0));
        assert_eq!(camel.horizon_years, None);
    }

    #[test]
    fn missing_fields_default() {
        let req: CompareRequest = serde_json::from_str("{}").unwrap();
        assert!(req.locations.is_empty());
        let req: AiAnalysisRequest = serde_json::from_str(r#"{"location":"x"}"#).unwrap();
        assert!(req.analysis_type.is_none());
    }
}
