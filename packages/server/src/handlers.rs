//! HTTP handler functions for the neighborhood analysis API.

use std::collections::BTreeMap;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use chrono::Utc;
use realty_ai::{
    AiError,
    prompt::{
        self, AnalysisType, BudgetCategory, COMPARATIVE_TEMPERATURE, MARKET_TEMPERATURE,
        STRATEGY_TEMPERATURE,
    },
};
use realty_analytics::{
    AnalyticsError,
    report::{is_safe_report_name, report_file_name, write_report},
};
use realty_analytics_models::{ComparisonResult, SearchFilters, TopPicksCriteria};
use realty_cache::CacheKey;
use realty_location_models::LocationId;
use realty_server_models::{
    AiAnalysisRequest, ApiAiAnalysis, ApiAiComparison, ApiAiInvestmentStrategy,
    ApiAiMarketInsights, ApiCacheCleared, ApiDocs, ApiExportReport, ApiHealth, ApiLocation,
    ApiLocationList, ApiLocationSummary, CityQueryParams, CompareRequest, ExportReportRequest,
    InvestmentAnalysisRequest, InvestmentStrategyRequest, LocationQueryParams,
};

use crate::{
    AppState,
    rate_limit::{Exceeded, RateLimiter},
};

/// Most locations a single comparison may name.
pub const MAX_COMPARISON_SIZE: usize = 5;

const API_VERSION: &str = env!("CARGO_PKG_VERSION");

fn error_body(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "error": message.into() })
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(error_body(message))
}

/// Maps an engine error onto its HTTP status.
fn analytics_error(context: &str, err: &AnalyticsError) -> HttpResponse {
    match err {
        AnalyticsError::NotFound { .. } => HttpResponse::NotFound().json(error_body(err.to_string())),
        AnalyticsError::Ambiguous { candidates, .. } => {
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": err.to_string(),
                "candidates": candidates,
            }))
        }
        AnalyticsError::InvalidInput { .. } => bad_request(err.to_string()),
        _ => {
            log::error!("Failed to {context}: {err}");
            HttpResponse::InternalServerError().json(error_body(format!("Failed to {context}")))
        }
    }
}

fn ai_error(err: &AiError) -> HttpResponse {
    match err {
        AiError::InvalidInput { .. } => bad_request(err.to_string()),
        _ => {
            log::error!("AI request failed: {err}");
            HttpResponse::InternalServerError().json(error_body("AI request failed"))
        }
    }
}

fn client_key(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

fn limit(limiter: &RateLimiter, req: &HttpRequest) -> Result<(), HttpResponse> {
    limiter.check(&client_key(req)).map_err(|Exceeded { limit, retry_after }| {
        HttpResponse::TooManyRequests()
            .insert_header((header::RETRY_AFTER, retry_after.as_secs().to_string()))
            .json(serde_json::json!({
                "error": format!("Rate limit exceeded: {limit} requests per hour"),
                "retryAfterSecs": retry_after.as_secs(),
            }))
    })
}

fn required(value: &str, what: &str) -> Result<String, HttpResponse> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(bad_request(format!("{what} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

fn to_response<T: serde::Serialize>(value: &T) -> HttpResponse {
    HttpResponse::Ok().json(value)
}

/// Runs `prompt` through the narrator, caching successful narratives
/// under `key`. Returns the narrative or the reason it is missing.
async fn narrate_cached(
    state: &AppState,
    key: &CacheKey,
    prompt: &str,
    temperature: f32,
) -> (Option<String>, Option<String>) {
    let result = state
        .cache
        .get_or_try_insert_with(key, || async {
            state
                .narrator
                .narrate_with(prompt, temperature)
                .await
                .map(serde_json::Value::String)
        })
        .await;

    match result {
        Ok(value) => (value.as_str().map(str::to_string), None),
        Err(e) => (None, Some(e.to_string())),
    }
}

/// Comparison for `names`, served from the cache when the same set of
/// locations was compared recently. Concurrent requests for the same set
/// share one computation, including its error.
async fn cached_comparison(
    state: &AppState,
    names: &[String],
) -> Result<ComparisonResult, Arc<AnalyticsError>> {
    let ids = names
        .iter()
        .map(|n| state.analyzer.resolve(n).map(|r| r.id()))
        .collect::<Result<Vec<LocationId>, _>>()?;
    let key = CacheKey::new("compare").with_identifiers(ids.iter().map(LocationId::as_str));

    let value = state
        .cache
        .get_or_try_insert_with(&key, || async {
            let result = state.analyzer.compare_locations(names)?;
            Ok::<_, AnalyticsError>(serde_json::to_value(result)?)
        })
        .await?;
    serde_json::from_value(value).map_err(|e| Arc::new(AnalyticsError::from(e)))
}

fn comparison_names(body: &CompareRequest) -> Result<Vec<String>, HttpResponse> {
    if body.locations.len() < 2 {
        return Err(bad_request("At least 2 locations are required for comparison"));
    }
    if body.locations.len() > MAX_COMPARISON_SIZE {
        return Err(bad_request(format!(
            "At most {MAX_COMPARISON_SIZE} locations can be compared"
        )));
    }
    Ok(body.locations.iter().map(|n| n.trim().to_string()).collect())
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        status: "healthy".to_string(),
        version: API_VERSION.to_string(),
        timestamp: Utc::now(),
        locations_loaded: state.analyzer.dataset().len(),
        ai_available: state.narrator.is_available(),
    })
}

/// `GET /api/docs`
pub async fn docs() -> HttpResponse {
    let endpoints = [
        ("GET /api/health", "Health check"),
        ("GET /api/docs", "This document"),
        ("GET /api/locations", "List all locations"),
        ("GET /api/location?name=<location>", "Location details and derived metrics"),
        ("POST /api/investment-analysis", "Investment analysis for a location"),
        ("POST /api/compare", "Compare 2 to 5 locations"),
        ("GET|POST /api/top-picks", "Top locations by a ranking criterion"),
        ("GET /api/market-trends?city=<city>", "Market trends"),
        ("POST /api/search", "Advanced search with filters"),
        ("GET /api/statistics", "Dataset statistics"),
        ("POST /api/ai-analysis", "AI narrative for a location"),
        ("POST /api/ai/compare", "AI narrative comparing locations"),
        ("GET /api/ai/market-insights?city=<city>", "AI market insights"),
        ("POST /api/ai/investment-strategy", "AI investment strategy for a budget"),
        ("GET /api/ai/stats", "AI provider usage"),
        ("POST /api/export-report", "Export a full analysis report"),
        ("GET /api/download-report/<filename>", "Download an exported report"),
        ("POST /api/cache/clear", "Clear the response cache"),
        ("GET /api/cache/stats", "Response cache statistics"),
    ];
    let rate_limits = [
        ("default", "100 requests/hour"),
        ("ai", "20 requests/hour"),
        ("export_report", "10 requests/hour"),
    ];

    HttpResponse::Ok().json(ApiDocs {
        version: API_VERSION.to_string(),
        title: "Neighborhood Analysis API".to_string(),
        description: "Real estate neighborhood analysis for Ahmedabad and Gandhinagar".to_string(),
        endpoints: endpoints
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<BTreeMap<_, _>>(),
        rate_limits: rate_limits
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<BTreeMap<_, _>>(),
    })
}

/// `GET /api/locations`
pub async fn locations(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.default, &req) {
        return resp;
    }

    let dataset = state.analyzer.dataset();
    let mut locations: Vec<ApiLocationSummary> = dataset
        .iter()
        .map(|r| {
            let metrics = state.analyzer.derived_metrics(r);
            ApiLocationSummary {
                location: r.id(),
                city: r.city.clone(),
                area: r.area.clone(),
                price_per_sqft: r.avg_price_per_sqft,
                safety_score: r.safety_score,
                overall_score: metrics.overall_score,
                investment_score: metrics.investment_score,
            }
        })
        .collect();
    locations.sort_by(|a, b| a.city.cmp(&b.city).then_with(|| a.area.cmp(&b.area)));

    HttpResponse::Ok().json(ApiLocationList {
        total_locations: locations.len(),
        cities: dataset.cities(),
        locations,
    })
}

/// `GET /api/location?name=`
pub async fn location(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<LocationQueryParams>,
) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.default, &req) {
        return resp;
    }
    let name = match required(params.name.as_deref().unwrap_or_default(), "Location name") {
        Ok(name) => name,
        Err(resp) => return resp,
    };

    match state.analyzer.location_detail(&name) {
        Ok(detail) => to_response(&ApiLocation {
            detail,
            last_updated: Utc::now(),
        }),
        Err(e) => analytics_error("look up location", &e),
    }
}

/// `POST /api/investment-analysis`
pub async fn investment_analysis(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<InvestmentAnalysisRequest>,
) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.default, &req) {
        return resp;
    }
    let location = match required(&body.location, "Location") {
        Ok(location) => location,
        Err(resp) => return resp,
    };

    match state
        .analyzer
        .investment_analysis(&location, body.investment_amount, body.horizon_years)
    {
        Ok(analysis) => to_response(&analysis),
        Err(e) => analytics_error("analyze investment", &e),
    }
}

/// `POST /api/compare`
pub async fn compare(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CompareRequest>,
) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.default, &req) {
        return resp;
    }
    let names = match comparison_names(&body) {
        Ok(names) => names,
        Err(resp) => return resp,
    };

    match cached_comparison(&state, &names).await {
        Ok(result) => to_response(&result),
        Err(e) => analytics_error("compare locations", &e),
    }
}

fn top_picks(state: &AppState, req: &HttpRequest, criteria: &TopPicksCriteria) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.default, req) {
        return resp;
    }
    match state.analyzer.top_picks(criteria) {
        Ok(result) => to_response(&result),
        Err(e) => analytics_error("rank top picks", &e),
    }
}

/// `GET /api/top-picks`
pub async fn top_picks_query(
    state: web::Data<AppState>,
    req: HttpRequest,
    criteria: web::Query<TopPicksCriteria>,
) -> HttpResponse {
    top_picks(&state, &req, &criteria)
}

/// `POST /api/top-picks`
pub async fn top_picks_body(
    state: web::Data<AppState>,
    req: HttpRequest,
    criteria: web::Json<TopPicksCriteria>,
) -> HttpResponse {
    top_picks(&state, &req, &criteria)
}

/// `GET /api/market-trends?city=`
pub async fn market_trends(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<CityQueryParams>,
) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.default, &req) {
        return resp;
    }
    match state.analyzer.market_trends_report(params.city.as_deref()) {
        Ok(report) => to_response(&report),
        Err(e) => analytics_error("analyze market trends", &e),
    }
}

/// `POST /api/search`
pub async fn search(
    state: web::Data<AppState>,
    req: HttpRequest,
    filters: web::Json<SearchFilters>,
) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.default, &req) {
        return resp;
    }
    match state.analyzer.advanced_search(&filters) {
        Ok(result) => to_response(&result),
        Err(e) => analytics_error("search locations", &e),
    }
}

/// `GET /api/statistics`
pub async fn statistics(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.default, &req) {
        return resp;
    }
    let key = CacheKey::new("statistics");
    let result = state
        .cache
        .get_or_try_insert_with(&key, || async {
            let stats = state.analyzer.statistics()?;
            Ok::<_, AnalyticsError>(serde_json::to_value(stats)?)
        })
        .await;

    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => analytics_error("compute statistics", &e),
    }
}

/// `POST /api/ai-analysis`
pub async fn ai_analysis(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<AiAnalysisRequest>,
) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.ai, &req) {
        return resp;
    }
    let location = match required(&body.location, "Location name") {
        Ok(location) => location,
        Err(resp) => return resp,
    };
    let record = match state.analyzer.resolve(&location) {
        Ok(record) => record,
        Err(e) => return analytics_error("look up location", &e),
    };
    let metrics = state.analyzer.derived_metrics(record);
    let id = record.id();

    let custom_focus = body
        .custom_focus
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());

    let (label, prompt) = if let Some(focus) = custom_focus {
        match prompt::build_custom_prompt(record, Some(&metrics), focus) {
            Ok(prompt) => ("custom".to_string(), prompt),
            Err(e) => return ai_error(&e),
        }
    } else {
        let analysis_type = match body.analysis_type.as_deref().map(str::trim) {
            None | Some("") => AnalysisType::default(),
            Some(raw) => match raw.parse::<AnalysisType>() {
                Ok(t) => t,
                Err(_) => {
                    return bad_request(format!(
                        "Unknown analysis type \"{raw}\"; expected one of: {}",
                        AnalysisType::all()
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ));
                }
            },
        };
        (
            analysis_type.to_string(),
            prompt::build_analysis_prompt_with(record, Some(&metrics), analysis_type),
        )
    };

    let key = CacheKey::new("ai_analysis")
        .with_identifiers([id.as_str()])
        .with_param("type", &label)
        .with_optional_param("focus", custom_focus);
    let (ai_analysis, ai_error) =
        narrate_cached(&state, &key, &prompt, prompt::ANALYSIS_TEMPERATURE).await;

    to_response(&ApiAiAnalysis {
        location: id,
        analysis_type: label,
        ai_analysis,
        ai_error,
        metrics,
        generated_at: Utc::now(),
    })
}

/// `POST /api/ai/compare`
pub async fn ai_compare(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CompareRequest>,
) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.ai, &req) {
        return resp;
    }
    let names = match comparison_names(&body) {
        Ok(names) => names,
        Err(resp) => return resp,
    };
    let comparison = match cached_comparison(&state, &names).await {
        Ok(result) => result,
        Err(e) => return analytics_error("compare locations", &e),
    };

    let mut pairs = Vec::with_capacity(comparison.locations.len());
    for id in &comparison.locations {
        match state.analyzer.get_record(id.as_str()) {
            Ok(record) => pairs.push((record, state.analyzer.derived_metrics(record))),
            Err(e) => return analytics_error("look up location", &e),
        }
    }
    let refs: Vec<_> = pairs.iter().map(|(r, m)| (*r, m)).collect();
    let prompt = match prompt::build_comparative_prompt(&refs) {
        Ok(prompt) => prompt,
        Err(e) => return ai_error(&e),
    };

    let key = CacheKey::new("ai_compare")
        .with_identifiers(comparison.locations.iter().map(LocationId::as_str));
    let (ai_analysis, ai_error) =
        narrate_cached(&state, &key, &prompt, COMPARATIVE_TEMPERATURE).await;

    to_response(&ApiAiComparison {
        comparison,
        ai_analysis,
        ai_error,
        generated_at: Utc::now(),
    })
}

/// `GET /api/ai/market-insights?city=`
pub async fn ai_market_insights(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<CityQueryParams>,
) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.ai, &req) {
        return resp;
    }
    let city = params
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let prompt = prompt::build_market_insights_prompt(city.as_deref());
    let key = CacheKey::new("ai_market_insights").with_optional_param("city", city.as_deref());
    let (ai_analysis, ai_error) = narrate_cached(&state, &key, &prompt, MARKET_TEMPERATURE).await;

    to_response(&ApiAiMarketInsights {
        city,
        ai_analysis,
        ai_error,
        generated_at: Utc::now(),
    })
}

/// `POST /api/ai/investment-strategy`
pub async fn ai_investment_strategy(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<InvestmentStrategyRequest>,
) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.ai, &req) {
        return resp;
    }
    let Some(budget) = body.budget else {
        return bad_request("Budget is required");
    };
    let goals = body
        .goals
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or("balanced growth")
        .to_string();

    let prompt = match prompt::build_investment_strategy_prompt(budget, &goals) {
        Ok(prompt) => prompt,
        Err(e) => return ai_error(&e),
    };
    let key = CacheKey::new("ai_investment_strategy")
        .with_param("budget", budget)
        .with_param("goals", &goals);
    let (ai_analysis, ai_error) =
        narrate_cached(&state, &key, &prompt, STRATEGY_TEMPERATURE).await;

    to_response(&ApiAiInvestmentStrategy {
        budget,
        budget_category: BudgetCategory::from_budget(budget).to_string(),
        goals,
        ai_analysis,
        ai_error,
        generated_at: Utc::now(),
    })
}

/// `GET /api/ai/stats`
pub async fn ai_stats(state: web::Data<AppState>) -> HttpResponse {
    to_response(&state.narrator.stats())
}

/// `POST /api/export-report`
pub async fn export_report(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ExportReportRequest>,
) -> HttpResponse {
    if let Err(resp) = limit(&state.rate_limits.export, &req) {
        return resp;
    }
    let location = match required(&body.location, "Location") {
        Ok(location) => location,
        Err(resp) => return resp,
    };
    let report = match state.analyzer.analysis_report(&location) {
        Ok(report) => report,
        Err(e) => return analytics_error("build report", &e),
    };

    let metadata = &report.report_metadata;
    let filename = report_file_name(metadata.location.as_str(), metadata.generated_at);
    if let Err(e) = write_report(state.reports_dir(), &filename, &report) {
        return analytics_error("export report", &e);
    }

    to_response(&ApiExportReport {
        location: metadata.location.clone(),
        download_url: format!("/api/download-report/{filename}"),
        filename,
        generated_at: metadata.generated_at,
    })
}

/// `GET /api/download-report/{filename}`
pub async fn download_report(
    state: web::Data<AppState>,
    filename: web::Path<String>,
) -> HttpResponse {
    let filename = filename.into_inner();
    if !is_safe_report_name(&filename) {
        return bad_request("Invalid filename");
    }

    let path = state.reports_dir().join(&filename);
    match std::fs::read(&path) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("application/json")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ))
            .body(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            HttpResponse::NotFound().json(error_body("File not found"))
        }
        Err(e) => {
            log::error!("Failed to read report {}: {e}", path.display());
            HttpResponse::InternalServerError().json(error_body("Failed to read report"))
        }
    }
}

/// `POST /api/cache/clear`
pub async fn cache_clear(state: web::Data<AppState>) -> HttpResponse {
    let entries_removed = state.cache.clear();
    log::info!("Cleared {entries_removed} cache entries");
    to_response(&ApiCacheCleared {
        message: "Cache cleared successfully".to_string(),
        entries_removed,
    })
}

/// `GET /api/cache/stats`
pub async fn cache_stats(state: web::Data<AppState>) -> HttpResponse {
    to_response(&state.cache.stats())
}

/// Fallback for unknown routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(error_body("Endpoint not found"))
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use actix_web::{App, http::StatusCode, test};
    use realty_ai::{
        narrator::Narrator,
        providers::{ChatRequest, LlmProvider},
    };
    use realty_analytics::Analyzer;
    use realty_dataset::Dataset;
    use serde_json::{Value, json};

    use super::*;
    use crate::{ServerConfig, configure};

    struct CountingProvider(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl LlmProvider for CountingProvider {
        async fn complete(&self, _request: &ChatRequest) -> Result<String, AiError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok("A well-connected suburb.".to_string())
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn model(&self) -> &str {
            "counting-1"
        }
    }

    fn state_with(narrator: Narrator, config: &ServerConfig) -> web::Data<AppState> {
        let dataset = Dataset::embedded().unwrap();
        let analyzer = Analyzer::with_default_config(Arc::new(dataset));
        web::Data::new(AppState::new(analyzer, narrator, config))
    }

    fn state() -> web::Data<AppState> {
        state_with(Narrator::disabled(), &ServerConfig::default())
    }

    #[actix_web::test]
    async fn health_reports_loaded_locations() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["locationsLoaded"], 8);
        assert_eq!(body["aiAvailable"], false);
    }

    #[actix_web::test]
    async fn locations_are_sorted_by_city_then_area() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/locations").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalLocations"], 8);
        assert_eq!(body["cities"], json!(["Ahmedabad", "Gandhinagar"]));
        let names: Vec<&str> = body["locations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["location"].as_str().unwrap())
            .collect();
        assert_eq!(names.first(), Some(&"Bodakdev, Ahmedabad"));
        assert_eq!(names.last(), Some(&"Sector 21, Gandhinagar"));
    }

    #[actix_web::test]
    async fn location_lookup_statuses() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/location").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/location?name=Nonexistent%2C%20City")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/location?name=satellite")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["location"], "Satellite, Ahmedabad");
        assert!(body["metrics"]["overallScore"].as_f64().unwrap() > 8.0);
    }

    #[actix_web::test]
    async fn negative_principal_is_rejected() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/investment-analysis")
            .set_json(json!({ "location": "Satellite, Ahmedabad", "investmentAmount": -5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("Invalid input"));
    }

    #[actix_web::test]
    async fn compare_validates_size_and_caches_result() {
        let state = state();
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/compare")
            .set_json(json!({ "locations": ["Satellite"] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let six = json!({ "locations": ["a", "b", "c", "d", "e", "f"] });
        let req = test::TestRequest::post()
            .uri("/api/compare")
            .set_json(six)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/compare")
            .set_json(json!({ "locations": ["Satellite", "Atlantis"] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        for order in [
            ["Vastrapur, Ahmedabad", "Satellite, Ahmedabad"],
            ["Satellite, Ahmedabad", "Vastrapur, Ahmedabad"],
        ] {
            let req = test::TestRequest::post()
                .uri("/api/compare")
                .set_json(json!({ "locations": order }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["overallWinner"], "Satellite, Ahmedabad");
        }

        let stats = state.cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[actix_web::test]
    async fn top_picks_respects_limit_in_query_and_body() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/top-picks?limit=2&city=ahmedabad")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["locations"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::post()
            .uri("/api/top-picks")
            .set_json(json!({ "limit": 0 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn ai_analysis_without_provider_returns_null_narrative() {
        let state = state();
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/ai-analysis")
            .set_json(json!({ "location": "Vastrapur" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["location"], "Vastrapur, Ahmedabad");
        assert!(body["aiAnalysis"].is_null());
        assert!(body["aiError"].is_string());
        assert!(body["metrics"]["investmentScore"].is_number());
        assert!(state.cache.is_empty());
    }

    #[actix_web::test]
    async fn ai_analysis_rejects_unknown_type() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/ai-analysis")
            .set_json(json!({ "location": "Vastrapur", "analysisType": "horoscope" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn narratives_are_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let narrator = Narrator::new(
            Some(Arc::new(CountingProvider(calls.clone()))),
            Duration::from_secs(5),
        )
        .with_min_interval(Duration::ZERO);
        let state = state_with(narrator, &ServerConfig::default());
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/ai-analysis")
                .set_json(json!({ "location": "Satellite", "analysisType": "family_focus" }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["aiAnalysis"], "A well-connected suburb.");
            assert_eq!(body["analysisType"], "family_focus");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let req = test::TestRequest::get().uri("/api/ai/stats").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalCalls"], 1);
        assert_eq!(body["provider"], "counting");
    }

    #[actix_web::test]
    async fn investment_strategy_requires_budget() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/ai/investment-strategy")
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/ai/investment-strategy")
            .set_json(json!({ "budget": 30_000_000 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["budgetCategory"], "Medium");
        assert_eq!(body["goals"], "balanced growth");
    }

    #[actix_web::test]
    async fn rate_limit_returns_429() {
        let config = ServerConfig {
            rate_limit: 2,
            ..ServerConfig::default()
        };
        let app = test::init_service(
            App::new()
                .app_data(state_with(Narrator::disabled(), &config))
                .configure(configure),
        )
        .await;

        for _ in 0..2 {
            let req = test::TestRequest::get().uri("/api/locations").to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
        let req = test::TestRequest::get().uri("/api/locations").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key(header::RETRY_AFTER));
    }

    #[actix_web::test]
    async fn export_then_download_report() {
        let dir: PathBuf =
            std::env::temp_dir().join(format!("realty_server_reports_{}", std::process::id()));
        let config = ServerConfig {
            reports_dir: dir.clone(),
            ..ServerConfig::default()
        };
        let app = test::init_service(
            App::new()
                .app_data(state_with(Narrator::disabled(), &config))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/export-report")
            .set_json(json!({ "location": "Kudasan" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let url = body["downloadUrl"].as_str().unwrap().to_string();
        assert!(url.ends_with(".json"));

        let req = test::TestRequest::get().uri(&url).to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            report["reportMetadata"]["location"],
            "Kudasan, Gandhinagar"
        );

        let req = test::TestRequest::get()
            .uri("/api/download-report/secrets.txt")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/download-report/missing.json")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[actix_web::test]
    async fn cache_can_be_cleared() {
        let state = state();
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/statistics").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert_eq!(state.cache.stats().live_entries, 1);

        let req = test::TestRequest::post().uri("/api/cache/clear").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["entriesRemoved"], 1);
        assert_eq!(state.cache.stats().live_entries, 0);
    }

    #[actix_web::test]
    async fn unknown_routes_return_json_404() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Endpoint not found");
    }
}
