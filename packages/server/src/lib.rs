#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for neighborhood real-estate analysis.
//!
//! Serves the REST API over the in-memory location table: listings,
//! derived metrics, investment analysis, comparisons, top picks, market
//! statistics and exported reports. AI narratives are generated through
//! the optional [`realty_ai::narrator::Narrator`]; when it is unavailable
//! the numeric results are still returned with a `null` narrative.
//! Comparisons, statistics and narratives are fronted by a TTL cache.

mod handlers;
pub mod interactive;
pub mod rate_limit;

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, error::InternalError, middleware, web};
use realty_ai::narrator::Narrator;
use realty_analytics::{AnalyticsError, Analyzer, ConfigError, config};
use realty_cache::{DEFAULT_TTL, TtlCache};
use realty_dataset::{Dataset, DatasetError};
use thiserror::Error;

use crate::rate_limit::{DEFAULT_LIMIT, RateLimiters};

/// Errors that can occur while starting the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The location table could not be loaded.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// The scoring configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The analyzer rejected its inputs.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// Binding or running the HTTP server failed.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Process settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Location table override (`REALTY_DATA_PATH`).
    pub data_path: Option<PathBuf>,
    /// Scoring configuration override (`REALTY_SCORING_CONFIG`).
    pub scoring_config: Option<PathBuf>,
    /// Where exported reports are written (`REALTY_REPORTS_DIR`).
    pub reports_dir: PathBuf,
    /// Cache entry lifetime (`REALTY_CACHE_TTL_SECS`).
    pub cache_ttl: Duration,
    /// Default requests per hour per client (`REALTY_RATE_LIMIT`).
    pub rate_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            data_path: None,
            scoring_config: None,
            reports_dir: PathBuf::from("reports"),
            cache_ttl: DEFAULT_TTL,
            rate_limit: DEFAULT_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Reads settings from the environment, falling back to defaults for
    /// anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: env_parse("PORT", defaults.port),
            data_path: env_path("REALTY_DATA_PATH"),
            scoring_config: env_path("REALTY_SCORING_CONFIG"),
            reports_dir: env_path("REALTY_REPORTS_DIR").unwrap_or(defaults.reports_dir),
            cache_ttl: Duration::from_secs(env_parse(
                "REALTY_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            rate_limit: env_parse("REALTY_RATE_LIMIT", defaults.rate_limit),
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn env_parse<T: FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {name}={value}");
            default
        }),
        Err(_) => default,
    }
}

/// Shared application state.
pub struct AppState {
    /// Scoring engine over the location table.
    pub analyzer: Analyzer,
    /// Cached comparison, statistics and narrative responses.
    pub cache: TtlCache<serde_json::Value>,
    /// AI narrative access.
    pub narrator: Narrator,
    /// Per-client request limits.
    pub rate_limits: RateLimiters,
    /// Where exported reports are written.
    pub reports_dir: PathBuf,
}

impl AppState {
    /// Assembles state from ready-made parts.
    #[must_use]
    pub fn new(analyzer: Analyzer, narrator: Narrator, config: &ServerConfig) -> Self {
        Self {
            analyzer,
            cache: TtlCache::new(config.cache_ttl),
            narrator,
            rate_limits: RateLimiters::new(config.rate_limit),
            reports_dir: config.reports_dir.clone(),
        }
    }

    /// Loads the location table and scoring configuration and builds the
    /// narrator from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the table or configuration fails to load
    /// or validate.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        log::info!("Loading location table...");
        let dataset = Dataset::load_or_embedded(config.data_path.as_deref())?;
        log::info!("Loaded {} locations", dataset.len());

        let scoring = config::load_or_embedded(config.scoring_config.as_deref())?;
        let analyzer = Analyzer::new(Arc::new(dataset), scoring)?;

        Ok(Self::new(analyzer, Narrator::from_env(), config))
    }

    /// Directory exported reports are written to.
    #[must_use]
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }
}

/// Registers every `/api` route plus JSON error handling for malformed
/// bodies and query strings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        let body = serde_json::json!({ "error": format!("Invalid request body: {err}") });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        let body = serde_json::json!({ "error": format!("Invalid query parameters: {err}") });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    }))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/docs", web::get().to(handlers::docs))
            .route("/locations", web::get().to(handlers::locations))
            .route("/location", web::get().to(handlers::location))
            .route(
                "/investment-analysis",
                web::post().to(handlers::investment_analysis),
            )
            .route("/compare", web::post().to(handlers::compare))
            .route("/top-picks", web::get().to(handlers::top_picks_query))
            .route("/top-picks", web::post().to(handlers::top_picks_body))
            .route("/market-trends", web::get().to(handlers::market_trends))
            .route("/search", web::post().to(handlers::search))
            .route("/statistics", web::get().to(handlers::statistics))
            .route("/ai-analysis", web::post().to(handlers::ai_analysis))
            .route("/ai/compare", web::post().to(handlers::ai_compare))
            .route(
                "/ai/market-insights",
                web::get().to(handlers::ai_market_insights),
            )
            .route(
                "/ai/investment-strategy",
                web::post().to(handlers::ai_investment_strategy),
            )
            .route("/ai/stats", web::get().to(handlers::ai_stats))
            .route("/export-report", web::post().to(handlers::export_report))
            .route(
                "/download-report/{filename}",
                web::get().to(handlers::download_report),
            )
            .route("/cache/clear", web::post().to(handlers::cache_clear))
            .route("/cache/stats", web::get().to(handlers::cache_stats)),
    )
    .default_service(web::to(handlers::not_found));
}

/// Starts the neighborhood analysis API server.
///
/// Reads [`ServerConfig`] from the environment, loads the location table
/// and scoring configuration, and starts the Actix-Web HTTP server. This is
/// a regular async function; the caller is responsible for providing the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if startup data fails to load, or the HTTP server
/// fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), ServerError> {
    run_server_with(ServerConfig::from_env()).await
}

/// Starts the server with explicit settings.
///
/// # Errors
///
/// See [`run_server`].
#[allow(clippy::future_not_send)]
pub async fn run_server_with(config: ServerConfig) -> Result<(), ServerError> {
    let state = web::Data::new(AppState::from_config(&config)?);

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
