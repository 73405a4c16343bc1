#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood analytics engine.
//!
//! Every operation is a pure function of the immutable [`Dataset`] and the
//! [`ScoringConfig`]; nothing is cached or mutated here, so an
//! [`Analyzer`] can be shared across threads without locking. Derived
//! values are rounded to two decimals before they are reported or used for
//! tie-breaking, which keeps orderings stable across platforms.

pub mod compare;
pub mod config;
pub mod investment;
pub mod market;
pub mod metrics;
pub mod picks;
pub mod report;
pub mod search;

use std::path::PathBuf;
use std::sync::Arc;

use realty_analytics_models::ScoringConfig;
use realty_dataset::{Dataset, DatasetError};
use realty_location_models::{LocationId, LocationRecord};
use thiserror::Error;

pub use config::ConfigError;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// No location matches the identifier or query.
    #[error("Location \"{identifier}\" not found")]
    NotFound {
        /// The identifier or query that failed to match.
        identifier: String,
    },

    /// A fuzzy query matched several locations.
    #[error("Location \"{query}\" matches {} locations; please be more specific", candidates.len())]
    Ambiguous {
        /// The query as given.
        query: String,
        /// Every matching identifier.
        candidates: Vec<LocationId>,
    },

    /// A parameter is malformed or out of range.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the problem.
        message: String,
    },

    /// The scoring configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The dataset could not be loaded.
    #[error(transparent)]
    Dataset(DatasetError),

    /// A report could not be written.
    #[error("Failed to write report {}: {source}", path.display())]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyticsError {
    /// Builds an [`AnalyticsError::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

impl From<DatasetError> for AnalyticsError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::NotFound { identifier } => Self::NotFound { identifier },
            DatasetError::Ambiguous { query, candidates } => Self::Ambiguous { query, candidates },
            DatasetError::EmptyQuery => Self::invalid("location cannot be empty"),
            other => Self::Dataset(other),
        }
    }
}

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Entry point of the engine: the dataset plus a validated scoring
/// configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    dataset: Arc<Dataset>,
    config: ScoringConfig,
}

impl Analyzer {
    /// Creates an analyzer after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Config`] if the configuration is invalid.
    pub fn new(dataset: Arc<Dataset>, config: ScoringConfig) -> Result<Self, AnalyticsError> {
        config::validate(&config)?;
        Ok(Self { dataset, config })
    }

    /// Creates an analyzer with the embedded default configuration.
    #[must_use]
    pub fn with_default_config(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            config: config::embedded(),
        }
    }

    /// The underlying dataset.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The active scoring configuration.
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Looks up a record by exact identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NotFound`] if no record has this identifier.
    pub fn get_record(&self, identifier: &str) -> Result<&LocationRecord, AnalyticsError> {
        Ok(self.dataset.get_record(identifier)?)
    }

    /// Resolves a free-text location name.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NotFound`], [`AnalyticsError::Ambiguous`]
    /// or [`AnalyticsError::InvalidInput`] for an empty query.
    pub fn resolve(&self, query: &str) -> Result<&LocationRecord, AnalyticsError> {
        Ok(self.dataset.resolve(query)?)
    }

    /// Every identifier in the dataset, sorted.
    #[must_use]
    pub fn list_identifiers(&self) -> Vec<LocationId> {
        self.dataset.list_identifiers()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use realty_dataset::Dataset;
    use realty_location_models::{Amenities, FutureGrowth, LocationRecord, Metro};

    use crate::Analyzer;

    /// Analyzer over the embedded dataset and default configuration.
    pub fn analyzer() -> Analyzer {
        Analyzer::with_default_config(Arc::new(Dataset::embedded().unwrap()))
    }

    /// Analyzer over the given records.
    pub fn analyzer_with(records: Vec<LocationRecord>) -> Analyzer {
        Analyzer::with_default_config(Arc::new(Dataset::from_records(records).unwrap()))
    }

    /// A valid record with middling values, for tests to tweak.
    pub fn record(area: &str, city: &str) -> LocationRecord {
        LocationRecord {
            location: None,
            city: city.to_string(),
            area: area.to_string(),
            population: 10_000,
            population_density: 5_000,
            safety_score: 8.0,
            traffic_score: 6.0,
            connectivity_score: 8.0,
            infrastructure_score: 7.5,
            lifestyle_score: 8.0,
            environment_score: 7.0,
            schools: 10,
            hospitals: 5,
            future_growth: FutureGrowth::Medium,
            avg_price_per_sqft: 5_000.0,
            rental_yield: 4.0,
            appreciation_rate: 8.0,
            metro: Metro::default(),
            bus_routes: 3,
            amenities: Amenities::default(),
        }
    }
}
