//! Loading and validation of the scoring configuration.
//!
//! The default configuration is embedded at compile time. Operators can
//! point `REALTY_SCORING_CONFIG` at a TOML file with the same layout; any
//! file is validated before the engine accepts it.

use std::path::{Path, PathBuf};

use realty_analytics_models::ScoringConfig;
use thiserror::Error;

/// TOML configuration bundled into the binary.
pub const EMBEDDED_SCORING_CONFIG: &str = include_str!("../config/scoring.toml");

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Errors that can occur while loading a scoring configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read scoring config {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("Failed to parse scoring config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The values are inconsistent.
    #[error("Invalid scoring config: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}

/// Parses and validates a TOML scoring configuration.
///
/// # Errors
///
/// Returns [`ConfigError`] if the text does not parse or fails validation.
pub fn parse(text: &str) -> Result<ScoringConfig, ConfigError> {
    let config: ScoringConfig = toml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

/// Returns the embedded default configuration.
///
/// # Panics
///
/// Panics if the embedded TOML is invalid, which is a build defect
/// caught by tests.
#[must_use]
pub fn embedded() -> ScoringConfig {
    parse(EMBEDDED_SCORING_CONFIG).expect("embedded scoring config is valid")
}

/// Reads and validates a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
pub fn load(path: &Path) -> Result<ScoringConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&text)?;
    log::info!("Loaded scoring config from {}", path.display());
    Ok(config)
}

/// Loads `path` when given, otherwise the embedded default.
///
/// # Errors
///
/// Returns [`ConfigError`] if the override file is unusable.
pub fn load_or_embedded(path: Option<&Path>) -> Result<ScoringConfig, ConfigError> {
    path.map_or_else(|| Ok(embedded()), load)
}

/// Checks that weights are non-negative and sum to 1.0 and that every
/// threshold and default is usable.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] describing the first problem found.
pub fn validate(config: &ScoringConfig) -> Result<(), ConfigError> {
    for (name, weight) in config.overall_weights.entries() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(invalid(format!(
                "overall_weights.{name} = {weight} must be a non-negative number"
            )));
        }
    }
    let total = config.overall_weights.total();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(invalid(format!(
            "overall_weights must sum to 1.0 (got {total})"
        )));
    }

    let inv = &config.investment_score;
    let parts = [
        ("appreciation_weight", inv.appreciation_weight),
        ("yield_weight", inv.yield_weight),
        ("risk_weight", inv.risk_weight),
    ];
    for (name, weight) in parts {
        if !weight.is_finite() || weight < 0.0 {
            return Err(invalid(format!(
                "investment_score.{name} = {weight} must be a non-negative number"
            )));
        }
    }
    let inv_total: f64 = parts.iter().map(|(_, w)| w).sum();
    if (inv_total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(invalid(format!(
            "investment_score weights must sum to 1.0 (got {inv_total})"
        )));
    }
    if !(inv.appreciation_cap.is_finite() && inv.appreciation_cap > 0.0) {
        return Err(invalid("investment_score.appreciation_cap must be positive"));
    }
    if !(inv.yield_cap.is_finite() && inv.yield_cap > 0.0) {
        return Err(invalid("investment_score.yield_cap must be positive"));
    }

    let risk = &config.risk;
    if risk.max_points() == 0 {
        return Err(invalid("risk factors must award at least one point"));
    }
    if risk.low_max_points > risk.medium_max_points {
        return Err(invalid(
            "risk.low_max_points must not exceed risk.medium_max_points",
        ));
    }

    let rec = &config.recommendation;
    if !(rec.highly_recommended_roi >= rec.recommended_roi
        && rec.recommended_roi >= rec.caution_roi)
    {
        return Err(invalid(
            "recommendation thresholds must be non-increasing from highly_recommended_roi to caution_roi",
        ));
    }

    let d = &config.defaults;
    if !(d.principal.is_finite() && d.principal > 0.0) {
        return Err(invalid("defaults.principal must be positive"));
    }
    if d.horizon_years == 0 || d.horizon_years > d.max_horizon_years {
        return Err(invalid(
            "defaults.horizon_years must be between 1 and defaults.max_horizon_years",
        ));
    }
    if d.top_picks_limit == 0 || d.search_limit == 0 || d.comparable_limit == 0 {
        return Err(invalid("default limits must be at least 1"));
    }
    if d.search_limit > d.max_search_limit {
        return Err(invalid(
            "defaults.search_limit must not exceed defaults.max_search_limit",
        ));
    }
    if !(d.comparable_price_band > 0.0 && d.comparable_price_band <= 1.0) {
        return Err(invalid("defaults.comparable_price_band must be in (0, 1]"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_is_valid() {
        let config = embedded();
        assert!((config.overall_weights.total() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert!((config.defaults.principal - 10_000_000.0).abs() < f64::EPSILON);
        assert_eq!(config.risk.max_points(), 5);
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let text = EMBEDDED_SCORING_CONFIG.replace("safety = 0.25", "safety = 0.5");
        let err = parse(&text).unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"), "{err}");
    }

    #[test]
    fn rejects_negative_weight() {
        let text = EMBEDDED_SCORING_CONFIG
            .replace("safety = 0.25", "safety = -0.25")
            .replace("traffic = 0.10", "traffic = 0.60");
        let err = parse(&text).unwrap_err();
        assert!(err.to_string().contains("non-negative"), "{err}");
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            parse("[overall_weights]\nsafety = ").unwrap_err(),
            ConfigError::Toml(_)
        ));
    }

    #[test]
    fn rejects_horizon_beyond_maximum() {
        let text = EMBEDDED_SCORING_CONFIG.replace("horizon_years = 5", "horizon_years = 50");
        assert!(matches!(parse(&text).unwrap_err(), ConfigError::Invalid { .. }));
    }

    #[test]
    fn missing_override_file_is_io_error() {
        let err = load_or_embedded(Some(Path::new("/nonexistent/scoring.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
