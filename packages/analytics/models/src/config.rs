//! Tunable scoring configuration.
//!
//! Every weight and threshold the engine uses lives here so it can be
//! adjusted from a TOML file without touching the formulas. The engine
//! crate embeds the default file and validates any override at startup.

use serde::{Deserialize, Serialize};

/// Complete scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weights of the six categories in the overall score.
    pub overall_weights: CategoryWeights,
    /// Parameters of the derived investment score.
    pub investment_score: InvestmentScoreConfig,
    /// Risk factor thresholds and bucket boundaries.
    pub risk: RiskThresholds,
    /// ROI thresholds for the investment recommendation.
    pub recommendation: RecommendationThresholds,
    /// Defaults applied when callers omit parameters.
    pub defaults: AnalysisDefaults,
}

/// Per-category weights of the overall score. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    /// Safety weight.
    pub safety: f64,
    /// Traffic (ease) weight.
    pub traffic: f64,
    /// Connectivity weight.
    pub connectivity: f64,
    /// Infrastructure weight.
    pub infrastructure: f64,
    /// Lifestyle weight.
    pub lifestyle: f64,
    /// Environment weight.
    pub environment: f64,
}

impl CategoryWeights {
    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.safety
            + self.traffic
            + self.connectivity
            + self.infrastructure
            + self.lifestyle
            + self.environment
    }

    /// All weights as `(name, value)` pairs.
    #[must_use]
    pub const fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("safety", self.safety),
            ("traffic", self.traffic),
            ("connectivity", self.connectivity),
            ("infrastructure", self.infrastructure),
            ("lifestyle", self.lifestyle),
            ("environment", self.environment),
        ]
    }
}

/// Investment score = weighted blend of appreciation, yield and risk
/// components, each scaled to `[0, 10]`. The three weights must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentScoreConfig {
    /// Weight of the appreciation component.
    pub appreciation_weight: f64,
    /// Weight of the rental yield component.
    pub yield_weight: f64,
    /// Weight of the risk component.
    pub risk_weight: f64,
    /// Appreciation rate (percent) that earns a full 10.
    pub appreciation_cap: f64,
    /// Rental yield (percent) that earns a full 10.
    pub yield_cap: f64,
}

/// Risk factor thresholds. Each triggered factor adds its points; the sum
/// is bucketed into Low / Medium / High.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Traffic scores strictly above this are a risk factor.
    pub high_traffic_above: f64,
    /// Points for high traffic.
    pub high_traffic_points: u32,
    /// Safety scores strictly below this are a risk factor.
    pub low_safety_below: f64,
    /// Points for low safety.
    pub low_safety_points: u32,
    /// Appreciation rates strictly below this are a risk factor.
    pub low_appreciation_below: f64,
    /// Points for low appreciation.
    pub low_appreciation_points: u32,
    /// Rental yields strictly below this are a risk factor.
    pub low_yield_below: f64,
    /// Points for low yield.
    pub low_yield_points: u32,
    /// Totals up to and including this are Low risk.
    pub low_max_points: u32,
    /// Totals up to and including this are Medium risk; above is High.
    pub medium_max_points: u32,
}

impl RiskThresholds {
    /// Largest possible risk total.
    #[must_use]
    pub const fn max_points(&self) -> u32 {
        self.high_traffic_points
            + self.low_safety_points
            + self.low_appreciation_points
            + self.low_yield_points
    }
}

/// ROI percentage thresholds for the investment recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationThresholds {
    /// ROI above this with Low risk is Highly Recommended.
    pub highly_recommended_roi: f64,
    /// ROI above this with Low or Medium risk is Recommended.
    pub recommended_roi: f64,
    /// ROI above this is Consider with Caution.
    pub caution_roi: f64,
}

/// Defaults for optional request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDefaults {
    /// Investment amount when none is supplied.
    pub principal: f64,
    /// Projection horizon in years.
    pub horizon_years: u32,
    /// Longest accepted projection horizon.
    pub max_horizon_years: u32,
    /// Number of top picks when no limit is supplied.
    pub top_picks_limit: usize,
    /// Number of search results when no limit is supplied.
    pub search_limit: usize,
    /// Largest accepted search limit.
    pub max_search_limit: usize,
    /// Relative price band for comparable locations (0.2 = +-20%).
    pub comparable_price_band: f64,
    /// Number of comparable locations to report.
    pub comparable_limit: usize,
}
