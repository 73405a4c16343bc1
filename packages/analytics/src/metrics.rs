//! Derived per-location metrics.

use realty_analytics_models::{
    CategoryWeights, DerivedMetrics, LocationDetail, PriceCategory, PriceRank, RiskAssessment,
    RiskLevel, RiskThresholds, ScoringConfig,
};
use realty_dataset::Dataset;
use realty_location_models::{LocationRecord, SCORE_MAX, SCORE_MIN};

use crate::{AnalyticsError, Analyzer, round1, round2};

/// Weighted sum of the desirability-oriented category scores, clamped to
/// `[0, 10]`.
///
/// Traffic enters as `10 - traffic_score`, so the result never decreases
/// when any category becomes more desirable.
#[must_use]
pub fn compute_overall_score(record: &LocationRecord, weights: &CategoryWeights) -> f64 {
    let s = record.category_scores();
    let raw = s.safety * weights.safety
        + s.traffic * weights.traffic
        + s.connectivity * weights.connectivity
        + s.infrastructure * weights.infrastructure
        + s.lifestyle * weights.lifestyle
        + s.environment * weights.environment;
    round2(raw.clamp(SCORE_MIN, SCORE_MAX))
}

/// Day-to-day livability, weighted towards safety and infrastructure.
#[must_use]
pub fn livability_score(record: &LocationRecord) -> f64 {
    round2(
        record.safety_score * 0.3
            + record.infrastructure_score * 0.25
            + record.lifestyle_score * 0.2
            + record.environment_score * 0.15
            + (SCORE_MAX - record.traffic_score) * 0.1,
    )
}

/// Maps a risk point total to its bucket.
#[must_use]
pub const fn risk_level_for(points: u32, thresholds: &RiskThresholds) -> RiskLevel {
    if points <= thresholds.low_max_points {
        RiskLevel::Low
    } else if points <= thresholds.medium_max_points {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Sums the triggered risk factors of a record.
#[must_use]
pub fn assess_risk(record: &LocationRecord, thresholds: &RiskThresholds) -> RiskAssessment {
    let mut points = 0;
    let mut factors = Vec::new();

    if record.traffic_score > thresholds.high_traffic_above {
        points += thresholds.high_traffic_points;
        factors.push("High traffic congestion".to_string());
    }
    if record.safety_score < thresholds.low_safety_below {
        points += thresholds.low_safety_points;
        factors.push("Below average safety".to_string());
    }
    if record.appreciation_rate < thresholds.low_appreciation_below {
        points += thresholds.low_appreciation_points;
        factors.push("Low appreciation rate".to_string());
    }
    if record.rental_yield < thresholds.low_yield_below {
        points += thresholds.low_yield_points;
        factors.push("Low rental yield".to_string());
    }

    RiskAssessment {
        points,
        level: risk_level_for(points, thresholds),
        factors,
    }
}

/// Blend of appreciation, rental yield and risk, each scaled to `[0, 10]`.
#[must_use]
pub fn investment_score(record: &LocationRecord, config: &ScoringConfig) -> f64 {
    let params = &config.investment_score;
    let appreciation =
        (record.appreciation_rate / params.appreciation_cap * SCORE_MAX).clamp(SCORE_MIN, SCORE_MAX);
    let rental = (record.rental_yield / params.yield_cap * SCORE_MAX).clamp(SCORE_MIN, SCORE_MAX);

    let risk = assess_risk(record, &config.risk);
    let safety_margin =
        SCORE_MAX - f64::from(risk.points) * SCORE_MAX / f64::from(config.risk.max_points());

    round2(
        appreciation * params.appreciation_weight
            + rental * params.yield_weight
            + safety_margin * params.risk_weight,
    )
}

/// Attractiveness to investors: appreciation and yield first, then
/// connectivity and the investment score.
#[must_use]
pub fn investment_attractiveness(record: &LocationRecord, investment_score: f64) -> f64 {
    round2(
        record.appreciation_rate * 0.4
            + record.rental_yield * 10.0 * 0.3
            + record.connectivity_score * 0.2
            + investment_score * 0.1,
    )
}

/// Inverse position of `price` between `min` and `max`, scaled to
/// `[0, 10]`. Every location is fully affordable when all prices are equal.
#[must_use]
pub fn affordability_index(price: f64, (min, max): (f64, f64)) -> f64 {
    let span = max - min;
    if span <= 0.0 {
        return SCORE_MAX;
    }
    round2(((max - price) / span * SCORE_MAX).clamp(SCORE_MIN, SCORE_MAX))
}

/// Price bracket for a percentile.
#[must_use]
pub fn price_category(percentile: f64) -> PriceCategory {
    if percentile <= 25.0 {
        PriceCategory::BudgetFriendly
    } else if percentile <= 50.0 {
        PriceCategory::Moderate
    } else if percentile <= 75.0 {
        PriceCategory::Premium
    } else {
        PriceCategory::Luxury
    }
}

/// Position of a record's price among every record of the dataset.
#[must_use]
pub fn price_rank(record: &LocationRecord, dataset: &Dataset) -> PriceRank {
    let total = dataset.len();
    let rank = dataset
        .iter()
        .filter(|r| r.avg_price_per_sqft <= record.avg_price_per_sqft)
        .count();
    let percentile = percentile(rank, total);
    PriceRank {
        rank,
        total_locations: total,
        percentile,
        category: price_category(percentile),
    }
}

/// `rank / total * 100`, one decimal.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn percentile(rank: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(rank as f64 / total as f64 * 100.0)
}

impl Analyzer {
    /// Overall score under the active weights.
    #[must_use]
    pub fn overall_score(&self, record: &LocationRecord) -> f64 {
        compute_overall_score(record, &self.config().overall_weights)
    }

    /// Every derived metric of a record.
    #[must_use]
    pub fn derived_metrics(&self, record: &LocationRecord) -> DerivedMetrics {
        let config = self.config();
        let investment = investment_score(record, config);
        DerivedMetrics {
            overall_score: self.overall_score(record),
            livability_score: livability_score(record),
            investment_score: investment,
            investment_attractiveness: investment_attractiveness(record, investment),
            affordability_index: affordability_index(
                record.avg_price_per_sqft,
                self.dataset().price_bounds(),
            ),
            risk_level: assess_risk(record, &config.risk).level,
            price_rank: price_rank(record, self.dataset()),
        }
    }

    /// A record with its derived metrics.
    #[must_use]
    pub fn detail(&self, record: &LocationRecord) -> LocationDetail {
        LocationDetail {
            location: record.id(),
            record: record.clone(),
            metrics: self.derived_metrics(record),
        }
    }

    /// Resolves `query` and returns the record with its derived metrics.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query does not resolve to exactly
    /// one location.
    pub fn location_detail(&self, query: &str) -> Result<LocationDetail, AnalyticsError> {
        let record = self.resolve(query)?;
        Ok(self.detail(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::test_support::{analyzer, analyzer_with, record};
    use realty_location_models::Category;

    fn set_desirability(record: &mut LocationRecord, category: Category, value: f64) {
        match category {
            Category::Safety => record.safety_score = value,
            Category::Traffic => record.traffic_score = SCORE_MAX - value,
            Category::Connectivity => record.connectivity_score = value,
            Category::Infrastructure => record.infrastructure_score = value,
            Category::Lifestyle => record.lifestyle_score = value,
            Category::Environment => record.environment_score = value,
        }
    }

    #[test]
    fn satellite_outscores_vastrapur() {
        let a = analyzer();
        let satellite = a.overall_score(a.get_record("Satellite, Ahmedabad").unwrap());
        let vastrapur = a.overall_score(a.get_record("Vastrapur, Ahmedabad").unwrap());
        assert!((satellite - 8.08).abs() < 0.02, "{satellite}");
        assert!((vastrapur - 7.79).abs() < 0.02, "{vastrapur}");
        assert!(satellite > vastrapur);
    }

    #[test]
    fn overall_score_stays_in_range() {
        let weights = config::embedded().overall_weights;
        let mut best = record("Best", "Town");
        let mut worst = record("Worst", "Town");
        for category in Category::all() {
            set_desirability(&mut best, *category, SCORE_MAX);
            set_desirability(&mut worst, *category, SCORE_MIN);
        }
        assert!((compute_overall_score(&best, &weights) - 10.0).abs() < 1e-9);
        assert!(compute_overall_score(&worst, &weights).abs() < 1e-9);

        let a = analyzer();
        for r in a.dataset().iter() {
            let score = a.overall_score(r);
            assert!((SCORE_MIN..=SCORE_MAX).contains(&score), "{score}");
        }
    }

    #[test]
    fn overall_score_is_monotone_in_each_category() {
        let weights = config::embedded().overall_weights;
        for category in Category::all() {
            let mut r = record("Probe", "Town");
            let mut previous = f64::MIN;
            for step in 0..=20 {
                set_desirability(&mut r, *category, f64::from(step) * 0.5);
                let score = compute_overall_score(&r, &weights);
                assert!(score >= previous, "{category} at step {step}: {score} < {previous}");
                previous = score;
            }
        }
    }

    #[test]
    fn overall_score_is_deterministic() {
        let a = analyzer();
        let r = a.get_record("Kudasan, Gandhinagar").unwrap();
        assert!((a.overall_score(r) - a.overall_score(r)).abs() < f64::EPSILON);
    }

    #[test]
    fn risk_points_and_levels() {
        let thresholds = config::embedded().risk;

        let calm = record("Calm", "Town");
        let risk = assess_risk(&calm, &thresholds);
        assert_eq!(risk.points, 0);
        assert_eq!(risk.level, RiskLevel::Low);
        assert!(risk.factors.is_empty());

        let mut unsafe_area = record("Rough", "Town");
        unsafe_area.safety_score = 6.0;
        let risk = assess_risk(&unsafe_area, &thresholds);
        assert_eq!(risk.points, 2);
        assert_eq!(risk.level, RiskLevel::Medium);

        let mut bad = record("Bad", "Town");
        bad.safety_score = 5.0;
        bad.traffic_score = 9.0;
        bad.rental_yield = 2.0;
        let risk = assess_risk(&bad, &thresholds);
        assert_eq!(risk.points, 4);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.factors.len(), 3);
    }

    #[test]
    fn investment_score_rewards_returns_and_penalizes_risk() {
        let config = config::embedded();
        let base = record("Base", "Town");
        let mut better = base.clone();
        better.appreciation_rate = 11.0;
        let mut riskier = base.clone();
        riskier.safety_score = 6.0;

        let s = investment_score(&base, &config);
        assert!((0.0..=10.0).contains(&s));
        assert!(investment_score(&better, &config) > s);
        assert!(investment_score(&riskier, &config) < s);
    }

    #[test]
    fn affordability_spans_zero_to_ten() {
        assert!((affordability_index(4000.0, (4000.0, 8000.0)) - 10.0).abs() < f64::EPSILON);
        assert!(affordability_index(8000.0, (4000.0, 8000.0)).abs() < f64::EPSILON);
        assert!((affordability_index(6000.0, (4000.0, 8000.0)) - 5.0).abs() < f64::EPSILON);
        assert!((affordability_index(5000.0, (5000.0, 5000.0)) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn price_rank_buckets() {
        let mut cheap = record("Cheap", "Town");
        cheap.avg_price_per_sqft = 3000.0;
        let mut mid = record("Mid", "Town");
        mid.avg_price_per_sqft = 5000.0;
        let mut dear = record("Dear", "Town");
        dear.avg_price_per_sqft = 7000.0;
        let mut top = record("Top", "Town");
        top.avg_price_per_sqft = 9000.0;
        let a = analyzer_with(vec![cheap, mid, dear, top]);

        let rank = price_rank(a.get_record("Cheap, Town").unwrap(), a.dataset());
        assert_eq!(rank.rank, 1);
        assert_eq!(rank.category, PriceCategory::BudgetFriendly);

        let rank = price_rank(a.get_record("Dear, Town").unwrap(), a.dataset());
        assert!((rank.percentile - 75.0).abs() < f64::EPSILON);
        assert_eq!(rank.category, PriceCategory::Premium);

        let rank = price_rank(a.get_record("Top, Town").unwrap(), a.dataset());
        assert_eq!(rank.category, PriceCategory::Luxury);
    }

    #[test]
    fn location_detail_resolves_fuzzy_names() {
        let a = analyzer();
        let detail = a.location_detail("satellite").unwrap();
        assert_eq!(detail.location.as_str(), "Satellite, Ahmedabad");
        assert_eq!(detail.metrics.price_rank.total_locations, a.dataset().len());
    }
}
