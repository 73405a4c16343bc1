//! Side-by-side comparison of two or more locations.
//!
//! Input names are resolved and de-duplicated, then every metric is
//! evaluated over the set sorted by identifier. Winners are chosen by a
//! total order (metric value, then lower price, then identifier), so the
//! result does not depend on the order the names were given in.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use realty_analytics_models::{
    ComparisonMetric, ComparisonResult, ComparisonSummary, MetricComparison,
};
use realty_location_models::{LocationId, LocationRecord};

use crate::metrics::investment_score;
use crate::{AnalyticsError, Analyzer, round2};

/// Minimum number of distinct locations in a comparison.
pub const MIN_COMPARISON_SIZE: usize = 2;

impl Analyzer {
    /// Value of `metric` for `record`, rounded to two decimals.
    #[must_use]
    pub fn metric_value(&self, record: &LocationRecord, metric: ComparisonMetric) -> f64 {
        let value = match metric {
            ComparisonMetric::SafetyScore => record.safety_score,
            ComparisonMetric::TrafficScore => record.traffic_score,
            ComparisonMetric::ConnectivityScore => record.connectivity_score,
            ComparisonMetric::InfrastructureScore => record.infrastructure_score,
            ComparisonMetric::LifestyleScore => record.lifestyle_score,
            ComparisonMetric::EnvironmentScore => record.environment_score,
            ComparisonMetric::Schools => f64::from(record.schools),
            ComparisonMetric::Hospitals => f64::from(record.hospitals),
            ComparisonMetric::AvgPricePerSqft => record.avg_price_per_sqft,
            ComparisonMetric::RentalYield => record.rental_yield,
            ComparisonMetric::AppreciationRate => record.appreciation_rate,
            ComparisonMetric::InvestmentScore => investment_score(record, self.config()),
            ComparisonMetric::OverallScore => self.overall_score(record),
        };
        round2(value)
    }

    /// Compares two or more locations.
    ///
    /// # Errors
    ///
    /// * [`AnalyticsError::InvalidInput`] if fewer than two distinct
    ///   locations are named.
    /// * [`AnalyticsError::NotFound`] naming the first unresolvable name.
    /// * [`AnalyticsError::Ambiguous`] if a name matches several locations.
    pub fn compare_locations<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<ComparisonResult, AnalyticsError> {
        if names.len() < MIN_COMPARISON_SIZE {
            return Err(AnalyticsError::invalid(format!(
                "at least {MIN_COMPARISON_SIZE} locations are required for comparison"
            )));
        }

        let mut members: BTreeMap<LocationId, &LocationRecord> = BTreeMap::new();
        for name in names {
            let record = self.resolve(name.as_ref())?;
            members.insert(record.id(), record);
        }
        if members.len() < MIN_COMPARISON_SIZE {
            return Err(AnalyticsError::invalid(format!(
                "at least {MIN_COMPARISON_SIZE} distinct locations are required for comparison"
            )));
        }

        let records: Vec<&LocationRecord> = members.values().copied().collect();
        log::debug!(
            "compare_locations: {}",
            members.keys().map(LocationId::as_str).collect::<Vec<_>>().join(" | ")
        );

        let metrics: Vec<MetricComparison> = ComparisonMetric::all()
            .iter()
            .map(|metric| self.compare_metric(&records, *metric))
            .collect();

        let winner_of = |metric: ComparisonMetric| {
            metrics
                .iter()
                .find(|m| m.metric == metric)
                .map(|m| m.winner.clone())
                .unwrap_or_else(|| records[0].id())
        };

        let summary = ComparisonSummary {
            best_for_safety: winner_of(ComparisonMetric::SafetyScore),
            best_for_investment: winner_of(ComparisonMetric::AppreciationRate),
            most_affordable: winner_of(ComparisonMetric::AvgPricePerSqft),
            best_connectivity: winner_of(ComparisonMetric::ConnectivityScore),
            best_lifestyle: winner_of(ComparisonMetric::LifestyleScore),
            recommendations: records
                .iter()
                .map(|r| (r.id(), suitability_tags(r)))
                .collect(),
        };

        Ok(ComparisonResult {
            locations: members.keys().cloned().collect(),
            overall_winner: winner_of(ComparisonMetric::OverallScore),
            metrics,
            summary,
        })
    }

    fn compare_metric(
        &self,
        records: &[&LocationRecord],
        metric: ComparisonMetric,
    ) -> MetricComparison {
        let mut scored: Vec<(&LocationRecord, f64)> = records
            .iter()
            .map(|r| (*r, self.metric_value(r, metric)))
            .collect();
        scored.sort_by(|a, b| rank_order(metric, a, b));

        let (best_record, best_value) = scored[0];
        let (min, max) = scored
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));

        MetricComparison {
            metric,
            values: scored.iter().map(|(r, v)| (r.id(), *v)).collect(),
            winner: best_record.id(),
            best_value,
            deltas: scored
                .iter()
                .map(|(r, v)| (r.id(), round2(v - best_value)))
                .collect(),
            spread: round2(max - min),
        }
    }
}

/// Best first: better metric value, then lower price, then identifier.
fn rank_order(
    metric: ComparisonMetric,
    (a, a_value): &(&LocationRecord, f64),
    (b, b_value): &(&LocationRecord, f64),
) -> Ordering {
    let by_value = if metric.higher_is_better() {
        b_value.total_cmp(a_value)
    } else {
        a_value.total_cmp(b_value)
    };
    by_value
        .then_with(|| a.avg_price_per_sqft.total_cmp(&b.avg_price_per_sqft))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Short descriptions of who a location suits best.
#[must_use]
pub fn suitability_tags(record: &LocationRecord) -> Vec<String> {
    let mut tags = Vec::new();
    if record.safety_score >= 9.0 {
        tags.push("Excellent for families with children".to_string());
    }
    if record.appreciation_rate >= 10.0 {
        tags.push("High investment potential".to_string());
    }
    if record.avg_price_per_sqft <= 6000.0 {
        tags.push("Budget-friendly option".to_string());
    }
    if record.lifestyle_score >= 9.0 {
        tags.push("Premium lifestyle destination".to_string());
    }
    if record.connectivity_score >= 9.0 {
        tags.push("Excellent for professionals".to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{analyzer, analyzer_with, record};

    #[test]
    fn satellite_beats_vastrapur_overall() {
        let a = analyzer();
        let result = a
            .compare_locations(&["Satellite, Ahmedabad", "Vastrapur, Ahmedabad"])
            .unwrap();
        assert_eq!(result.overall_winner.as_str(), "Satellite, Ahmedabad");
        assert_eq!(result.summary.most_affordable.as_str(), "Satellite, Ahmedabad");
        assert_eq!(result.metrics.len(), ComparisonMetric::all().len());
    }

    #[test]
    fn result_is_independent_of_input_order() {
        let a = analyzer();
        let names = ["Kudasan", "Satellite, Ahmedabad", "Maninagar"];
        let forward = a.compare_locations(&names).unwrap();
        let mut reversed = names;
        reversed.reverse();
        let backward = a.compare_locations(&reversed).unwrap();
        assert_eq!(forward, backward);

        let ids: Vec<&str> = forward.locations.iter().map(LocationId::as_str).collect();
        assert_eq!(ids, ["Kudasan, Gandhinagar", "Maninagar, Ahmedabad", "Satellite, Ahmedabad"]);
    }

    #[test]
    fn fewer_than_two_locations_is_invalid() {
        let a = analyzer();
        assert!(matches!(
            a.compare_locations(&["Satellite"]).unwrap_err(),
            AnalyticsError::InvalidInput { .. }
        ));
        assert!(matches!(
            a.compare_locations::<&str>(&[]).unwrap_err(),
            AnalyticsError::InvalidInput { .. }
        ));
        assert!(matches!(
            a.compare_locations(&["Satellite", "satellite, ahmedabad"]).unwrap_err(),
            AnalyticsError::InvalidInput { .. }
        ));
    }

    #[test]
    fn unknown_member_is_not_found() {
        let a = analyzer();
        match a.compare_locations(&["Satellite", "Nonexistent, City"]).unwrap_err() {
            AnalyticsError::NotFound { identifier } => assert_eq!(identifier, "Nonexistent, City"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn ties_go_to_lower_price_then_identifier() {
        let mut dear = record("Alpha", "Town");
        dear.avg_price_per_sqft = 6000.0;
        let cheap = record("Beta", "Town");
        let same = record("Gamma", "Town");
        let a = analyzer_with(vec![dear, cheap, same]);

        let result = a.compare_locations(&["Alpha, Town", "Beta, Town"]).unwrap();
        let safety = result
            .metrics
            .iter()
            .find(|m| m.metric == ComparisonMetric::SafetyScore)
            .unwrap();
        assert_eq!(safety.winner.as_str(), "Beta, Town");
        assert!(safety.spread.abs() < f64::EPSILON);

        let result = a.compare_locations(&["Gamma, Town", "Beta, Town"]).unwrap();
        assert_eq!(result.overall_winner.as_str(), "Beta, Town");
    }

    #[test]
    fn lower_is_better_for_traffic_and_price() {
        let a = analyzer();
        let result = a.compare_locations(&["Sector 21", "Maninagar"]).unwrap();
        let traffic = result
            .metrics
            .iter()
            .find(|m| m.metric == ComparisonMetric::TrafficScore)
            .unwrap();
        assert_eq!(traffic.winner.as_str(), "Sector 21, Gandhinagar");
        assert!(traffic.deltas.values().all(|d| *d >= 0.0));

        let price = result
            .metrics
            .iter()
            .find(|m| m.metric == ComparisonMetric::AvgPricePerSqft)
            .unwrap();
        assert_eq!(price.winner.as_str(), "Maninagar, Ahmedabad");
    }

    #[test]
    fn summary_tags_follow_thresholds() {
        let mut r = record("Probe", "Town");
        r.safety_score = 9.5;
        r.appreciation_rate = 10.0;
        r.avg_price_per_sqft = 7000.0;
        let tags = suitability_tags(&r);
        assert_eq!(
            tags,
            ["Excellent for families with children", "High investment potential"]
        );
    }
}
