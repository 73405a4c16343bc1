//! Market-wide trends and dataset statistics.

use std::collections::BTreeMap;

use realty_analytics_models::{
    DataOverview, GrowthAnalysis, InfrastructureStatistics, InvestmentStatistics, MarketOverview,
    MarketTrendsReport, PriceStatistics, SafetyDistribution, SafetyStatistics, ScoredLocation,
    Statistics, ValueRange,
};
use realty_location_models::{FutureGrowth, LocationId, LocationRecord};

use crate::metrics::investment_score;
use crate::{AnalyticsError, Analyzer, round1, round2};

const TOP_N: usize = 3;

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

/// Sample standard deviation; zero for fewer than two values.
#[allow(clippy::cast_precision_loss)]
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Identifier of the record maximizing `key`; the first in identifier
/// order wins ties.
fn arg_max<F>(records: &[&LocationRecord], key: F) -> Option<LocationId>
where
    F: Fn(&LocationRecord) -> f64,
{
    records
        .iter()
        .copied()
        .fold(None::<(&LocationRecord, f64)>, |best, r| {
            let value = key(r);
            match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((r, value)),
            }
        })
        .map(|(r, _)| r.id())
}

/// Top `n` records by `key`, descending, ties by identifier.
fn top_by<F>(records: &[&LocationRecord], n: usize, descending: bool, key: F) -> Vec<ScoredLocation>
where
    F: Fn(&LocationRecord) -> f64,
{
    let mut scored: Vec<(LocationId, f64)> = records
        .iter()
        .copied()
        .map(|r| (r.id(), key(r)))
        .collect();
    scored.sort_by(|(a_id, a), (b_id, b)| {
        let by_value = if descending { b.total_cmp(a) } else { a.total_cmp(b) };
        by_value.then_with(|| a_id.cmp(b_id))
    });
    scored
        .into_iter()
        .take(n)
        .map(|(location, value)| ScoredLocation {
            location,
            value: round2(value),
        })
        .collect()
}

fn unwrap_id(id: Option<LocationId>) -> Result<LocationId, AnalyticsError> {
    id.ok_or_else(|| AnalyticsError::invalid("dataset is empty"))
}

impl Analyzer {
    /// Records in `city`, or every record when `city` is absent or blank.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NotFound`] if the city has no locations.
    pub fn records_in(&self, city: Option<&str>) -> Result<Vec<&LocationRecord>, AnalyticsError> {
        match city.map(str::trim).filter(|c| !c.is_empty()) {
            None => Ok(self.dataset().iter().collect()),
            Some(c) => {
                let records = self.dataset().in_city(c);
                if records.is_empty() {
                    Err(AnalyticsError::NotFound {
                        identifier: c.to_string(),
                    })
                } else {
                    Ok(records)
                }
            }
        }
    }

    /// Market overview, growth breakdown and top-3 listings, optionally
    /// restricted to one city.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NotFound`] for a city with no locations.
    pub fn market_trends_report(
        &self,
        city: Option<&str>,
    ) -> Result<MarketTrendsReport, AnalyticsError> {
        let records = self.records_in(city)?;
        let prices: Vec<f64> = records.iter().map(|r| r.avg_price_per_sqft).collect();
        let safety: Vec<f64> = records.iter().map(|r| r.safety_score).collect();
        let yields: Vec<f64> = records.iter().map(|r| r.rental_yield).collect();
        let appreciation: Vec<f64> = records.iter().map(|r| r.appreciation_rate).collect();
        let growth_count =
            |g: FutureGrowth| records.iter().filter(|r| r.future_growth == g).count();

        Ok(MarketTrendsReport {
            city: city
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string),
            market_overview: MarketOverview {
                total_locations: records.len(),
                avg_price_per_sqft: round2(mean(&prices)),
                price_range: ValueRange {
                    min: prices.iter().copied().fold(f64::MAX, f64::min),
                    max: prices.iter().copied().fold(f64::MIN, f64::max),
                },
                avg_safety_score: round2(mean(&safety)),
                avg_rental_yield: round2(mean(&yields)),
            },
            growth_analysis: GrowthAnalysis {
                high_growth_areas: growth_count(FutureGrowth::High),
                medium_growth_areas: growth_count(FutureGrowth::Medium),
                low_growth_areas: growth_count(FutureGrowth::Low),
                avg_appreciation_rate: round2(mean(&appreciation)),
            },
            investment_hotspots: top_by(&records, TOP_N, true, |r| {
                investment_score(r, self.config())
            }),
            most_affordable: top_by(&records, TOP_N, false, |r| r.avg_price_per_sqft),
            safest_areas: top_by(&records, TOP_N, true, |r| r.safety_score),
        })
    }

    /// Dataset-wide statistics.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidInput`] if the table is empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn statistics(&self) -> Result<Statistics, AnalyticsError> {
        let records: Vec<&LocationRecord> = self.dataset().iter().collect();
        let prices: Vec<f64> = records.iter().map(|r| r.avg_price_per_sqft).collect();
        let safety: Vec<f64> = records.iter().map(|r| r.safety_score).collect();
        let yields: Vec<f64> = records.iter().map(|r| r.rental_yield).collect();
        let appreciation: Vec<f64> = records.iter().map(|r| r.appreciation_rate).collect();
        let schools: Vec<f64> = records.iter().map(|r| f64::from(r.schools)).collect();
        let hospitals: Vec<f64> = records.iter().map(|r| f64::from(r.hospitals)).collect();

        let mut city_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        for r in &records {
            *city_breakdown.entry(r.city.clone()).or_default() += 1;
        }

        let band = |lo: f64, hi: f64| {
            safety.iter().filter(|s| **s >= lo && **s < hi).count()
        };

        Ok(Statistics {
            data_overview: DataOverview {
                total_locations: records.len(),
                cities: city_breakdown.len(),
                city_breakdown,
            },
            price_statistics: PriceStatistics {
                average_price_per_sqft: round2(mean(&prices)),
                median_price_per_sqft: round2(median(&prices)),
                price_std_dev: round2(sample_std_dev(&prices)),
                most_expensive: unwrap_id(arg_max(&records, |r| r.avg_price_per_sqft))?,
                most_affordable: unwrap_id(arg_max(&records, |r| -r.avg_price_per_sqft))?,
            },
            safety_statistics: SafetyStatistics {
                average_safety_score: round2(mean(&safety)),
                safest_location: unwrap_id(arg_max(&records, |r| r.safety_score))?,
                safety_distribution: SafetyDistribution {
                    excellent_9_plus: band(9.0, f64::INFINITY),
                    good_7_to_9: band(7.0, 9.0),
                    average_5_to_7: band(5.0, 7.0),
                    below_average_less_5: band(f64::NEG_INFINITY, 5.0),
                },
            },
            investment_statistics: InvestmentStatistics {
                average_rental_yield: round2(mean(&yields)),
                average_appreciation_rate: round2(mean(&appreciation)),
                best_rental_yield: unwrap_id(arg_max(&records, |r| r.rental_yield))?,
                best_appreciation: unwrap_id(arg_max(&records, |r| r.appreciation_rate))?,
            },
            infrastructure: InfrastructureStatistics {
                locations_with_metro: records.iter().filter(|r| r.metro.available).count(),
                average_schools: round1(mean(&schools)),
                average_hospitals: round1(mean(&hospitals)),
                most_schools: unwrap_id(arg_max(&records, |r| f64::from(r.schools)))?,
                most_hospitals: unwrap_id(arg_max(&records, |r| f64::from(r.hospitals)))?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::analyzer;

    #[test]
    fn median_and_std_dev() {
        assert!((median(&[3.0, 1.0, 2.0]) - 2.0).abs() < f64::EPSILON);
        assert!((median(&[4.0, 1.0, 2.0, 3.0]) - 2.5).abs() < f64::EPSILON);
        assert!((sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.138).abs() < 1e-3);
        assert!(sample_std_dev(&[5.0]).abs() < f64::EPSILON);
    }

    #[test]
    fn trends_for_whole_dataset() {
        let a = analyzer();
        let report = a.market_trends_report(None).unwrap();
        assert_eq!(report.market_overview.total_locations, a.dataset().len());
        assert_eq!(report.investment_hotspots.len(), 3);
        assert_eq!(report.most_affordable[0].location.as_str(), "Chandkheda, Ahmedabad");
        assert_eq!(report.safest_areas[0].location.as_str(), "Sector 21, Gandhinagar");
        let g = &report.growth_analysis;
        assert_eq!(
            g.high_growth_areas + g.medium_growth_areas + g.low_growth_areas,
            a.dataset().len()
        );
    }

    #[test]
    fn trends_for_city_and_unknown_city() {
        let a = analyzer();
        let report = a.market_trends_report(Some("gandhinagar")).unwrap();
        assert_eq!(report.market_overview.total_locations, 2);
        assert!(matches!(
            a.market_trends_report(Some("Atlantis")).unwrap_err(),
            AnalyticsError::NotFound { .. }
        ));
    }

    #[test]
    fn statistics_cover_dataset() {
        let a = analyzer();
        let stats = a.statistics().unwrap();
        assert_eq!(stats.data_overview.total_locations, 8);
        assert_eq!(stats.data_overview.cities, 2);
        assert_eq!(stats.price_statistics.most_expensive.as_str(), "Bodakdev, Ahmedabad");
        assert_eq!(stats.price_statistics.most_affordable.as_str(), "Chandkheda, Ahmedabad");
        assert_eq!(stats.investment_statistics.best_appreciation.as_str(), "Kudasan, Gandhinagar");
        let d = &stats.safety_statistics.safety_distribution;
        assert_eq!(
            d.excellent_9_plus + d.good_7_to_9 + d.average_5_to_7 + d.below_average_less_5,
            8
        );
    }
}
