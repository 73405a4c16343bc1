//! Comprehensive per-location analysis reports.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use realty_analytics_models::{
    AnalysisReport, DetailedRecommendations, MarketPosition, PercentileRankings, ReportMetadata,
};
use realty_location_models::{FutureGrowth, LocationRecord};

use crate::metrics::{investment_attractiveness, investment_score, percentile};
use crate::{AnalyticsError, Analyzer};

/// Version stamped into every report.
pub const REPORT_VERSION: &str = "1.0";

/// Default file name for a report: `analysis_report_<location>_<timestamp>.json`
/// with every non-alphanumeric character of the location replaced by `_`.
#[must_use]
pub fn report_file_name(location: &str, at: DateTime<Utc>) -> String {
    let safe: String = location
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("analysis_report_{safe}_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Whether `name` is a bare `*.json` file name that cannot escape the
/// reports directory.
#[must_use]
pub fn is_safe_report_name(name: &str) -> bool {
    !name.is_empty()
        && name.ends_with(".json")
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Writes `report` as pretty JSON into `dir` under `file_name`, creating
/// the directory if needed.
///
/// # Errors
///
/// * [`AnalyticsError::InvalidInput`] for an unsafe file name.
/// * [`AnalyticsError::Io`] / [`AnalyticsError::Json`] if writing fails.
pub fn write_report(
    dir: &Path,
    file_name: &str,
    report: &AnalysisReport,
) -> Result<PathBuf, AnalyticsError> {
    if !is_safe_report_name(file_name) {
        return Err(AnalyticsError::invalid(format!(
            "invalid report file name \"{file_name}\""
        )));
    }
    std::fs::create_dir_all(dir).map_err(|source| AnalyticsError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json).map_err(|source| AnalyticsError::Io {
        path: path.clone(),
        source,
    })?;
    log::info!("Analysis report exported to {}", path.display());
    Ok(path)
}

/// Audience, strategy, lifestyle and concern notes for a location.
#[must_use]
pub fn detailed_recommendations(record: &LocationRecord) -> DetailedRecommendations {
    let mut rec = DetailedRecommendations::default();

    if record.schools >= 15 && record.safety_score >= 8.0 {
        rec.target_demographics
            .push("Families with school-age children".to_string());
    }
    if record.connectivity_score >= 8.0 {
        rec.target_demographics.push("Working professionals".to_string());
    }
    if record.lifestyle_score >= 8.5 {
        rec.target_demographics
            .push("Affluent individuals seeking premium lifestyle".to_string());
    }

    if record.appreciation_rate >= 10.0 {
        rec.investment_strategy
            .push("Buy and hold for capital appreciation".to_string());
    }
    if record.rental_yield >= 3.5 {
        rec.investment_strategy
            .push("Rental income generation strategy".to_string());
    }
    if record.future_growth == FutureGrowth::High {
        rec.investment_strategy
            .push("Long-term growth investment".to_string());
    }

    if record.metro.available {
        rec.lifestyle_benefits
            .push("Excellent public transportation".to_string());
    }
    if record.environment_score >= 8.0 {
        rec.lifestyle_benefits
            .push("Clean and green environment".to_string());
    }
    if record.malls() >= 2 {
        rec.lifestyle_benefits
            .push("Shopping and entertainment options".to_string());
    }

    if record.traffic_score >= 7.0 {
        rec.potential_concerns
            .push("High traffic congestion during peak hours".to_string());
    }
    if record.avg_price_per_sqft >= 7500.0 {
        rec.potential_concerns
            .push("High property prices may limit affordability".to_string());
    }
    if record.safety_score < 8.0 {
        rec.potential_concerns
            .push("Safety measures may need attention".to_string());
    }

    rec
}

impl Analyzer {
    /// Rank of `record` within its own city on price, safety and investment
    /// attractiveness. Ranks count the city's locations at or below this one.
    #[must_use]
    pub fn market_position(&self, record: &LocationRecord) -> MarketPosition {
        let city = self.dataset().in_city(&record.city);
        let total = city.len();
        let attractiveness =
            |r: &LocationRecord| investment_attractiveness(r, investment_score(r, self.config()));
        let own = attractiveness(record);

        let price_rank = city
            .iter()
            .filter(|r| r.avg_price_per_sqft <= record.avg_price_per_sqft)
            .count();
        let safety_rank = city
            .iter()
            .filter(|r| r.safety_score <= record.safety_score)
            .count();
        let investment_rank = city.iter().filter(|&&r| attractiveness(r) <= own).count();

        MarketPosition {
            city: record.city.clone(),
            total_locations_in_city: total,
            price_rank: format!("{price_rank}/{total}"),
            safety_rank: format!("{safety_rank}/{total}"),
            investment_rank: format!("{investment_rank}/{total}"),
            percentile_rankings: PercentileRankings {
                price: percentile(price_rank, total),
                safety: percentile(safety_rank, total),
                investment: percentile(investment_rank, total),
            },
        }
    }

    /// Builds the full report for a location at the default principal.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the location does not resolve.
    pub fn analysis_report(&self, query: &str) -> Result<AnalysisReport, AnalyticsError> {
        let record = self.resolve(query)?;
        let location = record.id();

        Ok(AnalysisReport {
            report_metadata: ReportMetadata {
                location: location.clone(),
                generated_at: Utc::now(),
                report_version: REPORT_VERSION.to_string(),
            },
            location_overview: self.detail(record),
            investment_analysis: self.investment_analysis(location.as_str(), None, None)?,
            market_position: self.market_position(record),
            recommendations: detailed_recommendations(record),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{analyzer, record};
    use chrono::TimeZone as _;

    #[test]
    fn file_name_is_sanitized() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(
            report_file_name("Satellite, Ahmedabad", at),
            "analysis_report_Satellite__Ahmedabad_20240305_140709.json"
        );
    }

    #[test]
    fn rejects_traversal_names() {
        assert!(is_safe_report_name("analysis_report_x.json"));
        for bad in ["../etc/passwd.json", "a/b.json", "report.txt", "", "..json", "a\\b.json"] {
            assert!(!is_safe_report_name(bad), "{bad}");
        }
    }

    #[test]
    fn report_covers_every_section() {
        let a = analyzer();
        let report = a.analysis_report("Satellite").unwrap();
        assert_eq!(report.report_metadata.location.as_str(), "Satellite, Ahmedabad");
        assert_eq!(report.report_metadata.report_version, REPORT_VERSION);
        assert!(
            (report.investment_analysis.analysis.investment_amount - 10_000_000.0).abs()
                < f64::EPSILON
        );
        assert_eq!(report.market_position.city, "Ahmedabad");
        assert_eq!(report.market_position.total_locations_in_city, 6);
        assert!(
            report
                .recommendations
                .lifestyle_benefits
                .contains(&"Excellent public transportation".to_string())
        );
    }

    #[test]
    fn market_position_ranks_within_city() {
        let a = analyzer();
        let sector = a.get_record("Sector 21, Gandhinagar").unwrap();
        let position = a.market_position(sector);
        assert_eq!(position.total_locations_in_city, 2);
        assert_eq!(position.safety_rank, "2/2");
        assert!((position.percentile_rankings.safety - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn recommendations_flag_concerns() {
        let mut r = record("Probe", "Town");
        r.traffic_score = 8.0;
        r.safety_score = 7.0;
        r.avg_price_per_sqft = 9_000.0;
        let rec = detailed_recommendations(&r);
        assert_eq!(rec.potential_concerns.len(), 3);
    }

    #[test]
    fn writes_report_to_directory() {
        let a = analyzer();
        let report = a.analysis_report("Kudasan").unwrap();
        let dir = std::env::temp_dir().join(format!("realty_reports_{}", std::process::id()));
        let path = write_report(&dir, "kudasan.json", &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Kudasan, Gandhinagar"));
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(
            write_report(&dir, "../escape.json", &report).unwrap_err(),
            AnalyticsError::InvalidInput { .. }
        ));
    }
}
