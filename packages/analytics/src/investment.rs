//! Investment returns, projections and market trend assessment.

use realty_analytics_models::{
    ComparableLocation, InvestmentAnalysis, InvestmentReturns, MarketOutlook, MarketTrends,
    ProjectionYear, Recommendation, RecommendationThresholds, RiskLevel, ScoringConfig,
};
use realty_location_models::{FutureGrowth, LocationRecord};

use crate::metrics::{assess_risk, investment_score};
use crate::{AnalyticsError, Analyzer, round2};

/// Rejects principals that are not positive finite amounts.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidInput`] for zero, negative or
/// non-finite values.
pub fn validate_principal(principal: f64) -> Result<(), AnalyticsError> {
    if principal.is_finite() && principal > 0.0 {
        Ok(())
    } else {
        Err(AnalyticsError::invalid(format!(
            "investment amount must be a positive number (got {principal})"
        )))
    }
}

/// Recommendation for an ROI percentage at a given risk level.
#[must_use]
pub fn recommendation_for(
    roi_percentage: f64,
    risk: RiskLevel,
    thresholds: &RecommendationThresholds,
) -> Recommendation {
    if roi_percentage > thresholds.highly_recommended_roi && risk == RiskLevel::Low {
        Recommendation::HighlyRecommended
    } else if roi_percentage > thresholds.recommended_roi && risk != RiskLevel::High {
        Recommendation::Recommended
    } else if roi_percentage > thresholds.caution_roi {
        Recommendation::ConsiderWithCaution
    } else {
        Recommendation::NotRecommended
    }
}

/// Return figures for investing `principal` in `record`.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidInput`] if `principal` is not a
/// positive finite amount.
pub fn compute_investment_analysis(
    record: &LocationRecord,
    principal: f64,
    config: &ScoringConfig,
) -> Result<InvestmentReturns, AnalyticsError> {
    validate_principal(principal)?;

    let annual_rent = principal * record.rental_yield / 100.0;
    let appreciation = principal * record.appreciation_rate / 100.0;
    let total = annual_rent + appreciation;
    let roi_percentage = total / principal * 100.0;
    let payback = (annual_rent > 0.0).then(|| round2(principal / annual_rent));

    let risk = assess_risk(record, &config.risk);
    let recommendation = recommendation_for(
        round2(roi_percentage),
        risk.level,
        &config.recommendation,
    );

    Ok(InvestmentReturns {
        investment_amount: principal,
        area_purchased_sqft: round2(principal / record.avg_price_per_sqft),
        rental_yield_amount: round2(annual_rent),
        monthly_rental_income: round2(annual_rent / 12.0),
        appreciation_amount: round2(appreciation),
        total_annual_return: round2(total),
        roi_percentage: round2(roi_percentage),
        payback_period_years: payback,
        risk_level: risk.level,
        risk_factors: risk.factors,
        recommendation,
    })
}

/// Year-by-year projection with compounding appreciation. Rent for a year
/// is the yield on the property value at the start of that year.
#[must_use]
pub fn project(record: &LocationRecord, principal: f64, years: u32) -> Vec<ProjectionYear> {
    let growth = 1.0 + record.appreciation_rate / 100.0;
    let mut value = principal;
    let mut cumulative_rent = 0.0;

    (1..=years)
        .map(|year| {
            let rent = value * record.rental_yield / 100.0;
            value *= growth;
            cumulative_rent += rent;
            let total_return = value - principal + cumulative_rent;
            ProjectionYear {
                year,
                property_value: round2(value),
                rental_income: round2(rent),
                cumulative_rental_income: round2(cumulative_rent),
                total_return: round2(total_return),
                cumulative_roi_percentage: round2(total_return / principal * 100.0),
            }
        })
        .collect()
}

fn score_points(score: f64) -> u32 {
    if score > 8.0 {
        2
    } else if score > 6.0 {
        1
    } else {
        0
    }
}

/// Factors expected to drive price growth.
#[must_use]
pub fn growth_drivers(record: &LocationRecord) -> Vec<String> {
    let mut drivers = Vec::new();
    if record.metro.available {
        drivers.push("Metro connectivity".to_string());
    }
    if record.infrastructure_score > 8.0 {
        drivers.push("Excellent infrastructure".to_string());
    }
    if record.schools > 15 {
        drivers.push("Educational hub".to_string());
    }
    if record.connectivity_score > 8.0 {
        drivers.push("Strategic location".to_string());
    }
    if record.lifestyle_score > 8.0 {
        drivers.push("Premium lifestyle amenities".to_string());
    }
    drivers
}

/// Outlook from future growth, infrastructure and connectivity.
#[must_use]
pub fn market_trends(record: &LocationRecord) -> MarketTrends {
    let growth_points = match record.future_growth {
        FutureGrowth::High => 3,
        FutureGrowth::Medium => 2,
        FutureGrowth::Low => 1,
    };
    let trend_score = growth_points
        + score_points(record.infrastructure_score)
        + score_points(record.connectivity_score);

    let (market_outlook, forecast) = match trend_score {
        6.. => (MarketOutlook::VeryPositive, "15-20% over next 3 years"),
        4..=5 => (MarketOutlook::Positive, "10-15% over next 3 years"),
        2..=3 => (MarketOutlook::Stable, "5-10% over next 3 years"),
        _ => (MarketOutlook::Uncertain, "0-5% over next 3 years"),
    };

    MarketTrends {
        market_outlook,
        price_growth_forecast: forecast.to_string(),
        trend_score,
        key_drivers: growth_drivers(record),
    }
}

impl Analyzer {
    /// Return figures for `principal` under the active configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidInput`] for a non-positive principal.
    pub fn compute_investment_analysis(
        &self,
        record: &LocationRecord,
        principal: f64,
    ) -> Result<InvestmentReturns, AnalyticsError> {
        compute_investment_analysis(record, principal, self.config())
    }

    /// Other locations priced within the configured band of `record`, in
    /// identifier order.
    #[must_use]
    pub fn comparable_locations(&self, record: &LocationRecord) -> Vec<ComparableLocation> {
        let defaults = &self.config().defaults;
        let price = record.avg_price_per_sqft;
        let lower = price * (1.0 - defaults.comparable_price_band);
        let upper = price * (1.0 + defaults.comparable_price_band);
        let id = record.id();

        self.dataset()
            .iter()
            .filter(|r| r.id() != id && (lower..=upper).contains(&r.avg_price_per_sqft))
            .take(defaults.comparable_limit)
            .map(|r| ComparableLocation {
                location: r.id(),
                price_per_sqft: r.avg_price_per_sqft,
                rental_yield: r.rental_yield,
                appreciation_rate: r.appreciation_rate,
                investment_score: investment_score(r, self.config()),
            })
            .collect()
    }

    /// Full investment analysis for a location.
    ///
    /// `principal` defaults to the configured amount and `horizon_years` to
    /// the configured projection length.
    ///
    /// # Errors
    ///
    /// * [`AnalyticsError::InvalidInput`] for a non-positive principal or a
    ///   horizon outside `1..=max_horizon_years`.
    /// * [`AnalyticsError::NotFound`] / [`AnalyticsError::Ambiguous`] if
    ///   the location does not resolve.
    pub fn investment_analysis(
        &self,
        query: &str,
        principal: Option<f64>,
        horizon_years: Option<u32>,
    ) -> Result<InvestmentAnalysis, AnalyticsError> {
        let defaults = &self.config().defaults;
        let principal = principal.unwrap_or(defaults.principal);
        validate_principal(principal)?;

        let horizon = horizon_years.unwrap_or(defaults.horizon_years);
        if horizon == 0 || horizon > defaults.max_horizon_years {
            return Err(AnalyticsError::invalid(format!(
                "projection horizon must be between 1 and {} years (got {horizon})",
                defaults.max_horizon_years
            )));
        }

        let record = self.resolve(query)?;
        log::debug!("investment_analysis: {} principal={principal}", record.id());

        Ok(InvestmentAnalysis {
            location: record.id(),
            analysis: self.compute_investment_analysis(record, principal)?,
            projection: project(record, principal, horizon),
            market_trends: market_trends(record),
            comparable_locations: self.comparable_locations(record),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::test_support::{analyzer, record};

    #[test]
    fn returns_scale_linearly_with_principal() {
        let config = config::embedded();
        let r = record("Probe", "Town");
        let base = compute_investment_analysis(&r, 1_000_000.0, &config).unwrap();
        for factor in [2.0, 5.0, 10.0] {
            let scaled = compute_investment_analysis(&r, 1_000_000.0 * factor, &config).unwrap();
            assert!((scaled.rental_yield_amount - base.rental_yield_amount * factor).abs() < 0.05);
            assert!((scaled.appreciation_amount - base.appreciation_amount * factor).abs() < 0.05);
            assert!((scaled.total_annual_return - base.total_annual_return * factor).abs() < 0.05);
            assert!((scaled.roi_percentage - base.roi_percentage).abs() < f64::EPSILON);
            assert_eq!(scaled.risk_level, base.risk_level);
        }
    }

    #[test]
    fn computes_expected_amounts() {
        let config = config::embedded();
        let r = record("Probe", "Town");
        let returns = compute_investment_analysis(&r, 10_000_000.0, &config).unwrap();
        assert!((returns.rental_yield_amount - 400_000.0).abs() < f64::EPSILON);
        assert!((returns.appreciation_amount - 800_000.0).abs() < f64::EPSILON);
        assert!((returns.roi_percentage - 12.0).abs() < f64::EPSILON);
        assert!((returns.area_purchased_sqft - 2_000.0).abs() < f64::EPSILON);
        assert_eq!(returns.payback_period_years, Some(25.0));
        assert_eq!(returns.risk_level, RiskLevel::Low);
        assert_eq!(returns.recommendation, Recommendation::Recommended);
    }

    #[test]
    fn rejects_non_positive_principal() {
        let config = config::embedded();
        let r = record("Probe", "Town");
        for principal in [-5.0, 0.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                compute_investment_analysis(&r, principal, &config).unwrap_err(),
                AnalyticsError::InvalidInput { .. }
            ));
        }
    }

    #[test]
    fn zero_yield_has_no_payback() {
        let config = config::embedded();
        let mut r = record("Probe", "Town");
        r.rental_yield = 0.0;
        let returns = compute_investment_analysis(&r, 1_000.0, &config).unwrap();
        assert_eq!(returns.payback_period_years, None);
    }

    #[test]
    fn recommendation_thresholds() {
        let t = config::embedded().recommendation;
        assert_eq!(recommendation_for(13.0, RiskLevel::Low, &t), Recommendation::HighlyRecommended);
        assert_eq!(recommendation_for(13.0, RiskLevel::Medium, &t), Recommendation::Recommended);
        assert_eq!(recommendation_for(13.0, RiskLevel::High, &t), Recommendation::ConsiderWithCaution);
        assert_eq!(recommendation_for(9.0, RiskLevel::Low, &t), Recommendation::ConsiderWithCaution);
        assert_eq!(recommendation_for(8.0, RiskLevel::Low, &t), Recommendation::NotRecommended);
    }

    #[test]
    fn projection_compounds_appreciation() {
        let mut r = record("Probe", "Town");
        r.appreciation_rate = 10.0;
        r.rental_yield = 5.0;
        let years = project(&r, 1_000.0, 3);
        assert_eq!(years.len(), 3);
        assert!((years[0].property_value - 1_100.0).abs() < 1e-9);
        assert!((years[1].property_value - 1_210.0).abs() < 1e-9);
        assert!((years[1].rental_income - 55.0).abs() < 1e-9);
        assert!((years[2].cumulative_rental_income - 165.5).abs() < 1e-9);
        assert!(years.windows(2).all(|w| w[1].total_return > w[0].total_return));
    }

    #[test]
    fn market_trend_buckets() {
        let mut r = record("Probe", "Town");
        r.future_growth = FutureGrowth::High;
        r.infrastructure_score = 9.0;
        r.connectivity_score = 9.0;
        let trends = market_trends(&r);
        assert_eq!(trends.trend_score, 7);
        assert_eq!(trends.market_outlook, MarketOutlook::VeryPositive);

        r.future_growth = FutureGrowth::Low;
        r.infrastructure_score = 5.0;
        r.connectivity_score = 5.0;
        let trends = market_trends(&r);
        assert_eq!(trends.trend_score, 1);
        assert_eq!(trends.market_outlook, MarketOutlook::Uncertain);
        assert!(trends.key_drivers.is_empty());
    }

    #[test]
    fn analysis_rejects_bad_horizon_and_principal() {
        let a = analyzer();
        assert!(matches!(
            a.investment_analysis("Satellite", Some(-5.0), None).unwrap_err(),
            AnalyticsError::InvalidInput { .. }
        ));
        assert!(matches!(
            a.investment_analysis("Satellite", None, Some(0)).unwrap_err(),
            AnalyticsError::InvalidInput { .. }
        ));
        assert!(matches!(
            a.investment_analysis("Nonexistent, City", None, None).unwrap_err(),
            AnalyticsError::NotFound { .. }
        ));
    }

    #[test]
    fn analysis_includes_comparables_within_band() {
        let a = analyzer();
        let analysis = a.investment_analysis("Satellite, Ahmedabad", None, None).unwrap();
        assert_eq!(analysis.projection.len(), 5);
        assert!(analysis.comparable_locations.len() <= 3);
        for c in &analysis.comparable_locations {
            assert_ne!(c.location.as_str(), "Satellite, Ahmedabad");
            assert!((5_200.0..=7_800.0).contains(&c.price_per_sqft));
        }
    }
}
