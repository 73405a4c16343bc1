//! Multi-criteria search over the dataset.

use std::str::FromStr as _;

use realty_analytics_models::{SearchFilters, SearchResult, SearchSortKey};
use realty_location_models::{FutureGrowth, LocationRecord};

use crate::metrics::investment_score;
use crate::{AnalyticsError, Analyzer, round2};

fn parse_growth(value: Option<&str>) -> Result<Option<FutureGrowth>, AnalyticsError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("any") => Ok(None),
        Some(v) => FutureGrowth::from_str(v).map(Some).map_err(|_| {
            AnalyticsError::invalid(format!(
                "future_growth must be one of High, Medium, Low or Any (got \"{v}\")"
            ))
        }),
    }
}

impl Analyzer {
    fn sort_value(&self, record: &LocationRecord, key: SearchSortKey) -> f64 {
        match key {
            SearchSortKey::InvestmentScore => investment_score(record, self.config()),
            SearchSortKey::OverallScore => self.overall_score(record),
            SearchSortKey::SafetyScore => round2(record.safety_score),
            SearchSortKey::ConnectivityScore => round2(record.connectivity_score),
            SearchSortKey::RentalYield => round2(record.rental_yield),
            SearchSortKey::AppreciationRate => round2(record.appreciation_rate),
            SearchSortKey::Schools => f64::from(record.schools),
        }
    }

    /// Locations matching every supplied filter, sorted descending by
    /// `filters.sort_by`. The limit defaults to the configured value and is
    /// capped at the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidInput`] for a zero limit or an
    /// unknown growth value.
    pub fn advanced_search(&self, filters: &SearchFilters) -> Result<SearchResult, AnalyticsError> {
        let defaults = &self.config().defaults;
        if filters.limit == Some(0) {
            return Err(AnalyticsError::invalid("limit must be at least 1"));
        }
        let limit = filters
            .limit
            .unwrap_or(defaults.search_limit)
            .min(defaults.max_search_limit);
        let growth = parse_growth(filters.future_growth.as_deref())?;
        let city = filters.city.as_deref().map(str::trim).filter(|c| !c.is_empty());

        let mut matches: Vec<(&LocationRecord, f64)> = self
            .dataset()
            .search(|r| {
                filters.min_safety_score.is_none_or(|v| r.safety_score >= v)
                    && filters.max_traffic_score.is_none_or(|v| r.traffic_score <= v)
                    && filters.min_schools.is_none_or(|v| r.schools >= v)
                    && filters.min_hospitals.is_none_or(|v| r.hospitals >= v)
                    && filters.max_price_per_sqft.is_none_or(|v| r.avg_price_per_sqft <= v)
                    && filters.min_rental_yield.is_none_or(|v| r.rental_yield >= v)
                    && growth.is_none_or(|g| r.future_growth == g)
                    && city.is_none_or(|c| r.city.eq_ignore_ascii_case(c))
                    && (!filters.metro_required || r.metro.available)
            })
            .into_iter()
            .map(|r| (r, self.sort_value(r, filters.sort_by)))
            .collect();

        matches.sort_by(|(a, a_value), (b, b_value)| {
            b_value
                .total_cmp(a_value)
                .then_with(|| a.avg_price_per_sqft.total_cmp(&b.avg_price_per_sqft))
                .then_with(|| a.id().cmp(&b.id()))
        });

        let total_found = matches.len();
        Ok(SearchResult {
            total_found,
            filters_applied: filters.clone(),
            results: matches
                .into_iter()
                .take(limit)
                .map(|(r, _)| self.detail(r))
                .collect(),
        })
    }
}
