//! Ranked top picks under optional budget, city and score filters.

use realty_analytics_models::{RankCriterion, TopPick, TopPicksCriteria, TopPicksResult};
use realty_location_models::LocationRecord;

use crate::metrics::{affordability_index, investment_attractiveness, investment_score, livability_score};
use crate::{AnalyticsError, Analyzer, round2};

/// Up to three notable features of a location.
#[must_use]
pub fn key_highlights(record: &LocationRecord) -> Vec<String> {
    let mut highlights = Vec::new();
    if record.safety_score >= 9.0 {
        highlights.push(format!("Excellent Safety Score: {}/10", record.safety_score));
    }
    if record.metro.available {
        highlights.push("Metro Connectivity Available".to_string());
    }
    if record.appreciation_rate >= 10.0 {
        highlights.push(format!("High Appreciation: {}%", record.appreciation_rate));
    }
    if record.schools >= 15 {
        highlights.push("Educational Hub".to_string());
    }
    if record.lifestyle_score >= 9.0 {
        highlights.push("Premium Lifestyle Amenities".to_string());
    }
    highlights.truncate(3);
    highlights
}

fn validate_criteria(criteria: &TopPicksCriteria) -> Result<(), AnalyticsError> {
    if criteria.limit == Some(0) {
        return Err(AnalyticsError::invalid("limit must be at least 1"));
    }
    if let Some(budget) = criteria.budget_max
        && !(budget.is_finite() && budget > 0.0)
    {
        return Err(AnalyticsError::invalid(format!(
            "budget_max must be a positive number (got {budget})"
        )));
    }
    if let Some(min) = criteria.min_overall_score
        && !min.is_finite()
    {
        return Err(AnalyticsError::invalid("min_overall_score must be a number"));
    }
    Ok(())
}

impl Analyzer {
    /// Value of the ranking criterion for `record`, rounded to two decimals.
    #[must_use]
    pub fn rank_score(&self, record: &LocationRecord, criterion: RankCriterion) -> f64 {
        match criterion {
            RankCriterion::Overall => self.overall_score(record),
            RankCriterion::Investment => {
                investment_attractiveness(record, investment_score(record, self.config()))
            }
            RankCriterion::Safety => round2(record.safety_score),
            RankCriterion::Affordability => {
                affordability_index(record.avg_price_per_sqft, self.dataset().price_bounds())
            }
            RankCriterion::Lifestyle => round2(record.lifestyle_score),
            RankCriterion::Connectivity => round2(record.connectivity_score),
            RankCriterion::Livability => livability_score(record),
        }
    }

    /// Locations passing every supplied filter, best first by
    /// `criteria.rank_by`, at most `limit` of them. An empty result is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidInput`] for a zero limit, a
    /// non-positive budget or a non-finite minimum score.
    pub fn top_picks(&self, criteria: &TopPicksCriteria) -> Result<TopPicksResult, AnalyticsError> {
        validate_criteria(criteria)?;
        let limit = criteria
            .limit
            .unwrap_or(self.config().defaults.top_picks_limit);
        let city = criteria.city.as_deref().map(str::trim).filter(|c| !c.is_empty());

        let mut candidates: Vec<(&LocationRecord, f64)> = self
            .dataset()
            .search(|r| {
                criteria.budget_max.is_none_or(|max| r.avg_price_per_sqft <= max)
                    && city.is_none_or(|c| r.city.eq_ignore_ascii_case(c))
                    && criteria
                        .min_overall_score
                        .is_none_or(|min| self.overall_score(r) >= min)
            })
            .into_iter()
            .map(|r| (r, self.rank_score(r, criteria.rank_by)))
            .collect();

        candidates.sort_by(|(a, a_score), (b, b_score)| {
            b_score
                .total_cmp(a_score)
                .then_with(|| a.avg_price_per_sqft.total_cmp(&b.avg_price_per_sqft))
                .then_with(|| a.id().cmp(&b.id()))
        });

        let total_found = candidates.len();
        let locations = candidates
            .into_iter()
            .take(limit)
            .map(|(r, score)| TopPick {
                location: r.id(),
                city: r.city.clone(),
                score,
                overall_score: self.overall_score(r),
                price_per_sqft: r.avg_price_per_sqft,
                key_highlights: key_highlights(r),
            })
            .collect();

        log::debug!(
            "top_picks: rank_by={} found={total_found} limit={limit}",
            criteria.rank_by
        );

        Ok(TopPicksResult {
            criteria: criteria.rank_by,
            total_found,
            locations,
        })
    }
}
