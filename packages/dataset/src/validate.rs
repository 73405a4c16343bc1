//! Load-time invariant checks for location records.

use realty_location_models::{Category, LocationRecord, SCORE_MAX, SCORE_MIN};

use crate::DatasetError;

/// Checks every invariant a record must satisfy before it can enter the
/// table.
pub(crate) fn validate_record(record: &LocationRecord) -> Result<(), DatasetError> {
    let fail = |message: String| DatasetError::DataIntegrity {
        location: display_name(record),
        message,
    };

    if record.area.trim().is_empty() {
        return Err(fail("area must not be empty".to_string()));
    }
    if record.city.trim().is_empty() {
        return Err(fail("city must not be empty".to_string()));
    }

    let id = record.id();
    if let Some(location) = &record.location
        && location.trim() != id.as_str()
    {
        return Err(fail(format!(
            "location \"{location}\" does not match area and city (expected \"{id}\")"
        )));
    }

    for category in Category::all() {
        let value = record.raw_score(*category);
        if !value.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&value) {
            return Err(fail(format!(
                "{} = {value} is outside [{SCORE_MIN}, {SCORE_MAX}]",
                category.field_name()
            )));
        }
    }

    if !record.avg_price_per_sqft.is_finite() || record.avg_price_per_sqft <= 0.0 {
        return Err(fail(format!(
            "avg_price_per_sqft = {} must be positive",
            record.avg_price_per_sqft
        )));
    }

    if !record.rental_yield.is_finite() || !(0.0..=100.0).contains(&record.rental_yield) {
        return Err(fail(format!(
            "rental_yield = {} is outside [0, 100]",
            record.rental_yield
        )));
    }

    if !record.appreciation_rate.is_finite()
        || !(-100.0..=100.0).contains(&record.appreciation_rate)
    {
        return Err(fail(format!(
            "appreciation_rate = {} is outside [-100, 100]",
            record.appreciation_rate
        )));
    }

    if let Some(distance) = record.metro.distance_km
        && (!distance.is_finite() || distance < 0.0)
    {
        return Err(fail(format!(
            "metro.distance_km = {distance} must be non-negative"
        )));
    }

    Ok(())
}

fn display_name(record: &LocationRecord) -> String {
    record.location.clone().unwrap_or_else(|| {
        if record.area.trim().is_empty() && record.city.trim().is_empty() {
            "<unnamed>".to_string()
        } else {
            record.id().to_string()
        }
    })
}
