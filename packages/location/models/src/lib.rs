#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood location record types.
//!
//! These are the canonical, typed rows of the static neighborhood dataset.
//! Every other crate in the workspace reads locations through these types;
//! the dataset crate is responsible for validating them at load time.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Lowest value any category score may take.
pub const SCORE_MIN: f64 = 0.0;

/// Highest value any category score may take.
pub const SCORE_MAX: f64 = 10.0;

/// Stable identifier of a location, rendered as `"{area}, {city}"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    /// Builds the identifier for an area within a city.
    #[must_use]
    pub fn new(area: &str, city: &str) -> Self {
        Self(format!("{}, {}", area.trim(), city.trim()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for LocationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LocationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Expected future growth of a neighborhood.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum FutureGrowth {
    /// Strong expected growth.
    High,
    /// Moderate expected growth.
    Medium,
    /// Little expected growth.
    Low,
}

impl FutureGrowth {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::High, Self::Medium, Self::Low]
    }
}

/// One of the six scored categories that make up the overall score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// Personal safety.
    Safety,
    /// Traffic conditions.
    Traffic,
    /// Connectivity to the rest of the city.
    Connectivity,
    /// Civic infrastructure.
    Infrastructure,
    /// Shopping, dining and leisure.
    Lifestyle,
    /// Green cover and air quality.
    Environment,
}

impl Category {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Safety,
            Self::Traffic,
            Self::Connectivity,
            Self::Infrastructure,
            Self::Lifestyle,
            Self::Environment,
        ]
    }

    /// Name of the raw record field holding this category's score.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Safety => "safety_score",
            Self::Traffic => "traffic_score",
            Self::Connectivity => "connectivity_score",
            Self::Infrastructure => "infrastructure_score",
            Self::Lifestyle => "lifestyle_score",
            Self::Environment => "environment_score",
        }
    }
}

/// Desirability-oriented category scores, each in `[0, 10]` where higher
/// is always better.
///
/// The raw `traffic_score` measures congestion, so it is inverted
/// (`10 - traffic_score`) when building this view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    /// Safety score.
    pub safety: f64,
    /// Traffic ease (inverted congestion).
    pub traffic: f64,
    /// Connectivity score.
    pub connectivity: f64,
    /// Infrastructure score.
    pub infrastructure: f64,
    /// Lifestyle score.
    pub lifestyle: f64,
    /// Environment score.
    pub environment: f64,
}

impl CategoryScores {
    /// Returns the score for a single category.
    #[must_use]
    pub const fn get(&self, category: Category) -> f64 {
        match category {
            Category::Safety => self.safety,
            Category::Traffic => self.traffic,
            Category::Connectivity => self.connectivity,
            Category::Infrastructure => self.infrastructure,
            Category::Lifestyle => self.lifestyle,
            Category::Environment => self.environment,
        }
    }

    /// Returns a copy with one category replaced.
    #[must_use]
    pub fn with(mut self, category: Category, value: f64) -> Self {
        match category {
            Category::Safety => self.safety = value,
            Category::Traffic => self.traffic = value,
            Category::Connectivity => self.connectivity = value,
            Category::Infrastructure => self.infrastructure = value,
            Category::Lifestyle => self.lifestyle = value,
            Category::Environment => self.environment = value,
        }
        self
    }
}

/// Metro rail access for a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metro {
    /// Whether a metro station serves the area.
    pub available: bool,
    /// Nearest station name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    /// Distance to the nearest station in kilometres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Notable amenities in a location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenities {
    /// Major shopping malls.
    #[serde(default)]
    pub malls: Vec<String>,
    /// Parks and recreation grounds.
    #[serde(default)]
    pub parks: Vec<String>,
    /// Approximate number of restaurants.
    #[serde(default)]
    pub restaurants: u32,
}

/// A single neighborhood row of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Display name; must match `"{area}, {city}"` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// City the area belongs to.
    pub city: String,
    /// Area (neighborhood) name.
    pub area: String,
    /// Resident population.
    #[serde(default)]
    pub population: u64,
    /// Residents per square kilometre.
    #[serde(default)]
    pub population_density: u64,
    /// Safety score, 0-10.
    pub safety_score: f64,
    /// Traffic congestion score, 0-10 (lower is better).
    pub traffic_score: f64,
    /// Connectivity score, 0-10.
    pub connectivity_score: f64,
    /// Infrastructure score, 0-10.
    pub infrastructure_score: f64,
    /// Lifestyle score, 0-10.
    pub lifestyle_score: f64,
    /// Environment score, 0-10.
    pub environment_score: f64,
    /// Number of schools.
    #[serde(default)]
    pub schools: u32,
    /// Number of hospitals.
    #[serde(default)]
    pub hospitals: u32,
    /// Expected future growth.
    pub future_growth: FutureGrowth,
    /// Average property price per square foot.
    pub avg_price_per_sqft: f64,
    /// Gross rental yield, percent per year.
    pub rental_yield: f64,
    /// Historical price appreciation, percent per year.
    pub appreciation_rate: f64,
    /// Metro rail access.
    #[serde(default)]
    pub metro: Metro,
    /// Number of city bus routes serving the area.
    #[serde(default)]
    pub bus_routes: u32,
    /// Notable amenities.
    #[serde(default)]
    pub amenities: Amenities,
}

impl LocationRecord {
    /// Returns this record's identifier.
    #[must_use]
    pub fn id(&self) -> LocationId {
        LocationId::new(&self.area, &self.city)
    }

    /// Returns the raw score stored for a category.
    #[must_use]
    pub const fn raw_score(&self, category: Category) -> f64 {
        match category {
            Category::Safety => self.safety_score,
            Category::Traffic => self.traffic_score,
            Category::Connectivity => self.connectivity_score,
            Category::Infrastructure => self.infrastructure_score,
            Category::Lifestyle => self.lifestyle_score,
            Category::Environment => self.environment_score,
        }
    }

    /// Returns the desirability-oriented category scores.
    #[must_use]
    pub fn category_scores(&self) -> CategoryScores {
        CategoryScores {
            safety: self.safety_score,
            traffic: SCORE_MAX - self.traffic_score,
            connectivity: self.connectivity_score,
            infrastructure: self.infrastructure_score,
            lifestyle: self.lifestyle_score,
            environment: self.environment_score,
        }
    }

    /// Number of major malls.
    #[must_use]
    pub fn malls(&self) -> usize {
        self.amenities.malls.len()
    }

    /// Number of parks.
    #[must_use]
    pub fn parks(&self) -> usize {
        self.amenities.parks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "location": "Satellite, Ahmedabad",
            "city": "Ahmedabad",
            "area": "Satellite",
            "population": 120000,
            "population_density": 9800,
            "safety_score": 8.5,
            "traffic_score": 6.8,
            "connectivity_score": 9.1,
            "infrastructure_score": 8.7,
            "lifestyle_score": 8.8,
            "environment_score": 7.5,
            "schools": 18,
            "hospitals": 9,
            "future_growth": "High",
            "avg_price_per_sqft": 6500,
            "rental_yield": 3.2,
            "appreciation_rate": 8.5,
            "metro": { "available": true, "station": "Shyamal", "distance_km": 1.2 },
            "bus_routes": 14,
            "amenities": { "malls": ["Iscon Mega Mall"], "parks": [], "restaurants": 140 }
        }"#
    }

    #[test]
    fn deserializes_full_record() {
        let record: LocationRecord = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(record.id().as_str(), "Satellite, Ahmedabad");
        assert_eq!(record.future_growth, FutureGrowth::High);
        assert!(record.metro.available);
        assert_eq!(record.malls(), 1);
        assert_eq!(record.parks(), 0);
    }

    #[test]
    fn traffic_is_inverted_in_category_scores() {
        let record: LocationRecord = serde_json::from_str(sample_json()).unwrap();
        let scores = record.category_scores();
        assert!((scores.traffic - 3.2).abs() < 1e-9);
        assert!((scores.get(Category::Safety) - record.safety_score).abs() < f64::EPSILON);
    }

    #[test]
    fn category_raw_scores_match_fields() {
        let record: LocationRecord = serde_json::from_str(sample_json()).unwrap();
        for category in Category::all() {
            let raw = record.raw_score(*category);
            assert!(
                (SCORE_MIN..=SCORE_MAX).contains(&raw),
                "{} out of range",
                category.field_name()
            );
        }
    }

    #[test]
    fn future_growth_parses_case_insensitively() {
        assert_eq!("medium".parse::<FutureGrowth>().unwrap(), FutureGrowth::Medium);
        assert!("Huge".parse::<FutureGrowth>().is_err());
    }

    #[test]
    fn location_id_trims_parts() {
        assert_eq!(LocationId::new(" Kudasan ", "Gandhinagar").as_str(), "Kudasan, Gandhinagar");
    }
}
