#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Immutable neighborhood dataset.
//!
//! The dataset is loaded once at startup, either from the JSON file
//! embedded at compile time or from a path supplied by the operator.
//! Every record is validated on load; any violation is a
//! [`DatasetError::DataIntegrity`] and the caller is expected to abort.
//! After loading, the table is read-only and can be shared freely across
//! request handlers.

pub mod resolve;
mod validate;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use realty_location_models::{LocationId, LocationRecord};
use thiserror::Error;

pub use resolve::sanitize;

/// Number of locations in the embedded dataset. Enforced by a test.
#[cfg(test)]
const EXPECTED_LOCATION_COUNT: usize = 8;

/// JSON dataset bundled into the binary.
const EMBEDDED_DATASET: &str = include_str!("../data/neighbourhood_data.json");

/// Errors that can occur while loading or querying the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be read.
    #[error("Failed to read dataset {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The dataset is not valid JSON or does not match the record schema.
    #[error("Failed to parse dataset: {0}")]
    Json(#[from] serde_json::Error),

    /// A record violates one of the dataset invariants.
    #[error("Data integrity error in '{location}': {message}")]
    DataIntegrity {
        /// Identifier (or best available name) of the offending record.
        location: String,
        /// What is wrong with it.
        message: String,
    },

    /// No record matches the identifier.
    #[error("Location \"{identifier}\" not found")]
    NotFound {
        /// The identifier or query that failed to match.
        identifier: String,
    },

    /// A fuzzy query matched more than one record.
    #[error("Location \"{query}\" matches {} locations; please be more specific", candidates.len())]
    Ambiguous {
        /// The query as given.
        query: String,
        /// Identifiers of every matching record.
        candidates: Vec<LocationId>,
    },

    /// The query was empty after sanitization.
    #[error("Location cannot be empty")]
    EmptyQuery,
}

/// Read-only table of validated location records.
///
/// Records are kept sorted by identifier so every listing and scan is
/// deterministic regardless of the order of the source file.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<LocationRecord>,
    index: BTreeMap<LocationId, usize>,
    /// Lowercased identifier to record position.
    folded: BTreeMap<String, usize>,
}

impl Dataset {
    /// Builds a dataset from already-parsed records, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::DataIntegrity`] if any record is invalid,
    /// two records share an identifier, or the table is empty.
    pub fn from_records(mut records: Vec<LocationRecord>) -> Result<Self, DatasetError> {
        if records.is_empty() {
            return Err(DatasetError::DataIntegrity {
                location: "<dataset>".to_string(),
                message: "dataset contains no locations".to_string(),
            });
        }

        for record in &records {
            validate::validate_record(record)?;
        }

        records.sort_by_key(LocationRecord::id);

        let mut index = BTreeMap::new();
        let mut folded = BTreeMap::new();
        let mut matched: BTreeMap<String, LocationId> = BTreeMap::new();
        for (i, record) in records.iter().enumerate() {
            let id = record.id();
            // Identifiers that only differ in case or punctuation are
            // indistinguishable to lookups and resolution.
            if let Some(existing) = matched.insert(sanitize(id.as_str()), id.clone()) {
                return Err(DatasetError::DataIntegrity {
                    location: id.to_string(),
                    message: format!("duplicate location identifier (clashes with \"{existing}\")"),
                });
            }
            folded.insert(id.as_str().to_ascii_lowercase(), i);
            index.insert(id, i);
        }

        Ok(Self {
            records,
            index,
            folded,
        })
    }

    /// Parses and validates a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Json`] on malformed input or
    /// [`DatasetError::DataIntegrity`] on invariant violations.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let records: Vec<LocationRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Loads the dataset from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`Self::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        log::info!("Loading dataset from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} locations from {} cities",
            dataset.len(),
            dataset.cities().len()
        );
        Ok(dataset)
    }

    /// Loads the dataset bundled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded file is itself invalid, which
    /// the test suite guards against.
    pub fn embedded() -> Result<Self, DatasetError> {
        let dataset = Self::from_json_str(EMBEDDED_DATASET)?;
        log::debug!("Loaded {} embedded locations", dataset.len());
        Ok(dataset)
    }

    /// Loads from `path` when given, otherwise falls back to the embedded
    /// dataset.
    ///
    /// # Errors
    ///
    /// See [`Self::load`] and [`Self::embedded`].
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self, DatasetError> {
        path.map_or_else(Self::embedded, Self::load)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records. Always `false` for a dataset
    /// that passed validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, sorted by identifier.
    #[must_use]
    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    /// Iterates over all records in identifier order.
    pub fn iter(&self) -> std::slice::Iter<'_, LocationRecord> {
        self.records.iter()
    }

    /// Looks up a record by its exact identifier, falling back to an
    /// ASCII case-insensitive comparison.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::NotFound`] if no record has this identifier.
    pub fn get_record(&self, identifier: &str) -> Result<&LocationRecord, DatasetError> {
        let identifier = identifier.trim();
        self.index
            .get(identifier)
            .or_else(|| self.folded.get(&identifier.to_ascii_lowercase()))
            .map(|&i| &self.records[i])
            .ok_or_else(|| DatasetError::NotFound {
                identifier: identifier.to_string(),
            })
    }

    /// Identifiers of every record, in identifier order.
    #[must_use]
    pub fn list_identifiers(&self) -> Vec<LocationId> {
        self.index.keys().cloned().collect()
    }

    /// Returns every record satisfying `predicate`, in identifier order.
    pub fn search<F>(&self, predicate: F) -> Vec<&LocationRecord>
    where
        F: Fn(&LocationRecord) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).collect()
    }

    /// Records in the given city (ASCII case-insensitive).
    #[must_use]
    pub fn in_city(&self, city: &str) -> Vec<&LocationRecord> {
        let city = city.trim();
        self.search(|r| r.city.eq_ignore_ascii_case(city))
    }

    /// Distinct city names, sorted.
    #[must_use]
    pub fn cities(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.city.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Lowest and highest price per square foot across the table.
    #[must_use]
    pub fn price_bounds(&self) -> (f64, f64) {
        self.records.iter().fold((f64::MAX, f64::MIN), |(lo, hi), r| {
            (lo.min(r.avg_price_per_sqft), hi.max(r.avg_price_per_sqft))
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use realty_location_models::{Amenities, FutureGrowth, LocationRecord, Metro};

    /// A valid record with middling values, for tests to tweak.
    pub fn record(area: &str, city: &str) -> LocationRecord {
        LocationRecord {
            location: None,
            city: city.to_string(),
            area: area.to_string(),
            population: 10_000,
            population_density: 5_000,
            safety_score: 8.0,
            traffic_score: 6.0,
            connectivity_score: 8.0,
            infrastructure_score: 7.5,
            lifestyle_score: 8.0,
            environment_score: 7.0,
            schools: 10,
            hospitals: 5,
            future_growth: FutureGrowth::Medium,
            avg_price_per_sqft: 5_000.0,
            rental_yield: 4.0,
            appreciation_rate: 8.0,
            metro: Metro::default(),
            bus_routes: 3,
            amenities: Amenities::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::record;

    #[test]
    fn loads_embedded_dataset() {
        let dataset = Dataset::embedded().unwrap();
        assert_eq!(
            dataset.len(),
            EXPECTED_LOCATION_COUNT,
            "Expected {EXPECTED_LOCATION_COUNT} embedded locations, found {}. \
             Update EXPECTED_LOCATION_COUNT after adding/removing locations.",
            dataset.len()
        );
        assert_eq!(dataset.cities(), vec!["Ahmedabad", "Gandhinagar"]);
    }

    #[test]
    fn identifiers_are_sorted_and_unique() {
        let dataset = Dataset::embedded().unwrap();
        let ids = dataset.list_identifiers();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn get_record_finds_exact_and_case_insensitive() {
        let dataset = Dataset::embedded().unwrap();
        let record = dataset.get_record("Satellite, Ahmedabad").unwrap();
        assert_eq!(record.area, "Satellite");
        let record = dataset.get_record("kudasan, gandhinagar").unwrap();
        assert_eq!(record.city, "Gandhinagar");
    }

    #[test]
    fn get_record_unknown_is_not_found() {
        let dataset = Dataset::embedded().unwrap();
        let err = dataset.get_record("Nonexistent, City").unwrap_err();
        assert!(
            matches!(err, DatasetError::NotFound { ref identifier } if identifier == "Nonexistent, City")
        );
    }

    #[test]
    fn search_applies_predicate() {
        let dataset = Dataset::embedded().unwrap();
        let cheap = dataset.search(|r| r.avg_price_per_sqft < 5_000.0);
        assert!(!cheap.is_empty());
        assert!(cheap.iter().all(|r| r.avg_price_per_sqft < 5_000.0));
        assert!(dataset.search(|_| false).is_empty());
    }

    #[test]
    fn in_city_is_case_insensitive() {
        let dataset = Dataset::embedded().unwrap();
        assert_eq!(dataset.in_city("gandhinagar").len(), 2);
        assert!(dataset.in_city("Surat").is_empty());
    }

    #[test]
    fn rejects_duplicate_identifiers() {
        let err = Dataset::from_records(vec![record("A", "X"), record("A", "X")]).unwrap_err();
        assert!(matches!(err, DatasetError::DataIntegrity { .. }));
    }

    #[test]
    fn rejects_identifiers_differing_only_in_case() {
        let err = Dataset::from_records(vec![
            record("Satellite", "Ahmedabad"),
            record("satellite", "Ahmedabad"),
        ])
        .unwrap_err();
        match err {
            DatasetError::DataIntegrity { message, .. } => {
                assert!(message.contains("duplicate"));
            }
            other => panic!("expected DataIntegrity, got {other:?}"),
        }
    }

    #[test]
    fn get_record_ignores_surrounding_whitespace_and_case() {
        let dataset =
            Dataset::from_records(vec![record("Sector 21", "Gandhinagar"), record("Bopal", "Ahmedabad")])
                .unwrap();
        assert_eq!(dataset.get_record(" Bopal, Ahmedabad ").unwrap().area, "Bopal");
        assert_eq!(dataset.get_record("SECTOR 21, GANDHINAGAR").unwrap().area, "Sector 21");
        assert!(dataset.get_record("Sector 2, Gandhinagar").is_err());
    }

    #[test]
    fn rejects_empty_table() {
        let err = Dataset::from_records(Vec::new()).unwrap_err();
        assert!(matches!(err, DatasetError::DataIntegrity { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Dataset::from_json_str("{\"not\": \"an array\"}").unwrap_err();
        assert!(matches!(err, DatasetError::Json(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Dataset::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn price_bounds_cover_all_records() {
        let mut cheap = record("Cheap", "X");
        cheap.avg_price_per_sqft = 3_000.0;
        let mut dear = record("Dear", "X");
        dear.avg_price_per_sqft = 9_000.0;
        let dataset = Dataset::from_records(vec![cheap, dear, record("Mid", "X")]).unwrap();
        assert_eq!(dataset.price_bounds(), (3_000.0, 9_000.0));
    }
}
