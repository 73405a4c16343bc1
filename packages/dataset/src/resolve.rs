//! Free-text resolution of user-supplied location names.
//!
//! Users rarely type the full `"Area, City"` identifier. A query is first
//! compared against identifiers exactly (after sanitization), then matched
//! as a substring of identifiers and area names. A query that matches more
//! than one record is reported as ambiguous rather than guessed.

use realty_location_models::LocationRecord;

use crate::{Dataset, DatasetError};

/// Normalizes free text for matching: keeps ASCII letters, digits,
/// whitespace and commas, collapses runs of whitespace and lowercases.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == ',')
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

impl Dataset {
    /// Resolves a free-text query to a single record.
    ///
    /// # Errors
    ///
    /// * [`DatasetError::EmptyQuery`] if nothing is left after sanitizing.
    /// * [`DatasetError::NotFound`] if nothing matches.
    /// * [`DatasetError::Ambiguous`] if several records match.
    pub fn resolve(&self, query: &str) -> Result<&LocationRecord, DatasetError> {
        let needle = sanitize(query);
        if needle.is_empty() {
            return Err(DatasetError::EmptyQuery);
        }

        if let Some(exact) = self
            .iter()
            .find(|r| sanitize(r.id().as_str()) == needle)
        {
            return Ok(exact);
        }

        let matches: Vec<&LocationRecord> = self.search(|r| {
            sanitize(r.id().as_str()).contains(&needle) || sanitize(&r.area).contains(&needle)
        });

        match matches.as_slice() {
            [] => Err(DatasetError::NotFound {
                identifier: query.trim().to_string(),
            }),
            [single] => Ok(*single),
            many => Err(DatasetError::Ambiguous {
                query: query.trim().to_string(),
                candidates: many.iter().map(|r| r.id()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("Satellite", "Ahmedabad"),
            record("Vastrapur", "Ahmedabad"),
            record("Sector 21", "Gandhinagar"),
            record("Sector 7", "Gandhinagar"),
        ])
        .unwrap()
    }

    #[test]
    fn sanitize_strips_punctuation_and_whitespace() {
        assert_eq!(sanitize("  Satellite,   AHMEDABAD!! "), "satellite, ahmedabad");
        assert_eq!(sanitize("<script>"), "script");
        assert_eq!(sanitize("!!!"), "");
    }

    #[test]
    fn resolves_partial_area_name() {
        let ds = dataset();
        assert_eq!(ds.resolve("satel").unwrap().area, "Satellite");
        assert_eq!(ds.resolve("Vastrapur").unwrap().area, "Vastrapur");
    }

    #[test]
    fn exact_identifier_wins_over_substrings() {
        let ds = dataset();
        assert_eq!(ds.resolve("Sector 21, Gandhinagar").unwrap().area, "Sector 21");
    }

    #[test]
    fn ambiguous_query_lists_candidates() {
        let ds = dataset();
        match ds.resolve("sector").unwrap_err() {
            DatasetError::Ambiguous { candidates, .. } => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn unknown_and_empty_queries_fail() {
        let ds = dataset();
        assert!(matches!(
            ds.resolve("Nonexistent, City").unwrap_err(),
            DatasetError::NotFound { .. }
        ));
        assert!(matches!(ds.resolve("  ?? ").unwrap_err(), DatasetError::EmptyQuery));
    }
}
