use crate::listing::record::{CandidateRecord, ValidatedRecord};
use crate::url::canonical_url;
use chrono::Utc;
use std::collections::HashSet;

/// Identity key derived deterministically from a validated record
///
/// Two records with an equal place key OR an equal URL key are the same
/// physical listing: agents frequently relist the same property under a
/// fresh URL, and the same URL can resurface with a reworded address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeKey {
    /// Normalized "address+postcode" string
    pub place: String,

    /// Canonical listing URL
    pub url: String,
}

impl DedupeKey {
    pub fn of(record: &ValidatedRecord) -> Self {
        Self {
            place: place_key(&record.address, &record.postcode),
            url: canonical_url(&record.url),
        }
    }
}

/// Lowercases, trims and collapses inner whitespace in the address, then
/// joins it to the postcode (lowercased, spaces removed) with `+`.
fn place_key(address: &str, postcode: &str) -> String {
    let address = address
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let postcode = postcode.to_lowercase().replace(' ', "");
    format!("{}+{}", address, postcode)
}

/// Outcome of validating one candidate record
#[derive(Debug)]
pub enum ValidationOutcome {
    /// Schema-complete and first-seen: passes downstream to emission
    Complete(ValidatedRecord),

    /// One or more required fields missing; candidate returned for logging
    Incomplete {
        record: CandidateRecord,
        missing: Vec<&'static str>,
    },

    /// Schema-complete but already seen this run; suppressed, not failed
    Duplicate(DedupeKey),
}

/// Enforces schema completeness and suppresses already-seen listings
///
/// Run-scoped state, first-seen-wins: the single-worker ordering
/// guarantee makes the suppression order deterministic. Cleared at
/// process exit; cross-run durability lives in the emitter's buffer.
#[derive(Debug, Default)]
pub struct Deduper {
    seen_places: HashSet<String>,
    seen_urls: HashSet<String>,
}

impl Deduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a candidate and checks it against the run's seen set
    ///
    /// A schema violation yields `Incomplete`; a dedupe-key collision on
    /// either key member yields `Duplicate`. Only complete, first-seen
    /// records come back as `Complete`, and are recorded so the next
    /// occurrence collides.
    pub fn check(&mut self, candidate: CandidateRecord) -> ValidationOutcome {
        let missing = candidate.missing_fields();
        if !missing.is_empty() {
            return ValidationOutcome::Incomplete {
                record: candidate,
                missing,
            };
        }

        // All five fields verified present just above
        let record = ValidatedRecord {
            url: candidate.url.clone(),
            rent_pcm: candidate.rent_pcm.unwrap_or_default(),
            beds: candidate.beds.unwrap_or_default(),
            address: candidate.address.clone().unwrap_or_default(),
            postcode: candidate.postcode.clone().unwrap_or_default(),
            raw_source: candidate.raw_source,
            source: "zoopla",
            scraped_at: Utc::now(),
        };

        let key = DedupeKey::of(&record);
        if self.seen_places.contains(&key.place) || self.seen_urls.contains(&key.url) {
            return ValidationOutcome::Duplicate(key);
        }

        self.seen_places.insert(key.place);
        self.seen_urls.insert(key.url);
        ValidationOutcome::Complete(record)
    }

    /// Number of distinct listings admitted so far
    pub fn seen_count(&self) -> usize {
        self.seen_urls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::record::RawSource;

    fn candidate(url: &str, address: &str, postcode: &str) -> CandidateRecord {
        CandidateRecord {
            url: url.to_string(),
            rent_pcm: Some(1200),
            beds: Some(3),
            address: Some(address.to_string()),
            postcode: Some(postcode.to_string()),
            raw_source: RawSource::JsonLd,
        }
    }

    #[test]
    fn test_complete_first_seen_passes() {
        let mut deduper = Deduper::new();
        let outcome = deduper.check(candidate(
            "https://www.zoopla.co.uk/to-rent/details/1",
            "123 Fake Street",
            "L12AB",
        ));
        assert!(matches!(outcome, ValidationOutcome::Complete(_)));
        assert_eq!(deduper.seen_count(), 1);
    }

    #[test]
    fn test_incomplete_reports_missing_fields() {
        let mut deduper = Deduper::new();
        let mut c = candidate("https://www.zoopla.co.uk/to-rent/details/1", "123 Fake Street", "L12AB");
        c.postcode = None;
        c.beds = None;

        match deduper.check(c) {
            ValidationOutcome::Incomplete { missing, .. } => {
                assert_eq!(missing, vec!["beds", "postcode"]);
            }
            other => panic!("expected Incomplete, got {:?}", other),
        }
        // Incomplete records are not admitted to the seen set
        assert_eq!(deduper.seen_count(), 0);
    }

    #[test]
    fn test_same_address_different_url_is_duplicate() {
        let mut deduper = Deduper::new();
        deduper.check(candidate(
            "https://www.zoopla.co.uk/to-rent/details/1",
            "123 Fake Street",
            "L1 2AB",
        ));
        let outcome = deduper.check(candidate(
            "https://www.zoopla.co.uk/to-rent/details/999",
            "123  FAKE  street",
            "l12ab",
        ));
        assert!(matches!(outcome, ValidationOutcome::Duplicate(_)));
    }

    #[test]
    fn test_same_url_different_address_is_duplicate() {
        let mut deduper = Deduper::new();
        deduper.check(candidate(
            "https://www.zoopla.co.uk/to-rent/details/1",
            "123 Fake Street",
            "L12AB",
        ));
        let outcome = deduper.check(candidate(
            "https://m.zoopla.co.uk/to-rent/details/1",
            "Flat 1, One Two Three Fake St",
            "L99ZZ",
        ));
        assert!(matches!(outcome, ValidationOutcome::Duplicate(_)));
    }

    #[test]
    fn test_distinct_listings_both_pass() {
        let mut deduper = Deduper::new();
        let first = deduper.check(candidate(
            "https://www.zoopla.co.uk/to-rent/details/1",
            "123 Fake Street",
            "L12AB",
        ));
        let second = deduper.check(candidate(
            "https://www.zoopla.co.uk/to-rent/details/2",
            "45 Example Ave",
            "L13CD",
        ));
        assert!(matches!(first, ValidationOutcome::Complete(_)));
        assert!(matches!(second, ValidationOutcome::Complete(_)));
        assert_eq!(deduper.seen_count(), 2);
    }

    #[test]
    fn test_place_key_normalization() {
        assert_eq!(
            place_key("  123  Fake   Street ", "L1 2AB"),
            "123 fake street+l12ab"
        );
    }

    #[test]
    fn test_validated_record_carries_enrichment() {
        let mut deduper = Deduper::new();
        match deduper.check(candidate(
            "https://www.zoopla.co.uk/to-rent/details/1",
            "123 Fake Street",
            "L12AB",
        )) {
            ValidationOutcome::Complete(record) => {
                assert_eq!(record.source, "zoopla");
                assert!(record.scraped_at <= Utc::now());
            }
            other => panic!("expected Complete, got {:?}", other),
        }
    }
}
