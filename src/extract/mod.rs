//! Listing extraction: structured data first, DOM selectors second
//!
//! Two independently testable strategies share the "produce a partial
//! record" contract: the JSON-LD strategy maps embedded structured data
//! into fields, and the DOM strategy fills in whatever is still missing.
//! Structured data is authoritative: a field it populated is never
//! overwritten by the DOM fallback.

mod coerce;
mod dom;
mod jsonld;
mod search;

pub use coerce::{coerce_count, normalize_postcode, parse_price_text};
pub use search::extract_listing_refs;

use crate::listing::{CandidateRecord, RawDocument, RawSource};
use crate::ExtractionError;
use scraper::Html;

/// Parses a rendered detail page into a candidate record
///
/// Fails with [`ExtractionError::NoStructuredData`] only when both
/// strategies find nothing at all; a partially populated candidate is a
/// legal result and the validator's concern, not extraction's.
pub fn extract_listing(doc: &RawDocument) -> Result<CandidateRecord, ExtractionError> {
    let html = Html::parse_document(&doc.body);

    let mut candidate = match jsonld::extract(&html) {
        Some(candidate) => candidate,
        None => CandidateRecord::empty("", RawSource::Dom),
    };

    if candidate.is_partial() {
        dom::fill_missing(&mut candidate, &html);
    }

    // The page's own URL is the fallback identity when neither strategy
    // carried one.
    if candidate.url.trim().is_empty() {
        candidate.url = doc.url.clone();
    }

    let found_anything = candidate.rent_pcm.is_some()
        || candidate.beds.is_some()
        || candidate.address.is_some()
        || candidate.postcode.is_some();

    if !found_anything {
        return Err(ExtractionError::NoStructuredData {
            url: doc.url.clone(),
        });
    }

    tracing::debug!(
        url = %candidate.url,
        source = ?candidate.raw_source,
        partial = candidate.is_partial(),
        "extracted candidate record"
    );

    Ok(candidate)
}
