use chrono::{DateTime, Utc};
use serde::Serialize;

/// A discovered detail-page URL plus the search page it came from
///
/// Created during search-page crawl, consumed once by the detail fetch,
/// never persisted.
#[derive(Debug, Clone)]
pub struct ListingRef {
    /// Absolute detail-page URL
    pub url: String,

    /// The search-page URL this ref was harvested from
    pub search_url: String,
}

/// Rendered page content with its response metadata
///
/// Owned solely by the fetch step that produced it; discarded after
/// extraction.
#[derive(Debug)]
pub struct RawDocument {
    /// Final URL after any redirects
    pub url: String,

    /// Rendered body
    pub body: String,

    /// HTTP status code of the response
    pub status: u16,

    /// Label of the transport variant that produced this document
    pub transport: &'static str,
}

/// Which extraction strategy supplied a record's fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RawSource {
    JsonLd,
    Dom,
}

/// Extraction output before validation; partially populated is legal
#[derive(Debug, Clone)]
pub struct CandidateRecord {
    /// Canonical listing URL
    pub url: String,

    /// Monthly rent in whole pounds
    pub rent_pcm: Option<u32>,

    /// Bedroom count
    pub beds: Option<u32>,

    /// Street address
    pub address: Option<String>,

    /// Normalized UK postcode (uppercased, inner space removed)
    pub postcode: Option<String>,

    /// Strategy that supplied the majority of fields
    pub raw_source: RawSource,
}

impl CandidateRecord {
    /// An empty candidate for the given URL, to be filled by the
    /// extraction strategies.
    pub fn empty(url: impl Into<String>, raw_source: RawSource) -> Self {
        Self {
            url: url.into(),
            rent_pcm: None,
            beds: None,
            address: None,
            postcode: None,
            raw_source,
        }
    }

    /// Names of required fields that are missing or empty
    ///
    /// A zero rent or bed count counts as missing: those come from
    /// coercion fallbacks, never from a real listing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.rent_pcm.unwrap_or(0) == 0 {
            missing.push("rent_pcm");
        }
        if self.beds.unwrap_or(0) == 0 {
            missing.push("beds");
        }
        if self.address.as_deref().unwrap_or("").trim().is_empty() {
            missing.push("address");
        }
        if self.postcode.as_deref().unwrap_or("").trim().is_empty() {
            missing.push("postcode");
        }
        if self.url.trim().is_empty() {
            missing.push("url");
        }
        missing
    }

    /// Whether any required field is still unpopulated
    pub fn is_partial(&self) -> bool {
        !self.missing_fields().is_empty()
    }
}

/// A schema-complete listing record, immutable once constructed
///
/// Invariant: all five required fields are present and type-correct.
/// Construction goes through the validator only.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedRecord {
    pub url: String,
    pub rent_pcm: u32,
    pub beds: u32,
    pub address: String,
    pub postcode: String,
    pub raw_source: RawSource,

    /// Constant source tag carried on every emitted record
    pub source: &'static str,

    /// UTC timestamp of the scrape that produced this record
    pub scraped_at: DateTime<Utc>,
}
