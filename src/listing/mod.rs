//! Listing data model and validation/deduplication
//!
//! The pipeline's record types flow: a search page yields [`ListingRef`]s,
//! a detail fetch yields a [`RawDocument`], extraction yields a
//! [`CandidateRecord`], and validation promotes complete candidates to
//! [`ValidatedRecord`]s, suppressing duplicates along the way.

mod dedupe;
mod record;

pub use dedupe::{DedupeKey, Deduper, ValidationOutcome};
pub use record::{CandidateRecord, ListingRef, RawDocument, RawSource, ValidatedRecord};
