use crate::extract::coerce::{coerce_count, normalize_postcode, parse_price_text};
use crate::listing::CandidateRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// Price fragment anywhere in page text, e.g. "£1,150 pcm"
static BODY_PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)£\s*\d[\d,]*\s*(pcm|pw|per\s+week|per\s+month)").unwrap());

/// Bedroom count fragment, e.g. "3 bed semi-detached house"
static BODY_BEDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*bed").unwrap());

/// Fills the fields a candidate is still missing from DOM patterns
///
/// Fields already populated (by structured data) are left untouched;
/// that non-overwrite rule is the authoritative-source invariant the
/// extractor is built around. Each selector list is tried in order,
/// ending with a page-text regex sweep for the markup-less cases.
pub fn fill_missing(candidate: &mut CandidateRecord, html: &Html) {
    if candidate.rent_pcm.is_none() {
        candidate.rent_pcm = select_text(html, &["[data-testid='price']", "p.listing-price"])
            .as_deref()
            .and_then(parse_price_text)
            .or_else(|| body_text_price(html));
    }

    if candidate.beds.is_none() {
        candidate.beds = select_text(
            html,
            &["[data-testid='beds-label']", "span.num-beds", "[data-testid='bed']"],
        )
        .as_deref()
        .and_then(coerce_count)
        .or_else(|| body_text_beds(html));
    }

    if candidate.address.is_none() {
        candidate.address = select_text(
            html,
            &["[data-testid='address-label']", "address", "h1.listing-address"],
        )
        .filter(|a| !a.is_empty());
    }

    if candidate.postcode.is_none() {
        // The address line usually carries the postcode; sweep the whole
        // page only when it doesn't.
        candidate.postcode = candidate
            .address
            .as_deref()
            .and_then(normalize_postcode)
            .or_else(|| normalize_postcode(&page_text(html)));
    }

    if candidate.url.trim().is_empty() {
        candidate.url = canonical_link(html).unwrap_or_default();
    }
}

/// First non-empty text content among the given selectors
fn select_text(html: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = html.select(&selector).next() {
            let text = element.text().collect::<String>();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// `link[rel="canonical"]` href, the page's self-declared identity
fn canonical_link(html: &Html) -> Option<String> {
    let selector = Selector::parse(r#"link[rel="canonical"][href]"#).ok()?;
    html.select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

fn page_text(html: &Html) -> String {
    html.root_element().text().collect::<Vec<_>>().join(" ")
}

fn body_text_price(html: &Html) -> Option<u32> {
    let text = page_text(html);
    BODY_PRICE_RE
        .find(&text)
        .and_then(|m| parse_price_text(m.as_str()))
}

fn body_text_beds(html: &Html) -> Option<u32> {
    let text = page_text(html);
    BODY_BEDS_RE
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|&n| n > 0)
}
