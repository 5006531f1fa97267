use crate::listing::ListingRef;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Harvests listing detail-page refs from a search result page
///
/// Primary shape: the first anchor inside each
/// `article[data-testid="search-result"]` card. Fallback for renditions
/// without the card markup (the mobile site, partial renders): any
/// anchor whose href matches the detail-page path pattern. Relative
/// hrefs resolve against the page URL; refs are deduped within the
/// page, preserving first-seen order.
pub fn extract_listing_refs(body: &str, page_url: &str) -> Vec<ListingRef> {
    let html = Html::parse_document(body);

    let mut hrefs = card_hrefs(&html);
    if hrefs.is_empty() {
        hrefs = fallback_hrefs(&html);
    }

    let base = Url::parse(page_url).ok();
    let mut seen = HashSet::new();
    let mut refs = Vec::new();

    for href in hrefs {
        if let Some(absolute) = resolve(&href, base.as_ref()) {
            if seen.insert(absolute.clone()) {
                refs.push(ListingRef {
                    url: absolute,
                    search_url: page_url.to_string(),
                });
            }
        }
    }

    tracing::debug!(page = %page_url, count = refs.len(), "harvested listing refs");

    refs
}

/// First anchor href of each search-result card
fn card_hrefs(html: &Html) -> Vec<String> {
    let Ok(card_selector) = Selector::parse(r#"article[data-testid="search-result"]"#) else {
        return Vec::new();
    };
    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    html.select(&card_selector)
        .filter_map(|card| {
            card.select(&anchor_selector)
                .next()
                .and_then(|anchor| anchor.value().attr("href"))
                .map(str::to_string)
        })
        .collect()
}

/// Any anchor pointing at a detail-page path
fn fallback_hrefs(html: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(r#"a[href*="/to-rent/details/"]"#) else {
        return Vec::new();
    };

    html.select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Resolves an href to an absolute http(s) URL
fn resolve(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }

    let resolved = base?.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
