use crate::extract::coerce::{normalize_postcode, parse_price_text};
use crate::listing::{CandidateRecord, RawSource};
use scraper::{Html, Selector};
use serde_json::Value;

/// Extracts a candidate record from embedded JSON-LD blocks
///
/// Scans every `script[type="application/ld+json"]` block for one that
/// describes an offer, and maps the known property paths into fields.
/// Returns `None` when no block describes a listing; the DOM fallback
/// takes over from there.
pub fn extract(html: &Html) -> Option<CandidateRecord> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;

    for script in html.select(&selector) {
        let raw = script.text().collect::<String>();
        let Ok(data) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };

        // A block may be a single object, a top-level array, or a @graph
        for node in candidate_nodes(&data) {
            if let Some(candidate) = map_listing(node) {
                return Some(candidate);
            }
        }
    }

    None
}

/// Flattens the JSON-LD shapes seen in the wild into a node list
fn candidate_nodes(data: &Value) -> Vec<&Value> {
    match data {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("@graph") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![data],
        },
        _ => Vec::new(),
    }
}

/// Maps one JSON-LD node into a candidate, requiring an offers block
fn map_listing(node: &Value) -> Option<CandidateRecord> {
    let offer = node.get("offers").filter(|o| !o.is_null())?;

    let rent_pcm = offer
        .get("price")
        .or_else(|| offer.get("Price"))
        .and_then(coerce_price);

    let (address, postcode) = match node.get("address") {
        Some(addr) => (
            string_field(addr, "streetAddress"),
            string_field(addr, "postalCode").and_then(|pc| normalize_postcode(&pc)),
        ),
        None => (None, None),
    };

    let beds = ["numberOfRooms", "numberOfBedrooms", "bedrooms"]
        .iter()
        .find_map(|key| node.get(*key))
        .and_then(coerce_beds);

    let url = node
        .get("@id")
        .or_else(|| node.get("url"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    Some(CandidateRecord {
        url,
        rent_pcm,
        beds,
        address: address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
        postcode,
        raw_source: RawSource::JsonLd,
    })
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty())
}

fn coerce_price(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as u32).filter(|&n| n > 0),
        Value::String(s) => parse_price_text(s),
        _ => None,
    }
}

fn coerce_beds(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as u32).filter(|&n| n > 0),
        Value::String(s) => crate::extract::coerce::coerce_count(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Html {
        Html::parse_document(body)
    }

    #[test]
    fn test_full_listing_block() {
        let html = parse(
            r#"<html><head><script type="application/ld+json">
            {
                "@type": "Residence",
                "@id": "https://www.zoopla.co.uk/to-rent/details/1",
                "offers": {"price": "1,200"},
                "address": {"streetAddress": "123 Fake Street", "postalCode": "L1 2AB"},
                "numberOfRooms": 3
            }
            </script></head><body></body></html>"#,
        );

        let candidate = extract(&html).expect("listing block expected");
        assert_eq!(candidate.rent_pcm, Some(1200));
        assert_eq!(candidate.beds, Some(3));
        assert_eq!(candidate.address.as_deref(), Some("123 Fake Street"));
        assert_eq!(candidate.postcode.as_deref(), Some("L12AB"));
        assert_eq!(candidate.url, "https://www.zoopla.co.uk/to-rent/details/1");
    }

    #[test]
    fn test_block_without_offers_skipped() {
        let html = parse(
            r#"<html><head>
            <script type="application/ld+json">
            {"@type": "BreadcrumbList", "itemListElement": []}
            </script>
            <script type="application/ld+json">
            {"offers": {"price": 800}, "numberOfBedrooms": "2 bedrooms",
             "url": "https://www.zoopla.co.uk/to-rent/details/2"}
            </script>
            </head><body></body></html>"#,
        );

        let candidate = extract(&html).expect("second block expected");
        assert_eq!(candidate.rent_pcm, Some(800));
        assert_eq!(candidate.beds, Some(2));
        assert_eq!(candidate.url, "https://www.zoopla.co.uk/to-rent/details/2");
    }

    #[test]
    fn test_graph_wrapper() {
        let html = parse(
            r#"<html><head><script type="application/ld+json">
            {"@graph": [
                {"@type": "WebPage"},
                {"offers": {"price": 950}, "bedrooms": 2,
                 "address": {"streetAddress": "45 Example Ave", "postalCode": "L1 3CD"}}
            ]}
            </script></head><body></body></html>"#,
        );

        let candidate = extract(&html).expect("graph member expected");
        assert_eq!(candidate.rent_pcm, Some(950));
        assert_eq!(candidate.postcode.as_deref(), Some("L13CD"));
    }

    #[test]
    fn test_malformed_json_skipped() {
        let html = parse(
            r#"<html><head>
            <script type="application/ld+json">{not json}</script>
            </head><body></body></html>"#,
        );
        assert!(extract(&html).is_none());
    }

    #[test]
    fn test_no_scripts_is_none() {
        let html = parse("<html><body><p>plain page</p></body></html>");
        assert!(extract(&html).is_none());
    }

    #[test]
    fn test_invalid_postcode_dropped() {
        let html = parse(
            r#"<html><head><script type="application/ld+json">
            {"offers": {"price": 700}, "numberOfRooms": 1,
             "address": {"streetAddress": "1 Somewhere", "postalCode": "not-a-postcode"}}
            </script></head><body></body></html>"#,
        );

        let candidate = extract(&html).unwrap();
        assert_eq!(candidate.postcode, None);
        assert_eq!(candidate.address.as_deref(), Some("1 Somewhere"));
    }
}
