use once_cell::sync::Lazy;
use regex::Regex;

/// Price with optional currency symbol, thousands separators and a
/// frequency suffix, e.g. "£1,200 pcm" or "275 pw"
static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)£?\s*(\d[\d,]*)\s*(pcm|pw|per\s+week|per\s+month|weekly|monthly)?").unwrap()
});

/// Simplified UK postcode shape, e.g. "L1 2AB" or "SW19 7NE"
static POSTCODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[A-Z]{1,2}\d{1,2}[A-Z]?\s*\d[A-Z]{2}").unwrap());

/// Leading integer in a free-text count, e.g. "3 bed semi" -> 3
static COUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());

/// Parses a price string into whole pounds per calendar month
///
/// Strips the currency symbol and thousands separators; a weekly
/// frequency converts at 52 weeks over 12 months, rounded. Returns
/// `None` when no digits are present; an uncoercible price is an
/// absent field, not a parse failure.
pub fn parse_price_text(text: &str) -> Option<u32> {
    let caps = PRICE_RE.captures(text)?;
    let amount: u32 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    if amount == 0 {
        return None;
    }

    let freq = caps.get(2).map(|m| m.as_str().to_lowercase());
    let weekly = matches!(freq.as_deref(), Some(f) if f == "pw" || f == "weekly" || f.contains("week"));

    if weekly {
        Some(((amount as f64) * 52.0 / 12.0).round() as u32)
    } else {
        Some(amount)
    }
}

/// Coerces a free-text count ("3", "3 bed", "three") to an integer
///
/// Only digit forms are recognized; anything else is an absent field.
pub fn coerce_count(text: &str) -> Option<u32> {
    let digits = COUNT_RE.captures(text)?.get(1)?.as_str();
    digits.parse().ok().filter(|&n| n > 0)
}

/// Extracts and normalizes the first UK postcode in a string
///
/// Normal form: uppercased, inner whitespace removed ("L1 2AB" ->
/// "L12AB"), matching the identity form the deduper keys on.
pub fn normalize_postcode(text: &str) -> Option<String> {
    let m = POSTCODE_RE.find(text)?;
    Some(m.as_str().to_uppercase().replace(' ', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_pcm() {
        assert_eq!(parse_price_text("£1,200 pcm"), Some(1200));
        assert_eq!(parse_price_text("950 per month"), Some(950));
        assert_eq!(parse_price_text("£825"), Some(825));
    }

    #[test]
    fn test_price_weekly_converts_to_pcm() {
        // 300 pw * 52 / 12 = 1300
        assert_eq!(parse_price_text("£300 pw"), Some(1300));
        assert_eq!(parse_price_text("300 per week"), Some(1300));
        // 275 pw * 52 / 12 = 1191.66… -> 1192
        assert_eq!(parse_price_text("£275 weekly"), Some(1192));
    }

    #[test]
    fn test_price_without_digits_is_none() {
        assert_eq!(parse_price_text("POA"), None);
        assert_eq!(parse_price_text(""), None);
    }

    #[test]
    fn test_zero_price_is_none() {
        assert_eq!(parse_price_text("£0 pcm"), None);
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count("3"), Some(3));
        assert_eq!(coerce_count("3 bed semi-detached"), Some(3));
        assert_eq!(coerce_count("studio"), None);
        assert_eq!(coerce_count("0"), None);
    }

    #[test]
    fn test_normalize_postcode() {
        assert_eq!(normalize_postcode("L1 2AB"), Some("L12AB".to_string()));
        assert_eq!(normalize_postcode("l1 2ab"), Some("L12AB".to_string()));
        assert_eq!(
            normalize_postcode("Flat 2, 9 Sample Road, Liverpool L4 5EF, UK"),
            Some("L45EF".to_string())
        );
        assert_eq!(normalize_postcode("SW19 7NE"), Some("SW197NE".to_string()));
        assert_eq!(normalize_postcode("no postcode here"), None);
    }
}
