//! URL utilities: canonicalization and host substitution
//!
//! Canonical URLs are the stable identity keys used by the deduper; host
//! substitution supports the mobile-host rung of the fallback ladder.

mod normalize;

pub use normalize::canonical_url;

use url::Url;

/// Rewrites the host of a URL, preserving everything else.
///
/// Used by the fallback ladder to retarget a listing URL at the site's
/// mobile subdomain, which is observed to be less aggressively gated.
/// Returns the original URL unchanged if it cannot be parsed or has no
/// host to replace.
pub fn substitute_host(url: &str, new_host: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.host_str().is_none() {
                return url.to_string();
            }
            match parsed.set_host(Some(new_host)) {
                Ok(()) => parsed.to_string(),
                Err(_) => url.to_string(),
            }
        }
        Err(_) => url.to_string(),
    }
}
