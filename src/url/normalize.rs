use url::Url;

/// Host prefixes that resolve to the same site and are stripped so the
/// desktop and mobile renditions of a listing share one identity.
const HOST_PREFIXES: &[&str] = &["www.", "m."];

/// Canonicalizes a listing URL into its stable identity form
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; an unparseable input falls back to a trimmed,
///    lowercased copy of the raw string (dedupe must never abort a run)
/// 2. Lowercase the host
/// 3. Strip `www.` / `m.` host prefixes so transport variants collide
/// 4. Drop the default port
/// 5. Remove the path's trailing slash (except for root `/`)
/// 6. Drop the query string and fragment entirely: listing detail pages
///    carry only tracking/search parameters there
///
/// The result determines dedupe correctness: two fetches of the same
/// listing through different transports must canonicalize identically.
pub fn canonical_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw.trim()) else {
        return raw.trim().to_lowercase();
    };

    if let Some(host) = url.host_str() {
        let mut host = host.to_lowercase();
        for prefix in HOST_PREFIXES {
            if let Some(stripped) = host.strip_prefix(prefix) {
                host = stripped.to_string();
                break;
            }
        }
        // set_host only fails for cannot-be-a-base URLs, excluded above by parse
        let _ = url.set_host(Some(&host));
    }

    url.set_query(None);
    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    url.to_string()
}
