use url::Url;

/// Main configuration structure for a scrape run
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote sink endpoint; `None` means buffer-only mode
    pub sink_url: Option<String>,

    /// Raw proxy specification, resolved lazily by the transport layer
    pub proxy_spec: Option<String>,

    /// Maximum search result pages fetched per query
    pub pages_per_query: u32,

    /// Lower bound of the randomized inter-request delay (milliseconds)
    pub delay_min_ms: u64,

    /// Upper bound of the randomized inter-request delay (milliseconds)
    pub delay_max_ms: u64,

    /// Hard ceiling on total requests for the run
    pub max_requests_per_run: u32,

    /// Path of the append-only NDJSON dead-letter buffer
    pub buffer_path: std::path::PathBuf,

    /// Host used to build search URLs from bare query tokens
    pub search_host: String,

    /// Mobile subdomain substituted by the last ladder rung
    pub mobile_host: String,

    /// Optional completion-rate floor checked after the run to decide
    /// the process exit status
    pub min_completion_rate: Option<f64>,

    /// Search queries: region tokens (e.g. "L4") or full search URLs
    pub queries: Vec<String>,
}

/// One immutable search input for the run
///
/// Constructed at run start from configuration; read-only thereafter.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// The raw query: a region token or a full search URL
    pub query: String,

    /// Page count bound for this query
    pub pages: u32,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, pages: u32) -> Self {
        Self {
            query: query.into(),
            pages,
        }
    }

    /// Materializes the search-page URL for page `page` (1-based)
    ///
    /// A bare region token expands to the site's rental search pattern;
    /// a query that is already a URL gets its `page` parameter set for
    /// pages beyond the first.
    pub fn page_url(&self, host: &str, page: u32) -> String {
        if self.query.starts_with("http") {
            if page <= 1 {
                return self.query.clone();
            }
            if let Ok(mut url) = Url::parse(&self.query) {
                let retained: Vec<(String, String)> = url
                    .query_pairs()
                    .filter(|(k, _)| k != "page")
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                {
                    let mut pairs = url.query_pairs_mut();
                    pairs.clear();
                    for (k, v) in &retained {
                        pairs.append_pair(k, v);
                    }
                    pairs.append_pair("page", &page.to_string());
                }
                return url.to_string();
            }
            return self.query.clone();
        }

        format!(
            "https://{}/to-rent/property/{}/?page_size=25&page={}",
            host, self.query, page
        )
    }
}
