use crate::crawler::render::{RenderEngine, RenderWait, Rendering};
use crate::listing::RawDocument;
use crate::transport::TransportDescriptor;
use crate::{NavigationError, RenderError};
use std::time::Duration;

/// Bound on the document-ready tier of a navigation attempt
const READY_TIMEOUT: Duration = Duration::from_secs(20);

/// Shorter bound on the network-idle fallback tier
const IDLE_TIMEOUT: Duration = Duration::from_secs(8);

/// Body fragments that identify a block page regardless of status code
const BLOCK_SIGNATURES: &[&str] = &[
    "access denied",
    "unusual traffic",
    "attention required",
    "verify you are a human",
    "captcha",
    "pardon our interruption",
];

/// Decides whether a response is a block page
///
/// The blocked/timeout boundary is deliberately pluggable: sites change
/// their gating pages more often than their markup. The default treats
/// 403/429 and known body signatures as blocked; anything else that
/// outlives the wait bounds is a timeout.
pub trait BlockClassifier: Send + Sync {
    fn is_blocked(&self, status: u16, body: &str) -> bool;
}

/// Default classifier: 403/429 status or a known block-page signature
#[derive(Debug, Default)]
pub struct DefaultBlockClassifier;

impl BlockClassifier for DefaultBlockClassifier {
    fn is_blocked(&self, status: u16, body: &str) -> bool {
        if status == 403 || status == 429 {
            return true;
        }
        let body = body.to_lowercase();
        BLOCK_SIGNATURES.iter().any(|sig| body.contains(sig))
    }
}

/// Markers whose presence proves the page content actually rendered
///
/// Transport-independent per page kind: a search page is stable once a
/// result card exists, a detail page once pricing or structured data
/// shows up. Any one fragment matching counts.
#[derive(Debug, Clone)]
pub struct ContentMarker {
    fragments: &'static [&'static str],
}

impl ContentMarker {
    /// Marker for search result pages
    pub fn search() -> Self {
        Self {
            fragments: &[r#"data-testid="search-result""#, "/to-rent/details/"],
        }
    }

    /// Marker for listing detail pages
    pub fn detail() -> Self {
        Self {
            fragments: &[
                "application/ld+json",
                r#"data-testid="price""#,
                r#"data-testid="address-label""#,
            ],
        }
    }

    pub fn is_present(&self, body: &str) -> bool {
        self.fragments.iter().any(|fragment| body.contains(fragment))
    }
}

/// Drives the rendering engine to a stable document state
///
/// The stable-navigation algorithm: request document-ready, wait a
/// bounded time for the content marker, then fall back to a
/// network-idle render with a second, shorter bound. A blocked
/// classification always wins over marker presence; it routes to a
/// different ladder recovery path than a timeout does.
pub struct NavigationController {
    classifier: Box<dyn BlockClassifier>,
}

impl NavigationController {
    pub fn new() -> Self {
        Self {
            classifier: Box::new(DefaultBlockClassifier),
        }
    }

    /// Swaps in a non-default block classifier
    pub fn with_classifier(classifier: Box<dyn BlockClassifier>) -> Self {
        Self { classifier }
    }

    /// Navigates to a stable rendition of `url` over `transport`
    pub async fn navigate(
        &self,
        engine: &dyn RenderEngine,
        url: &str,
        transport: &TransportDescriptor,
        marker: &ContentMarker,
    ) -> Result<RawDocument, NavigationError> {
        // Tier 1: document-ready, accept only if the marker appeared
        match engine
            .render(url, transport, RenderWait::DocumentReady, READY_TIMEOUT)
            .await
        {
            Ok(rendering) => {
                self.classify(url, &rendering)?;
                if marker.is_present(&rendering.body) {
                    return Ok(into_document(rendering, transport));
                }
                tracing::debug!(url, "content marker absent after document-ready, falling back to network-idle");
            }
            Err(RenderError::Timeout { .. }) => {
                tracing::debug!(url, "document-ready render timed out, falling back to network-idle");
            }
            Err(RenderError::Request { source, .. }) => {
                // Transient transport failures take the timeout recovery
                // path: retry the same rung once, then escalate.
                tracing::debug!(url, error = %source, "render request failed");
                return Err(NavigationError::Timeout {
                    url: url.to_string(),
                });
            }
        }

        // Tier 2: network-idle with the shorter bound; a stable render
        // is accepted here even without the marker.
        match engine
            .render(url, transport, RenderWait::NetworkIdle, IDLE_TIMEOUT)
            .await
        {
            Ok(rendering) => {
                self.classify(url, &rendering)?;
                Ok(into_document(rendering, transport))
            }
            Err(_) => Err(NavigationError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    /// Blocked beats everything else; then plain status screening
    fn classify(&self, url: &str, rendering: &Rendering) -> Result<(), NavigationError> {
        if self.classifier.is_blocked(rendering.status, &rendering.body) {
            return Err(NavigationError::Blocked {
                url: url.to_string(),
                status: rendering.status,
            });
        }
        if !(200..300).contains(&rendering.status) {
            return Err(NavigationError::NonSuccess {
                url: url.to_string(),
                status: rendering.status,
            });
        }
        Ok(())
    }
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}

fn into_document(rendering: Rendering, transport: &TransportDescriptor) -> RawDocument {
    RawDocument {
        url: rendering.final_url,
        body: rendering.body,
        status: rendering.status,
        transport: transport.label(),
    }
}
