//! Transport descriptors and proxy resolution
//!
//! A transport descriptor names one way of reaching the target site:
//! direct, through a configured proxy, or direct against the mobile host.
//! The fallback ladder walks an ordered sequence of these.

mod proxy;
mod user_agent;

pub use proxy::{resolve_proxy, ProxyCredentials, ProxyEndpoint};
pub use user_agent::{random_desktop_ua, random_mobile_ua};

use std::fmt;

/// One way of reaching the target site
///
/// `Mobile` is still a direct connection; it exists as its own variant
/// because it changes both the request host and the user agent, and the
/// run metrics count it separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportDescriptor {
    /// Plain connection, desktop user agent
    Direct,

    /// Connection through the configured proxy endpoint
    Proxied(ProxyEndpoint),

    /// Plain connection with the URL host rewritten to the mobile subdomain
    Mobile,
}

impl TransportDescriptor {
    /// Short label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            TransportDescriptor::Direct => "direct",
            TransportDescriptor::Proxied(_) => "proxy",
            TransportDescriptor::Mobile => "mobile",
        }
    }

    /// Picks a user agent appropriate for this transport
    pub fn user_agent(&self) -> &'static str {
        match self {
            TransportDescriptor::Mobile => random_mobile_ua(),
            _ => random_desktop_ua(),
        }
    }
}

impl fmt::Display for TransportDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
