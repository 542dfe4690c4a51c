use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Characters escaped when a target URL travels as a query component.
/// Matches the unreserved set left alone by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// How a route combines its base URL with the target URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteEncoding {
    /// Request the target itself; the base URL is ignored.
    Direct,
    /// Append the target verbatim to the base URL.
    Append,
    /// Percent-encode the target and append it to the base URL.
    EncodedQuery,
}

/// One way of reaching the upstream source: direct, or through a relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportRoute {
    pub name: String,
    #[serde(default)]
    pub base_url: String,
    pub encoding: RouteEncoding,
}

impl TransportRoute {
    #[must_use]
    pub fn direct(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: String::new(),
            encoding: RouteEncoding::Direct,
        }
    }

    #[must_use]
    pub fn appending(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            encoding: RouteEncoding::Append,
        }
    }

    #[must_use]
    pub fn encoded(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            encoding: RouteEncoding::EncodedQuery,
        }
    }

    /// Effective request URL for `target` on this route.
    #[must_use]
    pub fn request_url(&self, target: &str) -> String {
        match self.encoding {
            RouteEncoding::Direct => target.to_owned(),
            RouteEncoding::Append => format!("{}{target}", self.base_url),
            RouteEncoding::EncodedQuery => format!(
                "{}{}",
                self.base_url,
                utf8_percent_encode(target, URI_COMPONENT)
            ),
        }
    }
}

/// Direct first, then the public relays in the order they proved reliable.
#[must_use]
pub fn default_routes() -> Vec<TransportRoute> {
    vec![
        TransportRoute::direct("direct"),
        TransportRoute::encoded("corsproxy", "https://corsproxy.io/?"),
        TransportRoute::encoded("allorigins", "https://api.allorigins.win/raw?url="),
        TransportRoute::appending("corsproxy-raw", "https://corsproxy.io/?"),
    ]
}
