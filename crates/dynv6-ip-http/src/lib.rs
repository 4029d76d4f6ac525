// # HTTP IPv4 Source
//
// This crate provides the public IPv4 address source for the dynv6 agent.
//
// ## Purpose
//
// A host behind NAT cannot see its public IPv4 address on any interface,
// so it asks an external echo service. The service answers a plain `GET`
// with the caller's address as a text body.
//
// ## Behavior
//
// - One request per call to `current()`, no caching, no background polling
// - 5 second timeout per request
// - Body is trimmed and must parse as an IPv4 address
// - Timeouts map to `Error::ProviderTimeout`, everything else to
//   `Error::ProviderUnavailable`; the update client skips IPv4 for that cycle

use dynv6_core::traits::{AddressFamily, AddressSource};
use dynv6_core::{Error, Result};

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Default public IPv4 echo service
pub const DEFAULT_IPV4_URL: &str = "https://api4.my-ip.io/ip";

/// Default HTTP timeout for one lookup
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Public IPv4 source backed by a plain-text echo service
#[derive(Debug, Clone)]
pub struct HttpIpv4Source {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpv4Source {
    /// Create a source for the default service
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_IPV4_URL)
    }

    /// Create a source for a custom service URL
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(url, client))
    }

    /// Create a source with a pre-built client (custom timeout, proxy, TLS)
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl AddressSource for HttpIpv4Source {
    async fn current(&self) -> Result<IpAddr> {
        tracing::debug!("Fetching public IPv4 address from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| transport_error(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::unavailable(format!(
                "{}: HTTP error: {}",
                self.url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&self.url, e))?;

        parse_ipv4_body(&body).map(IpAddr::V4)
    }

    fn family(&self) -> AddressFamily {
        AddressFamily::Ipv4
    }
}

/// Parse an echo service body: one IPv4 address, surrounding whitespace allowed
pub fn parse_ipv4_body(body: &str) -> Result<Ipv4Addr> {
    let text = body.trim();
    text.parse()
        .map_err(|_| Error::unavailable(format!("Invalid IPv4 address in response: {:?}", text)))
}

fn transport_error(url: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::timeout(format!("{}: {}", url, e))
    } else {
        Error::unavailable(format!("{}: request failed: {}", url, e))
    }
}
