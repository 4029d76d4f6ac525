// # dynv6 Update API Clients
//
// This crate provides the two dynv6 update endpoints as `UpdateApi`
// implementations.
//
// ## Endpoints
//
// - REST update API (default):
//   `GET https://dynv6.com/api/update?hostname=..&token=..[&ipv4=..][&ipv6=..]`,
//   any 2xx status is success
// - DynDNS-compatible API:
//   `GET https://dynv6.com/nic/update?hostname=..&myip=<v4>,<v6>` with HTTP
//   basic auth (user `none`, password = token); success additionally
//   requires a body starting with `good` or `nochg`
//
// ## Constraints
//
// - Exactly one HTTP request per `send` call
// - NO retry logic (owned by UpdateClient)
// - NO cache access (owned by UpdateClient)
// - 5 second timeout per request
// - Token never appears in logs or Debug output
//
// ## Error Mapping
//
// | Outcome | Result |
// |---|---|
// | Any HTTP answer | `Ok(ApiResponse)`; the client decides via `accepts` |
// | Transport timeout | `Err(Error::ProviderTimeout)` |
// | Other transport failure | `Err(Error::ProviderUnavailable)` |

use async_trait::async_trait;
use dynv6_core::config::{ApiKind, Dynv6Config};
use dynv6_core::traits::{ApiResponse, UpdateApi, UpdateRequest};
use dynv6_core::{Error, Result};
use serde::Serialize;
use std::time::Duration;

/// dynv6 REST update endpoint
pub const DEFAULT_UPDATE_URL: &str = "https://dynv6.com/api/update";

/// dynv6 DynDNS-compatible endpoint
pub const DEFAULT_DYNDNS_URL: &str = "https://dynv6.com/nic/update";

/// Default HTTP timeout for one update call
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Basic-auth user name expected by the DynDNS endpoint
const DYNDNS_USER: &str = "none";

/// Body prefixes the DynDNS endpoint uses for a successful update
const DYNDNS_SUCCESS: &[&str] = &["good", "nochg"];

fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

fn transport_error(api: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::timeout(format!("{}: {}", api, e.without_url()))
    } else {
        Error::unavailable(format!("{}: request failed: {}", api, e.without_url()))
    }
}

async fn read_response(api: &str, response: reqwest::Response) -> Result<ApiResponse> {
    let status = response.status().as_u16();
    // A status line is an answer even when the body is cut short
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(
                "{}: failed to read {} response body: {}",
                api,
                status,
                e.without_url()
            );
            String::new()
        }
    };

    tracing::debug!("{} answered {}: {}", api, status, body.trim());
    Ok(ApiResponse::new(status, body))
}

/// Client for the dynv6 REST update endpoint
///
/// # Security
///
/// The token travels in the query string, so reqwest errors are stripped of
/// their URL before they reach an error message.
#[derive(Clone)]
pub struct Dynv6UpdateApi {
    url: String,
    client: reqwest::Client,
}

// Custom Debug implementation: the URL is safe, the client is noise
impl std::fmt::Debug for Dynv6UpdateApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dynv6UpdateApi")
            .field("url", &self.url)
            .finish()
    }
}

impl Dynv6UpdateApi {
    /// Create a client for the default endpoint
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(DEFAULT_UPDATE_URL, build_client()?))
    }

    /// Create a client for a custom endpoint with a pre-built HTTP client
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

#[async_trait]
impl UpdateApi for Dynv6UpdateApi {
    async fn send(&self, request: &UpdateRequest) -> Result<ApiResponse> {
        tracing::debug!(
            "Calling {} for {}",
            self.url,
            request.hostname()
        );

        let response = self
            .client
            .get(&self.url)
            .query(request)
            .send()
            .await
            .map_err(|e| transport_error(self.api_name(), e))?;

        read_response(self.api_name(), response).await
    }

    fn api_name(&self) -> &'static str {
        "dynv6 update API"
    }
}

/// Query string of the DynDNS endpoint
#[derive(Debug, Serialize)]
struct DynDnsQuery<'a> {
    hostname: &'a str,
    myip: String,
}

impl<'a> DynDnsQuery<'a> {
    /// Changed addresses only, IPv4 first, comma-joined
    fn from_request(request: &'a UpdateRequest) -> Self {
        let myip = request
            .changed_fields()
            .into_values()
            .collect::<Vec<_>>()
            .join(",");

        Self {
            hostname: request.hostname(),
            myip,
        }
    }
}

/// Client for the dynv6 DynDNS-compatible endpoint
#[derive(Clone)]
pub struct Dynv6DynDnsApi {
    url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for Dynv6DynDnsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dynv6DynDnsApi")
            .field("url", &self.url)
            .finish()
    }
}

impl Dynv6DynDnsApi {
    /// Create a client for the default endpoint
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(DEFAULT_DYNDNS_URL, build_client()?))
    }

    /// Create a client for a custom endpoint with a pre-built HTTP client
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

#[async_trait]
impl UpdateApi for Dynv6DynDnsApi {
    async fn send(&self, request: &UpdateRequest) -> Result<ApiResponse> {
        let query = DynDnsQuery::from_request(request);
        tracing::debug!("Calling {} with {:?}", self.url, query);

        let response = self
            .client
            .get(&self.url)
            .basic_auth(DYNDNS_USER, Some(request.token()))
            .query(&query)
            .send()
            .await
            .map_err(|e| transport_error(self.api_name(), e))?;

        read_response(self.api_name(), response).await
    }

    fn accepts(&self, response: &ApiResponse) -> bool {
        let body = response.body.trim_start();
        response.is_success() && DYNDNS_SUCCESS.iter().any(|prefix| body.starts_with(prefix))
    }

    fn api_name(&self) -> &'static str {
        "dynv6 DynDNS API"
    }
}

/// Build the update API selected by `config.api`
pub fn create_update_api(config: &Dynv6Config) -> Result<Box<dyn UpdateApi>> {
    let api: Box<dyn UpdateApi> = match config.api {
        ApiKind::Update => Box::new(Dynv6UpdateApi::new()?),
        ApiKind::DynDns => Box::new(Dynv6DynDnsApi::new()?),
    };

    tracing::debug!("Using {}", api.api_name());
    Ok(api)
}
