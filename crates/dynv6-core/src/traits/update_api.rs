// # Update API Trait
//
// Defines the interface for notifying the remote DNS provider of new
// addresses.
//
// ## Implementations
//
// - dynv6 REST update API and DynDNS-compatible API: `dynv6-provider` crate
//
// ## Usage
//
// ```rust,ignore
// use dynv6_core::{UpdateApi, UpdateRequest, AddressFamily};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let api = /* UpdateApi implementation */;
//
//     let mut request = UpdateRequest::new("myhost.dynv6.net", "token");
//     request.stage(AddressFamily::Ipv4, "203.0.113.7");
//
//     let response = api.send(&request).await?;
//     if api.accepts(&response) {
//         println!("{}", response.body);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

use super::address_source::AddressFamily;

/// One update call, built by a cycle that detected a change
///
/// Serializes to the query string of the dynv6 update endpoint:
/// `hostname`, `token`, and one parameter per changed family.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRequest {
    hostname: String,
    token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ipv4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ipv6: Option<String>,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for UpdateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateRequest")
            .field("hostname", &self.hostname)
            .field("token", &"<REDACTED>")
            .field("ipv4", &self.ipv4)
            .field("ipv6", &self.ipv6)
            .finish()
    }
}

impl UpdateRequest {
    /// Create a request with no changed family
    pub fn new(hostname: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            token: token.into(),
            ipv4: None,
            ipv6: None,
        }
    }

    /// Record a changed family
    pub fn stage(&mut self, family: AddressFamily, value: impl Into<String>) {
        let slot = match family {
            AddressFamily::Ipv4 => &mut self.ipv4,
            AddressFamily::Ipv6 => &mut self.ipv6,
        };
        *slot = Some(value.into());
    }

    /// The staged value for `family`, if it changed
    pub fn changed(&self, family: AddressFamily) -> Option<&str> {
        match family {
            AddressFamily::Ipv4 => self.ipv4.as_deref(),
            AddressFamily::Ipv6 => self.ipv6.as_deref(),
        }
    }

    /// Changed families and their new values
    pub fn changed_fields(&self) -> BTreeMap<AddressFamily, &str> {
        AddressFamily::ALL
            .into_iter()
            .filter_map(|family| self.changed(family).map(|value| (family, value)))
            .collect()
    }

    /// Whether any family changed
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_none() && self.ipv6.is_none()
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// ⚠️ NEVER log this value
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Status and body of one update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, verbatim
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for update API implementations
///
/// Implementations perform exactly one HTTP request per `send` call. Retries
/// and cache reconciliation are owned by the `UpdateClient`.
///
/// # Errors
///
/// - [`crate::Error::ProviderTimeout`]: connect/read timeout, no answer
/// - [`crate::Error::ProviderUnavailable`]: any other transport failure
///
/// A response with a non-success status is NOT an error at this layer; it is
/// returned as `Ok(ApiResponse)` and judged by [`UpdateApi::accepts`].
#[async_trait]
pub trait UpdateApi: Send + Sync {
    /// Send one update request
    async fn send(&self, request: &UpdateRequest) -> Result<ApiResponse, crate::Error>;

    /// Whether the response confirms the update
    ///
    /// Defaults to "status is 2xx".
    fn accepts(&self, response: &ApiResponse) -> bool {
        response.is_success()
    }

    /// Name used in logs
    fn api_name(&self) -> &'static str;
}
