// # Address Source Trait
//
// Defines the interface for fetching the host's current address of one
// family.
//
// ## Implementations
//
// - Public IPv4 over HTTP: `dynv6-ip-http` crate
// - Interface IPv6: `dynv6-ip-iface` crate
//
// ## Usage
//
// ```rust,ignore
// use dynv6_core::AddressSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* AddressSource implementation */;
//
//     let current = source.current().await?;
//     println!("{}: {}", source.family(), current);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;

/// Address family tracked by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Both families, in check order
    pub const ALL: [AddressFamily; 2] = [AddressFamily::Ipv4, AddressFamily::Ipv6];

    /// Query parameter name used by the update API
    pub fn param(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
        }
    }

    /// Whether `ip` belongs to this family
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            AddressFamily::Ipv4 => ip.is_ipv4(),
            AddressFamily::Ipv6 => ip.is_ipv6(),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

/// Trait for address source implementations
///
/// A source answers one question: what is the current address of its family?
/// It holds no state between calls and never decides whether an update is
/// needed; that belongs to the `UpdateClient`.
///
/// Implementations must bound every blocking operation with a timeout and
/// report it as [`crate::Error::ProviderTimeout`]. Other failures are
/// [`crate::Error::ProviderUnavailable`].
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Fetch the current address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current address, always of [`Self::family`]
    /// - `Err(Error)`: If the address cannot be determined
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// The family this source reports
    fn family(&self) -> AddressFamily;
}
