// # Interface IPv6 Source
//
// This crate provides the IPv6 address source for the dynv6 agent.
//
// ## Purpose
//
// IPv6 hosts are usually globally addressable, so the address to publish is
// the one bound to a local interface. No external service is involved.
//
// ## Selection
//
// The first IPv6 address the OS reports for the configured interface wins,
// skipping link-local `fe80::/10` addresses which are useless in DNS.
//
// ## Platform Support
//
// Enumeration uses `getifaddrs` on unix and `GetAdaptersAddresses` on
// Windows, through the `local-ip-address` crate.

use dynv6_core::traits::{AddressFamily, AddressSource};
use dynv6_core::{Error, Result};

use std::net::{IpAddr, Ipv6Addr};

/// IPv6 source reading the addresses bound to one network interface
#[derive(Debug, Clone)]
pub struct InterfaceIpv6Source {
    interface: String,
}

impl InterfaceIpv6Source {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

#[async_trait::async_trait]
impl AddressSource for InterfaceIpv6Source {
    async fn current(&self) -> Result<IpAddr> {
        let addresses = local_ip_address::list_afinet_netifas().map_err(|e| {
            Error::unavailable(format!("Failed to list network interfaces: {}", e))
        })?;

        tracing::trace!(
            "{} interface addresses reported, looking for {}",
            addresses.len(),
            self.interface
        );

        select_ipv6(&self.interface, &addresses)
            .map(IpAddr::V6)
            .ok_or_else(|| {
                Error::unavailable(format!(
                    "No usable IPv6 address on interface {}",
                    self.interface
                ))
            })
    }

    fn family(&self) -> AddressFamily {
        AddressFamily::Ipv6
    }
}

/// First non-link-local IPv6 address of `interface`, in OS order
pub fn select_ipv6(interface: &str, addresses: &[(String, IpAddr)]) -> Option<Ipv6Addr> {
    addresses
        .iter()
        .filter(|(name, _)| name == interface)
        .find_map(|(_, ip)| match ip {
            IpAddr::V6(v6) if !is_link_local(v6) => Some(*v6),
            _ => None,
        })
}

fn is_link_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xffc0 == 0xfe80
}
