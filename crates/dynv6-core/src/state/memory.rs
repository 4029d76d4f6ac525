// # Memory Address Store
//
// In-memory implementation of AddressStore.
//
// ## Purpose
//
// Provides a store that doesn't persist across restarts. Useful for testing
// and for deployments where one extra update after a restart is harmless.
//
// ## Crash Behavior
//
// - All state is lost on restart/crash
// - First cycle after a restart treats every family as changed

use async_trait::async_trait;

use crate::Error;
use crate::traits::{AddressFamily, AddressStore};

/// In-memory address store
///
/// # Example
///
/// ```rust
/// use dynv6_core::state::MemoryAddressStore;
/// use dynv6_core::traits::{AddressFamily, AddressStore};
///
/// let store = MemoryAddressStore::with_values("1.1.1.1", "");
/// assert_eq!(store.get(AddressFamily::Ipv4), "1.1.1.1");
/// assert_eq!(store.get(AddressFamily::Ipv6), "");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryAddressStore {
    ipv4: String,
    ipv6: String,
}

impl MemoryAddressStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with last-sent values
    pub fn with_values(ipv4: impl Into<String>, ipv6: impl Into<String>) -> Self {
        Self {
            ipv4: ipv4.into(),
            ipv6: ipv6.into(),
        }
    }
}

#[async_trait]
impl AddressStore for MemoryAddressStore {
    fn get(&self, family: AddressFamily) -> &str {
        match family {
            AddressFamily::Ipv4 => &self.ipv4,
            AddressFamily::Ipv6 => &self.ipv6,
        }
    }

    async fn set(&mut self, family: AddressFamily, value: &str) -> Result<(), Error> {
        let slot = match family {
            AddressFamily::Ipv4 => &mut self.ipv4,
            AddressFamily::Ipv6 => &mut self.ipv6,
        };
        *slot = value.to_string();
        Ok(())
    }
}
