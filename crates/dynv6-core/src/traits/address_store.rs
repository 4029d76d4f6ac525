// # Address Store Trait
//
// Defines the interface for the last-sent address of each family.
//
// ## Purpose
//
// The store is what makes a cycle cheap: a family whose current address
// equals the stored one is not sent again. Clearing a family forces the next
// cycle to resend it.
//
// ## Implementations
//
// - File-based: one plain-text file per family (`FileAddressStore`)
// - In-memory: `MemoryAddressStore`
//
// ## Usage
//
// ```rust,ignore
// use dynv6_core::{AddressStore, AddressFamily, FileAddressStore};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let mut store = FileAddressStore::open("data").await?;
//
//     // Pure read, no I/O
//     let last = store.get(AddressFamily::Ipv4);
//
//     // Explicit write, hits the disk
//     store.set(AddressFamily::Ipv4, "203.0.113.7").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use super::address_source::AddressFamily;

/// Trait for address store implementations
///
/// Reads and writes are deliberately asymmetric:
///
/// - [`AddressStore::get`] is a pure in-memory read and never touches the disk
/// - [`AddressStore::set`] performs I/O and only updates memory once the
///   write succeeded
///
/// After `set` returns `Ok`, `get` returns exactly the value written,
/// including the empty string.
///
/// # Trust Level: Trusted (Core Component)
///
/// The store is written only by the `UpdateClient`. It holds no business
/// logic: deciding when to write or clear belongs to the client.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Last-sent value for `family`, empty when unknown
    fn get(&self, family: AddressFamily) -> &str;

    /// Persist `value` for `family`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Value persisted and visible to `get`
    /// - `Err(Error::StorageFailure)`: Write failed, memory unchanged
    async fn set(&mut self, family: AddressFamily, value: &str) -> Result<(), crate::Error>;

    /// Reset every family to empty, forcing a resend on the next cycle
    async fn clear_all(&mut self) -> Result<(), crate::Error> {
        for family in AddressFamily::ALL {
            self.set(family, "").await?;
        }
        Ok(())
    }
}
