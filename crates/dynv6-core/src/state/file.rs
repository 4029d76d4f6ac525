// # File Address Store
//
// File-based implementation of AddressStore.
//
// ## Purpose
//
// Remembers the last address sent to dynv6 for each family across restarts,
// so a restart with unchanged addresses does not trigger an update.
//
// ## File Layout
//
// ```text
// <data_dir>/
// ├── .dynv6.addr4   "203.0.113.7" or empty
// └── .dynv6.addr6   "2001:db8::7" or empty
// ```
//
// Plain text, no trailing newline, no metadata.
//
// ## Crash Behavior
//
// - Atomic writes: each value is written to a `.tmp` file, then renamed
// - A missing file loads as empty (first start)
// - Garbage in a file loads as empty with a warning, which forces a resend

use async_trait::async_trait;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::{AddressFamily, AddressStore};

/// File holding the last-sent IPv4 address
pub const IPV4_FILE: &str = ".dynv6.addr4";

/// File holding the last-sent IPv6 address
pub const IPV6_FILE: &str = ".dynv6.addr6";

/// File-based address store
///
/// Values are loaded once in [`FileAddressStore::open`] and served from
/// memory afterwards. Every [`AddressStore::set`] rewrites the family's file
/// before updating memory.
///
/// # Example
///
/// ```rust,no_run
/// use dynv6_core::state::FileAddressStore;
/// use dynv6_core::traits::{AddressFamily, AddressStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut store = FileAddressStore::open("/var/lib/dynv6").await?;
///
///     store.set(AddressFamily::Ipv4, "203.0.113.7").await?;
///     assert_eq!(store.get(AddressFamily::Ipv4), "203.0.113.7");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileAddressStore {
    dir: PathBuf,
    ipv4: String,
    ipv6: String,
}

impl FileAddressStore {
    /// Open (and create if needed) the data directory and load both files
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(&dir).await.map_err(|e| {
                Error::storage(format!(
                    "Failed to create data directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let ipv4 = Self::load_value(&dir.join(IPV4_FILE), AddressFamily::Ipv4).await?;
        let ipv6 = Self::load_value(&dir.join(IPV6_FILE), AddressFamily::Ipv6).await?;

        tracing::debug!(
            "Loaded cached addresses from {}: ipv4='{}', ipv6='{}'",
            dir.display(),
            ipv4,
            ipv6
        );

        Ok(Self { dir, ipv4, ipv6 })
    }

    /// Path of the file backing `family`
    pub fn path(&self, family: AddressFamily) -> PathBuf {
        self.dir.join(Self::file_name(family))
    }

    fn file_name(family: AddressFamily) -> &'static str {
        match family {
            AddressFamily::Ipv4 => IPV4_FILE,
            AddressFamily::Ipv6 => IPV6_FILE,
        }
    }

    /// Read one family's file; missing means empty
    async fn load_value(path: &Path, family: AddressFamily) -> Result<String, Error> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Cache file does not exist: {}", path.display());
                return Ok(String::new());
            }
            Err(e) => {
                return Err(Error::storage(format!(
                    "Failed to read cache file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let value = content.trim();
        if value.is_empty() {
            return Ok(String::new());
        }

        match value.parse::<IpAddr>() {
            Ok(ip) if family.matches(&ip) => Ok(value.to_string()),
            _ => {
                tracing::warn!(
                    "Cache file {} does not hold an {} address ('{}'), treating as empty",
                    path.display(),
                    family,
                    value
                );
                Ok(String::new())
            }
        }
    }

    /// Write one family's file atomically
    async fn write_value(path: &Path, value: &str) -> Result<(), Error> {
        let mut temp_path = path.as_os_str().to_owned();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::storage(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(value.as_bytes()).await.map_err(|e| {
                Error::storage(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::storage(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, path).await.map_err(|e| {
            Error::storage(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::trace!("Cache file written: {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl AddressStore for FileAddressStore {
    fn get(&self, family: AddressFamily) -> &str {
        match family {
            AddressFamily::Ipv4 => &self.ipv4,
            AddressFamily::Ipv6 => &self.ipv6,
        }
    }

    async fn set(&mut self, family: AddressFamily, value: &str) -> Result<(), Error> {
        Self::write_value(&self.path(family), value).await?;

        let slot = match family {
            AddressFamily::Ipv4 => &mut self.ipv4,
            AddressFamily::Ipv6 => &mut self.ipv6,
        };
        *slot = value.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_files_load_as_empty() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");

        let store = FileAddressStore::open(&data_dir).await.unwrap();

        assert!(data_dir.is_dir(), "data directory should be created");
        assert_eq!(store.get(AddressFamily::Ipv4), "");
        assert_eq!(store.get(AddressFamily::Ipv6), "");
    }

    #[tokio::test]
    async fn test_loads_existing_values_exactly() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(IPV4_FILE), "127.0.0.1").unwrap();
        std::fs::write(dir.path().join(IPV6_FILE), "::").unwrap();

        let store = FileAddressStore::open(dir.path()).await.unwrap();

        assert_eq!(store.get(AddressFamily::Ipv4), "127.0.0.1");
        assert_eq!(store.get(AddressFamily::Ipv6), "::");
    }

    #[tokio::test]
    async fn test_garbage_loads_as_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(IPV4_FILE), "<html>502</html>").unwrap();
        // IPv4 address in the IPv6 slot
        std::fs::write(dir.path().join(IPV6_FILE), "10.0.0.1").unwrap();

        let store = FileAddressStore::open(dir.path()).await.unwrap();

        assert_eq!(store.get(AddressFamily::Ipv4), "");
        assert_eq!(store.get(AddressFamily::Ipv6), "");
    }

    #[tokio::test]
    async fn test_set_writes_through_and_round_trips() {
        let dir = tempdir().unwrap();
        let mut store = FileAddressStore::open(dir.path()).await.unwrap();

        store.set(AddressFamily::Ipv4, "127.0.1.1").await.unwrap();
        store.set(AddressFamily::Ipv6, "::1").await.unwrap();

        assert_eq!(store.get(AddressFamily::Ipv4), "127.0.1.1");
        assert_eq!(store.get(AddressFamily::Ipv6), "::1");
        assert_eq!(
            std::fs::read_to_string(dir.path().join(IPV4_FILE)).unwrap(),
            "127.0.1.1"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join(IPV6_FILE)).unwrap(),
            "::1"
        );
        assert!(!dir.path().join(".dynv6.addr4.tmp").exists());

        // Empty string is a value like any other
        store.set(AddressFamily::Ipv4, "").await.unwrap();
        assert_eq!(store.get(AddressFamily::Ipv4), "");
        assert_eq!(
            std::fs::read_to_string(dir.path().join(IPV4_FILE)).unwrap(),
            ""
        );
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let mut store = FileAddressStore::open(dir.path()).await.unwrap();
            store.set(AddressFamily::Ipv4, "2.2.2.2").await.unwrap();
        }

        let store = FileAddressStore::open(dir.path()).await.unwrap();
        assert_eq!(store.get(AddressFamily::Ipv4), "2.2.2.2");
        assert_eq!(store.get(AddressFamily::Ipv6), "");
    }

    #[tokio::test]
    async fn test_clear_all_empties_both_files() {
        let dir = tempdir().unwrap();
        let mut store = FileAddressStore::open(dir.path()).await.unwrap();
        store.set(AddressFamily::Ipv4, "2.2.2.2").await.unwrap();
        store.set(AddressFamily::Ipv6, "2001:db8::2").await.unwrap();

        store.clear_all().await.unwrap();

        let reopened = FileAddressStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get(AddressFamily::Ipv4), "");
        assert_eq!(reopened.get(AddressFamily::Ipv6), "");
    }
}
