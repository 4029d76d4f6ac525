//! Update Client: one detect-and-update cycle
//!
//! ## Cycle states
//!
//! ```text
//!          ┌─────────┐  no family changed   ┌──────┐
//!  start ─▶│  Check  │─────────────────────▶│ Idle │
//!          └─────────┘                      └──────┘
//!               │ at least one changed          ▲
//!               ▼                               │
//!          ┌─────────┐  2xx / timeouts x3      │
//!          │  Send   │─────────────────────────┘
//!          └─────────┘
//!               │ rejected
//!               ▼
//!        Err(UpdateRejected)  (fatal, cache cleared)
//! ```
//!
//! Check writes every newly observed address to the store before Send runs.
//! Only a rejection or an exhausted attempt budget clears the store, which
//! makes the next cycle resend unconditionally.

use tracing::{debug, error, info, warn};

use crate::config::Dynv6Config;
use crate::error::{Error, Result};
use crate::traits::{AddressFamily, AddressSource, AddressStore, UpdateApi, UpdateRequest};

/// Attempts per Send phase, first one included
pub const MAX_SEND_ATTEMPTS: usize = 3;

/// Result of the Send phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The API confirmed the update
    Success { body: String },
    /// The API answered and refused; retrying cannot help
    Rejected { status: u16, body: String },
    /// Every attempt ended without an answer
    TimeoutExhausted { attempts: usize },
}

/// Result of a non-fatal cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing changed, nothing sent
    Unchanged,
    /// Update sent and confirmed
    Updated { body: String },
    /// No answer after every attempt; store cleared
    RetryExhausted { attempts: usize },
}

/// Runs detect-and-update cycles
///
/// Owns the address sources, the only writer handle on the address store,
/// and the update API. Constructed once from an immutable [`Dynv6Config`].
pub struct UpdateClient {
    hostname: String,
    token: String,
    enabled: Vec<AddressFamily>,
    sources: Vec<Box<dyn AddressSource>>,
    store: Box<dyn AddressStore>,
    api: Box<dyn UpdateApi>,
    max_attempts: usize,
}

impl UpdateClient {
    /// Create a new update client
    ///
    /// # Parameters
    ///
    /// - `config`: Validated agent configuration
    /// - `sources`: At most one source per family; sources for a family
    ///   disabled in `config` are never called
    /// - `store`: Last-sent address store
    /// - `api`: Remote update API
    pub fn new(
        config: &Dynv6Config,
        sources: Vec<Box<dyn AddressSource>>,
        store: Box<dyn AddressStore>,
        api: Box<dyn UpdateApi>,
    ) -> Result<Self> {
        config.validate()?;

        let enabled = config.enabled_families();
        for family in &enabled {
            match sources.iter().filter(|s| s.family() == *family).count() {
                0 => {
                    return Err(Error::config(format!(
                        "No address source configured for enabled family {}",
                        family
                    )));
                }
                1 => {}
                _ => {
                    return Err(Error::config(format!(
                        "More than one address source configured for {}",
                        family
                    )));
                }
            }
        }

        Ok(Self {
            hostname: config.hostname.clone(),
            token: config.token.clone(),
            enabled,
            sources,
            store,
            api,
            max_attempts: MAX_SEND_ATTEMPTS,
        })
    }

    /// Override the Send attempt budget (at least one attempt is made)
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Read access to the address store
    pub fn store(&self) -> &dyn AddressStore {
        self.store.as_ref()
    }

    /// Run one cycle
    ///
    /// # Returns
    ///
    /// - `Ok(CycleOutcome)`: Cycle finished, the loop may continue
    /// - `Err(Error::UpdateRejected)`: The API refused the update (fatal)
    /// - `Err(Error::StorageFailure)`: The store could not be written (fatal)
    pub async fn cycle(&mut self) -> Result<CycleOutcome> {
        debug!("Checking addresses");

        let request = self.check().await?;
        if request.is_empty() {
            info!("No address change detected");
            return Ok(CycleOutcome::Unchanged);
        }

        info!(
            "Address change detected ({}), starting update via {}",
            describe_changes(&request),
            self.api.api_name()
        );

        match self.send(&request).await {
            SendOutcome::Success { body } => {
                info!("Update accepted: {}", body.trim());
                Ok(CycleOutcome::Updated { body })
            }
            SendOutcome::Rejected { status, body } => {
                error!("Update rejected, code: {}, msg: {}", status, body.trim());
                self.store.clear_all().await?;
                Err(Error::UpdateRejected { status, body })
            }
            SendOutcome::TimeoutExhausted { attempts } => {
                self.store.clear_all().await?;
                warn!(
                    "No answer from {} after {} attempts, cached addresses cleared",
                    self.api.api_name(),
                    attempts
                );
                Ok(CycleOutcome::RetryExhausted { attempts })
            }
        }
    }

    /// Check phase: fetch, compare, stage, and write changed families
    async fn check(&mut self) -> Result<UpdateRequest> {
        let mut request = UpdateRequest::new(self.hostname.as_str(), self.token.as_str());

        for source in &self.sources {
            let family = source.family();
            if !self.enabled.contains(&family) {
                continue;
            }

            let current = match source.current().await {
                Ok(ip) if family.matches(&ip) => ip.to_string(),
                Ok(ip) => {
                    warn!("{} source returned {}, skipping this cycle", family, ip);
                    continue;
                }
                Err(e) => {
                    warn!("Failed to fetch {} address, skipping this cycle: {}", family, e);
                    continue;
                }
            };

            info!("Current {} address: {}", family, current);

            let cached = self.store.get(family);
            if current != cached {
                info!("old {}: {}, current {}: {}", family, cached, family, current);
                request.stage(family, current.as_str());
                self.store.set(family, &current).await?;
            }
        }

        Ok(request)
    }

    /// Send phase: up to `max_attempts` calls, stopping at the first answer
    async fn send(&self, request: &UpdateRequest) -> SendOutcome {
        for attempt in 1..=self.max_attempts {
            match self.api.send(request).await {
                Ok(response) if self.api.accepts(&response) => {
                    return SendOutcome::Success {
                        body: response.body,
                    };
                }
                Ok(response) => {
                    return SendOutcome::Rejected {
                        status: response.status,
                        body: response.body,
                    };
                }
                Err(e) => {
                    warn!(
                        "Update attempt {}/{} got no answer: {}",
                        attempt, self.max_attempts, e
                    );
                }
            }
        }

        SendOutcome::TimeoutExhausted {
            attempts: self.max_attempts,
        }
    }
}

fn describe_changes(request: &UpdateRequest) -> String {
    request
        .changed_fields()
        .into_iter()
        .map(|(family, value)| format!("{}={}", family, value))
        .collect::<Vec<_>>()
        .join(", ")
}
