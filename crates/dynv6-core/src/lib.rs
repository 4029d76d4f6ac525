// # dynv6-core
//
// Core library for the dynv6 update agent.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping a dynv6 hostname
// pointed at the host's current addresses:
// - **AddressSource**: Trait for fetching the current address of one family
// - **UpdateApi**: Trait for notifying dynv6 of new addresses
// - **AddressStore**: Trait for the last-sent address of each family
// - **UpdateClient**: One detect-and-update cycle with retry/reconcile policy
// - **Scheduler**: Runs cycles at a fixed interval
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from I/O implementations
// 2. **Explicit Configuration**: One immutable config, no global settings
// 3. **Explicit I/O**: Store reads are pure, store writes are explicit
// 4. **Fatal Errors Are Values**: Nothing in the core exits the process

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod state;

// Re-export core types for convenience
pub use traits::{AddressFamily, AddressSource, AddressStore, ApiResponse, UpdateApi, UpdateRequest};
pub use engine::{CycleOutcome, MAX_SEND_ATTEMPTS, Scheduler, SendOutcome, UpdateClient};
pub use config::{ApiKind, Dynv6Config, LogLevel};
pub use error::{Error, Result};
pub use state::{FileAddressStore, MemoryAddressStore};
