//! Core update engine
//!
//! The engine is responsible for:
//! - Fetching current addresses via AddressSource
//! - Comparing them with the AddressStore
//! - Calling the UpdateApi with a bounded number of attempts
//! - Reconciling the AddressStore with the outcome
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Scheduler  │── cycle() ──┐
//! └─────────────┘             │
//!        ▲ sleep(interval)    ▼
//!        │            ┌──────────────┐
//!        └────────────│ UpdateClient │
//!                     └──────────────┘
//!                             │
//!         ┌───────────────────┼───────────────────┐
//!         │                   │                   │
//!         ▼                   ▼                   ▼
//! ┌───────────────┐   ┌──────────────┐    ┌─────────────┐
//! │ AddressSource │   │ AddressStore │    │  UpdateApi  │
//! │ (fetch)       │   │ (compare/set)│    │  (send)     │
//! └───────────────┘   └──────────────┘    └─────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Fetch the current address of every enabled family
//! 2. Compare with the store; write changed families immediately
//! 3. If anything changed, send one update request (up to 3 attempts)
//! 4. Clear the store on rejection or when every attempt went unanswered
//! 5. Return to the scheduler, which sleeps for the configured interval

pub mod client;
pub mod scheduler;

pub use client::{CycleOutcome, MAX_SEND_ATTEMPTS, SendOutcome, UpdateClient};
pub use scheduler::Scheduler;
