//! Core traits for the dynv6 update agent
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressSource`]: Fetch the current address of one family
//! - [`UpdateApi`]: Notify the remote DNS provider
//! - [`AddressStore`]: Last-sent address per family

pub mod address_source;
pub mod update_api;
pub mod address_store;

pub use address_source::{AddressFamily, AddressSource};
pub use update_api::{ApiResponse, UpdateApi, UpdateRequest};
pub use address_store::AddressStore;
