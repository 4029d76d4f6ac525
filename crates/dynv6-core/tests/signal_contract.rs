//! Contract Test: OS Signals During a Cycle
//!
//! Constraints verified:
//! - `Scheduler::run` installs its handlers before the first cycle
//! - A SIGTERM raised while the first update is in flight does not kill the
//!   process; the cycle completes and the loop then stops cleanly
//!
//! Lives in its own test binary: once tokio owns SIGTERM the default action
//! is gone for the whole process.

#![cfg(unix)]

mod common;

use common::*;
use dynv6_core::error::Result;
use dynv6_core::traits::{AddressFamily, AddressSource, ApiResponse, UpdateApi, UpdateRequest};
use dynv6_core::{MemoryAddressStore, Scheduler, UpdateClient};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// An UpdateApi that sends SIGTERM to its own process mid-request
#[derive(Clone, Default)]
struct SelfSignallingApi {
    calls: Arc<AtomicUsize>,
    completed: Arc<AtomicBool>,
}

#[async_trait::async_trait]
impl UpdateApi for SelfSignallingApi {
    async fn send(&self, _request: &UpdateRequest) -> Result<ApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        // SAFETY: kill(2) on our own pid with a valid signal number
        let rc = unsafe { libc::kill(std::process::id() as libc::pid_t, libc::SIGTERM) };
        assert_eq!(rc, 0, "kill(SIGTERM) failed");

        tokio::time::sleep(Duration::from_millis(200)).await;
        self.completed.store(true, Ordering::SeqCst);
        Ok(ApiResponse::new(200, "addresses updated"))
    }

    fn api_name(&self) -> &'static str {
        "self-signalling"
    }
}

#[tokio::test]
async fn sigterm_during_first_send_lets_the_cycle_finish() {
    let ipv4 = ScriptedSource::new(AddressFamily::Ipv4, "2.2.2.2");
    let ipv6 = ScriptedSource::new(AddressFamily::Ipv6, "2001:db8::2");
    let api = SelfSignallingApi::default();

    let mut config = minimal_config();
    config.interval_secs = 60.0;
    let sources: Vec<Box<dyn AddressSource>> = vec![Box::new(ipv4.clone()), Box::new(ipv6)];
    let client = UpdateClient::new(
        &config,
        sources,
        Box::new(MemoryAddressStore::new()),
        Box::new(api.clone()),
    )
    .expect("client construction succeeds");
    let mut scheduler = Scheduler::new(client, config.interval());

    let result = tokio::time::timeout(Duration::from_secs(5), scheduler.run())
        .await
        .expect("SIGTERM stops the loop instead of waiting out the interval");

    assert!(result.is_ok(), "clean shutdown expected: {:?}", result);
    assert!(api.completed.load(Ordering::SeqCst), "send ran to completion");
    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    assert_eq!(ipv4.call_count(), 1, "no second cycle after the signal");
    assert_eq!(
        cached(scheduler.client()),
        ("2.2.2.2".to_string(), "2001:db8::2".to_string())
    );
}
