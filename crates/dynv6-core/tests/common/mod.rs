//! Test doubles and common utilities for update cycle contract tests
//!
//! The doubles are scriptable and share their counters through `Arc`, so a
//! test keeps a handle after moving the double into an `UpdateClient`.

#![allow(dead_code)]

use dynv6_core::error::{Error, Result};
use dynv6_core::traits::{
    AddressFamily, AddressSource, AddressStore, ApiResponse, UpdateApi, UpdateRequest,
};
use dynv6_core::{Dynv6Config, UpdateClient};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What a scripted source returns on its next call
#[derive(Debug, Clone)]
pub enum Fetch {
    Addr(IpAddr),
    Timeout,
    Unavailable,
}

/// An AddressSource whose answer the test controls
#[derive(Clone)]
pub struct ScriptedSource {
    family: AddressFamily,
    next: Arc<Mutex<Fetch>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(family: AddressFamily, addr: &str) -> Self {
        Self {
            family,
            next: Arc::new(Mutex::new(Fetch::Addr(addr.parse().unwrap()))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Return `addr` from now on
    pub fn set(&self, addr: &str) {
        *self.next.lock().unwrap() = Fetch::Addr(addr.parse().unwrap());
    }

    /// Fail from now on
    pub fn fail(&self, fetch: Fetch) {
        *self.next.lock().unwrap() = fetch;
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AddressSource for ScriptedSource {
    async fn current(&self) -> Result<IpAddr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.next.lock().unwrap().clone() {
            Fetch::Addr(ip) => Ok(ip),
            Fetch::Timeout => Err(Error::timeout("scripted timeout")),
            Fetch::Unavailable => Err(Error::unavailable("scripted failure")),
        }
    }

    fn family(&self) -> AddressFamily {
        self.family
    }
}

/// What the mock API does on one call
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(u16, &'static str),
    Timeout,
    Unavailable,
}

/// An UpdateApi that replays scripted replies and records requests
///
/// Once the script is exhausted every call answers `200 addresses updated`.
#[derive(Clone, Default)]
pub struct MockUpdateApi {
    script: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<UpdateRequest>>>,
}

impl MockUpdateApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for the next calls
    pub fn script(&self, replies: impl IntoIterator<Item = Reply>) {
        self.script.lock().unwrap().extend(replies);
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<UpdateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<UpdateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl UpdateApi for MockUpdateApi {
    async fn send(&self, request: &UpdateRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Respond(200, "addresses updated"));

        match reply {
            Reply::Respond(status, body) => Ok(ApiResponse::new(status, body)),
            Reply::Timeout => Err(Error::timeout("dynv6.com: operation timed out")),
            Reply::Unavailable => Err(Error::unavailable("dynv6.com: connection refused")),
        }
    }

    fn api_name(&self) -> &'static str {
        "mock"
    }
}

/// Minimal valid configuration for tests
pub fn minimal_config() -> Dynv6Config {
    let mut config = Dynv6Config::new("example.dynv6.net", "test-token");
    config.interval_secs = 0.01;
    config
}

/// Both sources plus the mock API, wired into a client over `store`
pub struct Harness {
    pub ipv4: ScriptedSource,
    pub ipv6: ScriptedSource,
    pub api: MockUpdateApi,
}

impl Harness {
    pub fn new(ipv4: &str, ipv6: &str) -> Self {
        Self {
            ipv4: ScriptedSource::new(AddressFamily::Ipv4, ipv4),
            ipv6: ScriptedSource::new(AddressFamily::Ipv6, ipv6),
            api: MockUpdateApi::new(),
        }
    }

    pub fn client(&self, config: &Dynv6Config, store: Box<dyn AddressStore>) -> UpdateClient {
        UpdateClient::new(
            config,
            vec![Box::new(self.ipv4.clone()), Box::new(self.ipv6.clone())],
            store,
            Box::new(self.api.clone()),
        )
        .expect("client construction succeeds")
    }
}

/// Cached (ipv4, ipv6) pair, for compact assertions
pub fn cached(client: &UpdateClient) -> (String, String) {
    (
        client.store().get(AddressFamily::Ipv4).to_string(),
        client.store().get(AddressFamily::Ipv6).to_string(),
    )
}
