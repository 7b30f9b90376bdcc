//! Shared test doubles for the transport and storage seams.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::config::{ClientConfig, StorageKeys};
use crate::error::ApiError;
use crate::net::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::net::types::UserProfile;
use crate::state::session::SessionStore;
use crate::util::storage::{KeyValueStore, MemoryStorage};

pub const BASE: &str = "http://api.test/api/v1";

type Responder = dyn Fn(&ApiRequest) -> Result<ApiResponse, ApiError>;

/// Transport that records every request and answers through a closure.
///
/// Each call suspends once before answering so concurrent callers driven by
/// `futures::join!` genuinely interleave.
#[derive(Clone)]
pub struct MockTransport {
    requests: Rc<RefCell<Vec<ApiRequest>>>,
    responder: Rc<Responder>,
}

impl MockTransport {
    pub fn new(responder: impl Fn(&ApiRequest) -> Result<ApiResponse, ApiError> + 'static) -> Self {
        Self { requests: Rc::new(RefCell::new(Vec::new())), responder: Rc::new(responder) }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn count_to(&self, path: &str) -> usize {
        self.requests.borrow().iter().filter(|r| r.url.ends_with(path)).count()
    }

    /// `(path, authorization header)` for every request, in send order.
    pub fn trace(&self) -> Vec<(String, Option<String>)> {
        self.requests
            .borrow()
            .iter()
            .map(|r| (r.url.trim_start_matches(BASE).to_owned(), r.header("Authorization").map(str::to_owned)))
            .collect()
    }
}

impl HttpTransport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        YieldNow::default().await;
        (self.responder)(request)
    }
}

#[derive(Default)]
struct YieldNow {
    yielded: Cell<bool>,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded.get() {
            Poll::Ready(())
        } else {
            self.yielded.set(true);
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

pub fn respond(status: u16, body: serde_json::Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse { status, body: body.to_string() })
}

pub fn is(request: &ApiRequest, method: Method, path: &str) -> bool {
    request.method == method && request.url == format!("{BASE}{path}")
}

pub fn bearer(request: &ApiRequest) -> Option<&str> {
    request.header("Authorization").and_then(|v| v.strip_prefix("Bearer "))
}

pub fn test_config() -> ClientConfig {
    ClientConfig { base_url: BASE.to_owned(), ..ClientConfig::default() }
}

pub fn profile(id: i64, username: &str) -> UserProfile {
    UserProfile {
        id,
        email: format!("{username}@example.test"),
        username: username.to_owned(),
        first_name: None,
        last_name: None,
        note: None,
        active: Some(true),
        team_member_id: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn profile_json(id: i64, username: &str) -> serde_json::Value {
    serde_json::to_value(profile(id, username)).unwrap_or_default()
}

/// Store seeded with persisted tokens, plus a handle on its storage.
pub fn session_with(access: &str, refresh: &str) -> (SessionStore, Rc<MemoryStorage>) {
    let storage = Rc::new(MemoryStorage::new());
    if !access.is_empty() {
        storage.set("token", access);
    }
    if !refresh.is_empty() {
        storage.set("refresh_token", refresh);
    }
    let store = SessionStore::restore(storage.clone(), StorageKeys::default());
    (store, storage)
}

/// Identity endpoint stand-in that counts calls.
pub struct FakeIdentity {
    result: Result<UserProfile, ApiError>,
    calls: Cell<usize>,
    tokens_seen: RefCell<Vec<String>>,
}

impl FakeIdentity {
    pub fn returning(user: UserProfile) -> Self {
        Self { result: Ok(user), calls: Cell::new(0), tokens_seen: RefCell::new(Vec::new()) }
    }

    pub fn failing(error: ApiError) -> Self {
        Self { result: Err(error), calls: Cell::new(0), tokens_seen: RefCell::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.borrow().clone()
    }
}

impl crate::state::session::IdentityApi for FakeIdentity {
    async fn current_user(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        self.calls.set(self.calls.get() + 1);
        self.tokens_seen.borrow_mut().push(access_token.to_owned());
        YieldNow::default().await;
        self.result.clone()
    }
}
