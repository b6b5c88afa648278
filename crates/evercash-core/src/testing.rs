//! Test doubles shared by the unit tests of every module.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::api::{ApiError, HttpRequest, HttpResponse, RealClient, RequestClient, Transport};
use crate::auth::{AuthError, Credential, CredentialManager, IdentityProvider};
use crate::cache::ResponseCache;
use crate::clock::Clock;
use crate::notify::{DemoNotice, Notifier};
use crate::storage::{KeyValueStore, MemoryStore};

pub const FAKE_BASE_URL: &str = "https://api.test";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An unsigned JWT-shaped token expiring at `exp`.
pub fn jwt(exp: DateTime<Utc>) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "user-1", "exp": exp.timestamp() }).to_string());
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}

// ===== Clock =====

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *lock(&self.now) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        ManualClock::now(self)
    }
}

// ===== Identity =====

type RefreshResult = Result<Option<Credential>, AuthError>;
type RefreshFactory = Box<dyn Fn() -> RefreshResult + Send + Sync>;

/// Scripted identity provider. Refresh answers come from the queue first,
/// then from the factory, then `Ok(None)`.
#[derive(Default)]
pub struct FakeIdentity {
    session: Mutex<Option<Credential>>,
    refreshes: Mutex<VecDeque<RefreshResult>>,
    factory: Mutex<Option<RefreshFactory>>,
    delay: Option<Duration>,
    refresh_calls: Mutex<usize>,
    get_calls: Mutex<usize>,
    sign_out_calls: Mutex<usize>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, credential: Credential) -> Self {
        *lock(&self.session) = Some(credential);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_refresh(&self, result: RefreshResult) {
        lock(&self.refreshes).push_back(result);
    }

    pub fn refresh_with<F>(&self, factory: F)
    where
        F: Fn() -> RefreshResult + Send + Sync + 'static,
    {
        *lock(&self.factory) = Some(Box::new(factory));
    }

    pub fn refresh_calls(&self) -> usize {
        *lock(&self.refresh_calls)
    }

    pub fn get_calls(&self) -> usize {
        *lock(&self.get_calls)
    }

    pub fn sign_out_calls(&self) -> usize {
        *lock(&self.sign_out_calls)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn get_session(&self) -> Result<Option<Credential>, AuthError> {
        *lock(&self.get_calls) += 1;
        self.pause().await;
        Ok(lock(&self.session).clone())
    }

    async fn refresh_session(&self) -> Result<Option<Credential>, AuthError> {
        *lock(&self.refresh_calls) += 1;
        self.pause().await;
        if let Some(result) = lock(&self.refreshes).pop_front() {
            return result;
        }
        match lock(&self.factory).as_ref() {
            Some(factory) => factory(),
            None => Ok(None),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *lock(&self.sign_out_calls) += 1;
        *lock(&self.session) = None;
        Ok(())
    }
}

// ===== Transport =====

/// Scripted HTTP transport keyed by method and URL.
///
/// Routes given as paths are resolved against `FAKE_BASE_URL`. Each route
/// answers from its queue; the last response repeats. Unknown routes 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<(String, String), VecDeque<HttpResponse>>>,
    sent: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

fn resolve(url_or_path: &str) -> String {
    if url_or_path.starts_with('/') {
        format!("{}{}", FAKE_BASE_URL, url_or_path)
    } else {
        url_or_path.to_string()
    }
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond(&self, method: &str, url_or_path: &str, status: u16, body: impl Into<String>) {
        lock(&self.routes)
            .entry((method.to_uppercase(), resolve(url_or_path)))
            .or_default()
            .push_back(HttpResponse::new(status, body));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.sent).clone()
    }

    pub fn requests_to(&self, method: &str, url_or_path: &str) -> Vec<HttpRequest> {
        let url = resolve(url_or_path);
        lock(&self.sent)
            .iter()
            .filter(|request| request.method.as_str() == method && request.url == url)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.sent).len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let key = (request.method.as_str().to_string(), request.url.clone());
        lock(&self.sent).push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut routes = lock(&self.routes);
        let response = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| HttpResponse::new(404, r#"{"message":"no route"}"#)))
    }
}

// ===== Storage =====

/// A store whose every operation fails.
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("storage unavailable")
    }

    fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage unavailable")
    }

    fn delete(&self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage unavailable")
    }
}

// ===== Notifier =====

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<DemoNotice>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<DemoNotice> {
        lock(&self.notices).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        lock(&self.errors).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn demo_blocked(&self, notice: &DemoNotice) {
        lock(&self.notices).push(notice.clone());
    }

    fn error(&self, message: &str) {
        lock(&self.errors).push(message.to_string());
    }
}

// ===== Clients =====

/// A signed-out `RealClient` over `transport` with a three-minute cache.
pub fn real_client(transport: &Arc<FakeTransport>) -> Arc<RealClient> {
    let credentials = Arc::new(CredentialManager::new(
        Arc::new(FakeIdentity::new()) as Arc<dyn IdentityProvider>,
        Arc::new(MemoryStore::new()),
        Arc::new(ManualClock::new(Utc::now())) as Arc<dyn Clock>,
    ));
    let requests =
        RequestClient::new(FAKE_BASE_URL, Arc::clone(transport) as Arc<dyn Transport>, credentials).unwrap();
    Arc::new(RealClient::new(requests, Arc::new(ResponseCache::new(Duration::from_secs(180)))))
}
