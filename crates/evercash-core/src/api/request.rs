//! Authenticated request execution.
//!
//! Every call asks the [`CredentialManager`] for a fresh credential, attaches
//! it as a bearer header when it is a well-formed unexpired JWT, and on a 401
//! forces one refresh and retries the identical request exactly once.

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::transport::{HttpRequest, HttpResponse, MultipartForm, RequestBody, Transport};
use super::ApiError;
use crate::auth::{Credential, CredentialManager};
use crate::notify::Notifier;
use crate::utils::format::token_preview;

/// Length of the random id attached to each request's log lines
const REQUEST_ID_LEN: usize = 7;

/// What to send: method, body and any extra headers.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    body: RequestBody,
    headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: RequestBody::Empty,
            headers: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn post(body: Value) -> Self {
        Self::new(Method::POST).with_body(RequestBody::Json(body))
    }

    pub fn put(body: Value) -> Self {
        Self::new(Method::PUT).with_body(RequestBody::Json(body))
    }

    /// Multipart upload. No content type is set here so the transport can
    /// add the boundary.
    pub fn upload(form: MultipartForm) -> Self {
        Self::new(Method::POST).with_body(RequestBody::Multipart(form))
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// A successful response body: JSON when it parses, otherwise the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(text),
        }
    }

    /// Text bodies become JSON strings.
    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => Value::String(text),
        }
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self.into_value())
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

pub struct RequestClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialManager>,
    base_url: String,
    /// Told about hard failures (non-2xx other than 401).
    notifier: Option<Arc<dyn Notifier>>,
}

impl RequestClient {
    /// Fails with `ApiError::Initialization` when `base_url` is not a URL.
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialManager>,
    ) -> Result<Self, ApiError> {
        Url::parse(base_url).map_err(|e| {
            ApiError::Initialization(format!("invalid API base URL '{}': {}", base_url, e))
        })?;
        Ok(Self {
            transport,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
            notifier: None,
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<ResponseBody, ApiError> {
        let request_id = new_request_id();
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(request_id = %request_id, method = %options.method, endpoint = endpoint, "Starting request");

        let credential = self.credentials.ensure_fresh_token().await;
        let bearer = self.bearer(&request_id, credential.as_ref());
        let request = build_request(&url, &options, bearer);

        let response = self.transport.send(request.clone()).await?;
        debug!(request_id = %request_id, status = response.status, "Response received");

        if response.status == 401 {
            return self.retry_unauthorized(&request_id, request, credential, response).await;
        }
        into_body(response).map_err(|err| {
            self.report_failure(&request_id, endpoint, &err);
            err
        })
    }

    fn report_failure(&self, request_id: &str, endpoint: &str, err: &ApiError) {
        warn!(request_id = %request_id, endpoint = endpoint, status = ?err.status(), "Request failed");
        if let Some(notifier) = &self.notifier {
            notifier.error(&format!("Request to {} failed: {}", endpoint, err));
        }
    }

    /// One forced refresh, one retry. Anything short of a 2xx on the retry
    /// surfaces the original 401.
    async fn retry_unauthorized(
        &self,
        request_id: &str,
        request: HttpRequest,
        rejected: Option<Credential>,
        original: HttpResponse,
    ) -> Result<ResponseBody, ApiError> {
        warn!(request_id = %request_id, "Got 401 Unauthorized, forcing token refresh");

        let rejected_token = rejected.as_ref().map(Credential::token);
        let now = self.credentials.clock().now();
        match self.credentials.force_refresh(rejected_token).await {
            Some(fresh) if fresh.is_bearer_ready(now) => {
                let mut retry = request;
                match bearer_header(fresh.token()) {
                    Some(value) => {
                        retry.headers.insert(AUTHORIZATION, value);
                    }
                    None => return Err(ApiError::from_status(original.status, &original.body)),
                }
                debug!(request_id = %request_id, "Retrying request with refreshed token");
                match self.transport.send(retry).await {
                    Ok(response) if response.is_success() => {
                        return Ok(ResponseBody::parse(response.body));
                    }
                    Ok(response) => {
                        warn!(request_id = %request_id, status = response.status, "Retry also failed");
                    }
                    Err(e) => {
                        warn!(request_id = %request_id, error = %e, "Retry could not be sent");
                    }
                }
            }
            Some(_) => warn!(request_id = %request_id, "Refreshed token is not usable"),
            None => warn!(request_id = %request_id, "No new token available after refresh"),
        }

        Err(ApiError::from_status(original.status, &original.body))
    }

    fn bearer<'a>(&self, request_id: &str, credential: Option<&'a Credential>) -> Option<&'a str> {
        let credential = match credential {
            Some(credential) => credential,
            None => {
                warn!(request_id = %request_id, "No token available for Authorization header");
                return None;
            }
        };
        if !credential.is_jwt() {
            warn!(request_id = %request_id, "Ignoring malformed token (not a JWT)");
            return None;
        }
        let now = self.credentials.clock().now();
        if credential.is_expired(now) {
            warn!(request_id = %request_id, "Ignoring expired token");
            return None;
        }
        debug!(request_id = %request_id, token = %token_preview(credential.token()), "Attaching bearer token");
        Some(credential.token())
    }
}

fn new_request_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REQUEST_ID_LEN)
        .map(char::from)
        .collect()
}

fn bearer_header(token: &str) -> Option<reqwest::header::HeaderValue> {
    reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token)).ok()
}

fn build_request(url: &str, options: &RequestOptions, bearer: Option<&str>) -> HttpRequest {
    let mut request = HttpRequest::new(options.method.clone(), url).body(options.body.clone());

    if !matches!(options.body, RequestBody::Multipart(_)) {
        request = request.header(CONTENT_TYPE.as_str(), "application/json");
    }
    for (name, value) in &options.headers {
        request = request.header(name, value);
    }
    if let Some(value) = bearer.and_then(bearer_header) {
        request.headers.insert(AUTHORIZATION, value);
    }
    request
}

fn into_body(response: HttpResponse) -> Result<ResponseBody, ApiError> {
    if response.is_success() {
        Ok(ResponseBody::parse(response.body))
    } else {
        Err(ApiError::from_status(response.status, &response.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use crate::storage::{self, MemoryStore, CREDENTIAL_KEY};
    use crate::testing::{jwt, FakeIdentity, FakeTransport, ManualClock, RecordingNotifier, FAKE_BASE_URL};
    use chrono::{Duration, Utc};
    use serde_json::json;

    struct Harness {
        transport: Arc<FakeTransport>,
        identity: Arc<FakeIdentity>,
        client: RequestClient,
        clock: Arc<ManualClock>,
    }

    fn harness(stored_token: Option<String>) -> Harness {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let storage = Arc::new(MemoryStore::new());
        if let Some(token) = stored_token {
            storage::write(storage.as_ref(), CREDENTIAL_KEY, &token);
        }
        let identity = Arc::new(FakeIdentity::new());
        let transport = Arc::new(FakeTransport::new());
        let credentials = Arc::new(CredentialManager::new(
            Arc::clone(&identity) as Arc<dyn crate::auth::IdentityProvider>,
            storage,
            Arc::clone(&clock) as Arc<dyn crate::clock::Clock>,
        ));
        let client = RequestClient::new(FAKE_BASE_URL, Arc::clone(&transport) as Arc<dyn Transport>, credentials).unwrap();
        Harness { transport, identity, client, clock }
    }

    fn valid_token(clock: &ManualClock) -> String {
        jwt(clock.now() + Duration::hours(1))
    }

    #[test]
    fn test_invalid_base_url_is_an_initialization_error() {
        let h = harness(None);
        let credentials = Arc::clone(h.client.credentials());
        match RequestClient::new("not a url", h.transport, credentials) {
            Err(ApiError::Initialization(_)) => {}
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_attaches_bearer_and_parses_json() {
        let h = harness(None);
        let token = valid_token(&h.clock);
        h.client.credentials().sign_in(&Credential::from_token(token.clone()));
        h.transport.respond("GET", "/accounts", 200, r#"[{"id":"a"}]"#);

        let body = h.client.request("/accounts", RequestOptions::get()).await.unwrap();

        assert_eq!(body, ResponseBody::Json(json!([{ "id": "a" }])));
        let sent = &h.transport.requests()[0];
        assert_eq!(sent.header_value("authorization"), Some(format!("Bearer {}", token).as_str()));
        assert_eq!(sent.header_value("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_malformed_token_is_not_attached() {
        let h = harness(Some("demo-token-1700000000".to_string()));
        h.transport.respond("GET", "/", 200, r#"{"version":"2.1.0"}"#);

        h.client.request("/", RequestOptions::get()).await.unwrap();
        assert_eq!(h.transport.requests()[0].header_value("authorization"), None);
    }

    #[tokio::test]
    async fn test_expired_token_is_not_attached() {
        let h = harness(None);
        let expired = jwt(h.clock.now() - Duration::minutes(1));
        h.client.credentials().sign_in(&Credential::from_token(expired));
        h.identity.push_refresh(Err(AuthError::Rejected("expired".into())));
        h.transport.respond("GET", "/", 200, "ok");

        h.client.request("/", RequestOptions::get()).await.unwrap();
        assert_eq!(h.transport.requests()[0].header_value("authorization"), None);
    }

    #[tokio::test]
    async fn test_text_body_is_returned_verbatim() {
        let h = harness(Some(jwt(Utc::now() + Duration::hours(1))));
        h.transport.respond("GET", "/", 200, "plain text");
        let body = h.client.request("/", RequestOptions::get()).await.unwrap();
        assert_eq!(body, ResponseBody::Text("plain text".to_string()));
    }

    #[tokio::test]
    async fn test_401_then_refresh_then_success() {
        let h = harness(None);
        let old = valid_token(&h.clock);
        let fresh = jwt(h.clock.now() + Duration::hours(2));
        h.client.credentials().sign_in(&Credential::from_token(old.clone()));
        h.identity.push_refresh(Ok(Some(Credential::from_token(fresh.clone()))));
        h.transport.respond("GET", "/goals", 401, r#"{"message":"JWT expired"}"#);
        h.transport.respond("GET", "/goals", 200, r#"[{"id":"g1"}]"#);

        let body = h.client.request("/goals", RequestOptions::get()).await.unwrap();

        assert_eq!(body, ResponseBody::Json(json!([{ "id": "g1" }])));
        let sent = h.transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].header_value("authorization"), Some(format!("Bearer {}", old).as_str()));
        assert_eq!(sent[1].header_value("authorization"), Some(format!("Bearer {}", fresh).as_str()));
        assert_eq!(h.identity.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_401_twice_surfaces_original_error() {
        let h = harness(None);
        h.client.credentials().sign_in(&Credential::from_token(valid_token(&h.clock)));
        h.identity.push_refresh(Ok(Some(Credential::from_token(jwt(h.clock.now() + Duration::hours(3))))));
        h.transport.respond("GET", "/goals", 401, r#"{"message":"first"}"#);
        h.transport.respond("GET", "/goals", 401, r#"{"message":"second"}"#);

        let err = h.client.request("/goals", RequestOptions::get()).await.unwrap_err();

        assert_eq!(err, ApiError::Status { status: 401, body: json!({ "message": "first" }) });
        assert_eq!(h.transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_401_without_new_token_does_not_retry() {
        let h = harness(None);
        h.client.credentials().sign_in(&Credential::from_token(valid_token(&h.clock)));
        h.identity.push_refresh(Err(AuthError::Rejected("revoked".into())));
        h.transport.respond("GET", "/goals", 401, "Unauthorized");

        let err = h.client.request("/goals", RequestOptions::get()).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(h.transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let h = harness(Some(jwt(Utc::now() + Duration::hours(1))));
        h.transport.respond("POST", "/accounts", 500, r#"{"error":"db down"}"#);

        let err = h
            .client
            .request("/accounts", RequestOptions::post(json!({ "name": "x" })))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(h.transport.requests().len(), 1);
        assert_eq!(h.identity.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_hard_failures_reach_the_notifier() {
        let h = harness(Some(jwt(Utc::now() + Duration::hours(1))));
        let notifier = Arc::new(RecordingNotifier::new());
        let client = h.client.with_notifier(Arc::clone(&notifier) as Arc<dyn Notifier>);
        h.transport.respond("GET", "/categories", 503, "Service Unavailable");
        h.transport.respond("GET", "/goals", 401, "Unauthorized");

        client.request("/categories", RequestOptions::get()).await.unwrap_err();
        let unauthorized = client.request("/goals", RequestOptions::get()).await.unwrap_err();

        assert!(unauthorized.is_unauthorized());
        let errors = notifier.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("/categories"));
        assert!(errors[0].contains("503"));
    }

    #[tokio::test]
    async fn test_upload_omits_content_type_and_keeps_extra_headers() {
        let h = harness(Some(jwt(Utc::now() + Duration::hours(1))));
        h.transport.respond("POST", "/import-transactions", 200, r#"{"imported":3}"#);
        let form = MultipartForm::new().text("accountId", "acc-1").file("file", "t.csv", b"a,b".to_vec(), None);

        h.client
            .request(
                "/import-transactions",
                RequestOptions::upload(form).with_header("x-country-code", "IN"),
            )
            .await
            .unwrap();

        let sent = &h.transport.requests()[0];
        assert_eq!(sent.header_value("content-type"), None);
        assert_eq!(sent.header_value("x-country-code"), Some("IN"));
        assert!(matches!(sent.body, RequestBody::Multipart(_)));
    }

    #[test]
    fn test_decode_tolerates_text_bodies() {
        let text = ResponseBody::Text("2.0.0".to_string());
        let decoded: String = text.decode().unwrap();
        assert_eq!(decoded, "2.0.0");

        let json = ResponseBody::Json(json!({ "n": 1 }));
        assert!(json.decode::<Vec<u8>>().is_err());
    }
}
