//! Integration tests for the session client driven by a scripted mock
//! HTTP collaborator.

use async_trait::async_trait;
use serde_json::json;
use sessio_client::{GuardDecision, Refresh, SessionClient, SessionGuard};
use sessio_core::{
    CachePolicy, ErrorContext, HttpClient, HttpResponse, RequestOptions, SessioError,
    SessioResult, SessionConfig, SessionConfigUpdate,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted HTTP collaborator: responses are enqueued per "METHOD url" key
/// and every issued request is recorded.
#[derive(Default)]
struct MockHttp {
    queues: Mutex<HashMap<String, VecDeque<SessioResult<HttpResponse>>>>,
    calls: Mutex<Vec<String>>,
}

impl MockHttp {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn enqueue(&self, method: &str, url: &str, result: SessioResult<HttpResponse>) {
        self.queues
            .lock()
            .unwrap()
            .entry(format!("{} {}", method, url))
            .or_default()
            .push_back(result);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, method: &str, url: &str) -> SessioResult<HttpResponse> {
        let key = format!("{} {}", method, url);
        self.calls.lock().unwrap().push(key.clone());

        self.queues
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| panic!("unexpected request: {}", key))
    }
}

#[async_trait]
impl HttpClient for MockHttp {
    async fn get(&self, url: &str, _options: &RequestOptions) -> SessioResult<HttpResponse> {
        self.respond("GET", url)
    }

    async fn post(
        &self,
        url: &str,
        _body: Option<&serde_json::Value>,
        _options: &RequestOptions,
    ) -> SessioResult<HttpResponse> {
        self.respond("POST", url)
    }

    async fn put(
        &self,
        url: &str,
        _body: Option<&serde_json::Value>,
        _options: &RequestOptions,
    ) -> SessioResult<HttpResponse> {
        self.respond("PUT", url)
    }
}

fn ok(status: u16, body: Option<serde_json::Value>) -> SessioResult<HttpResponse> {
    Ok(HttpResponse::new(status, body))
}

fn rejected(status: u16, body: Option<serde_json::Value>) -> SessioResult<HttpResponse> {
    Err(SessioError::Transport {
        status,
        body,
        message: "request rejected".to_string(),
        context: ErrorContext::new("mock_http"),
    })
}

fn client_with(http: &Arc<MockHttp>) -> SessionClient {
    SessionClient::new(SessionConfig::default(), http.clone() as Arc<dyn HttpClient>)
}

#[tokio::test]
async fn sign_in_trusts_the_response_body() {
    let http = MockHttp::new();
    http.enqueue(
        "POST",
        "/api/users/sign-in",
        ok(200, Some(json!({"id": 1, "roles": ["admin", "manager"]}))),
    );

    let client = client_with(&http);
    let response = client
        .sign_in(json!({"email": "a@b.com", "password": "good"}), None)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(client.user_field("id").await, Some(json!(1)));

    assert!(client.has_role(&["admin", "user"], false).await);
    assert!(!client.has_role(&["admin", "user"], true).await);
    assert!(!client.has_role(&["user"], false).await);

    // No redundant session fetch after a sign-in that echoed the user
    assert_eq!(http.calls(), vec!["POST /api/users/sign-in"]);
}

#[tokio::test]
async fn bodiless_sign_in_fetches_the_canonical_record() {
    let http = MockHttp::new();
    http.enqueue("POST", "/api/users/sign-in", ok(204, None));
    http.enqueue(
        "GET",
        "/api/session",
        ok(200, Some(json!({"id": 1, "name": "John Tester"}))),
    );

    let client = client_with(&http);
    let response = client
        .sign_in(json!({"email": "a@b.com", "password": "good"}), None)
        .await
        .unwrap();

    // The follow-up GET's response is what the caller sees
    assert_eq!(response.status, 200);
    assert_eq!(client.user_field("name").await, Some(json!("John Tester")));
    assert_eq!(
        http.calls(),
        vec!["POST /api/users/sign-in", "GET /api/session"]
    );
}

#[tokio::test]
async fn failed_sign_in_leaves_the_user_absent() {
    let http = MockHttp::new();
    http.enqueue("POST", "/api/users/sign-in", ok(200, Some(json!({"id": 1}))));
    http.enqueue(
        "POST",
        "/api/users/sign-in",
        rejected(403, Some(json!({"error": "bad credentials"}))),
    );

    let client = client_with(&http);
    client
        .sign_in(json!({"email": "a@b.com", "password": "good"}), None)
        .await
        .unwrap();
    assert!(client.user().await.is_some());

    let err = client
        .sign_in(json!({"email": "a@b.com", "password": "bad"}), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert_eq!(err.body(), Some(&json!({"error": "bad credentials"})));
    // The previous user was cleared eagerly before the request went out
    assert!(client.user().await.is_none());
}

#[tokio::test]
async fn sign_out_clears_the_user() {
    let http = MockHttp::new();
    http.enqueue("POST", "/api/users/sign-in", ok(200, Some(json!({"id": 1}))));
    http.enqueue("POST", "/api/users/sign-out", ok(204, None));

    let client = client_with(&http);
    client.sign_in(json!({"email": "a@b.com"}), None).await.unwrap();

    let response = client.sign_out(None, None).await.unwrap();
    assert_eq!(response.status, 204);
    assert!(client.user().await.is_none());
}

#[tokio::test]
async fn failed_sign_out_keeps_the_session() {
    let http = MockHttp::new();
    http.enqueue("POST", "/api/users/sign-in", ok(200, Some(json!({"id": 1}))));
    http.enqueue("POST", "/api/users/sign-out", rejected(500, None));

    let client = client_with(&http);
    client.sign_in(json!({"email": "a@b.com"}), None).await.unwrap();

    let err = client.sign_out(None, None).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(client.user().await.is_some());
}

#[tokio::test]
async fn failed_update_keeps_the_prior_user() {
    let http = MockHttp::new();
    http.enqueue(
        "GET",
        "/api/session",
        ok(200, Some(json!({"id": 1, "name": "A"}))),
    );
    http.enqueue("GET", "/api/session", rejected(503, None));

    let client = client_with(&http);
    client.update(None).await.unwrap();

    let err = client.update(None).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    // A failed refresh does not sign the user out
    assert_eq!(client.user_field("name").await, Some(json!("A")));
}

#[tokio::test]
async fn update_against_an_anonymous_session_fails_through() {
    let http = MockHttp::new();
    http.enqueue("GET", "/api/session", rejected(401, None));

    let client = client_with(&http);
    let err = client.update(None).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(client.user().await.is_none());
}

#[tokio::test]
async fn reload_puts_then_refreshes() {
    let http = MockHttp::new();
    http.enqueue("PUT", "/api/session", ok(204, None));
    http.enqueue(
        "GET",
        "/api/session",
        ok(200, Some(json!({"id": 1, "plan": "pro"}))),
    );

    let client = client_with(&http);
    let response = client.reload(Some(json!({"recompute": true})), None).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(client.user_field("plan").await, Some(json!("pro")));
    assert_eq!(http.calls(), vec!["PUT /api/session", "GET /api/session"]);
}

#[tokio::test]
async fn failed_reload_skips_the_refresh() {
    let http = MockHttp::new();
    http.enqueue("PUT", "/api/session", rejected(500, None));

    let client = client_with(&http);
    let err = client.reload(None, None).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(http.calls(), vec!["PUT /api/session"]);
}

#[tokio::test(start_paused = true)]
async fn max_age_policy_suppresses_refreshes_inside_the_window() {
    let http = MockHttp::new();
    http.enqueue(
        "GET",
        "/api/session",
        ok(200, Some(json!({"id": 1, "name": "A"}))),
    );
    http.enqueue(
        "GET",
        "/api/session",
        ok(200, Some(json!({"id": 1, "name": "B"}))),
    );

    let client = client_with(&http);
    client
        .configure(
            SessionConfigUpdate::default()
                .cache_policy(CachePolicy::MaxAge(Duration::from_millis(1000))),
        )
        .await
        .unwrap();

    // t=0: explicit update
    client.update(None).await.unwrap();
    assert_eq!(client.user_field("name").await, Some(json!("A")));

    // t=500: still inside the window, no network call
    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(client.resolve(None).await.unwrap(), Refresh::Cached);
    assert_eq!(client.user_field("name").await, Some(json!("A")));
    assert_eq!(http.calls().len(), 1);

    // t=1500: window elapsed, the refresh goes out
    tokio::time::advance(Duration::from_millis(1000)).await;
    match client.resolve(None).await.unwrap() {
        Refresh::Fetched(response) => assert_eq!(response.status, 200),
        other => panic!("expected a network refresh, got {:?}", other),
    }
    assert_eq!(client.user_field("name").await, Some(json!("B")));
    assert_eq!(http.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn once_policy_caches_forever_after_first_success() {
    let http = MockHttp::new();
    http.enqueue("GET", "/api/session", ok(200, Some(json!({"id": 1}))));

    let client = client_with(&http);
    client
        .configure(SessionConfigUpdate::default().cache_policy(CachePolicy::Once))
        .await
        .unwrap();

    // Never refreshed yet, so the first resolve hits the network
    assert!(matches!(
        client.resolve(None).await.unwrap(),
        Refresh::Fetched(_)
    ));

    tokio::time::advance(Duration::from_secs(3600)).await;
    assert_eq!(client.resolve(None).await.unwrap(), Refresh::Cached);
    assert_eq!(http.calls().len(), 1);
}

#[tokio::test]
async fn always_policy_refreshes_every_time() {
    let http = MockHttp::new();
    http.enqueue("GET", "/api/session", ok(200, Some(json!({"id": 1}))));
    http.enqueue("GET", "/api/session", ok(200, Some(json!({"id": 1}))));

    let client = client_with(&http);
    client.resolve(None).await.unwrap();
    client.resolve(None).await.unwrap();

    assert_eq!(http.calls().len(), 2);
}

#[tokio::test]
async fn configure_points_operations_at_new_endpoints() {
    let http = MockHttp::new();
    http.enqueue("GET", "https://auth.example.com/session", ok(200, Some(json!({"id": 7}))));

    let client = client_with(&http);
    client
        .configure(SessionConfigUpdate::default().update_url("https://auth.example.com/session"))
        .await
        .unwrap();

    client.update(None).await.unwrap();
    assert_eq!(client.user_field("id").await, Some(json!(7)));

    // Unspecified fields kept their defaults
    assert_eq!(client.config().await.sign_in_url, "/api/users/sign-in");
}

#[tokio::test]
async fn session_values_survive_user_changes() {
    let http = MockHttp::new();
    http.enqueue("POST", "/api/users/sign-out", ok(204, None));

    let client = client_with(&http);
    let store = client.store();

    store.write().await.set("redirect_to", json!("/dashboard"));
    client.sign_out(None, None).await.unwrap();

    assert_eq!(
        store.read().await.get("redirect_to"),
        Some(&json!("/dashboard"))
    );
}

#[tokio::test]
async fn guard_denies_unauthenticated_navigation() {
    let http = MockHttp::new();
    http.enqueue("GET", "/api/session", rejected(401, None));

    let guard = SessionGuard::new(Arc::new(client_with(&http)));
    assert_eq!(guard.authorize().await, GuardDecision::Deny);
}

#[tokio::test]
async fn guard_allows_once_the_session_is_known() {
    let http = MockHttp::new();
    http.enqueue(
        "GET",
        "/api/session",
        ok(200, Some(json!({"id": 1, "roles": ["admin"]}))),
    );
    http.enqueue(
        "GET",
        "/api/session",
        ok(200, Some(json!({"id": 1, "roles": ["admin"]}))),
    );

    let client = Arc::new(client_with(&http));
    let guard = SessionGuard::new(client.clone());

    assert_eq!(guard.authorize().await, GuardDecision::Allow);
    assert_eq!(
        guard.authorize_roles(&["admin"], true).await,
        GuardDecision::Allow
    );
}

#[tokio::test]
async fn guard_denies_on_missing_role() {
    let http = MockHttp::new();
    http.enqueue(
        "GET",
        "/api/session",
        ok(200, Some(json!({"id": 1, "roles": ["viewer"]}))),
    );

    let guard = SessionGuard::new(Arc::new(client_with(&http)));
    assert_eq!(
        guard.authorize_roles(&["admin"], false).await,
        GuardDecision::Deny
    );
}
