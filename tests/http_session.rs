use careerdesk::ApiError;
use careerdesk::config::Config;
use careerdesk::models::auth::LoginRequest;
use careerdesk::net::{CallOptions, HttpSession};
use careerdesk::state::credentials::CredentialStore;
use mockito::{Matcher, Server, ServerGuard};
use reqwest::Method;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

fn session(server: &ServerGuard) -> HttpSession {
    let cfg = Config::default().with_api_base(format!("{}/api", server.url()));
    HttpSession::new(&cfg, Arc::new(CredentialStore::new())).unwrap()
}

/// Log in through a mocked endpoint so the store holds `token`.
async fn seed(server: &mut ServerGuard, http: &HttpSession, token: &str) {
    let body = json!({
        "access": token,
        "user": {"id": 1, "username": "alice", "email": "alice@example.com", "is_staff": true}
    });
    let _login = server
        .mock("POST", "/api/auth/login/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("set-cookie", "csrftoken=abc123; Path=/")
        .with_body(body.to_string())
        .create_async()
        .await;

    let req = LoginRequest {
        username: "alice".into(),
        password: "pw".into(),
    };
    http.login(&req).await.unwrap();
    assert_eq!(http.store().token().as_deref(), Some(token));
}

/// Chunked response body that only starts arriving after `delay`.
fn late_body(body: &'static str, delay: Duration) -> impl Fn(&mut dyn Write) -> std::io::Result<()> + Send + Sync + 'static {
    move |w| {
        std::thread::sleep(delay);
        w.write_all(body.as_bytes())
    }
}

#[tokio::test]
async fn attaches_bearer_and_csrf_on_writes() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let write = server
        .mock("POST", "/api/notes/")
        .match_header("authorization", "Bearer t1")
        .match_header("x-csrftoken", "abc123")
        .match_header("content-type", "application/json")
        .match_header("accept", "application/json")
        .match_body(Matcher::Json(json!({"text": "hi"})))
        .with_status(201)
        .with_body(r#"{"id": 3}"#)
        .create_async()
        .await;

    let resp = http.post("/notes/", &json!({"text": "hi"})).await.unwrap();
    assert_eq!(resp.status, 201);
    assert_eq!(resp.data, json!({"id": 3}));
    write.assert_async().await;
}

#[tokio::test]
async fn reads_skip_csrf_and_body_headers() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let read = server
        .mock("GET", "/api/notes/")
        .match_header("authorization", "Bearer t1")
        .match_header("x-csrftoken", Matcher::Missing)
        .match_header("content-type", Matcher::Missing)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let resp = http.get("/notes/").await.unwrap();
    assert_eq!(resp.data, json!([]));
    read.assert_async().await;
}

#[tokio::test]
async fn not_modified_skips_body_parsing() {
    let mut server = Server::new_async().await;
    let http = session(&server);

    let poll = server
        .mock("GET", "/api/status/bar/")
        .match_header("if-none-match", "\"v1\"")
        .with_status(304)
        .with_header("etag", "\"v1\"")
        .with_body("{ definitely not json")
        .create_async()
        .await;

    let opts = CallOptions::default().with_etag("\"v1\"");
    let resp = http.call(Method::GET, "/status/bar/", None, opts).await.unwrap();
    assert!(resp.not_modified());
    assert_eq!(resp.data, serde_json::Value::Null);
    assert_eq!(resp.etag.as_deref(), Some("\"v1\""));
    poll.assert_async().await;
}

#[tokio::test]
async fn malformed_error_body_becomes_message() {
    let mut server = Server::new_async().await;
    let http = session(&server);

    let _broken = server
        .mock("GET", "/api/report/")
        .with_status(500)
        .with_body("<html>upstream down</html>")
        .create_async()
        .await;

    let err = http.get("/report/").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.data(), Some(&json!({"message": "<html>upstream down</html>"})));
    assert_eq!(err.to_string(), "<html>upstream down</html>");
}

#[tokio::test]
async fn error_message_falls_back_to_status() {
    let mut server = Server::new_async().await;
    let http = session(&server);

    let _gone = server
        .mock("DELETE", "/api/notes/9/")
        .with_status(404)
        .create_async()
        .await;

    let err = http
        .call(Method::DELETE, "/notes/9/", None, CallOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }));
    assert_eq!(err.to_string(), "Request failed with status 404");
}

#[tokio::test]
async fn refresh_then_single_retry_with_new_token() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let stale = server
        .mock("GET", "/api/me/")
        .match_header("authorization", "Bearer t1")
        .with_status(401)
        .with_body(r#"{"detail": "token expired"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"access": "t2"}"#)
        .expect(1)
        .create_async()
        .await;
    let fresh = server
        .mock("GET", "/api/me/")
        .match_header("authorization", "Bearer t2")
        .with_status(200)
        .with_body(r#"{"id": 1, "username": "alice"}"#)
        .expect(1)
        .create_async()
        .await;

    let resp = http.get("/me/").await.unwrap();
    assert_eq!(resp.data["username"], "alice");
    assert_eq!(http.store().token().as_deref(), Some("t2"));
    assert!(!http.refresh_in_flight());

    stale.assert_async().await;
    refresh.assert_async().await;
    fresh.assert_async().await;
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let stale = server
        .mock("GET", Matcher::Regex(r"^/api/items/\d/$".into()))
        .match_header("authorization", "Bearer t1")
        .with_status(401)
        .expect(3)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .with_status(200)
        .with_body(r#"{"access": "t2"}"#)
        .expect(1)
        .create_async()
        .await;
    let fresh = server
        .mock("GET", Matcher::Regex(r"^/api/items/\d/$".into()))
        .match_header("authorization", "Bearer t2")
        .with_status(200)
        .with_body(r#"{"ok": true}"#)
        .expect(3)
        .create_async()
        .await;

    let (a, b, c) = tokio::join!(http.get("/items/1/"), http.get("/items/2/"), http.get("/items/3/"));
    for resp in [a, b, c] {
        assert_eq!(resp.unwrap().data, json!({"ok": true}));
    }

    stale.assert_async().await;
    refresh.assert_async().await;
    fresh.assert_async().await;
}

#[tokio::test]
async fn late_401_after_refresh_retries_without_refreshing_again() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let fast = server
        .mock("GET", "/api/items/1/")
        .match_header("authorization", "Bearer t1")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    // this 401 is only read once the refresh triggered by the first one has finished
    let slow = server
        .mock("GET", "/api/items/2/")
        .match_header("authorization", "Bearer t1")
        .with_status(401)
        .with_chunked_body(late_body(r#"{"error": "Token expired"}"#, Duration::from_millis(800)))
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .with_status(200)
        .with_body(r#"{"access": "t2"}"#)
        .expect(1)
        .create_async()
        .await;
    let fresh = server
        .mock("GET", Matcher::Regex(r"^/api/items/\d/$".into()))
        .match_header("authorization", "Bearer t2")
        .with_status(200)
        .with_body(r#"{"ok": true}"#)
        .expect(2)
        .create_async()
        .await;

    let (a, b) = tokio::join!(http.get("/items/1/"), http.get("/items/2/"));
    assert_eq!(a.unwrap().data, json!({"ok": true}));
    assert_eq!(b.unwrap().data, json!({"ok": true}));
    assert_eq!(http.store().token().as_deref(), Some("t2"));

    fast.assert_async().await;
    slow.assert_async().await;
    refresh.assert_async().await;
    fresh.assert_async().await;
}

#[tokio::test]
async fn tokenless_401s_share_the_first_refresh_result() {
    let mut server = Server::new_async().await;
    let http = session(&server);

    let fast = server
        .mock("GET", "/api/items/1/")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let slow = server
        .mock("GET", "/api/items/2/")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_chunked_body(late_body(r#"{"error": "Not authenticated"}"#, Duration::from_millis(800)))
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .with_status(200)
        .with_body(r#"{"access": "t2"}"#)
        .expect(1)
        .create_async()
        .await;
    let fresh = server
        .mock("GET", Matcher::Regex(r"^/api/items/\d/$".into()))
        .match_header("authorization", "Bearer t2")
        .with_status(200)
        .with_body(r#"{"ok": true}"#)
        .expect(2)
        .create_async()
        .await;

    let (a, b) = tokio::join!(http.get("/items/1/"), http.get("/items/2/"));
    assert!(a.is_ok(), "{a:?}");
    assert!(b.is_ok(), "{b:?}");

    fast.assert_async().await;
    slow.assert_async().await;
    refresh.assert_async().await;
    fresh.assert_async().await;
}

#[tokio::test]
async fn late_401_after_failed_refresh_does_not_refresh_again() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let _fast = server
        .mock("GET", "/api/items/1/")
        .with_status(401)
        .create_async()
        .await;
    let _slow = server
        .mock("GET", "/api/items/2/")
        .with_status(401)
        .with_chunked_body(late_body(r#"{"error": "Token expired"}"#, Duration::from_millis(800)))
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let (a, b) = tokio::join!(http.get("/items/1/"), http.get("/items/2/"));
    assert!(matches!(a, Err(ApiError::AuthExpired { .. })), "{a:?}");
    assert!(matches!(b, Err(ApiError::AuthExpired { .. })), "{b:?}");
    assert!(!http.store().is_authenticated());
    refresh.assert_async().await;
}

#[tokio::test]
async fn failed_refresh_clears_store_and_surfaces_original_401() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let me = server
        .mock("GET", "/api/me/")
        .with_status(401)
        .with_body(r#"{"error": "Token expired"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .with_status(401)
        .with_body(r#"{"error": "No refresh cookie"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = http.get("/me/").await.unwrap_err();
    assert!(matches!(err, ApiError::AuthExpired { .. }));
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Token expired");

    assert_eq!(http.store().token(), None);
    assert_eq!(http.store().user(), None);
    assert!(!http.store().is_authenticated());

    me.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn refresh_without_token_counts_as_failure() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let _refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    assert!(!http.refresh().await);
    assert!(!http.store().is_authenticated());
}

#[tokio::test]
async fn second_401_is_not_retried_again() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let _old = server
        .mock("GET", "/api/me/")
        .match_header("authorization", "Bearer t1")
        .with_status(401)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .with_status(200)
        .with_body(r#"{"access": "t2"}"#)
        .expect(1)
        .create_async()
        .await;
    let retry = server
        .mock("GET", "/api/me/")
        .match_header("authorization", "Bearer t2")
        .with_status(401)
        .with_body(r#"{"detail": "revoked"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = http.get("/me/").await.unwrap_err();
    assert!(matches!(err, ApiError::AuthExpired { .. }));
    assert_eq!(err.data(), Some(&json!({"detail": "revoked"})));
    assert!(!http.store().is_authenticated());

    refresh.assert_async().await;
    retry.assert_async().await;
}

#[tokio::test]
async fn skip_auth_refresh_surfaces_plain_401() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let _me = server.mock("GET", "/api/me/").with_status(401).create_async().await;
    let refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .expect(0)
        .create_async()
        .await;

    let opts = CallOptions::default().no_refresh();
    let err = http.call(Method::GET, "/me/", None, opts).await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 401, .. }));
    assert_eq!(http.store().token().as_deref(), Some("t1"));
    refresh.assert_async().await;
}

#[tokio::test]
async fn logout_clears_locally_when_server_fails() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let logout = server
        .mock("POST", "/api/auth/logout/")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .expect(0)
        .create_async()
        .await;

    http.logout().await;
    assert!(!http.store().is_authenticated());

    logout.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn logout_during_refresh_discards_the_new_token() {
    let mut server = Server::new_async().await;
    let http = session(&server);
    seed(&mut server, &http, "t1").await;

    let refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .with_status(200)
        .with_chunked_body(late_body(r#"{"access": "t2"}"#, Duration::from_millis(500)))
        .expect(1)
        .create_async()
        .await;
    let logout = server
        .mock("POST", "/api/auth/logout/")
        .match_header("authorization", "Bearer t1")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    // the refresh is polled first, so it has read the session before logout clears it
    let (refreshed, ()) = tokio::join!(http.refresh(), http.logout());
    assert!(!refreshed);
    assert_eq!(http.store().token(), None);
    assert!(!http.store().is_authenticated());
    assert!(!http.refresh_in_flight());

    refresh.assert_async().await;
    logout.assert_async().await;
}

#[tokio::test]
async fn login_without_user_fetches_profile() {
    let mut server = Server::new_async().await;
    let http = session(&server);

    let _login = server
        .mock("POST", "/api/auth/login/")
        .match_body(Matcher::Json(json!({"username": "bob", "password": "pw"})))
        .with_status(200)
        .with_body(r#"{"access": "t9"}"#)
        .create_async()
        .await;
    let me = server
        .mock("GET", "/api/me/")
        .match_header("authorization", "Bearer t9")
        .with_status(200)
        .with_body(r#"{"id": 7, "username": "bob", "tenant_id": 2, "is_superuser": true}"#)
        .expect(1)
        .create_async()
        .await;

    let req = LoginRequest {
        username: "bob".into(),
        password: "pw".into(),
    };
    let cred = http.login(&req).await.unwrap();
    let user = cred.user.unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.tenant_id, Some(2));
    assert!(http.store().is_admin());
    me.assert_async().await;
}

#[tokio::test]
async fn rejected_login_leaves_store_empty() {
    let mut server = Server::new_async().await;
    let http = session(&server);

    let _login = server
        .mock("POST", "/api/auth/login/")
        .with_status(401)
        .with_body(r#"{"error": "Invalid credentials"}"#)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/token/refresh/")
        .expect(0)
        .create_async()
        .await;

    let req = LoginRequest {
        username: "bob".into(),
        password: "nope".into(),
    };
    let err = http.login(&req).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!http.store().is_authenticated());
    refresh.assert_async().await;
}

#[tokio::test]
async fn malformed_token_response_is_an_error() {
    let mut server = Server::new_async().await;
    let http = session(&server);

    let _login = server
        .mock("POST", "/api/auth/login/")
        .with_status(200)
        .with_body(r#"{"access": "t1", "user": {"id": 1}}"#)
        .create_async()
        .await;
    let me = server.mock("GET", "/api/me/").expect(0).create_async().await;

    let req = LoginRequest {
        username: "alice".into(),
        password: "pw".into(),
    };
    let err = http.login(&req).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "{err:?}");
    assert!(!http.store().is_authenticated());
    me.assert_async().await;
}

#[tokio::test]
async fn service_token_only_on_state_changing_calls() {
    let mut server = Server::new_async().await;
    let mut cfg = Config::default().with_api_base(format!("{}/api", server.url()));
    cfg.service_secret = Some("s3cret".into());
    let http = HttpSession::new(&cfg, Arc::new(CredentialStore::new())).unwrap();

    let post = server
        .mock("POST", "/api/jobs/")
        .match_header("x-service-token", Matcher::Regex(r"^\d+:[0-9a-f]{64}$".into()))
        .with_status(200)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/api/jobs/")
        .match_header("x-service-token", Matcher::Missing)
        .with_status(200)
        .create_async()
        .await;

    http.post("/jobs/", &json!({})).await.unwrap();
    http.get("/jobs/").await.unwrap();
    post.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn timeout_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((sock, _)) = listener.accept().await {
            held.push(sock);
        }
    });

    let mut cfg = Config::default().with_api_base(format!("http://{addr}/api"));
    cfg.timeout_secs = 1;
    let http = HttpSession::new(&cfg, Arc::new(CredentialStore::new())).unwrap();

    let err = http.get("/slow/").await.unwrap_err();
    assert!(err.is_network());
    assert!(err.is_timeout());
    assert_eq!(err.status(), None);
}
