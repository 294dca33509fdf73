//! reqwest adapter for the portal REST API. Implements `ClaimsApi`.
//!
//! Every call reads the bearer token from the session store at call time, the
//! same moment the request is built. No retries: one request per call.

use crate::domain::{
    CatalogPolicy, Claim, ClaimApplication, Credentials, DomainError, LoginGrant, PendingUser,
    PolicyEnrollment, Policyholder, Registration, UserProfile,
};
use crate::ports::{ClaimsApi, SessionStorePort};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, IntoUrl, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Error body returned by the portal: `{ "msg": "..." }`.
#[derive(Deserialize)]
struct ErrorBody {
    msg: Option<String>,
}

#[derive(Serialize)]
struct UsernameBody<'a> {
    username: &'a str,
}

#[derive(Serialize)]
struct DeletePolicyBody<'a> {
    #[serde(rename = "Username")]
    username: &'a str,
    policy_id: &'a str,
}

/// HTTP gateway to the portal.
pub struct HttpClaimsApi {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStorePort>,
}

impl HttpClaimsApi {
    /// Create the gateway.
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. "https://securing.onrender.com" (trailing slash ignored)
    /// * `timeout` - per-request timeout; an expired request counts as "no response"
    /// * `session` - store read for the bearer token on every authorized call
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<dyn SessionStorePort>,
    ) -> Result<Self, DomainError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Request(format!("build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `prefix` followed by one caller-supplied identifier as a single
    /// percent-encoded path segment. `.` and `..` would be dropped by URL
    /// normalization and retarget the request, so they are refused.
    fn segment_url(&self, prefix: &str, segment: &str) -> Result<Url, DomainError> {
        if matches!(segment.trim(), "" | "." | "..") {
            return Err(DomainError::Validation(format!(
                "\"{}\" is not a valid identifier",
                segment
            )));
        }
        let mut url = Url::parse(&self.url(prefix))
            .map_err(|e| DomainError::Request(format!("invalid URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| DomainError::Request("base URL cannot carry a path".to_string()))?
            .push(segment);
        Ok(url)
    }

    /// Attaches `Authorization: Bearer <token>` or fails before any I/O.
    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, DomainError> {
        let session = self.session.load()?.ok_or(DomainError::MissingSession)?;
        Ok(builder.header(AUTHORIZATION, format!("Bearer {}", session.token)))
    }

    async fn execute(&self, builder: RequestBuilder, op: &'static str) -> Result<Response, DomainError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                DomainError::Request(e.to_string())
            } else {
                warn!(op, error = %e, "no response from portal");
                DomainError::Transport(e.to_string())
            }
        })?;
        let status = response.status();
        debug!(op, status = %status, "portal responded");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = error_from_response(status, &body);
        warn!(op, status = %status, error = %err, "portal rejected request");
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: impl IntoUrl,
        op: &'static str,
    ) -> Result<T, DomainError> {
        let builder = self.authorized(self.client.get(url))?;
        let response = self.execute(builder, op).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| DomainError::Decode(format!("{}: {}", op, e)))
    }

    async fn send_authorized(&self, builder: RequestBuilder, op: &'static str) -> Result<(), DomainError> {
        let builder = self.authorized(builder)?;
        self.execute(builder, op).await.map(drop)
    }
}

/// Maps a non-success response to a domain error. 401 means the session is no
/// longer usable; everything else is an ordinary server failure.
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> DomainError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.msg)
        .filter(|m| !m.trim().is_empty());
    if status == StatusCode::UNAUTHORIZED {
        DomainError::Unauthorized { message }
    } else {
        DomainError::Server {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait::async_trait]
impl ClaimsApi for HttpClaimsApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, DomainError> {
        let builder = self.client.post(self.url("/auth/login")).json(credentials);
        let response = self.execute(builder, "login").await?;
        response
            .json::<LoginGrant>()
            .await
            .map_err(|e| DomainError::Decode(format!("login: {}", e)))
    }

    async fn register(&self, registration: &Registration) -> Result<(), DomainError> {
        let builder = self
            .client
            .post(self.url("/auth/register"))
            .json(registration);
        self.execute(builder, "register").await.map(drop)
    }

    async fn user_details(&self) -> Result<UserProfile, DomainError> {
        self.fetch(self.url("/api/user/details"), "user_details").await
    }

    async fn pending_users(&self) -> Result<Vec<PendingUser>, DomainError> {
        self.fetch(self.url("/api/user/tempusers"), "pending_users").await
    }

    async fn confirm_user(&self, username: &str) -> Result<(), DomainError> {
        let builder = self
            .client
            .post(self.url("/api/user/confirm"))
            .json(&UsernameBody { username });
        self.send_authorized(builder, "confirm_user").await
    }

    async fn reject_user(&self, username: &str) -> Result<(), DomainError> {
        let builder = self
            .client
            .post(self.url("/api/user/reject"))
            .json(&UsernameBody { username });
        self.send_authorized(builder, "reject_user").await
    }

    async fn policyholders(&self) -> Result<Vec<Policyholder>, DomainError> {
        self.fetch(self.url("/api/policyholder"), "policyholders").await
    }

    async fn policyholder(&self, username: &str) -> Result<Policyholder, DomainError> {
        let url = self.segment_url("/api/policyholder", username)?;
        self.fetch(url, "policyholder").await
    }

    async fn upsert_policy(
        &self,
        username: &str,
        enrollment: &PolicyEnrollment,
    ) -> Result<(), DomainError> {
        let url = self.segment_url("/api/policyholder", username)?;
        let builder = self.client.put(url).json(enrollment);
        self.send_authorized(builder, "upsert_policy").await
    }

    async fn delete_policyholder(&self, username: &str) -> Result<(), DomainError> {
        let url = self.segment_url("/api/policyholder", username)?;
        let builder = self.client.delete(url);
        self.send_authorized(builder, "delete_policyholder").await
    }

    async fn delete_policy(&self, username: &str, policy_id: &str) -> Result<(), DomainError> {
        let builder = self
            .client
            .delete(self.url("/api/delete_policy"))
            .json(&DeletePolicyBody {
                username,
                policy_id,
            });
        self.send_authorized(builder, "delete_policy").await
    }

    async fn policy_catalog(&self) -> Result<Vec<CatalogPolicy>, DomainError> {
        self.fetch(self.url("/api/policy"), "policy_catalog").await
    }

    async fn claims(&self) -> Result<Vec<Claim>, DomainError> {
        self.fetch(self.url("/api/claim"), "claims").await
    }

    async fn apply_claim(&self, application: &ClaimApplication) -> Result<(), DomainError> {
        let builder = self.client.post(self.url("/api/claim")).json(application);
        self.send_authorized(builder, "apply_claim").await
    }

    async fn confirm_claim(&self, claim_id: &str) -> Result<(), DomainError> {
        let url = self.segment_url("/api/confirmclaim", claim_id)?;
        let builder = self.client.put(url).json(&serde_json::json!({}));
        self.send_authorized(builder, "confirm_claim").await
    }

    async fn reject_claim(&self, claim_id: &str) -> Result<(), DomainError> {
        let url = self.segment_url("/api/rejectclaim", claim_id)?;
        let builder = self.client.put(url).json(&serde_json::json!({}));
        self.send_authorized(builder, "reject_claim").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{MemoryTabStorage, TabSessionStore};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn api() -> HttpClaimsApi {
        let store = Arc::new(TabSessionStore::new(Arc::new(MemoryTabStorage::new())));
        HttpClaimsApi::new("http://127.0.0.1:9/", Duration::from_secs(1), store).unwrap()
    }

    /// One request as seen on the wire.
    struct Captured {
        request_line: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl Captured {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        }

        fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body).unwrap()
        }
    }

    /// Accepts a single connection, records the request and answers with
    /// `status` and `body`.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                raw.extend_from_slice(&chunk[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos;
                }
            };
            let head = String::from_utf8_lossy(&raw[..head_end]).to_string();
            let mut lines = head.split("\r\n");
            let request_line = lines.next().unwrap_or_default().to_string();
            let headers: Vec<(String, String)> = lines
                .filter_map(|l| l.split_once(':'))
                .map(|(n, v)| (n.trim().to_ascii_lowercase(), v.trim().to_string()))
                .collect();
            let length = headers
                .iter()
                .find(|(n, _)| n == "content-length")
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(0);
            let mut payload = raw[head_end + 4..].to_vec();
            while payload.len() < length {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before body");
                payload.extend_from_slice(&chunk[..n]);
            }
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            Captured {
                request_line,
                headers,
                body: String::from_utf8_lossy(&payload).to_string(),
            }
        });
        (base, handle)
    }

    fn api_at(base: &str, token: Option<&str>) -> HttpClaimsApi {
        let store = Arc::new(TabSessionStore::new(Arc::new(MemoryTabStorage::new())));
        if let Some(token) = token {
            store.save("jane", token, false).unwrap();
        }
        HttpClaimsApi::new(base, Duration::from_secs(5), store).unwrap()
    }

    #[test]
    fn test_error_from_response_uses_msg() {
        let err = error_from_response(StatusCode::BAD_REQUEST, r#"{"msg": "User already exists"}"#);
        assert!(matches!(
            err,
            DomainError::Server { status: 400, message: Some(ref m) } if m == "User already exists"
        ));
    }

    #[test]
    fn test_error_from_response_unauthorized() {
        let err = error_from_response(StatusCode::UNAUTHORIZED, r#"{"msg": "Token has expired"}"#);
        assert!(err.forces_logout());
        assert_eq!(err.user_message("x"), "Token has expired");
    }

    #[test]
    fn test_error_from_response_non_json_body() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(
            err,
            DomainError::Server {
                status: 502,
                message: None
            }
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        assert_eq!(api().url("/api/claim"), "http://127.0.0.1:9/api/claim");
    }

    #[tokio::test]
    async fn test_missing_session_fails_before_io() {
        let err = api().pending_users().await.unwrap_err();
        assert!(matches!(err, DomainError::MissingSession));
    }

    #[tokio::test]
    async fn test_authorized_call_sends_bearer_and_accept() {
        let (base, server) = serve_once("200 OK", r#"{"username":"jane","first_name":"Jane"}"#).await;
        let profile = api_at(&base, Some("tok-1")).user_details().await.unwrap();
        let req = server.await.unwrap();

        assert_eq!(profile.first_name, "Jane");
        assert_eq!(req.request_line, "GET /api/user/details HTTP/1.1");
        assert_eq!(req.header("authorization"), Some("Bearer tok-1"));
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_login_sends_no_bearer() {
        let (base, server) = serve_once("200 OK", r#"{"access_token":"t","isAdmin":true}"#).await;
        // A leftover session must not leak into the login request.
        let api = api_at(&base, Some("stale"));
        let grant = api
            .login(&Credentials {
                username: "admin".into(),
                password: "admin123".into(),
            })
            .await
            .unwrap();
        let req = server.await.unwrap();

        assert!(grant.is_admin);
        assert_eq!(req.request_line, "POST /auth/login HTTP/1.1");
        assert_eq!(req.header("authorization"), None);
        assert_eq!(
            req.json(),
            serde_json::json!({"username": "admin", "password": "admin123"})
        );
    }

    #[tokio::test]
    async fn test_register_sends_no_bearer() {
        let (base, server) = serve_once("201 Created", "{}").await;
        let registration = Registration {
            username: "carol".into(),
            password: "pw".into(),
            email: "carol@example.com".into(),
            mobile: "555".into(),
            first_name: "Carol".into(),
            last_name: "Ng".into(),
            age: 30,
        };
        api_at(&base, Some("stale")).register(&registration).await.unwrap();
        let req = server.await.unwrap();

        assert_eq!(req.request_line, "POST /auth/register HTTP/1.1");
        assert_eq!(req.header("authorization"), None);
        assert_eq!(req.json()["username"], "carol");
        assert_eq!(req.json()["age"], 30);
    }

    #[tokio::test]
    async fn test_delete_policy_body() {
        let (base, server) = serve_once("200 OK", "{}").await;
        api_at(&base, Some("tok-1"))
            .delete_policy("jane", "10482")
            .await
            .unwrap();
        let req = server.await.unwrap();

        assert_eq!(req.request_line, "DELETE /api/delete_policy HTTP/1.1");
        assert_eq!(req.header("authorization"), Some("Bearer tok-1"));
        assert_eq!(
            req.json(),
            serde_json::json!({"Username": "jane", "policy_id": "10482"})
        );
    }

    #[tokio::test]
    async fn test_confirm_and_reject_user_body() {
        let (base, server) = serve_once("200 OK", "{}").await;
        api_at(&base, Some("tok-1")).confirm_user("alice").await.unwrap();
        let req = server.await.unwrap();
        assert_eq!(req.request_line, "POST /api/user/confirm HTTP/1.1");
        assert_eq!(req.json(), serde_json::json!({"username": "alice"}));

        let (base, server) = serve_once("200 OK", "{}").await;
        api_at(&base, Some("tok-1")).reject_user("bob").await.unwrap();
        let req = server.await.unwrap();
        assert_eq!(req.request_line, "POST /api/user/reject HTTP/1.1");
        assert_eq!(req.json(), serde_json::json!({"username": "bob"}));
    }

    #[tokio::test]
    async fn test_identifiers_are_percent_encoded() {
        let (base, server) = serve_once("200 OK", "{}").await;
        api_at(&base, Some("tok-1"))
            .delete_policyholder("bob#evil")
            .await
            .unwrap();
        let req = server.await.unwrap();
        assert_eq!(req.request_line, "DELETE /api/policyholder/bob%23evil HTTP/1.1");

        let (base, server) = serve_once("200 OK", "{}").await;
        api_at(&base, Some("tok-1")).confirm_claim("a/b?x").await.unwrap();
        let req = server.await.unwrap();
        assert_eq!(req.request_line, "PUT /api/confirmclaim/a%2Fb%3Fx HTTP/1.1");
    }

    #[tokio::test]
    async fn test_dot_segments_are_refused_before_io() {
        let api = api_at("http://127.0.0.1:9", Some("tok-1"));
        for id in ["..", ".", ""] {
            let err = api.delete_policyholder(id).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{id:?}");
        }
        let err = api.reject_claim("..").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unauthorized_status_maps_to_forced_logout() {
        let (base, server) = serve_once("401 Unauthorized", r#"{"msg":"Token has expired"}"#).await;
        let err = api_at(&base, Some("tok-1")).claims().await.unwrap_err();
        server.await.unwrap();

        assert!(err.forces_logout());
        assert_eq!(err.user_message("x"), "Token has expired");
    }
}
