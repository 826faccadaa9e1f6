//! HTTP client for the LMS API
//!
//! Every request carries the session's bearer token. A 401 from any endpoint
//! expires the session, which publishes a delayed redirect-to-login event.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::models::{Envelope, LoginRequest, LoginResponse, UserDto};
use crate::config::session::{AuthSession, SessionHandle, User};
use crate::config::{AuthConfig, Config};

/// LMS API client
#[derive(Clone)]
pub struct ApiClient {
    /// HTTP client
    client: Client,
    /// Base URL without trailing slash
    base_url: String,
    /// Session providing the bearer token
    session: SessionHandle,
    /// What to do when the token is rejected
    auth: AuthConfig,
}

impl ApiClient {
    /// Create a new client for the configured API
    pub fn new(config: &Config, session: SessionHandle) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            session,
            auth: config.auth.clone(),
        }
    }

    /// The session this client authenticates with
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Join a path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sign in with email and password, installing the returned session
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let request =
            self.client.post(self.url("auth/login")).json(&LoginRequest { email, password });

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        check_status(status, &body)?;

        let login: LoginResponse = decode_body(&body)?;
        let session = AuthSession { token: login.token, user: login.user.into() };
        self.session.set(session.clone()).map_err(|e| ApiError::KeyringError(e.to_string()))?;

        tracing::info!("Signed in as {}", session.user.email);
        Ok(session)
    }

    /// Fetch the signed-in user
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let dto: UserDto = self.get("auth/me").await?;
        Ok(dto.into())
    }

    /// GET a JSON resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json::<(), T>(Method::GET, path, None).await
    }

    /// POST a JSON body
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::POST, path, Some(body)).await
    }

    /// PUT a JSON body
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::PUT, path, Some(body)).await
    }

    /// DELETE a resource, ignoring any response body
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_json::<(), serde::de::IgnoredAny>(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// POST a multipart form
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let request = self.client.post(self.url(path)).multipart(form);
        let body = self.execute(request).await?;
        decode_body(&body)
    }

    /// Send a request with an optional JSON body and decode the response
    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let mut request = self.client.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!("{} {}", method, path);
        let body = self.execute(request).await?;
        decode_body(&body)
    }

    /// Attach the bearer token, send, and map error statuses
    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let token = self.session.token().ok_or(ApiError::NotSignedIn)?;

        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match check_status(status, &body) {
            Err(ApiError::Unauthorized) => {
                tracing::warn!("Server rejected the session token, signing out");
                self.session.expire(
                    self.auth.login_route.clone(),
                    Duration::from_millis(self.auth.redirect_delay_ms),
                );
                Err(ApiError::Unauthorized)
            }
            Err(e) => Err(e),
            Ok(()) => Ok(body),
        }
    }
}

/// Map an HTTP status (and error body) to an [`ApiError`]
pub(crate) fn check_status(status: StatusCode, body: &str) -> Result<(), ApiError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }

    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16(), message: error_message(body) });
    }

    Ok(())
}

/// Pull a human-readable message out of an error body
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("error")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Decode a response body that may or may not be wrapped in `{"data": ...}`
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "null" } else { body };

    if let Ok(wrapped) = serde_json::from_str::<Envelope<T>>(body) {
        return Ok(wrapped.data);
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let mut config = Config::default();
        config.api.base_url = "https://lms.example.com/api/".into();
        let client = ApiClient::new(&config, SessionHandle::in_memory());

        assert_eq!(client.url("/courses"), "https://lms.example.com/api/courses");
        assert_eq!(client.url("courses/1"), "https://lms.example.com/api/courses/1");
    }

    #[test]
    fn unauthorized_maps_to_reauth() {
        let err = check_status(StatusCode::UNAUTHORIZED, "").unwrap_err();
        assert!(err.requires_reauth());
    }

    #[test]
    fn error_body_message_is_extracted() {
        let err = check_status(StatusCode::BAD_REQUEST, r#"{"message":"Lesson not found"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "API error (400): Lesson not found");

        let err = check_status(StatusCode::INTERNAL_SERVER_ERROR, "boom").unwrap_err();
        assert_eq!(err.to_string(), "API error (500): boom");
    }

    #[test]
    fn decode_accepts_wrapped_and_bare() {
        let wrapped: Vec<u32> = decode_body(r#"{"data":[1,2]}"#).unwrap();
        let bare: Vec<u32> = decode_body("[3]").unwrap();
        assert_eq!(wrapped, vec![1, 2]);
        assert_eq!(bare, vec![3]);
    }

    #[test]
    fn decode_empty_body_as_unit() {
        let _: () = decode_body("").unwrap();
        let _: serde::de::IgnoredAny = decode_body("  ").unwrap();
    }

    #[tokio::test]
    async fn requests_without_session_fail_fast() {
        let client = ApiClient::new(&Config::default(), SessionHandle::in_memory());
        let err = client.get::<serde_json::Value>("courses").await.unwrap_err();
        assert!(matches!(err, ApiError::NotSignedIn));
    }

    #[tokio::test]
    async fn rejected_token_signs_out_and_redirects() {
        use crate::config::session::{AuthEvent, Role};
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let body = r#"{"message":"Token expired"}"#;
            let response = format!(
                "HTTP/1.1 401 Unauthorized\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let mut config = Config::default();
        config.api.base_url = format!("http://{}/api", addr);
        config.auth.redirect_delay_ms = 50;
        let session = SessionHandle::in_memory();
        session
            .set(AuthSession {
                token: "aaa.bbb.ccc".into(),
                user: User {
                    id: "u1".into(),
                    name: "Ada".into(),
                    email: "ada@example.com".into(),
                    role: Role::Student,
                },
            })
            .unwrap();
        let mut events = session.subscribe();
        let client = ApiClient::new(&config, session.clone());

        let err = client.get::<serde_json::Value>("courses").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!session.is_signed_in());
        assert_eq!(*events.borrow_and_update(), AuthEvent::SignedOut);

        tokio::time::timeout(Duration::from_secs(2), events.changed()).await.unwrap().unwrap();
        assert_eq!(*events.borrow(), AuthEvent::RedirectToLogin { route: "/login".into() });
    }
}
