use crate::error::ApiError;
use crate::storage::credentials::SessionStore;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("opsdash/", env!("CARGO_PKG_VERSION"));

pub const LOGIN_CHECK_PATH: &str = "/api/v1/login/check";

/// HTTP pipeline against the ops server.
///
/// Holds the shared session store: the bearer header is attached exactly
/// when the store currently has a token, and a 401/403 drops the stored
/// token before the error is surfaced. Cloning is cheap; requests are
/// dispatched at most once (no retry layer).
#[derive(Debug, Clone)]
pub struct OpsClient {
    client: Client,
    pub base_url: String,
    session: Arc<SessionStore>,
    timeout_secs: u64,
}

impl OpsClient {
    // Create a client with default settings
    pub fn new(base_url: String, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, session, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(
        base_url: String,
        session: Arc<SessionStore>,
        timeout_secs: u64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Transport {
                endpoint: "client_init".to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(OpsClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            timeout_secs,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn build_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(token) = self.session.get() {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        request
    }

    pub async fn get(&self, path: &str) -> Result<Option<Value>, ApiError> {
        self.execute(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Option<Value>, ApiError> {
        self.execute(Method::POST, path, body).await
    }

    pub async fn put(&self, path: &str, body: Option<&Value>) -> Result<Option<Value>, ApiError> {
        self.execute(Method::PUT, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<Option<Value>, ApiError> {
        self.execute(Method::DELETE, path, None).await
    }

    /// Probe the stored token against the login check route
    pub async fn check(&self) -> bool {
        self.get(LOGIN_CHECK_PATH).await.is_ok()
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        let mut request = self.build_request(method, path);

        // Content-Type and a serialized body are emitted only together
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e, path))?;

        self.handle_response(response, path).await
    }

    /// Parse the body as JSON only when the content type says so, then
    /// classify by status.
    pub async fn handle_response(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<Option<Value>, ApiError> {
        let status = response.status();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));

        let body = if is_json {
            let text = response
                .text()
                .await
                .map_err(|e| self.transport_error(e, endpoint))?;
            let value =
                serde_json::from_str::<Value>(&text).map_err(|e| ApiError::Transport {
                    endpoint: endpoint.to_string(),
                    message: format!("Invalid JSON body: {}", e),
                })?;
            Some(value)
        } else {
            None
        };

        if status.is_success() {
            return Ok(body);
        }

        // Error message from the body, defaulting to the numeric status
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string());

        match status.as_u16() {
            401 | 403 => {
                let _ = self.session.clear();
                Err(ApiError::AuthExpired {
                    status: status.as_u16(),
                    endpoint: endpoint.to_string(),
                    message,
                })
            }
            _ => Err(ApiError::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                message,
            }),
        }
    }

    fn transport_error(&self, error: reqwest::Error, endpoint: &str) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout {
                timeout_secs: self.timeout_secs,
                endpoint: endpoint.to_string(),
            }
        } else {
            ApiError::Transport {
                endpoint: endpoint.to_string(),
                message: error.to_string(),
            }
        }
    }
}
