//! Request execution against the Toon API
//!
//! [`Session`] owns everything needed to turn an [`ApiRequest`] into an
//! [`ApiResponse`]: the HTTP client, the base URL, headers, the request
//! timeout and the two retry policies.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use toon_core::Agreement;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Result, ToonError};
use crate::retry::Retry;
use crate::token::TokenProvider;

const JSON_CONTENT_TYPE: &str = "application/json";

/// A request relative to the API base URL
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    method: Method,
    path: String,
    body: Option<Value>,
    agreement: Option<&'a Agreement>,
}

impl<'a> ApiRequest<'a> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            agreement: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// JSON request body
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Send the agreement context headers for `agreement`
    pub fn agreement(mut self, agreement: &'a Agreement) -> Self {
        self.agreement = Some(agreement);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Successful response body
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// HTTP 204
    Empty,
    Json(Value),
    Text(String),
}

impl ApiResponse {
    /// Body as JSON. An empty response is `null`; text must parse as JSON.
    pub fn into_json(self) -> Result<Value> {
        match self {
            ApiResponse::Empty => Ok(Value::Null),
            ApiResponse::Json(value) => Ok(value),
            ApiResponse::Text(text) => serde_json::from_str(&text)
                .map_err(|e| ToonError::Parse(format!("expected JSON response: {}", e))),
        }
    }
}

enum HttpSession {
    /// Created by the session, released on close
    Owned(Client),
    /// Supplied by the caller, left alone on close
    Shared(Client),
}

/// Transport core: builds, sends, classifies and retries requests
pub struct Session {
    http: HttpSession,
    base_url: Url,
    timeout: Duration,
    user_agent: HeaderValue,
    token: String,
    token_provider: Option<Arc<dyn TokenProvider>>,
    connection_retry: Retry,
    rate_limit_retry: Retry,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("owns_http_client", &self.owns_http_client())
            .field("token_provider", &self.token_provider.is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        config: &ClientConfig,
        token: String,
        http_client: Option<Client>,
        token_provider: Option<Arc<dyn TokenProvider>>,
    ) -> Result<Self> {
        let http = match http_client {
            Some(client) => HttpSession::Shared(client),
            None => HttpSession::Owned(Client::builder().build()?),
        };

        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let user_agent = HeaderValue::from_str(&config.user_agent())
            .map_err(|e| ToonError::InvalidHeader(format!("User-Agent: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            timeout: config.request_timeout(),
            user_agent,
            token,
            token_provider,
            connection_retry: Retry::connection(config.retry.connection),
            rate_limit_retry: Retry::rate_limit(config.retry.rate_limit),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether the HTTP client was created by this session
    pub fn owns_http_client(&self) -> bool {
        matches!(self.http, HttpSession::Owned(_))
    }

    /// Get a reference to the underlying HTTP client.
    pub fn http_client(&self) -> &Client {
        match &self.http {
            HttpSession::Owned(client) | HttpSession::Shared(client) => client,
        }
    }

    /// Execute a request, retrying connection failures and rate limiting.
    ///
    /// Every attempt gets its own timeout window and a freshly provided token.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: &ApiRequest<'_>) -> Result<ApiResponse> {
        let rate_limit = &self.rate_limit_retry;
        self.connection_retry
            .run(move || rate_limit.run(move || self.send(request)))
            .await
    }

    /// Release the HTTP client if this session created it.
    ///
    /// Requests still in flight on a shared client are not affected.
    pub fn close(self) {
        match self.http {
            HttpSession::Owned(client) => {
                debug!("Closing owned HTTP session");
                drop(client);
            }
            HttpSession::Shared(_) => debug!("Leaving shared HTTP session open"),
        }
    }

    async fn send(&self, request: &ApiRequest<'_>) -> Result<ApiResponse> {
        let token = self.bearer_token().await?;
        let url = self.base_url.join(&request.path)?;

        let mut builder = self
            .http_client()
            .request(request.method.clone(), url)
            .timeout(self.timeout)
            .header(AUTHORIZATION, header_value("Authorization", &format!("Bearer {}", token))?)
            .header(USER_AGENT, self.user_agent.clone())
            .header(ACCEPT, JSON_CONTENT_TYPE);

        if let Some(agreement) = request.agreement {
            if let Some(name) = &agreement.display_common_name {
                builder = builder.header("X-Common-Name", header_value("X-Common-Name", name)?);
            }
            if let Some(id) = &agreement.agreement_id {
                builder = builder.header("X-Agreement-ID", header_value("X-Agreement-ID", id)?);
            }
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!("Sending request");
        let response = builder.send().await?;
        Self::classify(response).await
    }

    async fn bearer_token(&self) -> Result<String> {
        match &self.token_provider {
            Some(provider) => provider
                .token()
                .await
                .map_err(|e| ToonError::TokenRefresh(format!("{:#}", e))),
            None => Ok(self.token.clone()),
        }
    }

    /// Turn an HTTP response into a body or a typed failure
    async fn classify(response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let is_json = content_type.contains(JSON_CONTENT_TYPE);

        debug!(status = status.as_u16(), content_type = %content_type, "Received response");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ToonError::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            let contents = response.bytes().await?;
            let text = String::from_utf8_lossy(&contents);
            let body = if is_json {
                serde_json::from_slice(&contents).unwrap_or_else(|_| json!({ "message": text }))
            } else {
                json!({ "message": text })
            };
            return Err(ToonError::api(status.as_u16(), body));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse::Empty);
        }

        if is_json {
            let contents = response.bytes().await?;
            let value = serde_json::from_slice(&contents)
                .map_err(|e| ToonError::Parse(e.to_string()))?;
            Ok(ApiResponse::Json(value))
        } else {
            Ok(ApiResponse::Text(response.text().await?))
        }
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ToonError::InvalidHeader(format!("{}: {}", name, e)))
}
