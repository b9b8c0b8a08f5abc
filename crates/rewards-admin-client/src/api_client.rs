//! HTTP client for communicating with the rewards platform API

use crate::{
    auth::{TokenSlot, TokenSupplier},
    error::{ApiError, ApiResult},
    navigation::{ACCESS_DENIED_PATH, Navigator, RecordingNavigator, SIGN_IN_PATH, redirect_once},
};
use reqwest::{Client, Method};
use rewards_admin_core::Config;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};
use tracing::{debug, error, warn};

/// Query parameters as sent on the wire, in order
pub type QueryParams = Vec<(String, String)>;

/// API client for making HTTP requests to the admin API
///
/// Every request is augmented with a bearer token from the injected
/// [`TokenSupplier`]. Non-success responses are normalized into [`ApiError`];
/// authentication failures additionally redirect the injected [`Navigator`].
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenSupplier>,
    navigator: Arc<dyn Navigator>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client with no token and a detached navigator
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: Arc::new(TokenSlot::empty()),
            navigator: Arc::new(RecordingNavigator::default()),
        }
    }

    /// Create a client from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(config.api.base_url.clone())
            .with_timeout(Duration::from_secs(config.api.request_timeout_secs))
    }

    /// Apply a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_timeout(mut self, timeout: Duration) -> ApiResult<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Configuration {
                message: e.to_string(),
            })?;
        Ok(self)
    }

    /// Set the token supplier for authentication
    #[must_use]
    pub fn with_token_supplier(mut self, tokens: Arc<dyn TokenSupplier>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Set the navigator redirected on authentication failures
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a request and decode the JSON response body
    ///
    /// An empty success body decodes as an empty JSON object.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`ApiError`] for transport failures, non-success
    /// statuses and undecodable bodies.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        params: &[(String, String)],
    ) -> ApiResult<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(method = %method, path, params = params.len(), "Sending API request");

        let mut request = self.client.request(method.clone(), &url);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        match self.tokens.token().await {
            Ok(Some(token)) => request = request.bearer_auth(token),
            Ok(None) => debug!(path, "No session token, sending unauthenticated request"),
            Err(e) => warn!(path, error = %e, "Failed to obtain auth token"),
        }

        let response = request.send().await.map_err(|e| {
            let err = ApiError::from(e);
            error!(method = %method, path, error = %err, "No response received");
            err
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(Value::Null);
            let err = ApiError::from_response(status.as_u16(), status.canonical_reason(), &body);
            self.handle_failure(&method, path, &err);
            return Err(err);
        }

        let payload = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(payload).map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })
    }

    /// GET with query parameters
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(String, String)]) -> ApiResult<T> {
        self.request(Method::GET, path, None, params).await
    }

    /// POST a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> ApiResult<T> {
        self.request(Method::POST, path, Some(body), &[]).await
    }

    /// PATCH with an optional JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: Option<&Value>) -> ApiResult<T> {
        self.request(Method::PATCH, path, body, &[]).await
    }

    /// DELETE
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::DELETE, path, None, &[]).await
    }

    /// Centralized reaction to a failed response: log, and redirect on auth failures
    fn handle_failure(&self, method: &Method, path: &str, err: &ApiError) {
        match err {
            ApiError::Unauthorized {
                server_misconfigured: true,
                message,
            } => {
                error!(method = %method, path, message, "Server authentication misconfigured");
            }
            ApiError::Unauthorized { .. } => {
                warn!(method = %method, path, "Unauthorized access");
                redirect_once(self.navigator.as_ref(), SIGN_IN_PATH);
            }
            ApiError::Forbidden { .. } => {
                warn!(method = %method, path, "Access forbidden");
                redirect_once(self.navigator.as_ref(), ACCESS_DENIED_PATH);
            }
            ApiError::NotFound { .. } => warn!(method = %method, path, "Resource not found"),
            ApiError::ServerError { status, message } => {
                error!(method = %method, path, status, message, "Server error");
            }
            other => warn!(method = %method, path, error = %other, "Request failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3000/api/");

        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn test_from_config_uses_base_url() {
        let config = Config::new("https://admin.example.com/api", "pk_test");
        let client = ApiClient::from_config(&config).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(client.base_url(), "https://admin.example.com/api");
    }

    #[test]
    fn test_debug_does_not_expose_internals() {
        let debug = format!("{:?}", ApiClient::new("http://localhost"));

        assert!(debug.contains("base_url"));
        assert!(!debug.contains("tokens"));
    }
}
