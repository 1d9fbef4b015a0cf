//! reqwest client wrapper for the management API.
//!
//! `ManagementClient` holds an authenticated HTTP client and the API base URL.
//! It only knows how to move JSON; which calls to make is decided by the
//! interpreter and the lifecycle above it.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// Default request timeout for a single management API call.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the management API.
#[derive(Clone)]
pub struct ClientConfig {
    /// Server URL, with or without the `/v3` suffix.
    pub url: String,

    /// API token (`token-xxxxx:secret`), sent as a bearer token.
    pub token: Option<String>,

    /// Skip TLS certificate verification.
    pub insecure: bool,

    /// Timeout for a single request.
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        ClientConfig {
            url: url.into(),
            token: None,
            insecure: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns the API root, always ending in `/v3` and without a trailing slash.
    pub fn api_root(&self) -> String {
        let base = self.url.trim_end_matches('/');
        if base.ends_with("/v3") {
            base.to_string()
        } else {
            format!("{}/v3", base)
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("insecure", &self.insecure)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// An authenticated management API client.
#[derive(Clone)]
pub struct ManagementClient {
    http: reqwest::Client,
    api_root: String,
    token: Option<String>,
}

impl ManagementClient {
    /// Builds a client from connection settings.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::from_reqwest)?;

        Ok(Self::from_http(http, config))
    }

    /// Wraps a pre-configured reqwest client.
    pub fn from_http(http: reqwest::Client, config: &ClientConfig) -> Self {
        ManagementClient {
            http,
            api_root: config.api_root(),
            token: config.token.clone(),
        }
    }

    /// Returns the API root URL.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Joins a path below the API root.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let req = self.http.request(method, url);
        let req = match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        req.header("Accept", "application/json")
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .request(reqwest::Method::GET, &self.url(path))
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        decode(resp).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self
            .request(reqwest::Method::POST, &self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        decode(resp).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self
            .request(reqwest::Method::PUT, &self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        decode(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let resp = self
            .request(reqwest::Method::DELETE, &self.url(path))
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        check_status(resp).await.map(|_| ())
    }

    /// Invokes a resource action (`POST <path>?action=<name>`), ignoring any body
    /// the action returns.
    pub async fn action<B: Serialize + ?Sized>(
        &self,
        path: &str,
        action: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let resp = self
            .request(reqwest::Method::POST, &self.url(path))
            .query(&[("action", action)])
            .json(body)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        check_status(resp).await.map(|_| ())
    }
}

impl std::fmt::Debug for ManagementClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementClient")
            .field("api_root", &self.api_root)
            .finish_non_exhaustive()
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::from_status(status.as_u16(), &body))
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    check_status(resp)
        .await?
        .json::<T>()
        .await
        .map_err(ApiError::from_reqwest)
}
