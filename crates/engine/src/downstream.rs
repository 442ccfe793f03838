//! Downstream HTTP abstraction for testability.
//!
//! The [`DownstreamClient`] trait is the single outbound call capability used by
//! probes: one request/response exchange against a named downstream system.
//! Production code uses [`HttpDownstreamClient`] (reqwest); tests stand up a fake
//! downstream or implement the trait directly.
//!
//! # Authentication
//!
//! Systems configured with a `client_id`/`client_secret` pair obtain a bearer token
//! from the token issuer using the OAuth2 client-credentials grant. Tokens are
//! cached per system until shortly before they expire.
//!
//! # Examples
//!
//! ```ignore
//! use smoketest_engine::{DownstreamClient, DownstreamRequest, HttpDownstreamClient};
//!
//! let client = HttpDownstreamClient::from_config(&config)?;
//! let response = client
//!     .call("community-api", &DownstreamRequest::get("/secure/offenders/crn/X1/all"))
//!     .await?;
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use smoketest_core::config::{DownstreamConfig, SmokeTestConfig};
use smoketest_core::error::DownstreamError;

/// Name under which the token issuer appears in health checks.
pub const OAUTH_HEALTH_TARGET: &str = "oauth";

/// Tokens are refreshed this long before the issuer-reported expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Expiry assumed when the issuer omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(300);

/// A rendered request against a downstream system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the system's base URL
    pub path: String,
    /// Optional JSON body
    pub body: Option<String>,
}

impl DownstreamRequest {
    /// Builds a body-less `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }
}

/// Status code and raw body of a downstream response.
#[derive(Debug, Clone)]
pub struct DownstreamResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Bytes,
}

/// Trait abstracting downstream system calls.
///
/// Implementations perform exactly one exchange per [`call`](Self::call) and never
/// retry internally; retrying is the poll scheduler's decision.
pub trait DownstreamClient: Send + Sync + 'static {
    /// Performs one request against `system`.
    ///
    /// # Errors
    ///
    /// - `DownstreamError::UnknownSystem`: `system` is not configured
    /// - `DownstreamError::Token`: bearer token could not be obtained
    /// - `DownstreamError::Transport`: connection failure or timeout
    fn call(
        &self,
        system: &str,
        request: &DownstreamRequest,
    ) -> impl Future<Output = Result<DownstreamResponse, DownstreamError>> + Send;

    /// Pings the health endpoint of `target` without credentials.
    fn ping(&self, target: &str) -> impl Future<Output = Result<(), DownstreamError>> + Send;

    /// Names accepted by [`ping`](Self::ping).
    fn health_targets(&self) -> Vec<String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Debug)]
struct Credentials {
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

#[derive(Debug)]
struct SystemEndpoint {
    base_url: String,
    timeout: Duration,
    credentials: Option<Credentials>,
}

/// Production downstream client backed by `reqwest`.
#[derive(Debug)]
pub struct HttpDownstreamClient {
    http: reqwest::Client,
    systems: BTreeMap<String, SystemEndpoint>,
    token_url: String,
    token_timeout: Duration,
    health: BTreeMap<String, (String, Duration)>,
}

impl HttpDownstreamClient {
    /// Builds a client for every `[downstream.<system>]` in the configuration.
    ///
    /// The token issuer is added as a health target when any system uses
    /// client credentials.
    pub fn from_config(config: &SmokeTestConfig) -> Result<Self, DownstreamError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| DownstreamError::InvalidRequest {
                system: "http-client".to_owned(),
                reason: e.to_string(),
            })?;

        let mut systems = BTreeMap::new();
        let mut health = BTreeMap::new();
        for (name, downstream) in &config.downstream {
            health.insert(
                name.clone(),
                (
                    join_url(&downstream.base_url, &downstream.health_path),
                    Duration::from_secs(downstream.timeout_secs),
                ),
            );
            systems.insert(name.clone(), SystemEndpoint::from_config(downstream));
        }

        let oauth_timeout = Duration::from_secs(config.oauth.timeout_secs);
        if config.downstream.values().any(DownstreamConfig::uses_oauth) {
            health.insert(
                OAUTH_HEALTH_TARGET.to_owned(),
                (
                    join_url(&config.oauth.base_url, &config.oauth.health_path),
                    oauth_timeout,
                ),
            );
        }

        Ok(Self {
            http,
            systems,
            token_url: join_url(&config.oauth.base_url, &config.oauth.token_path),
            token_timeout: oauth_timeout,
            health,
        })
    }

    /// Names of the configured downstream systems.
    pub fn systems(&self) -> Vec<&str> {
        self.systems.keys().map(String::as_str).collect()
    }

    async fn bearer_token(
        &self,
        system: &str,
        credentials: &Credentials,
    ) -> Result<String, DownstreamError> {
        let mut cached = credentials.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_at) {
            return Ok(token.value.clone());
        }

        debug!(system, "requesting client credentials token");
        let token_err = |reason: String| DownstreamError::Token {
            system: system.to_owned(),
            reason,
        };

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .timeout(self.token_timeout)
            .send()
            .await
            .map_err(|e| token_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(token_err(format!("token issuer returned {status}")));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| token_err(format!("malformed token response: {e}")))?;

        let lifetime = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        });
        Ok(token.access_token)
    }
}

impl SystemEndpoint {
    fn from_config(config: &DownstreamConfig) -> Self {
        let credentials = config.uses_oauth().then(|| Credentials {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token: Mutex::new(None),
        });
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            credentials,
        }
    }
}

impl DownstreamClient for HttpDownstreamClient {
    async fn call(
        &self,
        system: &str,
        request: &DownstreamRequest,
    ) -> Result<DownstreamResponse, DownstreamError> {
        let endpoint = self
            .systems
            .get(system)
            .ok_or_else(|| DownstreamError::UnknownSystem(system.to_owned()))?;

        let url = join_url(&endpoint.base_url, &request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .timeout(endpoint.timeout);

        if let Some(credentials) = &endpoint.credentials {
            let token = self.bearer_token(system, credentials).await?;
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let transport = |e: reqwest::Error| DownstreamError::Transport {
            system: system.to_owned(),
            reason: e.to_string(),
        };
        let response = builder.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?;

        debug!(system, method = %request.method, url = url.as_str(), status, "downstream call");
        Ok(DownstreamResponse { status, body })
    }

    async fn ping(&self, target: &str) -> Result<(), DownstreamError> {
        let (url, timeout) = self
            .health
            .get(target)
            .ok_or_else(|| DownstreamError::UnknownSystem(target.to_owned()))?;

        let response = self
            .http
            .get(url)
            .timeout(*timeout)
            .send()
            .await
            .map_err(|e| DownstreamError::Transport {
                system: target.to_owned(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DownstreamError::Transport {
                system: target.to_owned(),
                reason: format!("health check returned {status}"),
            })
        }
    }

    fn health_targets(&self) -> Vec<String> {
        self.health.keys().cloned().collect()
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
