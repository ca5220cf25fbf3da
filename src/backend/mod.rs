//! Client for the hosted database's REST surface (PostgREST + object storage).
//!
//! Every request carries the project API key both as `apikey` and as a bearer
//! token. Non-2xx responses are mapped to [`BackendError::Status`] with the
//! server-supplied message when one is present.

pub mod objects;
pub mod rpc;
pub mod tables;

use crate::APP_USER_AGENT;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{status} - {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
    api_key: SecretString,
}

impl RestClient {
    /// Build a client for `base_url` (for example `https://project.supabase.co`).
    ///
    /// # Errors
    /// Returns an error if the URL cannot be parsed or the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self, BackendError> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: normalize_base(base_url)?,
            api_key,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub(crate) fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        builder.header("apikey", key).bearer_auth(key)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"***")
            .finish()
    }
}

// `Url::join` drops the last path segment unless the base ends with '/'.
fn normalize_base(base_url: &str) -> Result<Url, url::ParseError> {
    let trimmed = base_url.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{trimmed}/"))
    }
}

/// Turn a non-2xx response into [`BackendError::Status`].
pub(crate) async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

// PostgREST uses `message`, the storage API uses `error`/`message`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error", "msg"]
                .iter()
                .find_map(|field| json[*field].as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}
