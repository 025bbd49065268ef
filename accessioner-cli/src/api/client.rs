//! ArchivesSpace HTTP client
//!
//! `ArchivesSpaceApi` is the seam between the pipeline and the network: the
//! resolvers and the event recorder only ever see `&dyn ArchivesSpaceApi`.
//! `ArchivesSpaceClient` is the reqwest-backed implementation produced by
//! [`super::auth::login`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, RemoteApiError};

/// Header carrying the session token after login (`X-ArchivesSpace-Session`)
pub const SESSION_HEADER: &str = "x-archivesspace-session";

/// Minimal JSON-over-HTTP surface used by the accessioning pipeline
///
/// Paths are relative to the API base and start with `/`
/// (e.g. `/repositories/2/archival_objects/15`).
#[async_trait]
pub trait ArchivesSpaceApi: Send + Sync {
    /// Base address the session is bound to
    fn base_url(&self) -> &str;

    /// Username the session was opened for
    fn username(&self) -> &str;

    async fn get_json(&self, path: &str) -> Result<Value, ApiError>;

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
}

/// GET a path and deserialize the body into `T`
pub async fn get_as<T: DeserializeOwned>(
    api: &dyn ArchivesSpaceApi,
    path: &str,
) -> Result<T, ApiError> {
    let value = api.get_json(path).await?;
    serde_json::from_value(value).map_err(|e| ApiError::decode(path, e.to_string()))
}

/// Authenticated session against one ArchivesSpace instance
#[derive(Debug, Clone)]
pub struct ArchivesSpaceClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
}

impl ArchivesSpaceClient {
    /// Wrap an HTTP client whose default headers already carry the session token
    pub(crate) fn new(http: reqwest::Client, base_url: String, username: String) -> Self {
        Self {
            http,
            base_url,
            username,
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[async_trait]
impl ArchivesSpaceApi for ArchivesSpaceClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn username(&self) -> &str {
        &self.username
    }

    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                uri: url.clone(),
                source,
            })?;

        read_json_response(&url, response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = self.url(path);
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                uri: url.clone(),
                source,
            })?;

        read_json_response(&url, response).await
    }
}

/// Turn a response into JSON, mapping non-success statuses to `RemoteApiError`
pub(crate) async fn read_json_response(
    url: &str,
    response: reqwest::Response,
) -> Result<Value, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(|source| ApiError::Transport {
        uri: url.to_string(),
        source,
    })?;

    if !status.is_success() {
        return Err(RemoteApiError {
            uri: url.to_string(),
            status: status.as_u16(),
            message: error_message(&text),
        }
        .into());
    }

    serde_json::from_str(&text).map_err(|e| ApiError::decode(url, e.to_string()))
}

/// Pull the `error` member out of an ArchivesSpace error body, falling back to the raw text
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        _ => body.to_string(),
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
