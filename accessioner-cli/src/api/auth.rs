//! Session login against the ArchivesSpace API

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use super::client::{ArchivesSpaceClient, SESSION_HEADER, join_url};
use super::models::LoginResponse;
use crate::error::AuthenticationError;

/// Username/password pair for one API instance
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Log in once and return a client that reuses the session token for every request
pub async fn login(
    base_url: &str,
    credentials: &Credentials,
) -> Result<ArchivesSpaceClient, AuthenticationError> {
    let base_url = base_url.trim_end_matches('/').to_string();
    let fail = |status: Option<u16>| AuthenticationError {
        status,
        url: base_url.clone(),
        username: credentials.username.clone(),
    };

    let login_url = join_url(
        &base_url,
        &format!(
            "/users/{}/login?password={}",
            urlencoding::encode(&credentials.username),
            urlencoding::encode(&credentials.password)
        ),
    );

    let response = reqwest::Client::new()
        .post(&login_url)
        .send()
        .await
        .map_err(|e| {
            log::error!("Login request to {} failed: {}", base_url, e);
            fail(None)
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(fail(Some(status.as_u16())));
    }

    let body: LoginResponse = response.json().await.map_err(|e| {
        log::error!("Login response from {} had no session token: {}", base_url, e);
        fail(Some(status.as_u16()))
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let token = HeaderValue::from_str(&body.session).map_err(|_| fail(Some(status.as_u16())))?;
    headers.insert(SESSION_HEADER, token);

    let http = reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| {
            log::error!("Failed to build HTTP client: {}", e);
            fail(Some(status.as_u16()))
        })?;

    log::info!("Login successful!: {}", base_url);
    Ok(ArchivesSpaceClient::new(
        http,
        base_url.clone(),
        credentials.username.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::CannedServer;

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            username: "archivist".to_string(),
            password: "hunter2".to_string(),
        };
        let printed = format!("{:?}", creds);
        assert!(printed.contains("archivist"));
        assert!(!printed.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_login_unreachable_host_is_authentication_error() {
        let creds = Credentials {
            username: "archivist".to_string(),
            password: "secret".to_string(),
        };
        let err = login("http://127.0.0.1:9/", &creds).await.unwrap_err();
        assert_eq!(err.status, None);
        assert_eq!(err.url, "http://127.0.0.1:9");
        assert_eq!(err.username, "archivist");
    }

    #[tokio::test]
    async fn test_login_rejected_status_is_authentication_error() {
        let server = CannedServer::start(vec![(403, r#"{"error":"Login failed"}"#)]).await;
        let creds = Credentials {
            username: "archivist".to_string(),
            password: "wrong pass".to_string(),
        };

        let err = login(&server.base_url, &creds).await.unwrap_err();
        assert_eq!(err.status, Some(403));
        assert_eq!(err.url, server.base_url);
        assert_eq!(err.username, "archivist");

        let requests = server.requests();
        assert!(requests[0].starts_with("post /users/archivist/login?password=wrong%20pass "));
    }
}
