//! Error types for the accessioning pipeline
//!
//! Each stage returns the narrowest error it can produce. `AccessionError`
//! collects them for the row pipeline and file sweep, which decide how far a
//! failure reaches (slot, file, or whole run).

use thiserror::Error;

/// Login against the ArchivesSpace API failed
#[derive(Debug, Error)]
#[error("Login failed! URL: {url}, Username: {username}, Status code: {}", status_display(.status))]
pub struct AuthenticationError {
    pub status: Option<u16>,
    pub url: String,
    pub username: String,
}

fn status_display(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no response".to_string(),
    }
}

/// An expected repository, agent, container, or record is absent
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{what} not found: {value} --> Check data and try again.")]
pub struct NotFoundError {
    pub what: &'static str,
    pub value: String,
}

impl NotFoundError {
    pub fn new(what: &'static str, value: impl Into<String>) -> Self {
        Self {
            what,
            value: value.into(),
        }
    }
}

/// A spreadsheet value does not have an accepted shape
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Value you entered: {value} --> Correct format: {expected} --> Invalid data! Check data entry rules and try again.")]
pub struct DataValidationError {
    pub value: String,
    pub expected: String,
}

impl DataValidationError {
    pub fn new(value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// Input filename carries neither a `create` nor an `update` marker
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{filename} -> Filename does not contain 'create' or 'update'. Please modify filename and try again.")]
pub struct FileNameError {
    pub filename: String,
}

/// Non-success response from the ArchivesSpace API
#[derive(Debug, Error, Clone)]
#[error("ArchivesSpace Error! URI: {uri}, Status code: {status}, Message: {message}")]
pub struct RemoteApiError {
    pub uri: String,
    pub status: u16,
    pub message: String,
}

/// Failure of a single API call
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Remote(#[from] RemoteApiError),

    #[error("Request to {uri} failed: {source}")]
    Transport {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {uri}: {message}")]
    Decode { uri: String, message: String },
}

impl ApiError {
    pub fn decode(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            uri: uri.into(),
            message: message.into(),
        }
    }
}

/// Umbrella error for the pipeline and sweep
#[derive(Debug, Error)]
pub enum AccessionError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    DataValidation(#[from] DataValidationError),

    #[error(transparent)]
    FileName(#[from] FileNameError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AccessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_error_display() {
        let err = AuthenticationError {
            status: Some(403),
            url: "http://localhost:8089".to_string(),
            username: "admin".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Login failed! URL: http://localhost:8089, Username: admin, Status code: 403"
        );

        let err = AuthenticationError {
            status: None,
            ..err
        };
        assert!(err.to_string().ends_with("Status code: no response"));
    }

    #[test]
    fn test_umbrella_keeps_inner_message() {
        let err: AccessionError = DataValidationError::new("13/45/2024", "YYYY-MM-DD").into();
        assert!(matches!(err, AccessionError::DataValidation(_)));
        assert!(err.to_string().contains("Correct format: YYYY-MM-DD"));
    }
}
