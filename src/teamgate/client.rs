//! Client for the remote identity-validation endpoint. The server is opaque:
//! it answers `POST /login/validation` with a success discriminator, the
//! dispatched one-time code and the privileged-group flag. Callers must never
//! log the response code.

use crate::teamgate::{config::AuthConfig, APP_USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{fmt, future::Future};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

const VALIDATION_PATH: &str = "/login/validation";
const SUCCESS_STATUS: &str = "success";
/// Maximum number of error body characters kept in `ClientError::Http`.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
}

#[derive(Serialize)]
pub struct ValidationRequest<'a> {
    pub email: &'a str,
}

#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ValidationResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "devCode", alias = "devcode")]
    pub dev_code: Option<String>,
    #[serde(default, rename = "inHRTeam")]
    pub in_hr_team: bool,
}

impl ValidationResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

impl fmt::Debug for ValidationResponse {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ValidationResponse")
            .field("status", &self.status)
            .field("dev_code", &self.dev_code.as_ref().map(|_| "[redacted]"))
            .field("in_hr_team", &self.in_hr_team)
            .finish()
    }
}

/// Remote identity validation used by the handshake's first step.
pub trait IdentityValidator: Send + Sync {
    fn validate(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<ValidationResponse, ClientError>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpIdentityValidator {
    client: Client,
    endpoint: String,
}

impl HttpIdentityValidator {
    pub fn new(config: &AuthConfig) -> Result<Self, ClientError> {
        let base = config.api_base_url();
        Url::parse(base)
            .map_err(|err| ClientError::Config(format!("Invalid API base URL {base:?}: {err}")))?;

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| ClientError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: format!("{base}{VALIDATION_PATH}"),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl IdentityValidator for HttpIdentityValidator {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn validate(&self, email: &str) -> Result<ValidationResponse, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ValidationRequest { email })
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: truncate(&body),
            });
        }

        let body = response.text().await.map_err(map_request_error)?;
        let payload: ValidationResponse = serde_json::from_str(&body).map_err(|err| {
            ClientError::Parse(format!(
                "Failed to decode response: {err}: {}",
                truncate(&body)
            ))
        })?;

        debug!(success = payload.is_success(), "identity validation answered");

        Ok(payload)
    }
}

fn map_request_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        ClientError::Network(format!("Unable to reach the server: {err}"))
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_CHARS).collect()
}
