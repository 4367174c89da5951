use std::{error::Error as StdError, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::Feature,
    error::PredictionFailure,
    protocol::{Prediction, PredictionRequest, PredictionSuccess, PREDICT_ROUTE},
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod evaluate;
pub mod form;

pub use form::{FormController, FormInput, FormState, FormView, SubmitControl, UiState};

pub const VALIDATION_MESSAGE: &str = "Please enter valid numbers for all fields.";
pub const TRANSPORT_FALLBACK_MESSAGE: &str = "Could not reach server.";

/// Failure of one submission. `Display` is the exact text shown in the error
/// panel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please enter valid numbers for all fields.")]
    Validation { fields: Vec<Feature> },
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Network error: {message}")]
    Transport { message: String },
}

impl SubmitError {
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            TRANSPORT_FALLBACK_MESSAGE.to_string()
        } else {
            message
        };
        Self::Transport { message }
    }

    pub fn server(status: u16, failure: &PredictionFailure) -> Self {
        Self::Server {
            status,
            message: failure.message(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Validation { .. } => "validation",
            SubmitError::Server { .. } => "server",
            SubmitError::Transport { .. } => "transport",
        }
    }
}

#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Issues exactly one prediction request.
    async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, SubmitError>;
}

pub struct HttpPredictionClient {
    http: Client,
    endpoint: Url,
}

impl HttpPredictionClient {
    pub fn new(base_url: &Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// A client whose every request gives up after `timeout`.
    pub fn with_request_timeout(base_url: &Url, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: &Url) -> Self {
        Self {
            http,
            endpoint: predict_endpoint(base_url),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Appends the predict route to whatever path prefix the base URL carries.
pub fn predict_endpoint(base_url: &Url) -> Url {
    let mut endpoint = base_url.clone();
    let path = format!("{}{}", base_url.path().trim_end_matches('/'), PREDICT_ROUTE);
    endpoint.set_path(&path);
    endpoint.set_query(None);
    endpoint.set_fragment(None);
    endpoint
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, SubmitError> {
        debug!(endpoint = %self.endpoint, "posting prediction request");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| {
                warn!(endpoint = %self.endpoint, error = %err, "prediction request did not complete");
                SubmitError::transport(describe_transport_error(&err))
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| SubmitError::transport(describe_transport_error(&err)))?;

        if !status.is_success() {
            let failure = PredictionFailure::from_body(&body);
            let err = SubmitError::server(status.as_u16(), &failure);
            warn!(status = status.as_u16(), message = %err, "prediction service rejected request");
            return Err(err);
        }

        let success: PredictionSuccess = serde_json::from_slice(&body).map_err(|err| {
            warn!(error = %err, "prediction response body did not decode");
            SubmitError::transport(format!("invalid response body: {err}"))
        })?;
        let prediction = Prediction::from(success);
        info!(
            verdict = prediction.verdict.name(),
            label = %prediction.label,
            "prediction received"
        );
        Ok(prediction)
    }
}

/// Flattens an error and its source chain into one line, skipping sources
/// whose text the outer message already contains.
fn describe_transport_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
