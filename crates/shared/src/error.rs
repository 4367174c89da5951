use serde::{Deserialize, Serialize};

pub const REQUEST_FAILED_MESSAGE: &str = "Request failed.";

/// Body of a non-2xx response from the prediction endpoint. Both fields are
/// optional and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PredictionFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            detail: None,
        }
    }

    /// `error`, else `detail`, else the generic phrase. Empty strings count as
    /// absent.
    pub fn message(&self) -> String {
        [self.error.as_deref(), self.detail.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
            .unwrap_or(REQUEST_FAILED_MESSAGE)
            .to_string()
    }

    /// Lenient decode; anything unreadable is treated as an empty body.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}
