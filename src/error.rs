use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures surfaced to the view through `SubjectView::error`.
///
/// A game that has not started is not an error; see `refresh::Availability`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Required identity fields (team id, player id, game id) are missing.
    /// Retrying the same payload cannot succeed.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Network or provider failure. Retry with a manual refresh.
    #[error("transport failure: {0}")]
    TransportFailure(String),
}

impl ErrorKind {
    pub fn malformed(msg: impl Into<String>) -> Self {
        ErrorKind::MalformedPayload(msg.into())
    }

    pub fn transport(err: &anyhow::Error) -> Self {
        ErrorKind::TransportFailure(format!("{err:#}"))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::TransportFailure(_))
    }
}
