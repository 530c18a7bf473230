use shared::error::ApiError;
use thiserror::Error;

use crate::validation::ValidationErrors;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered without `success: true`.
    #[error("{}", .0.message)]
    Api(#[from] ApiError),
    /// Input was rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("please log in first")]
    Unauthenticated,
    /// The view that issued the request went away before it completed.
    #[error("request cancelled")]
    Cancelled,
    #[error("local storage error: {0:#}")]
    Storage(anyhow::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid base url '{0}'")]
    InvalidBaseUrl(String),
}

impl From<anyhow::Error> for ClientError {
    fn from(value: anyhow::Error) -> Self {
        Self::Storage(value)
    }
}

impl ClientError {
    pub fn is_soft_failure(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// Text for a one-line notification. Server-provided messages win;
    /// transport and decoding problems show `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(err) => err.message.clone(),
            Self::Validation(errors) => errors.summary(),
            Self::Unauthenticated => "Please log in first".to_string(),
            Self::Cancelled
            | Self::Transport(_)
            | Self::Storage(_)
            | Self::Decode(_)
            | Self::InvalidBaseUrl(_) => fallback.to_string(),
        }
    }
}
