// src/error.rs
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("token storage: {0}")]
    Token(#[from] std::io::Error),
}

impl ApiError {
    /// The backend's own message when it sent one, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

/// Error body shape used by the backend for rejected requests.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

/// Client-side form validation failures. The display text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Quantity and purchase price must be positive values")]
    NotPositive,

    #[error("Portfolio name is required")]
    NameRequired,

    #[error("Please select a portfolio")]
    NoPortfolioSelected,

    #[error("Please enter a search term")]
    EmptyQuery,

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Please enter your username and password")]
    MissingCredentials,
}

/// Outcome of a rejected form submit.
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FormError {
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            FormError::Validation(e) => e.to_string(),
            FormError::Api(e) => e.user_message(fallback),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FormError::Validation(_))
    }
}
