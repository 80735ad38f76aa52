//! Notification errors.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    /// Transport or serialization failure.
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("notification request timed out")]
    Timeout,

    /// The function answered with a non-2xx status.
    #[error("unexpected response from notification function: {status}: {body}")]
    UnexpectedResponse { status: StatusCode, body: String },

    /// No functions endpoint is configured.
    #[error("notifications are disabled")]
    Disabled,
}

impl NotificationError {
    /// Whether retrying the same request later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::UnexpectedResponse { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::Http(error) => error.is_connect(),
            Self::Disabled => false,
        }
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout;
        }

        Self::Http(error)
    }
}
