// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Session bootstrap never surfaces these to its caller; they are logged and
//! collapsed into the unauthorized state. User-initiated flows (interactive
//! login, account updates) return them as-is.

use std::time::Duration;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Credential store unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Credential store write failed: {0}")]
    StorageWrite(String),

    #[error("Challenge rejected by authority")]
    ChallengeRejected,

    #[error("Challenge transport error: {0}")]
    ChallengeTransport(String),

    #[error("Challenge timed out after {0:?}")]
    ChallengeTimeout(Duration),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for failures that may succeed if the user simply tries again
    /// (network trouble, timeouts, an unreachable store).
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::ChallengeTransport(_)
            | AppError::ChallengeTimeout(_)
            | AppError::StorageUnavailable(_) => true,
            AppError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP-like status reported back to the account screens. Server-side
    /// failures collapse to 400.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Unauthorized | AppError::ChallengeRejected => 401,
            AppError::Api { status, .. } if *status < 500 => *status,
            _ => 400,
        }
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(AppError::ChallengeTransport("reset".into()).is_transient());
        assert!(AppError::ChallengeTimeout(Duration::from_secs(1)).is_transient());
        assert!(AppError::Api {
            status: 503,
            message: "down".into()
        }
        .is_transient());

        assert!(!AppError::ChallengeRejected.is_transient());
        assert!(!AppError::InvalidPayload("bad".into()).is_transient());
        assert!(!AppError::Api {
            status: 404,
            message: "gone".into()
        }
        .is_transient());
    }

    #[test]
    fn status_code_defaults_to_bad_request() {
        assert_eq!(AppError::Unauthorized.status_code(), 401);
        assert_eq!(AppError::Crypto("x".into()).status_code(), 400);
        assert_eq!(
            AppError::Api {
                status: 409,
                message: "taken".into()
            }
            .status_code(),
            409
        );
        assert_eq!(
            AppError::Api {
                status: 502,
                message: "bad gateway".into()
            }
            .status_code(),
            400
        );
    }
}
