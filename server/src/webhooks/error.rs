//! Webhook Error Types
//!
//! Every failure maps to a bare status code. Response bodies stay empty so
//! nothing about the failure reaches the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use wp_common::DecodeError;

/// Signature verification failures. All of them answer 403.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    /// `X-Hub-Signature` absent or empty.
    #[error("Signature header is empty")]
    MissingSignature,

    /// Header has no `=` between algorithm and digest.
    #[error("Signature header is malformed")]
    MalformedSignature,

    /// Digest does not match the body.
    #[error("Signature does not match payload")]
    SignatureMismatch,
}

/// Errors raised while handling a callback request.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Request body could not be read (stream error or over the size limit).
    #[error("Failed to read request body")]
    TransportRead,

    /// Body failed signature verification.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Body is not a valid envelope.
    #[error(transparent)]
    PayloadDecode(#[from] DecodeError),

    /// Registered handler returned an error or panicked.
    #[error("Handler failed: {0}")]
    Handler(anyhow::Error),

    /// Handshake query string could not be parsed.
    #[error("Malformed query string")]
    MalformedQuery,

    /// Handshake mode or verify token did not match.
    #[error("Subscription handshake rejected")]
    HandshakeRejected,

    /// Method other than GET or POST.
    #[error("Unsupported method")]
    UnsupportedMethod,
}

/// Per-request result reported to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Event accepted (handled, or nothing registered for it).
    Accepted,
    /// Unreadable or undecodable request, or handler failure.
    ClientError,
    /// Authentication failure or unsupported method.
    Forbidden,
}

impl Outcome {
    /// HTTP status for this outcome.
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Accepted => StatusCode::OK,
            Self::ClientError => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

impl WebhookError {
    /// Outcome this error resolves to.
    pub const fn outcome(&self) -> Outcome {
        match self {
            Self::Verification(_) | Self::HandshakeRejected | Self::UnsupportedMethod => {
                Outcome::Forbidden
            }
            Self::TransportRead
            | Self::PayloadDecode(_)
            | Self::Handler(_)
            | Self::MalformedQuery => Outcome::ClientError,
        }
    }

    /// Short label for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TransportRead => "transport_read",
            Self::Verification(VerificationError::MissingSignature) => "missing_signature",
            Self::Verification(VerificationError::MalformedSignature) => "malformed_signature",
            Self::Verification(VerificationError::SignatureMismatch) => "signature_mismatch",
            Self::PayloadDecode(_) => "payload_decode",
            Self::Handler(_) => "handler",
            Self::MalformedQuery => "malformed_query",
            Self::HandshakeRejected => "handshake_rejected",
            Self::UnsupportedMethod => "unsupported_method",
        }
    }
}

impl From<&WebhookError> for Outcome {
    fn from(err: &WebhookError) -> Self {
        err.outcome()
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        self.outcome().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_are_forbidden() {
        for err in [
            VerificationError::MissingSignature,
            VerificationError::MalformedSignature,
            VerificationError::SignatureMismatch,
        ] {
            assert_eq!(WebhookError::from(err).outcome(), Outcome::Forbidden);
        }
        assert_eq!(WebhookError::HandshakeRejected.outcome(), Outcome::Forbidden);
        assert_eq!(WebhookError::UnsupportedMethod.outcome(), Outcome::Forbidden);
    }

    #[test]
    fn other_failures_are_client_errors() {
        let decode = wp_common::Envelope::from_slice(b"nope").unwrap_err();
        for err in [
            WebhookError::TransportRead,
            WebhookError::PayloadDecode(decode),
            WebhookError::Handler(anyhow::anyhow!("boom")),
            WebhookError::MalformedQuery,
        ] {
            assert_eq!(Outcome::from(&err), Outcome::ClientError, "{}", err.kind());
        }
    }

    #[test]
    fn outcome_status_codes() {
        assert_eq!(Outcome::Accepted.status(), StatusCode::OK);
        assert_eq!(Outcome::ClientError.status(), StatusCode::BAD_REQUEST);
        assert_eq!(Outcome::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn response_has_status_only() {
        let response = WebhookError::Handler(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(axum::http::header::CONTENT_TYPE).is_none());
    }
}
