//! Subscription Handshake
//!
//! Before enabling delivery the platform sends
//! `GET <callback>?hub.mode=subscribe&hub.verify_token=..&hub.challenge=..`
//! and expects the challenge echoed back when the token matches.

use axum::extract::Query;
use axum::http::Uri;

use super::error::WebhookError;

/// The only `hub.mode` that is answered.
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Decoded `hub.*` query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeQuery {
    pub mode: Option<String>,
    pub verify_token: Option<String>,
    pub challenge: Option<String>,
}

impl HandshakeQuery {
    /// Parse the query string of a request URI.
    ///
    /// A repeated parameter keeps its first value. Invalid percent-escapes
    /// fail with [`WebhookError::MalformedQuery`].
    pub fn from_uri(uri: &Uri) -> Result<Self, WebhookError> {
        if let Some(raw) = uri.query() {
            if !has_valid_escapes(raw) {
                return Err(WebhookError::MalformedQuery);
            }
        }

        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map_err(|_| WebhookError::MalformedQuery)?;

        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "hub.mode" => &mut query.mode,
                "hub.verify_token" => &mut query.verify_token,
                "hub.challenge" => &mut query.challenge,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        Ok(query)
    }

    /// Check mode and token; return the challenge to echo on success.
    ///
    /// A missing challenge echoes an empty body.
    pub fn respond(self, verify_token: &str) -> Result<String, WebhookError> {
        let subscribed = self.mode.as_deref() == Some(SUBSCRIBE_MODE)
            && self.verify_token.as_deref().unwrap_or_default() == verify_token;

        if subscribed {
            Ok(self.challenge.unwrap_or_default())
        } else {
            Err(WebhookError::HandshakeRejected)
        }
    }
}

/// Answer a handshake request for the given URI.
pub fn answer(uri: &Uri, verify_token: &str) -> Result<String, WebhookError> {
    HandshakeQuery::from_uri(uri)?.respond(verify_token)
}

/// Every `%` must be followed by two hex digits.
fn has_valid_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}
