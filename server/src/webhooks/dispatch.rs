//! Webhook Callback Dispatch
//!
//! Per-request flow for the callback path:
//! GET answers the subscription handshake; POST reads the body, checks
//! `X-Hub-Signature`, decodes the envelope and runs the handler registered
//! for its object. Every failure ends the request with a bare status code.

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::Request,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};
use wp_common::Envelope;

use super::error::{Outcome, WebhookError};
use super::registry::HandlerRegistry;
use super::{handshake, signing};
use crate::config::Config;

/// Routes callback requests through verification to registered handlers.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    config: Arc<Config>,
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(config: Arc<Config>, registry: Arc<HandlerRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Handle one request addressed to the callback `pattern`.
    #[instrument(skip(self, request), fields(method = %request.method()))]
    pub async fn handle(&self, pattern: &str, request: Request) -> Response {
        let result = match *request.method() {
            Method::GET => handshake::answer(request.uri(), &self.config.verify_token)
                .map(|challenge| (StatusCode::OK, challenge).into_response()),
            Method::POST => self
                .receive_event(pattern, request)
                .await
                .map(IntoResponse::into_response),
            _ => Err(WebhookError::UnsupportedMethod),
        };

        result.unwrap_or_else(|err| {
            debug!(kind = err.kind(), status = %err.outcome().status(), "Webhook request rejected");
            err.into_response()
        })
    }

    /// Read, verify, decode and dispatch an event POST.
    pub async fn receive_event(
        &self,
        pattern: &str,
        request: Request,
    ) -> Result<Outcome, WebhookError> {
        let (parts, body) = request.into_parts();

        let raw = to_bytes(body, self.config.max_body_size)
            .await
            .map_err(|_| WebhookError::TransportRead)?;

        let signature = parts
            .headers
            .get(signing::SIGNATURE_HEADER)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default();
        signing::verify_signature(&signature, self.config.secret.expose(), &raw)?;

        let envelope = Envelope::from_slice(&raw)?;
        self.dispatch(pattern, envelope).await
    }

    /// Run the handler registered for the envelope's object, if any.
    ///
    /// An unregistered object is accepted without doing anything. The handler
    /// runs on the blocking pool and the outcome is known only after it returns.
    pub async fn dispatch(&self, pattern: &str, envelope: Envelope) -> Result<Outcome, WebhookError> {
        let object = envelope.object.clone();
        let Some(handler) = self.registry.lookup_at(pattern, &object) else {
            debug!(%object, pattern, "No handler registered, accepting");
            return Ok(Outcome::Accepted);
        };

        match tokio::task::spawn_blocking(move || handler(&envelope)).await {
            Ok(Ok(())) => {
                debug!(%object, pattern, "Webhook event handled");
                Ok(Outcome::Accepted)
            }
            Ok(Err(e)) => Err(WebhookError::Handler(e)),
            Err(e) => Err(WebhookError::Handler(anyhow::anyhow!("handler task failed: {e}"))),
        }
    }
}
