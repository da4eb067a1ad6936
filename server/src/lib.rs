//! Workplace Webhook Server
//!
//! Receives Workplace webhook callbacks: answers the subscription handshake,
//! verifies `X-Hub-Signature` and dispatches each event to the handler
//! registered for its `object`.

pub mod api;
pub mod config;
pub mod webhooks;

pub use api::{create_router, AppState, WebhookServer};
pub use config::{Config, RoutingMode, Secret};
pub use webhooks::{Outcome, WebhookError};
pub use wp_common::{Change, Entry, Envelope, Object};
