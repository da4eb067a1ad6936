//! Webhook Callback Receiver
//!
//! Subscription handshake, `X-Hub-Signature` verification and dispatch of
//! decoded envelopes to handlers registered per object.

pub mod dispatch;
pub mod error;
pub mod handshake;
pub mod registry;
pub mod signing;

pub use dispatch::Dispatcher;
pub use error::{Outcome, VerificationError, WebhookError};
pub use registry::{HandlerRegistry, ObjectHandler, RouteKey};
pub use signing::{sign_payload, verify_signature, SIGNATURE_HEADER};
