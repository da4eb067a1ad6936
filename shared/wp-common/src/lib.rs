//! Workplace Webhook Common Library
//!
//! Envelope types shared by the callback server and by handler crates,
//! plus the decoder that turns a raw request body into an [`Envelope`].

pub mod error;
pub mod types;

pub use error::{DecodeError, Result};
pub use types::*;
