//! Webhook payload types.

pub mod envelope;
pub mod object;

pub use envelope::*;
pub use object::*;
