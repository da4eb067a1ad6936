//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Default callback path in single-path mode.
pub const DEFAULT_CALLBACK_PATH: &str = "/";

/// Default maximum accepted request body (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Shared HMAC secret used to verify `X-Hub-Signature`.
///
/// Wiped from memory on drop. `Debug` never prints the value.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wrap raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the key material for HMAC computation.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// How callback requests are routed to handler sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingMode {
    /// One fixed callback path; handlers are keyed by object only.
    Single {
        /// Path receiving both the handshake GET and event POSTs.
        path: String,
    },
    /// Any path with registered handlers is a callback path; handlers are
    /// keyed by `(path, object)`.
    MultiPattern,
}

impl Default for RoutingMode {
    fn default() -> Self {
        Self::Single {
            path: DEFAULT_CALLBACK_PATH.into(),
        }
    }
}

impl RoutingMode {
    /// Parse a mode name (`"single"` or `"multi"`) with the path used in single mode.
    pub fn parse(mode: &str, path: impl Into<String>) -> Result<Self> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single { path: path.into() }),
            "multi" | "multi-pattern" | "multi_pattern" => Ok(Self::MultiPattern),
            other => bail!("Unknown WEBHOOK_ROUTING mode: {other} (expected \"single\" or \"multi\")"),
        }
    }

    /// Pattern used by object-only registration.
    pub fn default_pattern(&self) -> &str {
        match self {
            Self::Single { path } => path,
            Self::MultiPattern => DEFAULT_CALLBACK_PATH,
        }
    }
}

/// Check that `path` is a literal route path.
///
/// Router syntax (`{param}`, `*wildcard`, `:param`) would turn the callback
/// into a capture or fail at router build, so it is rejected here.
pub fn validate_callback_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        bail!("WEBHOOK_CALLBACK_PATH must start with '/' (got {path:?})");
    }
    if path.contains(['{', '}']) {
        bail!("WEBHOOK_CALLBACK_PATH must not contain '{{' or '}}' (got {path:?})");
    }
    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        bail!("WEBHOOK_CALLBACK_PATH segments must not start with ':' or '*' (got {path:?})");
    }
    Ok(())
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// HMAC-SHA1 key for `X-Hub-Signature`
    pub secret: Secret,

    /// Graph API access token, held for handlers (not used by dispatch)
    pub access_token: String,

    /// Token expected in `hub.verify_token` during the subscription handshake
    pub verify_token: String,

    /// Callback routing shape
    pub routing: RoutingMode,

    /// Maximum request body size in bytes (default: 1MB)
    pub max_body_size: usize,
}

impl Config {
    /// Build a configuration from the three platform credentials, using
    /// defaults for everything else.
    pub fn new(
        secret: impl Into<Vec<u8>>,
        access_token: impl Into<String>,
        verify_token: impl Into<String>,
    ) -> Self {
        Self {
            bind_address: "0.0.0.0:8080".into(),
            secret: Secret::new(secret),
            access_token: access_token.into(),
            verify_token: verify_token.into(),
            routing: RoutingMode::default(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let callback_path =
            env::var("WEBHOOK_CALLBACK_PATH").unwrap_or_else(|_| DEFAULT_CALLBACK_PATH.into());
        validate_callback_path(&callback_path)?;
        let routing = match env::var("WEBHOOK_ROUTING") {
            Ok(mode) => RoutingMode::parse(&mode, callback_path)?,
            Err(_) => RoutingMode::Single {
                path: callback_path,
            },
        };

        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            secret: Secret::new(env::var("WEBHOOK_SECRET").context("WEBHOOK_SECRET must be set")?),
            access_token: env::var("WEBHOOK_ACCESS_TOKEN").unwrap_or_default(),
            verify_token: env::var("WEBHOOK_VERIFY_TOKEN")
                .context("WEBHOOK_VERIFY_TOKEN must be set")?,
            routing,
            max_body_size: env::var("WEBHOOK_MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),
        })
    }

    /// Set the routing mode.
    #[must_use]
    pub fn with_routing(mut self, routing: RoutingMode) -> Self {
        self.routing = routing;
        self
    }

    /// Set the maximum accepted body size.
    #[must_use]
    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".into(),
            secret: Secret::new("test-app-secret"),
            access_token: "test-access-token".into(),
            verify_token: "test-verify-token".into(),
            routing: RoutingMode::default(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}
