//! Object Handler Registry
//!
//! Maps `(callback pattern, object)` to the callback that handles it.
//! Registration may happen while requests are being served; `DashMap`
//! keeps lookups and writes race-free without a global lock.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use wp_common::{Envelope, Object};

/// Callback invoked with a verified, decoded envelope.
pub type ObjectHandler = Arc<dyn Fn(&Envelope) -> anyhow::Result<()> + Send + Sync>;

/// Flattened registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub pattern: String,
    pub object: Object,
}

impl RouteKey {
    /// Build a key. `object` is normalized so `Object::Other("page")` and
    /// `Object::Page` address the same handler.
    pub fn new(pattern: impl Into<String>, object: Object) -> Self {
        Self {
            pattern: pattern.into(),
            object: object.normalized(),
        }
    }
}

/// Handlers keyed by pattern and object. Last registration for a key wins.
pub struct HandlerRegistry {
    default_pattern: String,
    handlers: DashMap<RouteKey, ObjectHandler>,
}

impl HandlerRegistry {
    /// Create an empty registry. `default_pattern` is the callback path used
    /// by [`register`](Self::register) and [`lookup`](Self::lookup).
    pub fn new(default_pattern: impl Into<String>) -> Self {
        Self {
            default_pattern: default_pattern.into(),
            handlers: DashMap::new(),
        }
    }

    /// Pattern used for object-only registration.
    pub fn default_pattern(&self) -> &str {
        &self.default_pattern
    }

    /// Register a handler for `object` on the default pattern, replacing any
    /// previous one.
    pub fn register<F>(&self, object: Object, handler: F)
    where
        F: Fn(&Envelope) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.insert(RouteKey::new(self.default_pattern.clone(), object), Arc::new(handler));
    }

    /// Register a handler for `object` on a specific callback pattern,
    /// replacing any previous one.
    pub fn register_at<F>(&self, pattern: impl Into<String>, object: Object, handler: F)
    where
        F: Fn(&Envelope) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.insert(RouteKey::new(pattern, object), Arc::new(handler));
    }

    fn insert(&self, key: RouteKey, handler: ObjectHandler) {
        if self.handlers.insert(key.clone(), handler).is_some() {
            tracing::debug!(pattern = %key.pattern, object = %key.object, "Replaced object handler");
        } else {
            tracing::debug!(pattern = %key.pattern, object = %key.object, "Registered object handler");
        }
    }

    /// Handler for `object` on the default pattern.
    pub fn lookup(&self, object: &Object) -> Option<ObjectHandler> {
        self.lookup_at(&self.default_pattern, object)
    }

    /// Handler for `object` on `pattern`.
    pub fn lookup_at(&self, pattern: &str, object: &Object) -> Option<ObjectHandler> {
        self.handlers
            .get(&RouteKey::new(pattern, object.clone()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Whether any handler is registered under `pattern`.
    pub fn has_pattern(&self, pattern: &str) -> bool {
        self.handlers.iter().any(|entry| entry.key().pattern == pattern)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("default_pattern", &self.default_pattern)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
