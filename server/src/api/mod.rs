//! API Router and Application State
//!
//! Central routing configuration, shared state, and the [`WebhookServer`]
//! entry point used by applications embedding the receiver.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get, MethodRouter},
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use wp_common::{Envelope, Object};

use crate::config::{Config, RoutingMode};
use crate::webhooks::{Dispatcher, HandlerRegistry};

/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Shared application state.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Callback dispatcher (owns config and handler registry)
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: Arc<Config>, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            dispatcher: Dispatcher::new(config, registry),
        }
    }

    pub fn config(&self) -> &Config {
        self.dispatcher.config()
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let routing = state.config().routing.clone();

    let router = match routing {
        RoutingMode::Single { ref path } => {
            let router = Router::new().route(path, any(single_callback));
            if path == HEALTH_PATH {
                router
            } else {
                router.route(HEALTH_PATH, get(health_check))
            }
        }
        RoutingMode::MultiPattern => Router::new()
            .route(HEALTH_PATH, get(health_check))
            .fallback(pattern_callback),
    };

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Callback endpoint in single-path mode.
async fn single_callback(State(state): State<AppState>, request: Request) -> Response {
    let dispatcher = &state.dispatcher;
    dispatcher
        .handle(dispatcher.registry().default_pattern(), request)
        .await
}

/// Callback endpoint in multi-pattern mode: the request path selects the
/// handler set. Paths without any handler are not callback endpoints.
async fn pattern_callback(State(state): State<AppState>, request: Request) -> Response {
    let pattern = request.uri().path().to_owned();
    if !state.dispatcher.registry().has_pattern(&pattern) {
        return StatusCode::NOT_FOUND.into_response();
    }
    state.dispatcher.handle(&pattern, request).await
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Number of registered object handlers
    handlers: usize,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        handlers: state.dispatcher.registry().len(),
    })
}

/// Webhook receiver holding one secret/token set and its handler registry.
///
/// # Example
///
/// ```no_run
/// use wp_webhook::{Config, Object, WebhookServer};
///
/// # async fn run() -> anyhow::Result<()> {
/// let server = WebhookServer::new(Config::new("app-secret", "access-token", "verify-token"));
/// server.handle_object(Object::Group, |envelope| {
///     println!("{} group entries", envelope.entries().count());
///     Ok(())
/// });
/// server.serve("0.0.0.0:8080").await
/// # }
/// ```
pub struct WebhookServer {
    config: Arc<Config>,
    registry: Arc<HandlerRegistry>,
    extra_routes: Router,
}

impl WebhookServer {
    /// Create a server from its configuration. No handlers are registered.
    pub fn new(config: Config) -> Self {
        let registry = HandlerRegistry::new(config.routing.default_pattern());
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            extra_routes: Router::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Graph API access token, for handlers that call back into the platform.
    pub fn access_token(&self) -> &str {
        &self.config.access_token
    }

    /// Shared handler registry. Handlers may be registered through it while
    /// the server is running.
    pub fn registry(&self) -> Arc<HandlerRegistry> {
        Arc::clone(&self.registry)
    }

    /// Register the handler for `object`, replacing any previous one.
    pub fn handle_object<F>(&self, object: Object, handler: F)
    where
        F: Fn(&Envelope) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.registry.register(object, handler);
    }

    /// Register the handler for `object` on a callback pattern (multi-pattern mode).
    pub fn handle_object_at<F>(&self, pattern: impl Into<String>, object: Object, handler: F)
    where
        F: Fn(&Envelope) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.registry.register_at(pattern, object, handler);
    }

    /// Mount a plain endpoint next to the webhook callback.
    ///
    /// The path must not collide with the callback path or `/health`.
    #[must_use]
    pub fn route(mut self, path: &str, method_router: MethodRouter) -> Self {
        self.extra_routes = self.extra_routes.route(path, method_router);
        self
    }

    /// Build the full router.
    pub fn router(&self) -> Router {
        let state = AppState::new(Arc::clone(&self.config), Arc::clone(&self.registry));
        create_router(state).merge(self.extra_routes.clone())
    }

    /// Bind `addr` and serve until Ctrl-C.
    pub async fn serve(&self, addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_with_shutdown(listener, ctrl_c()).await
    }

    /// Serve on an existing listener until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(&self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(address = %listener.local_addr()?, "Webhook server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Webhook server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal, cleaning up..."),
        Err(e) => {
            warn!(error = %e, "Failed to install CTRL+C handler; graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}
