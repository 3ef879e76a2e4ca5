//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, CORS, security headers)
//! - Mount the local API
//! - Dispatch everything else to the route table
//! - Bind server to listener with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::api;
use crate::config::validation::segments_overlap;
use crate::config::{ConfigError, GatewayConfig, Secrets};
use crate::http::forward::Forwarder;
use crate::http::proxy::{not_found_handler, proxy_handler, root_handler};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::panic_response;
use crate::routing::RouteTable;
use crate::security::headers::security_headers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub forwarder: Arc<Forwarder>,
}

/// Wire the configuration and route table into a request-handling router.
///
/// Fails if a route prefix overlaps the local API mount.
pub fn build_app(config: &GatewayConfig, routes: RouteTable) -> Result<Router, ConfigError> {
    let mount = config.local_api.prefix.as_str();
    if let Some(entry) = routes
        .entries()
        .iter()
        .find(|entry| segments_overlap(entry.prefix(), mount))
    {
        return Err(ConfigError::Route {
            prefix: entry.prefix().to_string(),
            reason: format!("overlaps the local API mounted at `{}`", mount),
        });
    }

    let state = AppState {
        routes: Arc::new(routes),
        forwarder: Arc::new(Forwarder::new(&config.upstream)?),
    };

    let mut app = Router::new()
        .route("/", get(root_handler).fallback(not_found_handler))
        .nest(&config.local_api.prefix, api::router())
        .fallback(proxy_handler)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
        .layer(CatchPanicLayer::custom(panic_response));

    if config.security.enable_headers {
        app = app.layer(middleware::map_response(security_headers));
    }
    if config.security.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    Ok(app
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer()))
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Build the route table from `config` and `secrets`, then the server.
    pub fn new(config: GatewayConfig, secrets: &Secrets) -> Result<Self, ConfigError> {
        let routes = RouteTable::from_config(&config, secrets)?;
        Self::with_routes(config, routes)
    }

    /// Build the server around an already constructed route table.
    pub fn with_routes(config: GatewayConfig, routes: RouteTable) -> Result<Self, ConfigError> {
        let router = build_app(&config, routes)?;
        Ok(Self { router, config })
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = %self.config.environment,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The wired router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;
    use crate::routing::RouteEntry;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = GatewayConfig {
            routes: vec![RouteConfig::new("/echo", "https://example.test/echo")],
            ..GatewayConfig::default()
        };
        let routes = RouteTable::from_config(&config, &Secrets::new()).unwrap();
        build_app(&config, routes).unwrap()
    }

    async fn send(method: &str, uri: &str) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("user-agent", "unit-test")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn root_returns_location() {
        let (status, headers, body) = send("GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"message": "API location: api/v1"}));
        assert!(headers.contains_key("x-request-id"));
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    }

    #[tokio::test]
    async fn root_with_other_method_is_not_found() {
        let (status, _, body) = send("POST", "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (status, _, body) = send("GET", "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found");
        assert_eq!(body["error"]["message"], "Not Found - /nope");
    }

    #[tokio::test]
    async fn local_api_is_mounted() {
        let (status, _, body) = send("GET", "/api/v1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "API - 👋🌎🌍🌏");

        let (status, _, _) = send("GET", "/api/v1/emojis").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn rejects_routes_under_local_api() {
        let config = GatewayConfig {
            routes: Vec::new(),
            ..GatewayConfig::default()
        };
        for prefix in ["/api/v1", "/api/v1/x", "/api"] {
            let routes = RouteTable::new(vec![
                RouteEntry::new(prefix, "https://example.test").unwrap(),
            ])
            .unwrap();
            match HttpServer::with_routes(config.clone(), routes) {
                Err(ConfigError::Route { prefix: p, .. }) => assert_eq!(p, prefix),
                Err(other) => panic!("unexpected error: {}", other),
                Ok(_) => panic!("route `{}` should be rejected", prefix),
            }
        }

        let routes = RouteTable::new(vec![
            RouteEntry::new("/api1", "https://example.test").unwrap(),
        ])
        .unwrap();
        assert!(HttpServer::with_routes(config, routes).is_ok());
    }

    #[tokio::test]
    async fn client_request_id_is_echoed() {
        let request = Request::builder()
            .uri("/")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");
    }
}
