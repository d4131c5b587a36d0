//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum Router with the forwarding handler
//! - Wire up middleware (tracing pipeline, timeout, request logging)
//! - Forward admitted requests to the upstream service
//! - Serve until the shutdown future resolves

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::TracerConfig;
use crate::http::middleware::{tracer_middleware, TracerState};
use crate::remote::RemoteError;

/// State of the forwarding handler.
#[derive(Clone)]
pub struct ProxyState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: String,
}

/// The gateway: tracing pipeline in front of one upstream service.
pub struct HttpServer {
    router: Router,
    config: TracerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: TracerConfig) -> Result<Self, RemoteError> {
        let tracer = TracerState::new(&config.remote, &config.cache)?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let proxy = ProxyState {
            client,
            upstream: config.upstream.address.clone(),
        };

        let router = Self::build_router(&config, proxy, tracer);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &TracerConfig, proxy: ProxyState, tracer: TracerState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(proxy)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn_with_state(tracer, tracer_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }
}

/// Forward the request to the upstream service unchanged.
async fn proxy_handler(State(state): State<ProxyState>, request: Request) -> Response {
    let (mut parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let target = format!("http://{}{}", state.upstream, path_and_query);
    parts.uri = match Uri::try_from(target.as_str()) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(target = %target, error = %e, "Invalid upstream URI");
            return (StatusCode::BAD_GATEWAY, "Invalid upstream URI").into_response();
        }
    };

    tracing::debug!(method = %parts.method, target = %target, "Forwarding request");

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %state.upstream, error = %e, "Upstream request failed");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
