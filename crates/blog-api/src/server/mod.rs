//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use blog_bus::{Bus, NodeId};
use blog_common::{AppConfig, AppError};
use blog_core::DomainError;
use blog_db::{PgCommentRepository, PgPostRepository, PgStore, PgVoteRepository};
use blog_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application: API, health probes and the realtime gateway
///
/// # Errors
/// Returns a configuration error if the middleware settings are unusable
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;

    let gateway = blog_gateway::create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state.gateway_state());

    Ok(api
        .merge(health_routes())
        .merge(gateway)
        .with_state(state))
}

/// Connect to the store, start the bus and create AppState
///
/// # Errors
/// Returns an error if no replica is reachable or the schema cannot be applied
pub async fn build_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!(replicas = config.database.urls.len(), "Connecting to the database...");
    let store = PgStore::connect(&config.database)
        .await
        .map_err(|e| AppError::from(DomainError::from(e)))?;
    info!(replica = %store.active_replica(), "Database connection established");

    if config.database.run_migrations {
        store
            .migrate()
            .await
            .map_err(|e| AppError::from(DomainError::from(e)))?;
        info!("Schema is up to date");
    }

    let bus = Bus::from_config(NodeId::new(config.app.node_id.as_str()), &config.fanout).await;
    info!(
        node_id = %bus.node_id(),
        transport = bus.transport(),
        degraded = bus.is_degraded(),
        "Broadcast bus ready"
    );

    let service_context = ServiceContextBuilder::new()
        .post_repo(Arc::new(PgPostRepository::new(store.clone())))
        .comment_repo(Arc::new(PgCommentRepository::new(store.clone())))
        .vote_repo(Arc::new(PgVoteRepository::new(store.clone())))
        .bus(bus)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, Some(store), config))
}

/// Run the HTTP server until ctrl-c or SIGTERM
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    let local: SocketAddr = listener
        .local_addr()
        .map_err(|e| AppError::Config(format!("Failed to read bound address: {e}")))?;
    info!("Server listening on http://{local} (realtime on ws://{local}/ws)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
///
/// # Errors
/// Returns an error if startup fails or the server stops abnormally
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.server.address();

    let state = build_app_state(config).await?;
    let bus = Arc::clone(state.bus());
    let bus_tasks = bus.start();

    let result = match create_app(state) {
        Ok(app) => run_server(app, &addr).await,
        Err(e) => Err(e),
    };

    // Other nodes forget this node's members right away
    bus.stop().await;
    for task in bus_tasks {
        task.abort();
    }
    info!("Server stopped");

    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use blog_bus::LocalFanOut;
    use blog_core::entities::Post;
    use blog_db::MemoryStore;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> Router {
        let store = MemoryStore::default();
        store.insert_post(Post::new("hello-world", "Hello", "First post"));
        let store = Arc::new(store);

        let bus = Bus::new(
            NodeId::new("node-test"),
            Arc::new(LocalFanOut::new()),
            Duration::from_secs(30),
        );
        let ctx = ServiceContextBuilder::new()
            .post_repo(store.clone())
            .comment_repo(store.clone())
            .vote_repo(store)
            .bus(bus)
            .build()
            .unwrap();

        let config = AppConfig::from_lookup(|key| match key {
            "PORT" => Some("0".to_string()),
            "DATABASE_URL" => Some("postgres://unused@localhost/unused".to_string()),
            "JWT_SECRET" => Some("router-test-secret".to_string()),
            _ => None,
        })
        .unwrap();

        create_app(AppState::new(ctx, None, config)).unwrap()
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_route() {
        let (status, body) = get(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
    }

    #[tokio::test]
    async fn test_readiness_without_database() {
        let (status, body) = get(app(), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["database"], true);
    }

    #[tokio::test]
    async fn test_list_comments_route() {
        let (status, body) = get(app(), "/comments?slug=hello-world").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);

        let (status, body) = get(app(), "/comments").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_QUERY_PARAMETER");
    }
}
