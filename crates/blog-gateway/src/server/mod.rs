//! Gateway server setup
//!
//! Provides the realtime route and its router.

mod handler;
mod state;

pub use handler::{gateway_handler, ConnectQuery};
pub use state::{GatewaySettings, GatewayState, DEFAULT_IDLE_TIMEOUT, DEFAULT_PING_INTERVAL};

use axum::routing::get;
use axum::Router;

/// Path of the realtime endpoint
pub const GATEWAY_PATH: &str = "/ws";

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new().route(GATEWAY_PATH, get(gateway_handler))
}
