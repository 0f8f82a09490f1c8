//! # blog-gateway
//!
//! WebSocket gateway binding client sockets to post rooms and to the comment service.

pub mod connection;
pub mod handlers;
pub mod identity;
pub mod protocol;
pub mod server;

pub use connection::{Connection, ConnectionState};
pub use identity::{resolve_identity, token_from_headers, AUTH_COOKIE};
pub use server::{
    create_router, gateway_handler, GatewaySettings, GatewayState, GATEWAY_PATH,
};
