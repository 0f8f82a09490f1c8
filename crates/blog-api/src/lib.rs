//! # blog-api
//!
//! HTTP API built with Axum, serving the comment and vote endpoints next to the
//! realtime gateway.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{build_app_state, create_app, run, run_server};
pub use state::AppState;
