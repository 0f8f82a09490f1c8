//! Integration test utilities for the blog backend
//!
//! Starts in-process server nodes joined by one in-process fan-out hub and
//! drives them over real sockets with HTTP and WebSocket clients.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
