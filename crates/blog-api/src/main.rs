//! Blog server entry point
//!
//! Serves the comment and vote API and the realtime gateway from one process.
//! Run several with distinct `NODE_ID`s behind a load balancer and
//! `FANOUT_TRANSPORT=redis` to form a cluster.
//!
//! Run with:
//! ```bash
//! cargo run -p blog-api --bin blog-server
//! ```

use blog_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration first so the log format follows APP_ENV
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        node_id = %config.app.node_id,
        port = config.server.port,
        transport = ?config.fanout.transport,
        "Configuration loaded"
    );

    if let Err(e) = blog_api::run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
