//! Gateway state
//!
//! Shared dependencies of every realtime connection.

use std::sync::Arc;
use std::time::Duration;

use blog_bus::Bus;
use blog_common::JwtService;
use blog_service::ServiceContext;

/// Default idle time before a silent connection is dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Default interval between transport-level pings
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest period for the per-connection timers
const MIN_TIMER_PERIOD: Duration = Duration::from_millis(10);

/// Connection tuning
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Close a connection after this long without any client frame
    pub idle_timeout: Duration,
    pub ping_interval: Duration,
    /// Reported to clients in `node_info`
    pub version: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            ping_interval: DEFAULT_PING_INTERVAL,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl GatewaySettings {
    /// How often a connection checks its idle time: a third of the timeout
    pub fn idle_check_period(&self) -> Duration {
        (self.idle_timeout / 3).max(MIN_TIMER_PERIOD)
    }

    pub fn ping_period(&self) -> Duration {
        self.ping_interval.max(MIN_TIMER_PERIOD)
    }
}

/// Gateway application state
#[derive(Clone)]
pub struct GatewayState {
    service_context: Arc<ServiceContext>,
    jwt_service: Arc<JwtService>,
    settings: Arc<GatewaySettings>,
}

impl GatewayState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        jwt_service: Arc<JwtService>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            service_context,
            jwt_service,
            settings: Arc::new(settings),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn bus(&self) -> &Arc<Bus> {
        self.service_context.bus()
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("node_id", self.bus().node_id())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
