//! Application state
//!
//! Holds the shared state for the Axum application including
//! the service context and configuration.

use std::sync::Arc;

use blog_bus::Bus;
use blog_common::{AppConfig, JwtService};
use blog_db::PgStore;
use blog_gateway::{GatewaySettings, GatewayState};
use blog_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    jwt_service: Arc<JwtService>,
    /// Backing store for readiness probes; `None` when running on in-process storage
    store: Option<PgStore>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, store: Option<PgStore>, config: AppConfig) -> Self {
        let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.token_expiry);
        Self {
            service_context: Arc::new(service_context),
            jwt_service: Arc::new(jwt_service),
            store,
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn bus(&self) -> &Arc<Bus> {
        self.service_context.bus()
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn store(&self) -> Option<&PgStore> {
        self.store.as_ref()
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// State for the realtime gateway, sharing this state's services
    pub fn gateway_state(&self) -> GatewayState {
        GatewayState::new(
            Arc::clone(&self.service_context),
            Arc::clone(&self.jwt_service),
            GatewaySettings::default(),
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("store", &self.store)
            .field("config", &"AppConfig")
            .finish()
    }
}
