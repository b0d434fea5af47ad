//! State management module
//! Handles application state, service wiring and apiConfig.json persistence

pub mod api_config;
pub mod app_state;

pub use api_config::{ApiConfigStore, ConfigStoreError, ServiceOverrides};
pub use app_state::{AppState, Services};

/// State shared by every handler
pub type SharedState = std::sync::Arc<tokio::sync::RwLock<AppState>>;
