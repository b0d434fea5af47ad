//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. Variables from a `.env` file are applied first by
//! [`crate::env_file::load_env_file`], so everything here reads the process
//! environment only.

use std::env;
use std::path::PathBuf;

/// Default prefix applied to every file by the rename pass
pub const DEFAULT_FILE_PREFIX: &str = "[CLIENTE] ";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Location of `apiConfig.json`
    pub storage: StorageConfig,
    /// Google Drive, Sheets and Firestore access
    pub google: GoogleConfig,
    /// Zoho Sign access
    pub zoho: ZohoConfig,
    /// Outgoing mail
    pub smtp: SmtpConfig,
    /// Onboarding workflow settings
    pub workflow: WorkflowConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path of the JSON settings file rewritten by `POST /api/config/save`
    pub api_config_path: PathBuf,
}

/// OAuth credentials shared by the token providers
#[derive(Clone, Default)]
pub struct OAuthCredentials {
    /// Pre-issued access token; skips the refresh grant when set
    pub access_token: Option<String>,
    /// OAuth client id
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<String>,
    /// Long-lived refresh token
    pub refresh_token: Option<String>,
    /// Token endpoint for the refresh grant
    pub token_url: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// Google APIs configuration
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth credentials for Drive, Sheets and Firestore
    pub credentials: OAuthCredentials,
    /// Firestore project id (None = in-memory client store)
    pub firestore_project_id: Option<String>,
    /// Firestore REST base URL
    pub firestore_base_url: String,
    /// Drive REST base URL
    pub drive_base_url: String,
    /// Sheets REST base URL
    pub sheets_base_url: String,
    /// Parent folder for client folders
    pub drive_parent_folder_id: Option<String>,
    /// Default spreadsheet for the Drive to Sheet sync
    pub sheet_id: Option<String>,
    /// Default A1 range for the Drive to Sheet sync
    pub sheet_range: String,
}

/// Zoho Sign configuration
#[derive(Debug, Clone)]
pub struct ZohoConfig {
    /// OAuth credentials for Zoho Sign
    pub credentials: OAuthCredentials,
    /// Zoho Sign REST base URL
    pub base_url: String,
    /// Template used for engagement letters
    pub template_id: Option<String>,
    /// Action id of the template's signer slot
    pub template_action_id: Option<String>,
}

/// SMTP configuration
#[derive(Clone)]
pub struct SmtpConfig {
    /// Relay host (None = mail disabled)
    pub host: Option<String>,
    /// Relay port
    pub port: u16,
    /// Login user
    pub username: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Sender address
    pub from: Option<String>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .finish()
    }
}

/// Onboarding workflow configuration
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Marker prefixed to file names by the rename pass
    pub file_prefix: String,
    /// Timeout applied to every outbound HTTP request (in seconds)
    pub upstream_timeout_secs: u64,
}

/// Read a variable, treating empty values as unset
fn var_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    var_opt(key).unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(3001),
                host: var_or("HOST", "0.0.0.0"),
            },
            storage: StorageConfig {
                api_config_path: PathBuf::from(var_or("API_CONFIG_PATH", "apiConfig.json")),
            },
            google: GoogleConfig {
                credentials: OAuthCredentials {
                    access_token: var_opt("GOOGLE_ACCESS_TOKEN"),
                    client_id: var_opt("GOOGLE_CLIENT_ID"),
                    client_secret: var_opt("GOOGLE_CLIENT_SECRET"),
                    refresh_token: var_opt("GOOGLE_REFRESH_TOKEN"),
                    token_url: var_or("GOOGLE_TOKEN_URL", "https://oauth2.googleapis.com/token"),
                },
                firestore_project_id: var_opt("FIRESTORE_PROJECT_ID"),
                firestore_base_url: var_or(
                    "FIRESTORE_BASE_URL",
                    "https://firestore.googleapis.com",
                ),
                drive_base_url: var_or("DRIVE_BASE_URL", "https://www.googleapis.com"),
                sheets_base_url: var_or("SHEETS_BASE_URL", "https://sheets.googleapis.com"),
                drive_parent_folder_id: var_opt("DRIVE_PARENT_FOLDER_ID"),
                sheet_id: var_opt("SHEET_ID"),
                sheet_range: var_or("SHEET_RANGE", "Sheet1!A1"),
            },
            zoho: ZohoConfig {
                credentials: OAuthCredentials {
                    access_token: var_opt("ZOHO_ACCESS_TOKEN"),
                    client_id: var_opt("ZOHO_CLIENT_ID"),
                    client_secret: var_opt("ZOHO_CLIENT_SECRET"),
                    refresh_token: var_opt("ZOHO_REFRESH_TOKEN"),
                    token_url: var_or("ZOHO_TOKEN_URL", "https://accounts.zoho.com/oauth/v2/token"),
                },
                base_url: var_or("ZOHO_SIGN_BASE_URL", "https://sign.zoho.com"),
                template_id: var_opt("ZOHO_TEMPLATE_ID"),
                template_action_id: var_opt("ZOHO_TEMPLATE_ACTION_ID"),
            },
            smtp: SmtpConfig {
                host: var_opt("SMTP_HOST"),
                port: env::var("SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587),
                username: var_opt("SMTP_USER"),
                password: var_opt("SMTP_PASS"),
                from: var_opt("SMTP_FROM"),
            },
            workflow: WorkflowConfig {
                file_prefix: env::var("FILE_PREFIX")
                    .ok()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| DEFAULT_FILE_PREFIX.to_string()),
                upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(30),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
