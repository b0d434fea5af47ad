//! Application state management
//! Holds config, the service adapters and the current apiConfig.json document

use crate::config::{Config, OAuthCredentials};
use crate::services::{
    ClientRecords, DriveClient, FileHosting, FirestoreClient, MailSender, MemoryClientStore,
    SheetWriter, SheetsClient, SignatureProvider, SmtpMailer, TokenProvider, ZohoSignClient,
};
use crate::state::api_config::{ApiConfigStore, ServiceOverrides};
use crate::workflow::{OnboardingSettings, OnboardingWorkflow};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Adapters used by the handlers and the onboarding workflow
#[derive(Clone)]
pub struct Services {
    /// Client document store
    pub records: Arc<dyn ClientRecords>,
    /// Drive
    pub files: Arc<dyn FileHosting>,
    /// Zoho Sign
    pub signatures: Arc<dyn SignatureProvider>,
    /// Sheets
    pub sheets: Arc<dyn SheetWriter>,
    /// SMTP, `None` when no relay is configured
    pub mailer: Option<Arc<dyn MailSender>>,
}

impl Services {
    /// Build the production adapters from config
    ///
    /// All adapters share one `reqwest::Client` carrying the upstream timeout.
    /// Without a Firestore project the client store falls back to memory.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.workflow.upstream_timeout_secs))
            .build()?;

        let google_tokens = token_provider("google", &http, &config.google.credentials);
        let zoho_tokens = token_provider("zoho", &http, &config.zoho.credentials);

        let records: Arc<dyn ClientRecords> = match &config.google.firestore_project_id {
            Some(project_id) => Arc::new(FirestoreClient::new(
                http.clone(),
                google_tokens.clone(),
                &config.google.firestore_base_url,
                project_id.clone(),
            )?),
            None => {
                tracing::warn!(
                    "FIRESTORE_PROJECT_ID not set; client records are kept in memory only"
                );
                Arc::new(MemoryClientStore::new())
            }
        };

        let files = Arc::new(DriveClient::new(
            http.clone(),
            google_tokens.clone(),
            &config.google.drive_base_url,
        )?);
        let sheets = Arc::new(SheetsClient::new(
            http.clone(),
            google_tokens,
            &config.google.sheets_base_url,
        )?);
        let signatures = Arc::new(ZohoSignClient::new(
            http,
            zoho_tokens,
            &config.zoho.base_url,
            config.zoho.template_id.clone(),
            config.zoho.template_action_id.clone(),
        )?);

        let mailer = SmtpMailer::from_config(&config.smtp)?
            .map(|mailer| Arc::new(mailer) as Arc<dyn MailSender>);
        if mailer.is_none() {
            tracing::warn!("SMTP_HOST not set; /api/email/send is disabled");
        }

        Ok(Self {
            records,
            files,
            signatures,
            sheets,
            mailer,
        })
    }
}

fn token_provider(
    service: &'static str,
    http: &reqwest::Client,
    credentials: &OAuthCredentials,
) -> Arc<TokenProvider> {
    let provider = TokenProvider::new(service, http.clone(), credentials.clone());
    if !provider.is_configured() {
        tracing::warn!(service, "No OAuth credentials configured; calls will fail");
    }
    Arc::new(provider)
}

/// Main application state
pub struct AppState {
    /// Environment configuration
    pub config: Config,
    /// Service adapters
    pub services: Services,
    /// Backing store for `apiConfig.json`
    pub config_store: ApiConfigStore,
    /// Last loaded or saved `apiConfig.json` document
    pub api_config: Value,
    /// Overrides parsed from `api_config`
    pub overrides: ServiceOverrides,
}

impl AppState {
    /// Create state over the given adapters and load `apiConfig.json`
    ///
    /// An unreadable config file is logged and treated as empty.
    pub fn new(config: Config, services: Services) -> Self {
        let config_store = ApiConfigStore::new(config.storage.api_config_path.clone());
        let api_config = match config_store.load() {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(
                    path = %config_store.path().display(),
                    error = %e,
                    "Failed to load apiConfig.json; starting with an empty document"
                );
                Value::Object(Default::default())
            }
        };

        let mut state = Self {
            config,
            services,
            config_store,
            api_config: Value::Null,
            overrides: ServiceOverrides::default(),
        };
        state.set_api_config(api_config);
        state
    }

    /// Create state with the production adapters
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let services = Services::from_config(&config)?;
        Ok(Self::new(config, services))
    }

    /// Replace the in-memory config document and its overrides
    pub fn set_api_config(&mut self, document: Value) {
        self.overrides = ServiceOverrides::from_document(&document);
        self.api_config = document;
    }

    /// Parent folder for client folders (apiConfig.json wins over env)
    pub fn parent_folder_id(&self) -> Option<String> {
        self.overrides
            .drive_parent_folder_id
            .clone()
            .or_else(|| self.config.google.drive_parent_folder_id.clone())
    }

    /// Rename marker (apiConfig.json wins over env)
    pub fn file_prefix(&self) -> String {
        self.overrides
            .file_prefix
            .clone()
            .unwrap_or_else(|| self.config.workflow.file_prefix.clone())
    }

    /// Default spreadsheet and range for the Drive to Sheet sync
    pub fn sheet_target(&self) -> (Option<String>, String) {
        let sheet_id = self
            .overrides
            .sheet_id
            .clone()
            .or_else(|| self.config.google.sheet_id.clone());
        let range = self
            .overrides
            .sheet_range
            .clone()
            .unwrap_or_else(|| self.config.google.sheet_range.clone());
        (sheet_id, range)
    }

    /// Workflow over the current adapters and settings
    pub fn onboarding_workflow(&self) -> OnboardingWorkflow {
        OnboardingWorkflow::new(
            self.services.records.clone(),
            self.services.files.clone(),
            self.services.signatures.clone(),
            OnboardingSettings {
                parent_folder_id: self.parent_folder_id(),
                file_prefix: self.file_prefix(),
            },
        )
    }
}
