//! Client onboarding workflow
//!
//! Provisions a new client across the external services in a fixed order:
//!
//! 1. Merge-upsert the client record
//! 2. Create the client folder under the configured parent
//! 3. Share the folder with the client (the host emails them)
//! 4. Send the engagement letter for signature, referencing the folder link
//! 5. Prefix every file in the folder and build the rename report
//!
//! Each step feeds the next. The first failure aborts the run; side effects of
//! completed steps are left in place and listed in the error.

use crate::services::{
    ClientRecords, FileHosting, ServiceError, SignatureDispatch, SignatureProvider,
};
use crate::workflow::rename::rename_pass;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::Instrument;

/// The three fields collected by the onboarding form
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    /// Client id, also the record key
    #[serde(alias = "id")]
    pub client_id: String,
    /// Client display name
    pub name: String,
    /// Client email, granted access to the folder and asked to sign
    pub email: String,
}

impl OnboardingRequest {
    /// Validate the request before any side effect
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.client_id.trim().is_empty() {
            return Err("Client id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Client name cannot be empty".to_string());
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err("Client email cannot be empty".to_string());
        }
        if !email.contains('@') {
            return Err(format!("Invalid email address: {}", email));
        }
        Ok(())
    }

    /// Folder name, made unique by the client id
    pub fn folder_name(&self) -> String {
        format!("{} ({})", self.name.trim(), self.client_id.trim())
    }

    /// Name of the signature request
    pub fn document_name(&self) -> String {
        format!("Engagement letter - {}", self.name.trim())
    }
}

/// Workflow steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    /// Merge-upsert the client record
    UpsertRecord,
    /// Create the client folder
    CreateFolder,
    /// Share the folder with the client
    GrantPermission,
    /// Send the engagement letter for signature
    SendSignature,
    /// Prefix the folder's files
    RenameFiles,
}

impl OnboardingStep {
    /// All steps in execution order
    pub const ALL: [OnboardingStep; 5] = [
        OnboardingStep::UpsertRecord,
        OnboardingStep::CreateFolder,
        OnboardingStep::GrantPermission,
        OnboardingStep::SendSignature,
        OnboardingStep::RenameFiles,
    ];

    /// 1-based position
    pub fn number(self) -> u32 {
        match self {
            OnboardingStep::UpsertRecord => 1,
            OnboardingStep::CreateFolder => 2,
            OnboardingStep::GrantPermission => 3,
            OnboardingStep::SendSignature => 4,
            OnboardingStep::RenameFiles => 5,
        }
    }

    /// Stable identifier used in progress events
    pub fn id(self) -> &'static str {
        match self {
            OnboardingStep::UpsertRecord => "upsert_record",
            OnboardingStep::CreateFolder => "create_folder",
            OnboardingStep::GrantPermission => "grant_permission",
            OnboardingStep::SendSignature => "send_signature",
            OnboardingStep::RenameFiles => "rename_files",
        }
    }

    fn description(self) -> &'static str {
        match self {
            OnboardingStep::UpsertRecord => "Saving client record",
            OnboardingStep::CreateFolder => "Creating client folder",
            OnboardingStep::GrantPermission => "Sharing folder with client",
            OnboardingStep::SendSignature => "Sending engagement letter for signature",
            OnboardingStep::RenameFiles => "Renaming folder files",
        }
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A failed run
#[derive(Debug, Error)]
#[error("step {step} failed: {source}")]
pub struct OnboardingError {
    /// Step that failed
    pub step: OnboardingStep,
    /// Adapter error
    #[source]
    pub source: ServiceError,
    /// Steps that completed before the failure (not rolled back)
    pub completed: Vec<OnboardingStep>,
}

/// Progress state reported for a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step started
    Running,
    /// Step finished
    Completed,
    /// Step failed; the run is over
    Error,
}

/// Progress event emitted while the workflow runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepEvent {
    /// Step number (1, 2, 3, etc.)
    pub step: u32,
    /// Step identifier
    pub step_id: &'static str,
    /// Human-readable message describing the step
    pub message: String,
    /// Step state
    pub status: StepStatus,
}

/// Aggregate result of a successful run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingOutcome {
    /// Client id
    pub client_id: String,
    /// Created folder id
    pub folder_id: String,
    /// Created folder name
    pub folder_name: String,
    /// Share link sent to the signer
    pub folder_link: String,
    /// Permission granted to the client
    pub permission_id: String,
    /// Zoho request id
    pub signature_request_id: String,
    /// Zoho request status at creation
    pub signature_status: String,
    /// Number of files renamed
    pub renamed_files: usize,
    /// Line-per-file rename report
    pub rename_report: String,
}

/// Settings resolved at run time from config and `apiConfig.json`
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingSettings {
    /// Parent of every client folder
    pub parent_folder_id: Option<String>,
    /// Marker prefixed by the rename pass
    pub file_prefix: String,
}

struct StepTracker<'a> {
    progress: Option<&'a UnboundedSender<StepEvent>>,
    completed: Vec<OnboardingStep>,
}

impl<'a> StepTracker<'a> {
    fn emit(&self, step: OnboardingStep, message: String, status: StepStatus) {
        if let Some(tx) = self.progress {
            // A closed receiver only means nobody is listening anymore
            let _ = tx.send(StepEvent {
                step: step.number(),
                step_id: step.id(),
                message,
                status,
            });
        }
    }

    fn start(&self, step: OnboardingStep) {
        tracing::info!(step = %step, "Onboarding step started");
        self.emit(step, format!("{}...", step.description()), StepStatus::Running);
    }

    fn done(&mut self, step: OnboardingStep, message: String) {
        tracing::info!(step = %step, detail = %message, "Onboarding step completed");
        self.emit(step, message, StepStatus::Completed);
        self.completed.push(step);
    }

    fn fail(&self, step: OnboardingStep, source: ServiceError) -> OnboardingError {
        tracing::error!(
            step = %step,
            error = %source,
            completed = ?self.completed,
            "Onboarding aborted; completed steps were not rolled back"
        );
        self.emit(step, format!("{} failed: {}", step.description(), source), StepStatus::Error);
        OnboardingError {
            step,
            source,
            completed: self.completed.clone(),
        }
    }
}

/// The onboarding sequence over a set of adapters
pub struct OnboardingWorkflow {
    records: Arc<dyn ClientRecords>,
    files: Arc<dyn FileHosting>,
    signatures: Arc<dyn SignatureProvider>,
    settings: OnboardingSettings,
}

impl OnboardingWorkflow {
    /// Assemble a workflow
    pub fn new(
        records: Arc<dyn ClientRecords>,
        files: Arc<dyn FileHosting>,
        signatures: Arc<dyn SignatureProvider>,
        settings: OnboardingSettings,
    ) -> Self {
        Self {
            records,
            files,
            signatures,
            settings,
        }
    }

    /// Run every step and return the aggregate outcome
    ///
    /// The request must already be validated.
    pub async fn run(
        &self,
        request: &OnboardingRequest,
    ) -> Result<OnboardingOutcome, OnboardingError> {
        self.run_with_progress(request, None).await
    }

    /// Same as [`run`](Self::run), also emitting a [`StepEvent`] per state change
    pub async fn run_with_progress(
        &self,
        request: &OnboardingRequest,
        progress: Option<&UnboundedSender<StepEvent>>,
    ) -> Result<OnboardingOutcome, OnboardingError> {
        let span = tracing::info_span!("onboarding", client_id = %request.client_id);
        self.execute(request, progress).instrument(span).await
    }

    async fn execute(
        &self,
        request: &OnboardingRequest,
        progress: Option<&UnboundedSender<StepEvent>>,
    ) -> Result<OnboardingOutcome, OnboardingError> {
        let mut tracker = StepTracker {
            progress,
            completed: Vec::new(),
        };
        let client_id = request.client_id.trim();
        let email = request.email.trim();

        let step = OnboardingStep::UpsertRecord;
        tracker.start(step);
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!(request.name.trim()));
        fields.insert("email".to_string(), json!(email));
        fields.insert(
            "onboardedAt".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        let record = self
            .records
            .upsert(client_id, &fields)
            .await
            .map_err(|e| tracker.fail(step, e))?;
        tracker.done(step, format!("Client record '{}' saved", record.id));

        let step = OnboardingStep::CreateFolder;
        tracker.start(step);
        let folder = self
            .files
            .create_folder(
                &request.folder_name(),
                self.settings.parent_folder_id.as_deref(),
            )
            .await
            .map_err(|e| tracker.fail(step, e))?;
        tracker.done(step, format!("Folder '{}' created ({})", folder.name, folder.id));

        let step = OnboardingStep::GrantPermission;
        tracker.start(step);
        let permission = self
            .files
            .grant_permission(&folder.id, email, "writer", true)
            .await
            .map_err(|e| tracker.fail(step, e))?;
        tracker.done(step, format!("Folder shared with {}", email));

        let step = OnboardingStep::SendSignature;
        tracker.start(step);
        let folder_link = folder.share_link();
        let dispatch = SignatureDispatch {
            signer_name: request.name.trim().to_string(),
            signer_email: email.to_string(),
            document_name: request.document_name(),
            share_link: Some(folder_link.clone()),
        };
        let signature = self
            .signatures
            .send_for_signature(&dispatch)
            .await
            .map_err(|e| tracker.fail(step, e))?;
        tracker.done(
            step,
            format!("Signature request {} sent", signature.request_id),
        );

        let step = OnboardingStep::RenameFiles;
        tracker.start(step);
        let report = rename_pass(self.files.as_ref(), &folder.id, &self.settings.file_prefix)
            .await
            .map_err(|e| tracker.fail(step, e))?;
        tracker.done(step, format!("{} file(s) renamed", report.files.len()));

        Ok(OnboardingOutcome {
            client_id: client_id.to_string(),
            folder_id: folder.id,
            folder_name: folder.name,
            folder_link,
            permission_id: permission.id,
            signature_request_id: signature.request_id,
            signature_status: signature.status,
            renamed_files: report.files.len(),
            rename_report: report.to_text(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        ClientRecord, DriveFile, DriveFolder, DrivePermission, MemoryClientStore,
        SignatureRequest,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Records every call in order; optionally fails one operation
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
        folder_files: Vec<DriveFile>,
    }

    impl Recorder {
        fn record(&self, call: &'static str) -> Result<(), ServiceError> {
            self.calls.lock().unwrap().push(call.to_string());
            if self.fail_on == Some(call) {
                return Err(ServiceError::Http {
                    service: "fake",
                    status: 503,
                    body: format!("{} unavailable", call),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ClientRecords for Recorder {
        async fn upsert(
            &self,
            id: &str,
            fields: &Map<String, Value>,
        ) -> Result<ClientRecord, ServiceError> {
            self.record("upsert")?;
            Ok(ClientRecord {
                id: id.to_string(),
                fields: fields.clone(),
            })
        }
        async fn get(&self, _id: &str) -> Result<Option<ClientRecord>, ServiceError> {
            self.record("get")?;
            Ok(None)
        }
        async fn delete(&self, _id: &str) -> Result<(), ServiceError> {
            self.record("delete")
        }
        async fn search(&self, _prefix: &str) -> Result<Vec<ClientRecord>, ServiceError> {
            self.record("search")?;
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl FileHosting for Recorder {
        async fn create_folder(
            &self,
            name: &str,
            _parent_id: Option<&str>,
        ) -> Result<DriveFolder, ServiceError> {
            self.record("create_folder")?;
            Ok(DriveFolder {
                id: "folder-1".to_string(),
                name: name.to_string(),
                web_view_link: None,
            })
        }
        async fn grant_permission(
            &self,
            _file_id: &str,
            email: &str,
            role: &str,
            _notify: bool,
        ) -> Result<DrivePermission, ServiceError> {
            self.record("grant_permission")?;
            Ok(DrivePermission {
                id: "perm-1".to_string(),
                email_address: Some(email.to_string()),
                role: role.to_string(),
                kind: "user".to_string(),
            })
        }
        async fn list_files(&self, _folder_id: &str) -> Result<Vec<DriveFile>, ServiceError> {
            self.record("list_files")?;
            Ok(self.folder_files.clone())
        }
        async fn rename_file(
            &self,
            file_id: &str,
            new_name: &str,
        ) -> Result<DriveFile, ServiceError> {
            self.record("rename_file")?;
            Ok(DriveFile {
                id: file_id.to_string(),
                name: new_name.to_string(),
                mime_type: String::new(),
                web_view_link: None,
            })
        }
        async fn list_permissions(
            &self,
            _file_id: &str,
        ) -> Result<Vec<DrivePermission>, ServiceError> {
            self.record("list_permissions")?;
            Ok(Vec::new())
        }
        async fn delete_permission(&self, _file_id: &str, _id: &str) -> Result<(), ServiceError> {
            self.record("delete_permission")
        }
    }

    #[async_trait]
    impl SignatureProvider for Recorder {
        async fn send_for_signature(
            &self,
            dispatch: &SignatureDispatch,
        ) -> Result<SignatureRequest, ServiceError> {
            self.record("send_for_signature")?;
            Ok(SignatureRequest {
                request_id: "sig-1".to_string(),
                status: "inprogress".to_string(),
                document_name: dispatch.document_name.clone(),
            })
        }
        async fn status(&self, _id: &str) -> Result<SignatureRequest, ServiceError> {
            unreachable!("not used by the workflow")
        }
        async fn cancel(&self, _id: &str) -> Result<(), ServiceError> {
            unreachable!("not used by the workflow")
        }
        async fn remind(&self, _id: &str) -> Result<(), ServiceError> {
            unreachable!("not used by the workflow")
        }
    }

    fn request() -> OnboardingRequest {
        OnboardingRequest {
            client_id: "c-1".to_string(),
            name: "Ana Ruiz".to_string(),
            email: "ana@example.com".to_string(),
        }
    }

    fn settings() -> OnboardingSettings {
        OnboardingSettings {
            parent_folder_id: Some("parent".to_string()),
            file_prefix: "[CLIENTE] ".to_string(),
        }
    }

    fn workflow(recorder: Arc<Recorder>) -> OnboardingWorkflow {
        OnboardingWorkflow::new(recorder.clone(), recorder.clone(), recorder, settings())
    }

    #[test]
    fn test_request_validation() {
        assert!(request().validate().is_ok());

        let mut bad = request();
        bad.client_id = "  ".to_string();
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.email = "ana.example.com".to_string();
        assert!(bad.validate().unwrap_err().contains("Invalid email"));
    }

    #[test]
    fn test_request_accepts_id_alias() {
        let parsed: OnboardingRequest =
            serde_json::from_str(r#"{"id": "c-9", "name": "Bo", "email": "bo@x.io"}"#).unwrap();
        assert_eq!(parsed.client_id, "c-9");
    }

    #[tokio::test]
    async fn test_steps_run_once_in_order() {
        let recorder = Arc::new(Recorder {
            folder_files: vec![DriveFile {
                id: "file-1".to_string(),
                name: "id.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                web_view_link: None,
            }],
            ..Default::default()
        });

        let outcome = workflow(recorder.clone()).run(&request()).await.unwrap();

        assert_eq!(
            recorder.calls(),
            vec![
                "upsert",
                "create_folder",
                "grant_permission",
                "send_for_signature",
                "list_files",
                "rename_file",
            ]
        );
        assert_eq!(outcome.folder_name, "Ana Ruiz (c-1)");
        assert_eq!(outcome.folder_link, "https://drive.google.com/drive/folders/folder-1");
        assert_eq!(outcome.signature_request_id, "sig-1");
        assert_eq!(outcome.renamed_files, 1);
        assert_eq!(outcome.rename_report, "id.pdf -> [CLIENTE] id.pdf");
    }

    #[tokio::test]
    async fn test_failure_aborts_without_rollback() {
        let recorder = Arc::new(Recorder {
            fail_on: Some("send_for_signature"),
            ..Default::default()
        });

        let err = workflow(recorder.clone()).run(&request()).await.unwrap_err();

        assert_eq!(err.step, OnboardingStep::SendSignature);
        assert_eq!(
            err.completed,
            vec![
                OnboardingStep::UpsertRecord,
                OnboardingStep::CreateFolder,
                OnboardingStep::GrantPermission,
            ]
        );
        // Nothing after the failed step ran and nothing was undone
        assert_eq!(
            recorder.calls(),
            vec!["upsert", "create_folder", "grant_permission", "send_for_signature"]
        );
    }

    #[tokio::test]
    async fn test_progress_events() {
        let recorder = Arc::new(Recorder::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        workflow(recorder)
            .run_with_progress(&request(), Some(&tx))
            .await
            .unwrap();
        drop(tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(events.len(), OnboardingStep::ALL.len() * 2);
        assert_eq!(events[0].step_id, "upsert_record");
        assert_eq!(events[0].status, StepStatus::Running);
        assert_eq!(events[9].step_id, "rename_files");
        assert_eq!(events[9].status, StepStatus::Completed);
    }

    #[tokio::test]
    async fn test_record_is_merged_into_existing_client() {
        let store = Arc::new(MemoryClientStore::new());
        let mut existing = Map::new();
        existing.insert("taxId".to_string(), json!("20-123"));
        store.upsert("c-1", &existing).await.unwrap();

        let recorder = Arc::new(Recorder::default());
        let workflow =
            OnboardingWorkflow::new(store.clone(), recorder.clone(), recorder, settings());
        workflow.run(&request()).await.unwrap();

        let record = store.get("c-1").await.unwrap().unwrap();
        assert_eq!(record.fields["taxId"], json!("20-123"));
        assert_eq!(record.fields["email"], json!("ana@example.com"));
    }
}
