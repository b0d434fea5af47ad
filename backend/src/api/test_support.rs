//! In-process fakes for handler tests

use crate::config::Config;
use crate::services::{
    DriveFile, DriveFolder, DrivePermission, FileHosting, MailSender, MemoryClientStore,
    OutgoingMail, ServiceError, SheetWrite, SheetWriter, SignatureDispatch, SignatureProvider,
    SignatureRequest,
};
use crate::state::{AppState, Services, SharedState};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::RwLock;

/// Records calls and holds a tiny Drive in memory
#[derive(Default)]
pub(crate) struct FakeHost {
    pub calls: Mutex<Vec<String>>,
    pub files: Mutex<Vec<DriveFile>>,
    pub permissions: Mutex<Vec<DrivePermission>>,
    pub rows: Mutex<Vec<Vec<String>>>,
    pub mail: Mutex<Vec<OutgoingMail>>,
}

impl FakeHost {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn add_file(&self, id: &str, name: &str) {
        self.files.lock().unwrap().push(DriveFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            web_view_link: None,
        });
    }

    pub fn add_permission(&self, id: &str, email: &str, role: &str) {
        self.permissions.lock().unwrap().push(DrivePermission {
            id: id.to_string(),
            email_address: Some(email.to_string()),
            role: role.to_string(),
            kind: "user".to_string(),
        });
    }
}

#[async_trait]
impl FileHosting for FakeHost {
    async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<DriveFolder, ServiceError> {
        self.record(format!("create_folder:{}:{}", name, parent_id.unwrap_or("-")));
        Ok(DriveFolder {
            id: "folder-1".to_string(),
            name: name.to_string(),
            web_view_link: Some("https://drive.example/folder-1".to_string()),
        })
    }

    async fn grant_permission(
        &self,
        _file_id: &str,
        email: &str,
        role: &str,
        notify: bool,
    ) -> Result<DrivePermission, ServiceError> {
        self.record(format!("grant_permission:{}:{}:{}", email, role, notify));
        let mut permissions = self.permissions.lock().unwrap();
        let permission = DrivePermission {
            id: format!("perm-{}", permissions.len() + 100),
            email_address: Some(email.to_string()),
            role: role.to_string(),
            kind: "user".to_string(),
        };
        permissions.push(permission.clone());
        Ok(permission)
    }

    async fn list_files(&self, _folder_id: &str) -> Result<Vec<DriveFile>, ServiceError> {
        self.record("list_files");
        Ok(self.files.lock().unwrap().clone())
    }

    async fn rename_file(&self, file_id: &str, new_name: &str) -> Result<DriveFile, ServiceError> {
        self.record(format!("rename_file:{}", file_id));
        let mut files = self.files.lock().unwrap();
        let file = files
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or_else(|| ServiceError::Http {
                service: "fake",
                status: 404,
                body: file_id.to_string(),
            })?;
        file.name = new_name.to_string();
        Ok(file.clone())
    }

    async fn list_permissions(&self, _file_id: &str) -> Result<Vec<DrivePermission>, ServiceError> {
        self.record("list_permissions");
        Ok(self.permissions.lock().unwrap().clone())
    }

    async fn delete_permission(&self, _file_id: &str, id: &str) -> Result<(), ServiceError> {
        self.record(format!("delete_permission:{}", id));
        self.permissions.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl SignatureProvider for FakeHost {
    async fn send_for_signature(
        &self,
        dispatch: &SignatureDispatch,
    ) -> Result<SignatureRequest, ServiceError> {
        self.record(format!("send_for_signature:{}", dispatch.signer_email));
        Ok(SignatureRequest {
            request_id: "sig-1".to_string(),
            status: "inprogress".to_string(),
            document_name: dispatch.document_name.clone(),
        })
    }

    async fn status(&self, request_id: &str) -> Result<SignatureRequest, ServiceError> {
        self.record(format!("status:{}", request_id));
        Ok(SignatureRequest {
            request_id: request_id.to_string(),
            status: "completed".to_string(),
            document_name: "Engagement letter".to_string(),
        })
    }

    async fn cancel(&self, request_id: &str) -> Result<(), ServiceError> {
        self.record(format!("cancel:{}", request_id));
        Ok(())
    }

    async fn remind(&self, request_id: &str) -> Result<(), ServiceError> {
        self.record(format!("remind:{}", request_id));
        Ok(())
    }
}

#[async_trait]
impl SheetWriter for FakeHost {
    async fn write_rows(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<SheetWrite, ServiceError> {
        self.record(format!("write_rows:{}", range));
        let count = rows.len() as u32;
        *self.rows.lock().unwrap() = rows;
        Ok(SheetWrite {
            updated_rows: count,
            updated_range: Some(range.to_string()),
        })
    }
}

#[async_trait]
impl MailSender for FakeHost {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), ServiceError> {
        self.record(format!("send_mail:{}", mail.to));
        self.mail.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// State over an in-memory client store and a [`FakeHost`]
///
/// `apiConfig.json` lives in `dir`. Mail is enabled when `with_mailer` is set.
pub(crate) fn test_state(dir: &TempDir, with_mailer: bool) -> (SharedState, Arc<FakeHost>) {
    let host = Arc::new(FakeHost::default());

    let mut config = Config::from_env();
    config.storage.api_config_path = dir.path().join("apiConfig.json");
    config.google.drive_parent_folder_id = Some("parent-1".to_string());
    config.google.sheet_id = None;
    config.google.sheet_range = "Sheet1!A1".to_string();
    config.workflow.file_prefix = "[CLIENTE] ".to_string();

    let services = Services {
        records: Arc::new(MemoryClientStore::new()),
        files: host.clone(),
        signatures: host.clone(),
        sheets: host.clone(),
        mailer: with_mailer.then(|| host.clone() as Arc<dyn MailSender>),
    };

    let state = Arc::new(RwLock::new(AppState::new(config, services)));
    (state, host)
}
