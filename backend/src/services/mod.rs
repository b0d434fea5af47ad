//! Service layer for external integrations
//!
//! Each adapter wraps one SaaS API (Firestore, Drive, Sheets, Zoho Sign, SMTP).
//! The traits below are the seams the onboarding workflow and the HTTP handlers
//! are written against; the REST clients implement them for production and
//! tests substitute recording fakes.

pub mod drive;
pub mod error;
pub mod firestore;
pub(crate) mod http;
pub mod mailer;
pub mod memory;
pub mod oauth;
pub mod sheets;
pub mod zoho;

pub use drive::{fix_permissions, DriveClient, DriveFile, DriveFolder, DrivePermission, PermissionRepair};
pub use error::ServiceError;
pub use firestore::{ClientRecord, FirestoreClient};
pub use mailer::{OutgoingMail, SmtpMailer};
pub use memory::MemoryClientStore;
pub use oauth::TokenProvider;
pub use sheets::{sync_folder_to_sheet, SheetSync, SheetWrite, SheetWriter, SheetsClient};
pub use zoho::{SignatureDispatch, SignatureRequest, ZohoSignClient};

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Document store holding one record per client
#[async_trait]
pub trait ClientRecords: Send + Sync {
    /// Merge `fields` into the record keyed by `id`, creating it if needed
    ///
    /// Fields absent from `fields` keep their stored values. Returns the record
    /// as stored after the merge.
    async fn upsert(&self, id: &str, fields: &Map<String, Value>)
        -> Result<ClientRecord, ServiceError>;

    /// Fetch a record, `None` when it does not exist
    async fn get(&self, id: &str) -> Result<Option<ClientRecord>, ServiceError>;

    /// Delete a record; deleting a missing record succeeds
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;

    /// Records whose `name` starts with `prefix` (all records for an empty prefix)
    async fn search(&self, prefix: &str) -> Result<Vec<ClientRecord>, ServiceError>;
}

/// File hosting operations used by the workflow and the Drive endpoints
#[async_trait]
pub trait FileHosting: Send + Sync {
    /// Create a folder, optionally under `parent_id`
    async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<DriveFolder, ServiceError>;

    /// Share `file_id` with `email`; `notify` makes the host email the user
    async fn grant_permission(
        &self,
        file_id: &str,
        email: &str,
        role: &str,
        notify: bool,
    ) -> Result<DrivePermission, ServiceError>;

    /// All non-trashed files directly inside `folder_id`
    async fn list_files(&self, folder_id: &str) -> Result<Vec<DriveFile>, ServiceError>;

    /// Rename one file
    async fn rename_file(&self, file_id: &str, new_name: &str) -> Result<DriveFile, ServiceError>;

    /// Permissions currently set on `file_id`
    async fn list_permissions(&self, file_id: &str) -> Result<Vec<DrivePermission>, ServiceError>;

    /// Remove one permission from `file_id`
    async fn delete_permission(&self, file_id: &str, permission_id: &str)
        -> Result<(), ServiceError>;
}

/// E-signature provider
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Create and send a request with a single signer
    async fn send_for_signature(
        &self,
        dispatch: &SignatureDispatch,
    ) -> Result<SignatureRequest, ServiceError>;

    /// Current state of a request
    async fn status(&self, request_id: &str) -> Result<SignatureRequest, ServiceError>;

    /// Recall a request that has not been completed
    async fn cancel(&self, request_id: &str) -> Result<(), ServiceError>;

    /// Send the signer a reminder
    async fn remind(&self, request_id: &str) -> Result<(), ServiceError>;
}

/// Outgoing mail transport
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Deliver one message
    async fn send(&self, mail: &OutgoingMail) -> Result<(), ServiceError>;
}
