//! Google Drive adapter
//!
//! Folder creation, sharing, listing and renaming, plus the permission repair
//! pass. All calls go through the v3 REST API with `supportsAllDrives=true` so
//! shared drives behave like My Drive.

use crate::services::http::{ensure_success, read_json, require};
use crate::services::{FileHosting, ServiceError, TokenProvider};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const SERVICE: &str = "drive";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const FILE_FIELDS: &str = "id,name,mimeType,webViewLink";
const PERMISSION_FIELDS: &str = "id,emailAddress,role,type";

/// A created folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFolder {
    /// Drive file id
    pub id: String,
    /// Folder name
    pub name: String,
    /// Browser link used as the share link
    #[serde(default)]
    pub web_view_link: Option<String>,
}

impl DriveFolder {
    /// Share link, falling back to the canonical folder URL
    pub fn share_link(&self) -> String {
        self.web_view_link
            .clone()
            .unwrap_or_else(|| format!("https://drive.google.com/drive/folders/{}", self.id))
    }
}

/// A file inside a folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Drive file id
    pub id: String,
    /// File name
    pub name: String,
    /// MIME type
    #[serde(default)]
    pub mime_type: String,
    /// Browser link
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// A sharing entry on a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivePermission {
    /// Permission id
    pub id: String,
    /// Grantee address (absent for `anyone` and domain permissions)
    #[serde(default)]
    pub email_address: Option<String>,
    /// `owner`, `writer`, `reader`, ...
    pub role: String,
    /// `user`, `group`, `domain` or `anyone`
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl DrivePermission {
    /// True when this entry belongs to `email` (case-insensitive)
    pub fn matches_email(&self, email: &str) -> bool {
        self.email_address
            .as_deref()
            .is_some_and(|addr| addr.eq_ignore_ascii_case(email.trim()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PermissionList {
    #[serde(default)]
    permissions: Vec<DrivePermission>,
}

/// Outcome of [`fix_permissions`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRepair {
    /// File that was repaired
    pub file_id: String,
    /// Ids of the permissions that were deleted
    pub removed: Vec<String>,
    /// Owner permission ids left in place
    pub kept_owners: Vec<String>,
    /// The single permission recreated for the target email
    pub permission: DrivePermission,
}

/// Reset sharing on `file_id` so that `email` holds exactly one writer entry
///
/// Lists every permission, deletes each one that is not an owner entry
/// (including existing entries for `email`), then recreates a single writer
/// permission for `email` without a notification email. When `email` is itself
/// an owner, its owner entry is the one that remains and nothing is granted.
/// Irreversible: there is no dry run.
pub async fn fix_permissions(
    files: &dyn FileHosting,
    file_id: &str,
    email: &str,
) -> Result<PermissionRepair, ServiceError> {
    require(file_id, "file id")?;
    require(email, "email")?;

    let existing = files.list_permissions(file_id).await?;
    let mut removed = Vec::new();
    let mut kept_owners = Vec::new();
    let mut owned_by_email = None;

    for permission in existing {
        if permission.role == "owner" {
            // Drive refuses to delete the owner entry
            kept_owners.push(permission.id.clone());
            if owned_by_email.is_none() && permission.matches_email(email) {
                owned_by_email = Some(permission);
            }
            continue;
        }
        files.delete_permission(file_id, &permission.id).await?;
        removed.push(permission.id);
    }

    // An owner already has full access and cannot also hold a writer entry
    let permission = match owned_by_email {
        Some(owner) => owner,
        None => {
            files
                .grant_permission(file_id, email.trim(), "writer", false)
                .await?
        }
    };

    tracing::info!(
        file_id = %file_id,
        email = %email,
        removed = removed.len(),
        "Permissions repaired"
    );

    Ok(PermissionRepair {
        file_id: file_id.to_string(),
        removed,
        kept_owners,
        permission,
    })
}

/// Drive v3 REST client
#[derive(Debug)]
pub struct DriveClient {
    http: reqwest::Client,
    tokens: Arc<TokenProvider>,
    base_url: Url,
}

impl DriveClient {
    /// Create a client against `base_url` (normally `https://www.googleapis.com`)
    ///
    /// # Errors
    /// Returns `ServiceError::InvalidInput` if `base_url` is not a valid URL.
    pub fn new(
        http: reqwest::Client,
        tokens: Arc<TokenProvider>,
        base_url: &str,
    ) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid Drive URL: {}", e)))?;
        Ok(Self {
            http,
            tokens,
            base_url,
        })
    }

    fn url(&self, tail: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidInput("Drive URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["drive", "v3", "files"])
            .extend(tail);
        url.query_pairs_mut().append_pair("supportsAllDrives", "true");
        Ok(url)
    }
}

/// Escape a value for use inside a single-quoted Drive query literal
fn quote_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl FileHosting for DriveClient {
    async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<DriveFolder, ServiceError> {
        require(name, "folder name")?;

        let mut body = json!({ "name": name, "mimeType": FOLDER_MIME_TYPE });
        if let Some(parent) = parent_id.filter(|p| !p.trim().is_empty()) {
            body["parents"] = json!([parent]);
        }

        let mut url = self.url(&[])?;
        url.query_pairs_mut().append_pair("fields", "id,name,webViewLink");

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        read_json(SERVICE, response).await
    }

    async fn grant_permission(
        &self,
        file_id: &str,
        email: &str,
        role: &str,
        notify: bool,
    ) -> Result<DrivePermission, ServiceError> {
        require(file_id, "file id")?;
        require(email, "email")?;

        let mut url = self.url(&[file_id, "permissions"])?;
        url.query_pairs_mut()
            .append_pair("sendNotificationEmail", if notify { "true" } else { "false" })
            .append_pair("fields", PERMISSION_FIELDS);

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "type": "user", "role": role, "emailAddress": email }))
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        read_json(SERVICE, response).await
    }

    async fn list_files(&self, folder_id: &str) -> Result<Vec<DriveFile>, ServiceError> {
        require(folder_id, "folder id")?;

        let query = format!(
            "'{}' in parents and trashed = false",
            quote_query_literal(folder_id)
        );
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.url(&[])?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs
                    .append_pair("q", &query)
                    .append_pair("includeItemsFromAllDrives", "true")
                    .append_pair("pageSize", "1000")
                    .append_pair("fields", &format!("nextPageToken,files({})", FILE_FIELDS));
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let token = self.tokens.access_token().await?;
            let response = self
                .http
                .get(url)
                .bearer_auth(token)
                .send()
                .await
                .map_err(ServiceError::transport(SERVICE))?;

            let page: FileList = read_json(SERVICE, response).await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(files)
    }

    async fn rename_file(&self, file_id: &str, new_name: &str) -> Result<DriveFile, ServiceError> {
        require(file_id, "file id")?;
        require(new_name, "file name")?;

        let mut url = self.url(&[file_id])?;
        url.query_pairs_mut().append_pair("fields", FILE_FIELDS);

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .patch(url)
            .bearer_auth(token)
            .json(&json!({ "name": new_name }))
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        read_json(SERVICE, response).await
    }

    async fn list_permissions(&self, file_id: &str) -> Result<Vec<DrivePermission>, ServiceError> {
        require(file_id, "file id")?;

        let mut url = self.url(&[file_id, "permissions"])?;
        url.query_pairs_mut()
            .append_pair("fields", &format!("permissions({})", PERMISSION_FIELDS));

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        let list: PermissionList = read_json(SERVICE, response).await?;
        Ok(list.permissions)
    }

    async fn delete_permission(
        &self,
        file_id: &str,
        permission_id: &str,
    ) -> Result<(), ServiceError> {
        let url = self.url(&[file_id, "permissions", permission_id])?;
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .delete(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;
        ensure_success(SERVICE, response).await?;
        Ok(())
    }
}
