//! Drive API handlers
//!
//! Folder creation, Drive to Sheet sync, permission repair and the rename pass.

use crate::api::utils::{require_email, require_field};
use crate::error::AppError;
use crate::services::{
    fix_permissions as repair_permissions, sync_folder_to_sheet, DriveFolder, DrivePermission,
    PermissionRepair, SheetSync,
};
use crate::state::SharedState;
use crate::workflow::{rename_pass, RenamedFile};
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};

fn default_role() -> String {
    "writer".to_string()
}

fn default_notify() -> bool {
    true
}

/// Create folder request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    /// Folder name
    #[serde(default)]
    pub name: String,
    /// Parent folder; defaults to the configured parent
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Email to share the new folder with
    #[serde(default)]
    pub share_with: Option<String>,
    /// Role granted to `share_with`
    #[serde(default = "default_role")]
    pub role: String,
    /// Whether Drive emails `share_with`
    #[serde(default = "default_notify")]
    pub notify: bool,
}

/// Create folder response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderResponse {
    /// The new folder
    pub folder: DriveFolder,
    /// Share link
    pub link: String,
    /// Permission created for `shareWith`, if any
    pub permission: Option<DrivePermission>,
}

/// Sync request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSheetRequest {
    /// Folder to list
    #[serde(default)]
    pub folder_id: String,
    /// Target spreadsheet; defaults to the configured sheet
    #[serde(default)]
    pub sheet_id: Option<String>,
    /// Target range; defaults to the configured range
    #[serde(default)]
    pub range: Option<String>,
}

/// Permission repair request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixPermissionsRequest {
    /// File or folder to repair
    #[serde(default)]
    pub file_id: String,
    /// Email that ends up holding the single writer entry
    #[serde(default)]
    pub email: String,
}

/// Rename pass request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortFilesRequest {
    /// Folder whose files are renamed
    #[serde(default)]
    pub folder_id: String,
    /// Marker; defaults to the configured prefix
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Rename pass response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortFilesResponse {
    /// Folder that was processed
    pub folder_id: String,
    /// Renamed files, in listing order
    pub files: Vec<RenamedFile>,
    /// Line-per-file text report
    pub report: String,
}

/// POST /api/drive/folders - Create a folder, optionally sharing it
pub async fn create_folder(
    State(state): State<SharedState>,
    Json(request): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<CreateFolderResponse>), AppError> {
    let name = require_field(&request.name, "Folder name")?;
    let share_with = request
        .share_with
        .as_deref()
        .map(|email| require_email(email, "shareWith"))
        .transpose()?;

    let (files, parent_id) = {
        let state = state.read().await;
        let parent = request.parent_id.clone().or_else(|| state.parent_folder_id());
        (state.services.files.clone(), parent)
    };

    let folder = files.create_folder(name, parent_id.as_deref()).await?;
    let permission = match share_with {
        Some(email) => Some(
            files
                .grant_permission(&folder.id, email, &request.role, request.notify)
                .await?,
        ),
        None => None,
    };

    tracing::info!(folder_id = %folder.id, name = %folder.name, shared = permission.is_some(), "Folder created");
    Ok((
        StatusCode::CREATED,
        Json(CreateFolderResponse {
            link: folder.share_link(),
            folder,
            permission,
        }),
    ))
}

/// POST /api/drive/sync-sheet - Write a folder listing into a spreadsheet
pub async fn sync_sheet(
    State(state): State<SharedState>,
    Json(request): Json<SyncSheetRequest>,
) -> Result<Json<SheetSync>, AppError> {
    let folder_id = require_field(&request.folder_id, "Folder id")?;

    let (files, sheets, sheet_id, range) = {
        let state = state.read().await;
        let (default_sheet, default_range) = state.sheet_target();
        (
            state.services.files.clone(),
            state.services.sheets.clone(),
            request.sheet_id.clone().or(default_sheet),
            request.range.clone().unwrap_or(default_range),
        )
    };
    let sheet_id = sheet_id.ok_or_else(|| {
        AppError::Config("No spreadsheet given and SHEET_ID is not configured".to_string())
    })?;

    let sync =
        sync_folder_to_sheet(files.as_ref(), sheets.as_ref(), folder_id, &sheet_id, &range).await?;
    Ok(Json(sync))
}

/// POST /api/drive/fix-permissions - Reset sharing to a single writer
pub async fn fix_permissions(
    State(state): State<SharedState>,
    Json(request): Json<FixPermissionsRequest>,
) -> Result<Json<PermissionRepair>, AppError> {
    let file_id = require_field(&request.file_id, "File id")?;
    let email = require_email(&request.email, "Email")?;
    let files = state.read().await.services.files.clone();

    let repair = repair_permissions(files.as_ref(), file_id, email).await?;
    Ok(Json(repair))
}

/// POST /api/drive/sort-files - Prefix every file in a folder
pub async fn sort_files(
    State(state): State<SharedState>,
    Json(request): Json<SortFilesRequest>,
) -> Result<Json<SortFilesResponse>, AppError> {
    let folder_id = require_field(&request.folder_id, "Folder id")?;
    let (files, prefix) = {
        let state = state.read().await;
        let prefix = request
            .prefix
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| state.file_prefix());
        (state.services.files.clone(), prefix)
    };

    let report = rename_pass(files.as_ref(), folder_id, &prefix).await?;
    Ok(Json(SortFilesResponse {
        folder_id: folder_id.to_string(),
        report: report.to_text(),
        files: report.files,
    }))
}
