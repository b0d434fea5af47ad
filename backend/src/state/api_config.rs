//! apiConfig.json store
//! Loads and rewrites the operator-editable settings file

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for `apiConfig.json` operations
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    /// File I/O error
    #[error("IO Error on {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// Stored file is not valid JSON
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings from `apiConfig.json` that override environment config
///
/// Every key is optional; the rest of the document is kept as opaque JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceOverrides {
    /// Parent folder for new client folders
    pub drive_parent_folder_id: Option<String>,
    /// Rename marker
    pub file_prefix: Option<String>,
    /// Spreadsheet for the Drive to Sheet sync
    pub sheet_id: Option<String>,
    /// A1 range for the Drive to Sheet sync
    pub sheet_range: Option<String>,
}

impl ServiceOverrides {
    /// Read the known keys out of a config document
    ///
    /// Non-object documents and keys of the wrong type yield no overrides.
    pub fn from_document(document: &Value) -> Self {
        let text = |key: &str| {
            document
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        // file_prefix keeps surrounding whitespace; the separator is part of the marker
        let prefix = document
            .get("filePrefix")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Self {
            drive_parent_folder_id: text("driveParentFolderId"),
            file_prefix: prefix,
            sheet_id: text("sheetId"),
            sheet_range: text("sheetRange"),
        }
    }
}

/// File-backed `apiConfig.json`
#[derive(Debug, Clone)]
pub struct ApiConfigStore {
    path: PathBuf,
}

impl ApiConfigStore {
    /// Store backed by `path`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document
    ///
    /// # Returns
    /// * `Ok(Value)` - The stored document, or `{}` if the file does not exist
    /// * `Err(ConfigStoreError)` - If the file cannot be read or parsed
    pub fn load(&self) -> Result<Value, ConfigStoreError> {
        if !self.path.exists() {
            return Ok(Value::Object(Default::default()));
        }

        let json = fs::read_to_string(&self.path).map_err(|source| ConfigStoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Replace the whole file with `document`, pretty-printed
    ///
    /// Key order is preserved. Returns the text written.
    pub fn save(&self, document: &Value) -> Result<String, ConfigStoreError> {
        let json = serde_json::to_string_pretty(document)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| ConfigStoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        fs::write(&self.path, &json).map_err(|source| ConfigStoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), bytes = json.len(), "Saved apiConfig.json");
        Ok(json)
    }
}
