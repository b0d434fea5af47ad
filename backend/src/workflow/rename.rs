//! Folder rename pass
//!
//! Prefixes every file in a folder with a marker and produces a text report,
//! one line per file. The pass is unconditional: running it twice prefixes
//! twice, and files that already carry the marker are renamed again.

use crate::services::{FileHosting, ServiceError};
use serde::Serialize;

/// One renamed file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamedFile {
    /// Drive file id
    pub file_id: String,
    /// Name before the pass
    pub old_name: String,
    /// Name after the pass
    pub new_name: String,
}

/// Result of a rename pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameReport {
    /// Files renamed, in listing order
    pub files: Vec<RenamedFile>,
}

impl RenameReport {
    /// Line-per-file text report (`old -> new`)
    pub fn to_text(&self) -> String {
        self.files
            .iter()
            .map(|f| format!("{} -> {}", f.old_name, f.new_name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Rename every file in `folder_id` to `{prefix}{name}`
///
/// Stops at the first failed rename; files renamed before the failure keep
/// their new names.
pub async fn rename_pass(
    files: &dyn FileHosting,
    folder_id: &str,
    prefix: &str,
) -> Result<RenameReport, ServiceError> {
    let listing = files.list_files(folder_id).await?;
    let mut report = RenameReport::default();

    for file in listing {
        let new_name = format!("{}{}", prefix, file.name);
        files.rename_file(&file.id, &new_name).await?;
        tracing::debug!(file_id = %file.id, old = %file.name, new = %new_name, "Renamed file");
        report.files.push(RenamedFile {
            file_id: file.id,
            old_name: file.name,
            new_name,
        });
    }

    tracing::info!(folder_id = %folder_id, renamed = report.files.len(), "Rename pass finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_text() {
        let report = RenameReport {
            files: vec![
                RenamedFile {
                    file_id: "1".to_string(),
                    old_name: "a.pdf".to_string(),
                    new_name: "[X] a.pdf".to_string(),
                },
                RenamedFile {
                    file_id: "2".to_string(),
                    old_name: "b.pdf".to_string(),
                    new_name: "[X] b.pdf".to_string(),
                },
            ],
        };
        assert_eq!(report.to_text(), "a.pdf -> [X] a.pdf\nb.pdf -> [X] b.pdf");
        assert_eq!(RenameReport::default().to_text(), "");
    }
}
