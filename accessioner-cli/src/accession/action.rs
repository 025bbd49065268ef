//! Create-or-update selection for an input file

use std::fmt;
use std::path::Path;

use crate::error::FileNameError;

/// What a sheet does to its rows' archival objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// New child archival objects under each row's parent
    Create,
    /// Modify the archival object each row references
    Update,
}

impl Action {
    /// Pick the action from the filename marker (case-insensitive); `create` wins if both appear
    pub fn from_path(path: &Path) -> Result<Self, FileNameError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.contains("create") {
            Ok(Action::Create)
        } else if name.contains("update") {
            Ok(Action::Update)
        } else {
            Err(FileNameError {
                filename: path.display().to_string(),
            })
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
        }
    }
}
