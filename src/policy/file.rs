use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::policy::types::Policy;

/// Errors that can occur when reading or writing a policy file.
#[derive(Debug, Error)]
pub enum PolicyFileError {
    #[error("Failed to read policy file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse policy file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode policy: {0}")]
    EncodeError(#[source] serde_json::Error),

    #[error("Failed to write policy file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Policy {
    /// Load a policy from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self, PolicyFileError> {
        let content = fs::read_to_string(path).map_err(|e| PolicyFileError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| PolicyFileError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the policy as pretty-printed JSON.
    pub fn save_to(&self, path: &Path) -> Result<(), PolicyFileError> {
        let content = serde_json::to_string_pretty(self).map_err(PolicyFileError::EncodeError)?;

        fs::write(path, content).map_err(|e| PolicyFileError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Policy::load_from(&temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(PolicyFileError::ReadError { .. })));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("policy.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Policy::load_from(&path),
            Err(PolicyFileError::ParseError { .. })
        ));
    }

    #[test]
    fn saved_policy_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("policy.json");
        let policy = Policy {
            id: "p1".to_string(),
            output_currency: "EUR".to_string(),
            ..Default::default()
        };

        policy.save_to(&path).unwrap();
        assert_eq!(Policy::load_from(&path).unwrap(), policy);
    }
}
