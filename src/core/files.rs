//! core::files
//!
//! Structured file accessors used by the manifest reader and by checks.
//!
//! # Atomicity
//!
//! Writes go to a sibling temp file which is then renamed over the
//! target, so a failed write never leaves a half-written file behind.
//! Writing a value equal to what is already on disk is a no-op.

use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading or writing a JSON file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read '{}': {source}", path.display())]
    ReadError { path: PathBuf, source: io::Error },

    #[error("failed to parse '{}': {message}", path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write '{}': {source}", path.display())]
    WriteError { path: PathBuf, source: io::Error },
}

impl FileError {
    /// Whether the error only means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FileError::NotFound { .. })
    }
}

/// A JSON document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Accessor for `<dir>/<file_name>`.
    pub fn new(dir: &Path, file_name: &str) -> Self {
        Self {
            path: dir.join(file_name),
        }
    }

    /// The file's path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file exists.
    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Read and parse the file.
    ///
    /// # Errors
    ///
    /// `FileError::NotFound` when the file is absent, `ParseError` when it
    /// is not valid JSON.
    pub async fn load(&self) -> Result<Value, FileError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FileError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) => {
                return Err(FileError::ReadError {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|e| FileError::ParseError {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Read the file, treating a missing or malformed file as absent.
    pub async fn get(&self) -> Option<Value> {
        match self.load().await {
            Ok(value) => Some(value),
            Err(e) => {
                if !e.is_not_found() {
                    log::debug!("{e}");
                }
                None
            }
        }
    }

    /// Write `value` atomically.
    ///
    /// Returns `Ok(false)` without touching the file when its current
    /// contents already parse to `value`.
    pub async fn set(&self, value: &Value) -> Result<bool, FileError> {
        if let Ok(current) = self.load().await {
            if &current == value {
                return Ok(false);
            }
        }

        let mut contents = serde_json::to_string_pretty(value).map_err(|e| {
            FileError::ParseError {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;
        contents.push('\n');

        let temp_path = self.temp_path();
        if let Err(e) = tokio::fs::write(&temp_path, contents.as_bytes()).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(FileError::WriteError {
                path: temp_path,
                source: e,
            });
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(FileError::WriteError {
                path: self.path.clone(),
                source: e,
            });
        }

        log::debug!("wrote {}", self.path.display());
        Ok(true)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let file = JsonFile::new(dir.path(), "package.json");

        let err = file.load().await.unwrap_err();
        assert!(err.is_not_found());
        assert!(file.get().await.is_none());
        assert!(!file.exists().await);
    }

    #[tokio::test]
    async fn load_malformed_is_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        let file = JsonFile::new(dir.path(), "package.json");

        assert!(matches!(
            file.load().await,
            Err(FileError::ParseError { .. })
        ));
        assert!(file.get().await.is_none());
    }

    #[tokio::test]
    async fn set_writes_pretty_json_with_newline() {
        let dir = TempDir::new().unwrap();
        let file = JsonFile::new(dir.path(), "package.json");

        let changed = file.set(&json!({"name": "pkg"})).await.unwrap();
        assert!(changed);

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "{\n  \"name\": \"pkg\"\n}\n");
        assert!(!dir.path().join("package.json.tmp").exists());
    }

    #[tokio::test]
    async fn failed_write_leaves_target_untouched() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), "{\"name\":\"old\"}").unwrap();
        // A directory in the temp file's place makes the write fail.
        std::fs::create_dir(dir.path().join("package.json.tmp")).unwrap();
        let file = JsonFile::new(dir.path(), "package.json");

        let err = file.set(&json!({"name": "new"})).await.unwrap_err();
        assert!(matches!(err, FileError::WriteError { .. }));

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "{\"name\":\"old\"}");
    }

    #[tokio::test]
    async fn set_same_value_is_noop() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), "{\"name\":\"pkg\"}").unwrap();
        let file = JsonFile::new(dir.path(), "package.json");

        let changed = file.set(&json!({"name": "pkg"})).await.unwrap();
        assert!(!changed);

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "{\"name\":\"pkg\"}");
    }
}
