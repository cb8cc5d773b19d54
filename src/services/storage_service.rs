use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Prefix of the hidden files uploads are staged in before being renamed into place.
pub const TEMP_UPLOAD_PREFIX: &str = ".upload-";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not create the directory where the uploaded files will be stored: {path:?}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Sorry! Filename contains invalid path sequence {0}")]
    InvalidFileName(String),
    #[error("Could not store file {file_name}. Please try again!")]
    Write {
        file_name: String,
        #[source]
        source: io::Error,
    },
    #[error("File not found {0}")]
    NotFound(String),
}

/// An opened stored file, ready to be streamed.
#[derive(Debug)]
pub struct FileResource {
    pub file_name: String,
    pub path: PathBuf,
    pub len: u64,
    pub file: tokio::fs::File,
}

/// File storage owned by entities of type `T`.
#[async_trait]
pub trait StorageService<T: Sync>: Send + Sync {
    /// Stores `content` as the file belonging to `owner` and returns the stored name.
    async fn store_file(
        &self,
        content: &[u8],
        original_file_name: Option<&str>,
        owner: &T,
    ) -> Result<String, StorageError>;

    async fn load_file_as_resource(&self, file_name: &str) -> Result<FileResource, StorageError>;

    /// Returns whether a file was actually removed.
    async fn delete_file(&self, file_name: &str) -> bool;
}

/// Text after the last `.`, or `""` when the name is absent or has no dot.
pub fn file_extension(file_name: Option<&str>) -> &str {
    file_name
        .and_then(|name| name.rfind('.').map(|idx| &name[idx + 1..]))
        .unwrap_or("")
}

/// Drops characters that would let a name segment address another directory.
pub fn clean_path_segment(segment: &str) -> String {
    segment
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '\0'))
        .collect()
}

/// Lexically resolves `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Joins `file_name` onto `base`, refusing results that leave `base` or name `base` itself.
pub fn resolve_within(base: &Path, file_name: &str) -> Option<PathBuf> {
    let candidate = normalize_path(&base.join(file_name));
    if candidate.starts_with(base) && candidate != base {
        Some(candidate)
    } else {
        None
    }
}

pub fn is_temp_upload_name(name: &str) -> bool {
    name.starts_with(TEMP_UPLOAD_PREFIX)
}
