use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::entities::user;
use crate::services::storage_service::{
    FileResource, StorageError, StorageService, TEMP_UPLOAD_PREFIX, clean_path_segment,
    file_extension, is_temp_upload_name, normalize_path, resolve_within,
};

/// Stores one avatar per user under `<id> - <username>.<extension>`.
#[derive(Debug, Clone)]
pub struct AvatarStorageService {
    storage_location: PathBuf,
}

impl AvatarStorageService {
    /// Resolves `upload_dir` to an absolute path and creates it if needed.
    pub fn new(upload_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let upload_dir = upload_dir.as_ref();
        let directory_error = |source: io::Error| StorageError::DirectoryCreation {
            path: upload_dir.to_path_buf(),
            source,
        };

        let storage_location = std::path::absolute(upload_dir)
            .map(|path| normalize_path(&path))
            .map_err(directory_error)?;
        std::fs::create_dir_all(&storage_location).map_err(directory_error)?;

        info!(location = %storage_location.display(), "Avatar storage ready.");
        Ok(AvatarStorageService { storage_location })
    }

    pub fn storage_location(&self) -> &Path {
        &self.storage_location
    }
}

/// Canonical avatar name. An empty extension yields no trailing dot.
fn avatar_file_name(user: &user::Model, extension: &str) -> String {
    let id = clean_path_segment(&user.id.to_string());
    if extension.is_empty() {
        format!("{id} - {}", user.username)
    } else {
        format!("{id} - {}.{extension}", user.username)
    }
}

fn is_unsafe_file_name(file_name: &str) -> bool {
    file_name.contains("..") || file_name.contains(['/', '\\'])
}

/// Extension of the avatar previously stored as `avatar_url`. Names built by
/// `avatar_file_name` are read past the `<id> - <username>` prefix, so dotted
/// usernames and extensionless avatars resolve correctly.
fn previous_extension<'a>(user: &user::Model, avatar_url: &'a str) -> &'a str {
    match avatar_url.strip_prefix(avatar_file_name(user, "").as_str()) {
        Some(rest) if rest.is_empty() => "",
        Some(rest) if rest.starts_with('.') => &rest[1..],
        _ => file_extension(Some(avatar_url)),
    }
}

/// Writes through a hidden sibling and renames it over `target`.
async fn write_replacing(target: &Path, content: &[u8]) -> io::Result<()> {
    let staging = target.with_file_name(format!("{TEMP_UPLOAD_PREFIX}{}", Uuid::new_v4()));

    let result = match tokio::fs::write(&staging, content).await {
        Ok(()) => tokio::fs::rename(&staging, target).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        let _ = tokio::fs::remove_file(&staging).await;
    }
    result
}

#[async_trait]
impl StorageService<user::Model> for AvatarStorageService {
    async fn store_file(
        &self,
        content: &[u8],
        original_file_name: Option<&str>,
        user: &user::Model,
    ) -> Result<String, StorageError> {
        let extension = file_extension(original_file_name);
        let file_name = avatar_file_name(user, extension);
        if is_unsafe_file_name(&file_name) {
            warn!(user_id = user.id, file = %file_name, "Rejected unsafe avatar file name.");
            return Err(StorageError::InvalidFileName(file_name));
        }

        // Same extension means same name, so the write below replaces it.
        if let Some(avatar_url) = user.avatar_url.as_deref().filter(|url| !url.is_empty()) {
            let old_extension = previous_extension(user, avatar_url);
            if old_extension != extension {
                let old_file_name = avatar_file_name(user, old_extension);
                if is_unsafe_file_name(&old_file_name) {
                    warn!(user_id = user.id, file = %old_file_name, "Skipped pruning an unsafe avatar name.");
                } else {
                    let removed = self.delete_file(&old_file_name).await;
                    debug!(user_id = user.id, file = %old_file_name, removed, "Pruned previous avatar.");
                }
            }
        }

        let target = self.storage_location.join(&file_name);
        write_replacing(&target, content)
            .await
            .map_err(|source| StorageError::Write {
                file_name: file_name.clone(),
                source,
            })?;

        info!(user_id = user.id, file = %file_name, bytes = content.len(), "Stored avatar.");
        Ok(file_name)
    }

    async fn load_file_as_resource(&self, file_name: &str) -> Result<FileResource, StorageError> {
        let not_found = || StorageError::NotFound(file_name.to_string());
        if is_temp_upload_name(file_name) {
            return Err(not_found());
        }
        let path = resolve_within(&self.storage_location, file_name).ok_or_else(not_found)?;

        let metadata = tokio::fs::metadata(&path).await.map_err(|_| not_found())?;
        if !metadata.is_file() {
            return Err(not_found());
        }
        let file = tokio::fs::File::open(&path).await.map_err(|_| not_found())?;

        Ok(FileResource {
            file_name: file_name.to_string(),
            path,
            len: metadata.len(),
            file,
        })
    }

    async fn delete_file(&self, file_name: &str) -> bool {
        let Some(path) = resolve_within(&self.storage_location, file_name) else {
            warn!(file = %file_name, "Refused to delete a path outside avatar storage.");
            return false;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) => {
                debug!(file = %file_name, error = %e, "Avatar file not deleted.");
                false
            }
        }
    }
}
