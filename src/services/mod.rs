pub mod avatar_storage_service;
pub mod storage_service;

pub use avatar_storage_service::AvatarStorageService;
pub use storage_service::{FileResource, StorageError, StorageService};
