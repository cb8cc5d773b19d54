use serde::{Deserialize, Serialize};

/// Query string shared by every `/api/tag` request; `action` picks the operation.
#[derive(Debug, Deserialize)]
pub struct TagQuery {
    pub action: String,
    pub name: Option<String>,
    pub id: Option<i32>,
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse { message: message.into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileResponse {
    pub file_name: String,
    pub file_download_uri: String,
    pub file_type: String,
    pub size: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteAvatarResponse {
    pub deleted: bool,
}
