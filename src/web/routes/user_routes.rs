use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::info;

use crate::db::entities::user;
use crate::db::services::user_service;
use crate::web::models::{DeleteAvatarResponse, UploadFileResponse};
use crate::web::{AppError, AppState};

const AVATAR_FIELD: &str = "file";

pub fn create_user_router() -> Router<Arc<AppState>> {
    Router::new().route("/{user_id}/avatar", post(upload_avatar).delete(delete_avatar))
}

async fn find_user(app_state: &AppState, user_id: i32) -> Result<user::Model, AppError> {
    user_service::get_user_by_id(&app_state.db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(err.body_text())
    }
}

async fn upload_avatar(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<UploadFileResponse>, AppError> {
    let user = find_user(&app_state, user_id).await?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let original_file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((original_file_name, content_type, data));
        break;
    }
    let (original_file_name, content_type, data) = upload.ok_or_else(|| {
        AppError::InvalidInput(format!("Multipart field '{AVATAR_FIELD}' is required"))
    })?;

    let file_name = app_state
        .avatar_storage
        .store_file(&data, original_file_name.as_deref(), &user)
        .await?;
    user_service::update_avatar_url(&app_state.db_pool, user, &file_name).await?;
    info!(user_id, file = %file_name, "Avatar updated.");

    let file_type = content_type.unwrap_or_else(|| {
        mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string()
    });
    Ok(Json(UploadFileResponse {
        file_download_uri: format!("/api/avatar/{}", urlencoding::encode(&file_name)),
        file_name,
        file_type,
        size: data.len() as u64,
    }))
}

async fn delete_avatar(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<DeleteAvatarResponse>, AppError> {
    let user = find_user(&app_state, user_id).await?;

    let deleted = match user.avatar_url.as_deref().filter(|url| !url.is_empty()) {
        Some(file_name) => app_state.avatar_storage.delete_file(file_name).await,
        None => false,
    };
    if user.avatar_url.is_some() {
        user_service::clear_avatar_url(&app_state.db_pool, user).await?;
    }

    Ok(Json(DeleteAvatarResponse { deleted }))
}
