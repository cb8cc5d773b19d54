use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::web::{AppError, AppState};

pub fn create_avatar_router() -> Router<Arc<AppState>> {
    Router::new().route("/{file_name}", get(download_avatar))
}

/// Streams a stored avatar back to the client.
async fn download_avatar(
    State(app_state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError> {
    let resource = app_state.avatar_storage.load_file_as_resource(&file_name).await?;

    let mime_type = mime_guess::from_path(&resource.path).first_or_octet_stream();
    let disposition = format!("inline; filename=\"{}\"", resource.file_name.replace('"', ""));
    let headers = [
        (header::CONTENT_TYPE, mime_type.to_string()),
        (header::CONTENT_LENGTH, resource.len.to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    let body = Body::from_stream(ReaderStream::new(resource.file));

    Ok((headers, body).into_response())
}
