use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::debug;

use crate::db::models::PageRequest;
use crate::web::models::{CreateTagRequest, MessageResponse, TagQuery};
use crate::web::{AppError, AppState};

// --- Route Handlers ---

fn unsupported_action(action: &str) -> AppError {
    AppError::InvalidInput(format!("Unsupported action '{action}'"))
}

fn page_request(query: &TagQuery) -> Result<PageRequest, AppError> {
    PageRequest::from_params(query.page, query.size, query.sort.as_deref()).map_err(AppError::InvalidInput)
}

async fn create_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<TagQuery>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    if query.action != "create" {
        return Err(unsupported_action(&query.action));
    }
    app_state.tag_service.create(payload.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Tag title created in database!")),
    ))
}

/// Serves both `action=list` and `action=search`; an empty result is 204.
async fn get_tags_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<TagQuery>,
) -> Result<Response, AppError> {
    let request = page_request(&query)?;
    let page = match query.action.as_str() {
        "list" => app_state.tag_service.list(&request).await?,
        "search" => {
            let name = query.name.as_deref().ok_or_else(|| {
                AppError::InvalidInput("Required parameter 'name' is missing".to_string())
            })?;
            app_state.tag_service.search(name, &request).await?
        }
        other => return Err(unsupported_action(other)),
    };

    match page {
        Some(page) => Ok(Json(page).into_response()),
        None => {
            debug!(action = %query.action, "No tags matched.");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

async fn delete_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<TagQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    if query.action != "delete" {
        return Err(unsupported_action(&query.action));
    }
    let id = query
        .id
        .ok_or_else(|| AppError::InvalidInput("Required parameter 'id' is missing".to_string()))?;
    app_state.tag_service.delete_by_id(id).await?;
    Ok(Json(MessageResponse::new("Tag title removed in database!")))
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/tag",
        get(get_tags_handler)
            .post(create_tag_handler)
            .delete(delete_tag_handler),
    )
}
