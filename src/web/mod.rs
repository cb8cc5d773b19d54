use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::get,
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::db::entities::user;
use crate::db::services::TagService;
use crate::server::config::ServerConfig;
use crate::services::StorageService;
use crate::web::routes::*;

pub use error::AppError;

pub mod error;
pub mod models;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub tag_service: Arc<TagService>,
    pub avatar_storage: Arc<dyn StorageService<user::Model>>,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(
    db_pool: DatabaseConnection,
    tag_service: Arc<TagService>,
    avatar_storage: Arc<dyn StorageService<user::Model>>,
    config: &ServerConfig,
) -> Router {
    let app_state = Arc::new(AppState {
        db_pool,
        tag_service,
        avatar_storage,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .merge(tag_routes::create_tags_router())
        .nest(
            "/api/user",
            user_routes::create_user_router().layer(DefaultBodyLimit::max(config.max_upload_size)),
        )
        .nest("/api/avatar", avatar_routes::create_avatar_router())
        .with_state(app_state)
        .layer(cors)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db::test_db;
    use crate::services::AvatarStorageService;
    use axum::body::Body;
    use axum::http::{Request, Response};
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    pub fn test_config(avatar_upload_dir: &std::path::Path) -> ServerConfig {
        ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            avatar_upload_dir: avatar_upload_dir.to_string_lossy().into_owned(),
            log_dir: "logs".to_string(),
            max_upload_size: 1024 * 1024,
        }
    }

    /// Router over a fresh in-memory database and a temporary avatar directory.
    pub async fn test_app() -> (Router, DatabaseConnection, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = test_db().await;
        let config = test_config(&dir.path().join("avatars"));
        let storage = AvatarStorageService::new(&config.avatar_upload_dir).unwrap();
        let router = create_axum_router(
            db.clone(),
            Arc::new(TagService::new(db.clone())),
            Arc::new(storage),
            &config,
        );
        (router, db, dir)
    }

    pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
        router.clone().oneshot(request).await.unwrap()
    }

    pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (router, _db, _dir) = test_app().await;
        let response = send(
            &router,
            Request::get("/api/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"OK");
    }
}
