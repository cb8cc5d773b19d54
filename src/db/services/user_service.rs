use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use crate::db::entities::{prelude::User, user};

// --- User Service Functions ---

/// Retrieves a user by their ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i32) -> Result<Option<user::Model>, DbErr> {
    User::find_by_id(user_id).one(db).await
}

/// Records `file_name` as the user's current avatar.
pub async fn update_avatar_url(
    db: &DatabaseConnection,
    user: user::Model,
    file_name: &str,
) -> Result<user::Model, DbErr> {
    let mut active_user: user::ActiveModel = user.into();
    active_user.avatar_url = Set(Some(file_name.to_string()));
    active_user.update(db).await
}

/// Forgets the user's avatar.
pub async fn clear_avatar_url(db: &DatabaseConnection, user: user::Model) -> Result<user::Model, DbErr> {
    let mut active_user: user::ActiveModel = user.into();
    active_user.avatar_url = Set(None);
    active_user.update(db).await
}

#[cfg(test)]
pub(crate) async fn insert_user(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        avatar_url: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[tokio::test]
    async fn test_avatar_url_roundtrip() {
        let db = test_db().await;
        let ann = insert_user(&db, "ann").await;
        assert!(ann.avatar_url.is_none());

        let updated = update_avatar_url(&db, ann.clone(), "1 - ann.png").await.unwrap();
        assert_eq!(updated.avatar_url.as_deref(), Some("1 - ann.png"));

        let reloaded = get_user_by_id(&db, ann.id).await.unwrap().unwrap();
        assert_eq!(reloaded, updated);

        let cleared = clear_avatar_url(&db, reloaded).await.unwrap();
        assert!(cleared.avatar_url.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let db = test_db().await;
        assert!(get_user_by_id(&db, 42).await.unwrap().is_none());
    }
}
