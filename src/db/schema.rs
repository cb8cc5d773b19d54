use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};
use tracing::debug;

use crate::db::entities::{tag, user};

/// Creates the tables backing the entities if they are missing.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table_if_missing(db, user::Entity).await?;
    create_table_if_missing(db, tag::Entity).await?;
    Ok(())
}

async fn create_table_if_missing<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    debug!(table = entity.table_name(), "Ensured table exists.");
    Ok(())
}
