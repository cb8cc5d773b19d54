use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set, SqlErr,
};
use tracing::{debug, info};

use crate::db::entities::{prelude::Tag, tag};
use crate::db::models::{Direction, Page, PageRequest};

#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("A tag named '{0}' already exists.")]
    DuplicateName(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Tag operations backed by the `tags` table.
#[derive(Clone)]
pub struct TagService {
    db: DatabaseConnection,
}

impl TagService {
    pub fn new(db: DatabaseConnection) -> Self {
        TagService { db }
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<tag::Model>, TagServiceError> {
        Ok(Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    /// Inserts a tag unless one with exactly the same name already exists.
    pub async fn create(&self, name: String) -> Result<tag::Model, TagServiceError> {
        if name.trim().is_empty() {
            return Err(TagServiceError::InvalidInput("Tag name must not be blank.".to_string()));
        }
        if self.find_by_name(&name).await?.is_some() {
            return Err(TagServiceError::DuplicateName(name));
        }

        let new_tag = tag::ActiveModel {
            name: Set(name.clone()),
            ..Default::default()
        };

        match new_tag.insert(&self.db).await {
            Ok(model) => {
                info!(tag_id = model.id, name = %model.name, "Tag created.");
                Ok(model)
            }
            // Lost a race against a concurrent insert of the same name.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(TagServiceError::DuplicateName(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns `None` when the store holds no tags at all.
    pub async fn list(&self, request: &PageRequest) -> Result<Option<Page<tag::Model>>, TagServiceError> {
        self.fetch_page(Tag::find(), request).await
    }

    /// Returns `None` when no tag name contains `name_fragment`.
    pub async fn search(
        &self,
        name_fragment: &str,
        request: &PageRequest,
    ) -> Result<Option<Page<tag::Model>>, TagServiceError> {
        let query = Tag::find().filter(tag::Column::Name.contains(name_fragment));
        self.fetch_page(query, request).await
    }

    /// Deletes the tag if present. Missing ids are not an error.
    pub async fn delete_by_id(&self, id: i32) -> Result<(), TagServiceError> {
        let result = Tag::delete_by_id(id).exec(&self.db).await?;
        debug!(tag_id = id, rows_affected = result.rows_affected, "Tag delete executed.");
        Ok(())
    }

    async fn fetch_page(
        &self,
        query: Select<Tag>,
        request: &PageRequest,
    ) -> Result<Option<Page<tag::Model>>, TagServiceError> {
        let (column, order) = sort_column(request)?;
        let paginator = query.order_by(column, order).paginate(&self.db, request.size);

        let totals = paginator.num_items_and_pages().await?;
        if totals.number_of_items == 0 {
            return Ok(None);
        }

        let content = paginator.fetch_page(request.page).await?;
        Ok(Some(Page::new(
            content,
            request,
            totals.number_of_items,
            totals.number_of_pages,
        )))
    }
}

fn sort_column(request: &PageRequest) -> Result<(tag::Column, Order), TagServiceError> {
    let Some(sort) = &request.sort else {
        return Ok((tag::Column::Id, Order::Asc));
    };
    let column = match sort.property.as_str() {
        "id" => tag::Column::Id,
        "name" => tag::Column::Name,
        other => {
            return Err(TagServiceError::InvalidInput(format!(
                "Cannot sort tags by '{other}'"
            )));
        }
    };
    let order = match sort.direction {
        Direction::Asc => Order::Asc,
        Direction::Desc => Order::Desc,
    };
    Ok((column, order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Sort;
    use crate::db::test_db;

    async fn service_with(names: &[&str]) -> TagService {
        let service = TagService::new(test_db().await);
        for name in names {
            service.create(name.to_string()).await.unwrap();
        }
        service
    }

    fn names(page: &Page<tag::Model>) -> Vec<&str> {
        page.content.iter().map(|t| t.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_then_list_contains_tag_once() {
        let service = service_with(&[]).await;
        let created = service.create("rock".to_string()).await.unwrap();
        assert_eq!(created.name, "rock");

        let page = service.list(&PageRequest::default()).await.unwrap().unwrap();
        assert_eq!(names(&page), vec!["rock"]);
        assert_eq!(page.total_elements, 1);

        let found = service.search("roc", &PageRequest::default()).await.unwrap().unwrap();
        assert_eq!(found.content, vec![created]);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_is_rejected_without_write() {
        let service = service_with(&["jazz"]).await;

        let err = service.create("jazz".to_string()).await.unwrap_err();
        assert!(matches!(err, TagServiceError::DuplicateName(ref n) if n == "jazz"));

        let page = service.list(&PageRequest::default()).await.unwrap().unwrap();
        assert_eq!(page.total_elements, 1);
    }

    #[tokio::test]
    async fn test_create_blank_name_is_invalid() {
        let service = service_with(&[]).await;
        let err = service.create("   ".to_string()).await.unwrap_err();
        assert!(matches!(err, TagServiceError::InvalidInput(_)));
        assert!(service.list(&PageRequest::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_search_signal_empty() {
        let service = service_with(&[]).await;
        assert!(service.list(&PageRequest::default()).await.unwrap().is_none());

        let service = service_with(&["pop"]).await;
        assert!(service.search("metal", &PageRequest::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_page_past_end_is_not_empty_signal() {
        let service = service_with(&["a", "b", "c"]).await;
        let request = PageRequest::from_params(Some(5), Some(2), None).unwrap();

        let page = service.list(&request).await.unwrap().unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_list_paginates_in_id_order() {
        let service = service_with(&["c", "a", "b"]).await;
        let first = PageRequest::from_params(Some(0), Some(2), None).unwrap();
        let second = PageRequest::from_params(Some(1), Some(2), None).unwrap();

        let page = service.list(&first).await.unwrap().unwrap();
        assert_eq!(names(&page), vec!["c", "a"]);
        assert!(page.first);
        assert!(!page.last);

        let page = service.list(&second).await.unwrap().unwrap();
        assert_eq!(names(&page), vec!["b"]);
        assert!(page.last);
    }

    #[tokio::test]
    async fn test_list_sorted_by_name_desc() {
        let service = service_with(&["beta", "alpha", "gamma"]).await;
        let request = PageRequest {
            sort: Some(Sort::parse("name,desc").unwrap()),
            ..PageRequest::default()
        };

        let page = service.list(&request).await.unwrap().unwrap();
        assert_eq!(names(&page), vec!["gamma", "beta", "alpha"]);
    }

    #[tokio::test]
    async fn test_unknown_sort_property_is_invalid() {
        let service = service_with(&["x"]).await;
        let request = PageRequest {
            sort: Some(Sort::parse("color").unwrap()),
            ..PageRequest::default()
        };
        let err = service.list(&request).await.unwrap_err();
        assert!(matches!(err, TagServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_search_matches_substring() {
        let service = service_with(&["hardrock", "softrock", "blues"]).await;
        let page = service.search("rock", &PageRequest::default()).await.unwrap().unwrap();
        assert_eq!(names(&page), vec!["hardrock", "softrock"]);
    }

    #[tokio::test]
    async fn test_delete_by_id_is_idempotent() {
        let service = service_with(&["temp"]).await;
        let tag = service.find_by_name("temp").await.unwrap().unwrap();

        service.delete_by_id(tag.id).await.unwrap();
        service.delete_by_id(tag.id).await.unwrap();
        service.delete_by_id(9_999).await.unwrap();

        assert!(service.find_by_name("temp").await.unwrap().is_none());
        assert!(service.list(&PageRequest::default()).await.unwrap().is_none());
    }
}
