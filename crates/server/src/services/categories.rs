//! Catalog categories.

use std::sync::Arc;
use std::time::Duration;

use bazaar_core::{CategoryId, PageMeta};

use crate::db::categories::CategoryStore;
use crate::error::ApiError;
use crate::models::{Category, CategoryInput};

use super::{bounded, page_params};

/// Category service.
pub struct CategoryService {
    categories: Arc<dyn CategoryStore>,
    deadline: Duration,
}

impl CategoryService {
    #[must_use]
    pub fn new(categories: Arc<dyn CategoryStore>, deadline: Duration) -> Self {
        Self {
            categories,
            deadline,
        }
    }

    pub async fn list(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<(Vec<Category>, PageMeta), ApiError> {
        let (page, limit) = page_params(page, limit);
        let total = bounded(self.deadline, self.categories.count()).await?;
        let categories = bounded(
            self.deadline,
            self.categories.list(PageMeta::skip(page, limit), limit),
        )
        .await?;
        Ok((categories, PageMeta::compute(page, limit, total)))
    }

    pub async fn get(&self, id: CategoryId) -> Result<Category, ApiError> {
        self.find(id).await
    }

    pub async fn create(&self, input: CategoryInput) -> Result<Category, ApiError> {
        let Some(name) = input.name.filter(|n| !n.trim().is_empty()) else {
            return Err(ApiError::InvalidArgument(
                "Category name is required".to_owned(),
            ));
        };
        let category = Category::new(name, input.description);
        bounded(self.deadline, self.categories.insert(&category)).await?;
        Ok(category)
    }

    pub async fn update(&self, id: CategoryId, input: CategoryInput) -> Result<Category, ApiError> {
        let mut category = self.find(id).await?;
        category.apply_update(input);
        bounded(self.deadline, self.categories.update(&category)).await?;
        Ok(category)
    }

    pub async fn delete(&self, id: CategoryId) -> Result<(), ApiError> {
        let removed = bounded(self.deadline, self.categories.delete(id)).await?;
        if removed {
            Ok(())
        } else {
            Err(ApiError::NotFound("Category not found".to_owned()))
        }
    }

    async fn find(&self, id: CategoryId) -> Result<Category, ApiError> {
        bounded(self.deadline, self.categories.find(id))
            .await?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::memory::MemoryCategoryStore;

    fn service() -> CategoryService {
        CategoryService::new(
            Arc::new(MemoryCategoryStore::default()),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn create_requires_a_name() {
        let err = service()
            .create(CategoryInput::default())
            .await
            .expect_err("must reject");
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let service = service();
        let input = CategoryInput {
            name: Some("Lighting".to_owned()),
            description: None,
        };
        service.create(input.clone()).await.expect("first");
        let err = service.create(input).await.expect_err("duplicate");
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_preserves_absent_fields() {
        let service = service();
        let category = service
            .create(CategoryInput {
                name: Some("Lighting".to_owned()),
                description: Some("Lamps and bulbs".to_owned()),
            })
            .await
            .expect("create");

        let updated = service
            .update(
                category.id,
                CategoryInput {
                    name: Some("Lights".to_owned()),
                    description: None,
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.name, "Lights");
        assert_eq!(updated.description.as_deref(), Some("Lamps and bulbs"));
    }
}
