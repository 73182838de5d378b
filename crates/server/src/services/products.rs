//! Catalog products.

use std::sync::Arc;
use std::time::Duration;

use bazaar_core::{PageMeta, ProductId};

use crate::db::products::ProductStore;
use crate::error::ApiError;
use crate::models::{Product, ProductInput};

use super::images::{ImageStorage, ImageUpload};
use super::{bounded, page_params};

/// Product service.
pub struct ProductService {
    products: Arc<dyn ProductStore>,
    images: Arc<dyn ImageStorage>,
    deadline: Duration,
}

impl ProductService {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductStore>,
        images: Arc<dyn ImageStorage>,
        deadline: Duration,
    ) -> Self {
        Self {
            products,
            images,
            deadline,
        }
    }

    /// Public catalog browse.
    pub async fn list(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<(Vec<Product>, PageMeta), ApiError> {
        let (page, limit) = page_params(page, limit);
        let total = bounded(self.deadline, self.products.count()).await?;
        let products = bounded(
            self.deadline,
            self.products.list(PageMeta::skip(page, limit), limit),
        )
        .await?;
        Ok((products, PageMeta::compute(page, limit, total)))
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, ApiError> {
        self.find(id).await
    }

    /// Create a product, storing any uploaded images first.
    pub async fn create(
        &self,
        input: ProductInput,
        uploads: Vec<ImageUpload>,
    ) -> Result<Product, ApiError> {
        let Some(name) = input.name.clone().filter(|n| !n.trim().is_empty()) else {
            return Err(ApiError::InvalidArgument(
                "Product name is required".to_owned(),
            ));
        };

        let images = self.store_images(uploads).await?;
        let product = Product::from_input(name, input, images);
        bounded(self.deadline, self.products.insert(&product)).await?;
        Ok(product)
    }

    /// Partial update; uploaded images append to the existing list.
    pub async fn update(
        &self,
        id: ProductId,
        input: ProductInput,
        uploads: Vec<ImageUpload>,
    ) -> Result<Product, ApiError> {
        let mut product = self.find(id).await?;
        let new_images = self.store_images(uploads).await?;
        product.apply_update(input, new_images);
        bounded(self.deadline, self.products.update(&product)).await?;
        Ok(product)
    }

    /// Attach additional images to an existing product.
    pub async fn upload_images(
        &self,
        id: ProductId,
        uploads: Vec<ImageUpload>,
    ) -> Result<Product, ApiError> {
        if uploads.is_empty() {
            return Err(ApiError::InvalidArgument(
                "No images supplied".to_owned(),
            ));
        }
        let mut product = self.find(id).await?;
        let new_images = self.store_images(uploads).await?;
        product.apply_update(ProductInput::default(), new_images);
        bounded(self.deadline, self.products.update(&product)).await?;
        Ok(product)
    }

    /// Admin-only removal.
    pub async fn delete(&self, id: ProductId) -> Result<(), ApiError> {
        let removed = bounded(self.deadline, self.products.delete(id)).await?;
        if removed {
            Ok(())
        } else {
            Err(ApiError::NotFound("Product not found".to_owned()))
        }
    }

    async fn find(&self, id: ProductId) -> Result<Product, ApiError> {
        bounded(self.deadline, self.products.find(id))
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))
    }

    async fn store_images(&self, uploads: Vec<ImageUpload>) -> Result<Vec<String>, ApiError> {
        let mut urls = Vec::with_capacity(uploads.len());
        for upload in uploads {
            urls.push(self.images.store(upload).await?);
        }
        Ok(urls)
    }
}
