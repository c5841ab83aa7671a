use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::database::models::category::Category;
use crate::database::repository::CategoryRepository;
use crate::error::ApiError;
use crate::utils::slug::slugify;

use super::{max_chars, optional, required, ServiceResult};

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.list().await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> ServiceResult<Category> {
        self.categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))
    }

    pub async fn create(&self, input: CategoryInput) -> ServiceResult<Category> {
        let name = required(&input.name, "name")?;
        max_chars(&name, 100, "name")?;

        if self.categories.exists_by_name(&name).await? {
            return Err(ApiError::conflict("Category already exists"));
        }

        let slug = slug_for(&name)?;
        if self.categories.exists_by_slug(&slug).await? {
            return Err(ApiError::conflict("Category slug already exists"));
        }

        let description = optional(input.description);
        let category = self.categories.create(&name, &slug, description.as_deref()).await?;
        info!("Created category {} ({})", category.id, category.slug);
        Ok(category)
    }

    pub async fn update(&self, id: i64, input: CategoryInput) -> ServiceResult<Category> {
        let existing = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;

        let name = required(&input.name, "name")?;
        max_chars(&name, 100, "name")?;

        if name != existing.name && self.categories.exists_by_name(&name).await? {
            return Err(ApiError::conflict("Category already exists"));
        }

        let slug = slug_for(&name)?;
        if slug != existing.slug && self.categories.exists_by_slug(&slug).await? {
            return Err(ApiError::conflict("Category slug already exists"));
        }

        let description = optional(input.description);
        Ok(self.categories.update(id, &name, &slug, description.as_deref()).await?)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if self.categories.find_by_id(id).await?.is_none() {
            return Err(ApiError::not_found("Category not found"));
        }
        self.categories.delete(id).await?;
        info!("Deleted category {}", id);
        Ok(())
    }
}

fn slug_for(name: &str) -> ServiceResult<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ApiError::invalid_field("name", "name must contain letters or numbers"));
    }
    Ok(slug)
}
