use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::database::models::tag::Tag;
use crate::database::repository::TagRepository;
use crate::error::ApiError;
use crate::utils::slug::slugify;

use super::{max_chars, required, ServiceResult};

#[derive(Debug, Deserialize)]
pub struct TagInput {
    pub name: String,
}

#[derive(Clone)]
pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Tag>> {
        Ok(self.tags.list().await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> ServiceResult<Tag> {
        self.tags
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ApiError::not_found("Tag not found"))
    }

    pub async fn create(&self, input: TagInput) -> ServiceResult<Tag> {
        let (name, slug) = validated(&input)?;

        if self.tags.exists_by_name(&name).await? {
            return Err(ApiError::conflict("Tag already exists"));
        }
        if self.tags.exists_by_slug(&slug).await? {
            return Err(ApiError::conflict("Tag slug already exists"));
        }

        let tag = self.tags.create(&name, &slug).await?;
        info!("Created tag {} ({})", tag.id, tag.slug);
        Ok(tag)
    }

    pub async fn update(&self, id: i64, input: TagInput) -> ServiceResult<Tag> {
        let existing = self
            .tags
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Tag not found"))?;

        let (name, slug) = validated(&input)?;

        if name != existing.name && self.tags.exists_by_name(&name).await? {
            return Err(ApiError::conflict("Tag already exists"));
        }
        if slug != existing.slug && self.tags.exists_by_slug(&slug).await? {
            return Err(ApiError::conflict("Tag slug already exists"));
        }

        Ok(self.tags.update(id, &name, &slug).await?)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if self.tags.find_by_id(id).await?.is_none() {
            return Err(ApiError::not_found("Tag not found"));
        }
        self.tags.delete(id).await?;
        info!("Deleted tag {}", id);
        Ok(())
    }
}

fn validated(input: &TagInput) -> ServiceResult<(String, String)> {
    let name = required(&input.name, "name")?;
    max_chars(&name, 50, "name")?;
    let slug = slugify(&name);
    if slug.is_empty() {
        return Err(ApiError::invalid_field("name", "name must contain letters or numbers"));
    }
    Ok((name, slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn input(name: &str) -> TagInput {
        TagInput { name: name.into() }
    }

    #[tokio::test]
    async fn crud_round() {
        let service = TagService::new(MemoryStore::new());
        let rust = service.create(input("Rust Lang")).await.unwrap();
        assert_eq!(rust.slug, "rust-lang");

        assert_eq!(service.create(input("Rust Lang")).await.unwrap_err().status_code(), 409);
        assert_eq!(service.create(input("")).await.unwrap_err().status_code(), 400);

        let renamed = service.update(rust.id, input("Rust")).await.unwrap();
        assert_eq!(renamed.slug, "rust");
        assert_eq!(service.get_by_slug("rust").await.unwrap().id, rust.id);

        service.delete(rust.id).await.unwrap();
        assert_eq!(service.delete(rust.id).await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn symbol_only_names_are_rejected() {
        let service = TagService::new(MemoryStore::new());
        assert_eq!(service.create(input("!!!")).await.unwrap_err().status_code(), 400);
    }
}
