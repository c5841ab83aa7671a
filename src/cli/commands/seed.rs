use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::password::hash_password;
use crate::cli::utils::{connect, output_success};
use crate::cli::OutputFormat;
use crate::database::models::user::NewUser;
use crate::services::category_service::CategoryInput;
use crate::services::post_service::CreatePostInput;
use crate::services::tag_service::TagInput;
use crate::services::{CategoryService, PostService, TagService};
use crate::state::Repositories;
use crate::utils::cache::ViewCountCache;
use crate::utils::slugify;

const BUILTIN_FIXTURE: &str = include_str!("../../../fixtures/seed.yaml");

#[derive(Debug, Deserialize)]
pub struct SeedFixture {
    pub admin: AdminFixture,
    #[serde(default)]
    pub categories: Vec<CategoryFixture>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub posts: Vec<PostFixture>,
}

#[derive(Debug, Deserialize)]
pub struct AdminFixture {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryFixture {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostFixture {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Rows created by one seed run; existing rows are not counted
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub admin_created: bool,
    pub categories: usize,
    pub tags: usize,
    pub posts: usize,
}

impl SeedFixture {
    pub fn builtin() -> anyhow::Result<Self> {
        Self::parse(BUILTIN_FIXTURE)
    }

    pub fn parse(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid seed fixture")
    }
}

pub async fn handle(fixture: Option<PathBuf>, output_format: OutputFormat) -> anyhow::Result<()> {
    let fixture = match fixture {
        Some(path) => {
            let yaml = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            SeedFixture::parse(&yaml)?
        }
        None => SeedFixture::builtin()?,
    };

    let pool = connect().await?;
    let report = seed(&Repositories::postgres(&pool), &fixture).await?;
    pool.close().await;

    output_success(
        output_format,
        &format!(
            "Seeded {} categories, {} tags, {} posts",
            report.categories, report.tags, report.posts
        ),
        Some(json!({ "seeded": report })),
    )
}

/// Load a fixture, skipping rows that already exist.
pub async fn seed(repos: &Repositories, fixture: &SeedFixture) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    let email = fixture.admin.email.trim().to_lowercase();
    let admin = match repos.users.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            report.admin_created = true;
            repos
                .users
                .create(NewUser {
                    email,
                    password_hash: hash_password(&fixture.admin.password)?,
                    nickname: fixture.admin.nickname.clone(),
                    is_admin: true,
                })
                .await?
        }
    };

    let categories = CategoryService::new(repos.categories.clone());
    for category in &fixture.categories {
        if repos.categories.exists_by_name(&category.name).await? {
            continue;
        }
        categories
            .create(CategoryInput {
                name: category.name.clone(),
                description: category.description.clone(),
            })
            .await
            .map_err(|e| anyhow::anyhow!("category {}: {}", category.name, e))?;
        report.categories += 1;
    }

    let tags = TagService::new(repos.tags.clone());
    for name in &fixture.tags {
        if repos.tags.exists_by_name(name).await? {
            continue;
        }
        tags.create(TagInput { name: name.clone() })
            .await
            .map_err(|e| anyhow::anyhow!("tag {}: {}", name, e))?;
        report.tags += 1;
    }

    let posts = PostService::new(
        repos.posts.clone(),
        repos.users.clone(),
        repos.categories.clone(),
        repos.tags.clone(),
        repos.likes.clone(),
        repos.bookmarks.clone(),
        ViewCountCache::new(),
    );
    for post in &fixture.posts {
        if repos.posts.find_by_slug(&slugify(&post.title)).await?.is_some() {
            continue;
        }

        let category_id = match &post.category {
            Some(name) => repos.categories.find_by_slug(&slugify(name)).await?.map(|c| c.id),
            None => None,
        };
        let mut tag_ids = Vec::new();
        for name in &post.tags {
            if let Some(tag) = repos.tags.find_by_slug(&slugify(name)).await? {
                tag_ids.push(tag.id);
            }
        }

        posts
            .create(
                admin.id,
                CreatePostInput {
                    title: post.title.clone(),
                    slug: None,
                    content: post.content.clone(),
                    excerpt: post.excerpt.clone(),
                    featured_image: None,
                    status: Some("published".to_string()),
                    published_at: None,
                    meta_title: None,
                    meta_description: None,
                    meta_keywords: None,
                    category_id,
                    tag_ids,
                },
            )
            .await
            .map_err(|e| anyhow::anyhow!("post {}: {}", post.title, e))?;
        report.posts += 1;
    }

    tracing::info!(?report, "Seed complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    #[test]
    fn builtin_fixture_parses() {
        let fixture = SeedFixture::builtin().unwrap();
        assert_eq!(fixture.admin.email, "admin@viblog.com");
        let names: Vec<_> = fixture.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Technology", "Lifestyle", "Travel"]);
    }

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let store = MemoryStore::new();
        let repos = store.repositories();
        let fixture = SeedFixture::builtin().unwrap();

        let first = seed(&repos, &fixture).await.unwrap();
        assert!(first.admin_created);
        assert_eq!(first.categories, 3);
        assert_eq!(first.tags, fixture.tags.len());
        assert_eq!(first.posts, fixture.posts.len());

        let admin = repos.users.find_by_email("admin@viblog.com").await.unwrap().unwrap();
        assert!(admin.is_admin);

        let technology = repos.categories.find_by_slug("technology").await.unwrap().unwrap();
        assert_eq!(technology.post_count, 1);

        let second = seed(&repos, &fixture).await.unwrap();
        assert_eq!(second, SeedReport::default());
    }
}
