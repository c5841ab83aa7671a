use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::database::models::category::Category;
use crate::database::models::post::{Post, PostCounter, PostDraft, PostStatus};
use crate::database::models::tag::Tag;
use crate::database::repository::{
    BookmarkRepository, CategoryRepository, LikeRepository, PostRepository, TagRepository, UserRepository,
};
use crate::error::ApiError;
use crate::utils::cache::ViewCountCache;
use crate::utils::pagination::{PageRequest, Pagination};
use crate::utils::slug::slugify;

use super::{max_chars, optional, required, ServiceResult};

pub const MAX_TAGS_PER_POST: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    pub id: i64,
    pub nickname: String,
    pub avatar_url: Option<String>,
}

/// A post with everything a reader sees alongside it
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<AuthorSummary>,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub is_liked: bool,
    pub is_bookmarked: bool,
}

#[derive(Debug, Serialize)]
pub struct PostList {
    pub posts: Vec<PostView>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct ViewOutcome {
    pub counted: bool,
    pub view_count: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Partial update; absent fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub category_id: Option<i64>,
    pub tag_ids: Option<Vec<i64>>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
    likes: Arc<dyn LikeRepository>,
    bookmarks: Arc<dyn BookmarkRepository>,
    views: ViewCountCache,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        tags: Arc<dyn TagRepository>,
        likes: Arc<dyn LikeRepository>,
        bookmarks: Arc<dyn BookmarkRepository>,
        views: ViewCountCache,
    ) -> Self {
        Self {
            posts,
            users,
            categories,
            tags,
            likes,
            bookmarks,
            views,
        }
    }

    pub async fn list(&self, page: PageRequest, viewer: Option<i64>) -> ServiceResult<PostList> {
        let (posts, total) = self.posts.list_published(Utc::now(), &page).await?;
        self.present_page(posts, total, &page, viewer).await
    }

    pub async fn search(&self, query: &str, page: PageRequest, viewer: Option<i64>) -> ServiceResult<PostList> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::invalid_field("q", "Search query is required"));
        }
        max_chars(query, 100, "q")?;

        let (posts, total) = self.posts.search_published(query, Utc::now(), &page).await?;
        self.present_page(posts, total, &page, viewer).await
    }

    pub async fn list_by_category(&self, slug: &str, page: PageRequest, viewer: Option<i64>) -> ServiceResult<PostList> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;

        let (posts, total) = self
            .posts
            .list_published_by_category(category.id, Utc::now(), &page)
            .await?;
        self.present_page(posts, total, &page, viewer).await
    }

    pub async fn list_by_tag(&self, slug: &str, page: PageRequest, viewer: Option<i64>) -> ServiceResult<PostList> {
        let tag = self
            .tags
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ApiError::not_found("Tag not found"))?;

        let (posts, total) = self.posts.list_published_by_tag(tag.id, Utc::now(), &page).await?;
        self.present_page(posts, total, &page, viewer).await
    }

    pub async fn list_bookmarked(&self, user_id: i64, page: PageRequest) -> ServiceResult<PostList> {
        let (ids, total) = self.bookmarks.list_post_ids(user_id, Utc::now(), &page).await?;
        let mut found: HashMap<i64, Post> = self
            .posts
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // Keep bookmark order
        let posts = ids.iter().filter_map(|id| found.remove(id)).collect();
        self.present_page(posts, total, &page, Some(user_id)).await
    }

    /// Fetch a post readers are allowed to see.
    pub async fn get(&self, id: i64, viewer: Option<i64>) -> ServiceResult<PostView> {
        let post = self.visible(id).await?;
        let mut views = self.present(vec![post], viewer).await?;
        views.pop().ok_or_else(|| ApiError::not_found("Post not found"))
    }

    /// Count a view unless this IP already viewed the post in the last 24h.
    pub async fn record_view(&self, id: i64, ip: &str, user_agent: Option<&str>) -> ServiceResult<ViewOutcome> {
        let post = self.visible(id).await?;

        // Check and mark under one lock so concurrent requests from the same IP count once
        if !self.views.try_mark(id, ip).await {
            return Ok(ViewOutcome {
                counted: false,
                view_count: post.view_count,
            });
        }

        let view_count = self.posts.adjust_counter(id, PostCounter::Views, 1).await?;
        self.posts.log_view(id, ip, user_agent).await?;
        debug!("Counted view of post {} from {}", id, ip);

        Ok(ViewOutcome {
            counted: true,
            view_count,
        })
    }

    pub async fn create(&self, author_id: i64, input: CreatePostInput) -> ServiceResult<PostView> {
        let title = required(&input.title, "title")?;
        max_chars(&title, 255, "title")?;
        let content = required(&input.content, "content")?;

        let slug = resolve_slug(input.slug.as_deref(), &title)?;
        if self.posts.find_by_slug(&slug).await?.is_some() {
            return Err(ApiError::conflict("Slug already exists"));
        }

        let status = parse_status(input.status.as_deref().unwrap_or("draft"))?;
        let published_at = publication_time(status, input.published_at)?;
        self.ensure_category(input.category_id).await?;
        let tag_ids = self.ensure_tags(input.tag_ids).await?;

        let draft = PostDraft {
            title,
            slug,
            content,
            excerpt: optional(input.excerpt),
            featured_image: optional(input.featured_image),
            status,
            published_at,
            meta_title: optional(input.meta_title),
            meta_description: optional(input.meta_description),
            meta_keywords: optional(input.meta_keywords),
            author_id,
            category_id: input.category_id,
            tag_ids: tag_ids.clone(),
        };

        let post = self.posts.create(draft).await?;
        self.shift_counts(None, &[], post.category_id, &tag_ids).await?;
        info!("Created post {} ({}) by user {}", post.id, post.slug, author_id);

        self.present_one(post, Some(author_id)).await
    }

    pub async fn update(&self, id: i64, actor_id: i64, input: UpdatePostInput) -> ServiceResult<PostView> {
        let existing = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;
        let old_tags = self.posts.tag_ids(id).await?;

        let title = match input.title {
            Some(title) => {
                let title = required(&title, "title")?;
                max_chars(&title, 255, "title")?;
                title
            }
            None => existing.title.clone(),
        };

        let slug = match input.slug {
            Some(slug) => resolve_slug(Some(&slug), &title)?,
            None => existing.slug.clone(),
        };
        if slug != existing.slug {
            if let Some(other) = self.posts.find_by_slug(&slug).await? {
                if other.id != id {
                    return Err(ApiError::conflict("Slug already exists"));
                }
            }
        }

        let content = match input.content {
            Some(content) => required(&content, "content")?,
            None => existing.content.clone(),
        };

        let status = match input.status.as_deref() {
            Some(raw) => parse_status(raw)?,
            None => parse_status(&existing.status)?,
        };
        let published_at = publication_time(status, input.published_at.or(existing.published_at))?;

        let category_id = match input.category_id {
            Some(category_id) => {
                self.ensure_category(Some(category_id)).await?;
                Some(category_id)
            }
            None => existing.category_id,
        };

        let tag_ids = match input.tag_ids {
            Some(tag_ids) => self.ensure_tags(tag_ids).await?,
            None => old_tags.clone(),
        };

        let draft = PostDraft {
            title,
            slug,
            content,
            excerpt: match input.excerpt {
                Some(excerpt) => optional(Some(excerpt)),
                None => existing.excerpt,
            },
            featured_image: match input.featured_image {
                Some(image) => optional(Some(image)),
                None => existing.featured_image,
            },
            status,
            published_at,
            meta_title: input.meta_title.or(existing.meta_title),
            meta_description: input.meta_description.or(existing.meta_description),
            meta_keywords: input.meta_keywords.or(existing.meta_keywords),
            author_id: existing.author_id,
            category_id,
            tag_ids: tag_ids.clone(),
        };

        let post = self.posts.update(id, draft).await?;
        self.shift_counts(existing.category_id, &old_tags, post.category_id, &tag_ids).await?;
        info!("Updated post {} by user {}", id, actor_id);

        self.present_one(post, Some(actor_id)).await
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let existing = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;
        let tags = self.posts.tag_ids(id).await?;

        self.posts.delete(id).await?;
        self.shift_counts(existing.category_id, &tags, None, &[]).await?;
        info!("Deleted post {}", id);
        Ok(())
    }

    /// A post readers may see: published, live and not deleted.
    pub(crate) async fn visible(&self, id: i64) -> ServiceResult<Post> {
        match self.posts.find_by_id(id).await? {
            Some(post) if post.is_visible(Utc::now()) => Ok(post),
            _ => Err(ApiError::not_found("Post not found")),
        }
    }

    async fn ensure_category(&self, category_id: Option<i64>) -> ServiceResult<()> {
        if let Some(category_id) = category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(ApiError::invalid_field("category_id", "Category not found"));
            }
        }
        Ok(())
    }

    async fn ensure_tags(&self, tag_ids: Vec<i64>) -> ServiceResult<Vec<i64>> {
        let mut seen = HashSet::new();
        let tag_ids: Vec<i64> = tag_ids.into_iter().filter(|id| seen.insert(*id)).collect();

        if tag_ids.len() > MAX_TAGS_PER_POST {
            return Err(ApiError::invalid_field(
                "tag_ids",
                format!("A post can have at most {} tags", MAX_TAGS_PER_POST),
            ));
        }
        if !tag_ids.is_empty() && self.tags.find_by_ids(&tag_ids).await?.len() != tag_ids.len() {
            return Err(ApiError::invalid_field("tag_ids", "Unknown tag"));
        }
        Ok(tag_ids)
    }

    /// Move category/tag post counts from the old assignment to the new one.
    async fn shift_counts(
        &self,
        old_category: Option<i64>,
        old_tags: &[i64],
        new_category: Option<i64>,
        new_tags: &[i64],
    ) -> ServiceResult<()> {
        if old_category != new_category {
            if let Some(id) = old_category {
                self.categories.adjust_post_count(id, -1).await?;
            }
            if let Some(id) = new_category {
                self.categories.adjust_post_count(id, 1).await?;
            }
        }

        for id in old_tags.iter().filter(|id| !new_tags.contains(id)) {
            self.tags.adjust_post_count(*id, -1).await?;
        }
        for id in new_tags.iter().filter(|id| !old_tags.contains(id)) {
            self.tags.adjust_post_count(*id, 1).await?;
        }
        Ok(())
    }

    async fn present_one(&self, post: Post, viewer: Option<i64>) -> ServiceResult<PostView> {
        let mut views = self.present(vec![post], viewer).await?;
        views.pop().ok_or_else(|| ApiError::internal_server_error("Failed to load post"))
    }

    async fn present_page(
        &self,
        posts: Vec<Post>,
        total: i64,
        page: &PageRequest,
        viewer: Option<i64>,
    ) -> ServiceResult<PostList> {
        Ok(PostList {
            posts: self.present(posts, viewer).await?,
            pagination: Pagination::new(page, total),
        })
    }

    async fn present(&self, posts: Vec<Post>, viewer: Option<i64>) -> ServiceResult<Vec<PostView>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<i64> = posts.iter().map(|p| p.id).collect();

        let mut author_ids: Vec<i64> = posts.iter().map(|p| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors: HashMap<i64, AuthorSummary> = self
            .users
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    AuthorSummary {
                        id: u.id,
                        nickname: u.nickname,
                        avatar_url: u.avatar_url,
                    },
                )
            })
            .collect();

        let mut categories: HashMap<i64, Category> = HashMap::new();
        for category_id in posts.iter().filter_map(|p| p.category_id) {
            if categories.contains_key(&category_id) {
                continue;
            }
            if let Some(category) = self.categories.find_by_id(category_id).await? {
                categories.insert(category_id, category);
            }
        }

        let (liked, bookmarked): (HashSet<i64>, HashSet<i64>) = match viewer {
            Some(user_id) => (
                self.likes.liked_post_ids(user_id, &post_ids).await?.into_iter().collect(),
                self.bookmarks
                    .bookmarked_post_ids(user_id, &post_ids)
                    .await?
                    .into_iter()
                    .collect(),
            ),
            None => (HashSet::new(), HashSet::new()),
        };

        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            let tag_ids = self.posts.tag_ids(post.id).await?;
            let tags = if tag_ids.is_empty() {
                Vec::new()
            } else {
                self.tags.find_by_ids(&tag_ids).await?
            };

            views.push(PostView {
                author: authors.get(&post.author_id).cloned(),
                category: post.category_id.and_then(|id| categories.get(&id).cloned()),
                tags,
                is_liked: liked.contains(&post.id),
                is_bookmarked: bookmarked.contains(&post.id),
                post,
            });
        }
        Ok(views)
    }
}

fn parse_status(raw: &str) -> ServiceResult<PostStatus> {
    raw.parse::<PostStatus>()
        .map_err(|msg| ApiError::invalid_field("status", msg))
}

fn resolve_slug(given: Option<&str>, title: &str) -> ServiceResult<String> {
    let source = given.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(title);
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(ApiError::invalid_field("slug", "slug must contain letters or numbers"));
    }
    max_chars(&slug, 255, "slug")?;
    Ok(slug)
}

/// Published posts default to "now"; scheduled posts need an explicit time.
fn publication_time(status: PostStatus, requested: Option<DateTime<Utc>>) -> ServiceResult<Option<DateTime<Utc>>> {
    match status {
        PostStatus::Draft => Ok(requested),
        PostStatus::Published => Ok(Some(requested.unwrap_or_else(Utc::now))),
        PostStatus::Scheduled => match requested {
            Some(at) => Ok(Some(at)),
            None => Err(ApiError::invalid_field(
                "published_at",
                "published_at is required for scheduled posts",
            )),
        },
    }
}
