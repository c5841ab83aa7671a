//! In-memory repositories and fixtures for unit and router tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::auth::password::hash_password;
use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::category::Category;
use crate::database::models::comment::{Comment, NewComment};
use crate::database::models::interaction::{Bookmark, Like, LikeTarget};
use crate::database::models::notification::{NewNotification, Notification};
use crate::database::models::post::{Post, PostCounter, PostDraft, PostStatus};
use crate::database::models::tag::Tag;
use crate::database::models::user::{NewUser, ProfileChanges, User};
use crate::database::models::view_log::ViewLog;
use crate::database::repository::*;
use crate::services::{AdminService, CommentService, InteractionService, NotificationService, PostService};
use crate::state::{AppState, Repositories};
use crate::utils::cache::ViewCountCache;
use crate::utils::pagination::PageRequest;

pub const TEST_PASSWORD: &str = "Passw0rd!";

pub fn test_jwt() -> JwtManager {
    JwtManager::new(&AppConfig::development().jwt)
}

#[derive(Default)]
struct Tables {
    ids: HashMap<&'static str, i64>,
    users: Vec<User>,
    posts: Vec<Post>,
    post_tags: Vec<(i64, i64)>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    bookmarks: Vec<Bookmark>,
    notifications: Vec<Notification>,
    view_logs: Vec<ViewLog>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let id = self.ids.entry(table).or_insert(0);
        *id += 1;
        *id
    }
}

/// Implements every repository trait over plain vectors.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

fn paginate<T: Clone>(items: Vec<T>, page: &PageRequest) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let window = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    (window, total)
}

fn not_found(what: &str) -> DatabaseError {
    DatabaseError::NotFound(what.to_string())
}

fn published_newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(b.id.cmp(&a.id)));
    posts
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            posts: self.clone(),
            categories: self.clone(),
            tags: self.clone(),
            comments: self.clone(),
            likes: self.clone(),
            bookmarks: self.clone(),
            notifications: self.clone(),
        }
    }

    /// State for router tests: development config, no database.
    pub fn app_state(self: &Arc<Self>) -> AppState {
        AppState::new(&AppConfig::development(), self.repositories(), None)
    }

    pub fn post_service(self: &Arc<Self>) -> PostService {
        PostService::new(
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            ViewCountCache::new(),
        )
    }

    pub fn comment_service(self: &Arc<Self>) -> CommentService {
        CommentService::new(
            self.clone(),
            self.clone(),
            self.clone(),
            NotificationService::new(self.clone()),
        )
    }

    pub fn interaction_service(self: &Arc<Self>) -> InteractionService {
        InteractionService::new(
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            NotificationService::new(self.clone()),
        )
    }

    pub fn admin_service(self: &Arc<Self>) -> AdminService {
        AdminService::new(self.clone(), self.clone(), self.clone(), self.comment_service())
    }

    pub async fn post(&self, id: i64) -> Post {
        let tables = self.tables();
        tables.posts.iter().find(|p| p.id == id).cloned().unwrap()
    }

    pub async fn category(&self, id: i64) -> Category {
        let tables = self.tables();
        tables.categories.iter().find(|c| c.id == id).cloned().unwrap()
    }

    pub async fn tag(&self, id: i64) -> Tag {
        let tables = self.tables();
        tables.tags.iter().find(|t| t.id == id).cloned().unwrap()
    }

    pub async fn view_logs(&self) -> Vec<ViewLog> {
        self.tables().view_logs.clone()
    }
}

/// Insert a user whose password is `TEST_PASSWORD`.
pub async fn seed_user(store: &Arc<MemoryStore>, email: &str, nickname: &str, is_admin: bool) -> User {
    UserRepository::create(
        store.as_ref(),
        NewUser {
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            nickname: nickname.to_string(),
            is_admin,
        },
    )
    .await
    .unwrap()
}

/// Insert a post that went live a minute ago.
pub async fn seed_published_post(store: &Arc<MemoryStore>, author_id: i64, title: &str) -> Post {
    PostRepository::create(
        store.as_ref(),
        PostDraft {
            title: title.to_string(),
            slug: crate::utils::slug::slugify(title),
            content: format!("{} body", title),
            excerpt: None,
            featured_image: None,
            status: PostStatus::Published,
            published_at: Some(Utc::now() - Duration::minutes(1)),
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
            author_id,
            category_id: None,
            tag_ids: vec![],
        },
    )
    .await
    .unwrap()
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables();
        let live = |u: &&User| u.deleted_at.is_none();
        if tables.users.iter().filter(live).any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict("Email already exists".into()));
        }
        if tables.users.iter().filter(live).any(|u| u.nickname == user.nickname) {
            return Err(DatabaseError::Conflict("Nickname already exists".into()));
        }

        let now = Utc::now();
        let user = User {
            id: tables.next_id("users"),
            email: user.email,
            password: user.password_hash,
            nickname: user.nickname,
            avatar_url: None,
            bio: None,
            is_admin: user.is_admin,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        let tables = self.tables();
        Ok(tables.users.iter().find(|u| u.id == id && u.deleted_at.is_none()).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<User>> {
        let tables = self.tables();
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id) && u.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let tables = self.tables();
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        Ok(UserRepository::find_by_email(self, email).await?.is_some())
    }

    async fn exists_by_nickname(&self, nickname: &str) -> RepoResult<bool> {
        let tables = self.tables();
        Ok(tables
            .users
            .iter()
            .any(|u| u.nickname == nickname && u.deleted_at.is_none()))
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> RepoResult<User> {
        let mut tables = self.tables();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .ok_or_else(|| not_found("user"))?;

        if let Some(nickname) = changes.nickname {
            user.nickname = nickname;
        }
        if let Some(avatar_url) = changes.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        if let Some(bio) = changes.bio {
            user.bio = Some(bio);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> RepoResult<()> {
        let mut tables = self.tables();
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn list(&self, page: &PageRequest) -> RepoResult<(Vec<User>, i64)> {
        let tables = self.tables();
        let mut users: Vec<User> = tables.users.iter().filter(|u| u.deleted_at.is_none()).cloned().collect();
        users.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(paginate(users, page))
    }

    async fn count(&self) -> RepoResult<i64> {
        let tables = self.tables();
        Ok(tables.users.iter().filter(|u| u.deleted_at.is_none()).count() as i64)
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut tables = self.tables();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .ok_or_else(|| not_found("user"))?;
        user.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, draft: PostDraft) -> RepoResult<Post> {
        let mut tables = self.tables();
        if tables.posts.iter().any(|p| p.slug == draft.slug) {
            return Err(DatabaseError::Conflict("Slug already exists".into()));
        }

        let now = Utc::now();
        let post = Post {
            id: tables.next_id("posts"),
            title: draft.title,
            slug: draft.slug,
            content: draft.content,
            excerpt: draft.excerpt,
            featured_image: draft.featured_image,
            status: draft.status.as_str().to_string(),
            published_at: draft.published_at,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            bookmark_count: 0,
            meta_title: draft.meta_title,
            meta_description: draft.meta_description,
            meta_keywords: draft.meta_keywords,
            author_id: draft.author_id,
            category_id: draft.category_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        for tag_id in draft.tag_ids {
            tables.post_tags.push((post.id, tag_id));
        }
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, id: i64, draft: PostDraft) -> RepoResult<Post> {
        let mut tables = self.tables();
        if tables.posts.iter().any(|p| p.slug == draft.slug && p.id != id) {
            return Err(DatabaseError::Conflict("Slug already exists".into()));
        }

        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id && p.deleted_at.is_none())
            .ok_or_else(|| not_found("post"))?;
        post.title = draft.title;
        post.slug = draft.slug;
        post.content = draft.content;
        post.excerpt = draft.excerpt;
        post.featured_image = draft.featured_image;
        post.status = draft.status.as_str().to_string();
        post.published_at = draft.published_at;
        post.meta_title = draft.meta_title;
        post.meta_description = draft.meta_description;
        post.meta_keywords = draft.meta_keywords;
        post.category_id = draft.category_id;
        post.updated_at = Utc::now();
        let post = post.clone();

        tables.post_tags.retain(|(post_id, _)| *post_id != id);
        for tag_id in draft.tag_ids {
            tables.post_tags.push((id, tag_id));
        }
        Ok(post)
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut tables = self.tables();
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id && p.deleted_at.is_none())
            .ok_or_else(|| not_found("post"))?;
        post.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Post>> {
        let tables = self.tables();
        Ok(tables.posts.iter().find(|p| p.id == id && p.deleted_at.is_none()).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Post>> {
        let tables = self.tables();
        Ok(tables
            .posts
            .iter()
            .filter(|p| ids.contains(&p.id) && p.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        let tables = self.tables();
        Ok(tables
            .posts
            .iter()
            .find(|p| p.slug == slug && p.deleted_at.is_none())
            .cloned())
    }

    async fn list_published(&self, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)> {
        let tables = self.tables();
        let posts = tables.posts.iter().filter(|p| p.is_visible(now)).cloned().collect();
        Ok(paginate(published_newest_first(posts), page))
    }

    async fn search_published(&self, query: &str, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)> {
        let needle = query.to_lowercase();
        let matches = |p: &Post| {
            p.title.to_lowercase().contains(&needle)
                || p.content.to_lowercase().contains(&needle)
                || p.excerpt.as_deref().unwrap_or_default().to_lowercase().contains(&needle)
        };

        let tables = self.tables();
        let posts = tables
            .posts
            .iter()
            .filter(|p| p.is_visible(now) && matches(p))
            .cloned()
            .collect();
        Ok(paginate(published_newest_first(posts), page))
    }

    async fn list_published_by_category(&self, category_id: i64, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)> {
        let tables = self.tables();
        let posts = tables
            .posts
            .iter()
            .filter(|p| p.is_visible(now) && p.category_id == Some(category_id))
            .cloned()
            .collect();
        Ok(paginate(published_newest_first(posts), page))
    }

    async fn list_published_by_tag(&self, tag_id: i64, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)> {
        let tables = self.tables();
        let tagged: Vec<i64> = tables
            .post_tags
            .iter()
            .filter(|(_, t)| *t == tag_id)
            .map(|(p, _)| *p)
            .collect();
        let posts = tables
            .posts
            .iter()
            .filter(|p| p.is_visible(now) && tagged.contains(&p.id))
            .cloned()
            .collect();
        Ok(paginate(published_newest_first(posts), page))
    }

    async fn tag_ids(&self, post_id: i64) -> RepoResult<Vec<i64>> {
        let tables = self.tables();
        Ok(tables
            .post_tags
            .iter()
            .filter(|(p, _)| *p == post_id)
            .map(|(_, t)| *t)
            .collect())
    }

    async fn adjust_counter(&self, id: i64, counter: PostCounter, delta: i32) -> RepoResult<i32> {
        let mut tables = self.tables();
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("post"))?;
        let value = match counter {
            PostCounter::Views => &mut post.view_count,
            PostCounter::Likes => &mut post.like_count,
            PostCounter::Comments => &mut post.comment_count,
            PostCounter::Bookmarks => &mut post.bookmark_count,
        };
        *value = (*value + delta).max(0);
        Ok(*value)
    }

    async fn log_view(&self, post_id: i64, ip_address: &str, user_agent: Option<&str>) -> RepoResult<()> {
        let mut tables = self.tables();
        let log = ViewLog {
            id: tables.next_id("view_logs"),
            post_id,
            ip_address: ip_address.to_string(),
            user_agent: user_agent.map(str::to_string),
            created_at: Utc::now(),
        };
        tables.view_logs.push(log);
        Ok(())
    }

    async fn count(&self) -> RepoResult<i64> {
        let tables = self.tables();
        Ok(tables.posts.iter().filter(|p| p.deleted_at.is_none()).count() as i64)
    }

    async fn count_published(&self, now: DateTime<Utc>) -> RepoResult<i64> {
        let tables = self.tables();
        Ok(tables.posts.iter().filter(|p| p.is_visible(now)).count() as i64)
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, name: &str, slug: &str, description: Option<&str>) -> RepoResult<Category> {
        let mut tables = self.tables();
        if tables.categories.iter().any(|c| c.name == name || c.slug == slug) {
            return Err(DatabaseError::Conflict("Category already exists".into()));
        }
        let now = Utc::now();
        let category = Category {
            id: tables.next_id("categories"),
            name: name.to_string(),
            slug: slug.to_string(),
            description: description.map(str::to_string),
            post_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, id: i64, name: &str, slug: &str, description: Option<&str>) -> RepoResult<Category> {
        let mut tables = self.tables();
        let category = tables
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("category"))?;
        category.name = name.to_string();
        category.slug = slug.to_string();
        category.description = description.map(str::to_string);
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut tables = self.tables();
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Err(not_found("category"));
        }
        for post in tables.posts.iter_mut().filter(|p| p.category_id == Some(id)) {
            post.category_id = None;
        }
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Category>> {
        Ok(self.tables().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        Ok(self.tables().categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn exists_by_name(&self, name: &str) -> RepoResult<bool> {
        Ok(self.tables().categories.iter().any(|c| c.name == name))
    }

    async fn exists_by_slug(&self, slug: &str) -> RepoResult<bool> {
        Ok(self.tables().categories.iter().any(|c| c.slug == slug))
    }

    async fn list(&self) -> RepoResult<Vec<Category>> {
        let mut categories = self.tables().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn adjust_post_count(&self, id: i64, delta: i32) -> RepoResult<()> {
        let mut tables = self.tables();
        if let Some(category) = tables.categories.iter_mut().find(|c| c.id == id) {
            category.post_count = (category.post_count + delta).max(0);
        }
        Ok(())
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn create(&self, name: &str, slug: &str) -> RepoResult<Tag> {
        let mut tables = self.tables();
        if tables.tags.iter().any(|t| t.name == name || t.slug == slug) {
            return Err(DatabaseError::Conflict("Tag already exists".into()));
        }
        let now = Utc::now();
        let tag = Tag {
            id: tables.next_id("tags"),
            name: name.to_string(),
            slug: slug.to_string(),
            post_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.tags.push(tag.clone());
        Ok(tag)
    }

    async fn update(&self, id: i64, name: &str, slug: &str) -> RepoResult<Tag> {
        let mut tables = self.tables();
        let tag = tables
            .tags
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("tag"))?;
        tag.name = name.to_string();
        tag.slug = slug.to_string();
        tag.updated_at = Utc::now();
        Ok(tag.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut tables = self.tables();
        let before = tables.tags.len();
        tables.tags.retain(|t| t.id != id);
        if tables.tags.len() == before {
            return Err(not_found("tag"));
        }
        tables.post_tags.retain(|(_, tag_id)| *tag_id != id);
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Tag>> {
        Ok(self.tables().tags.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Tag>> {
        let mut tags: Vec<Tag> = self.tables().tags.iter().filter(|t| ids.contains(&t.id)).cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Tag>> {
        Ok(self.tables().tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn exists_by_name(&self, name: &str) -> RepoResult<bool> {
        Ok(self.tables().tags.iter().any(|t| t.name == name))
    }

    async fn exists_by_slug(&self, slug: &str) -> RepoResult<bool> {
        Ok(self.tables().tags.iter().any(|t| t.slug == slug))
    }

    async fn list(&self) -> RepoResult<Vec<Tag>> {
        let mut tags = self.tables().tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn adjust_post_count(&self, id: i64, delta: i32) -> RepoResult<()> {
        let mut tables = self.tables();
        if let Some(tag) = tables.tags.iter_mut().find(|t| t.id == id) {
            tag.post_count = (tag.post_count + delta).max(0);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: NewComment) -> RepoResult<Comment> {
        let mut tables = self.tables();
        let now = Utc::now();
        let comment = Comment {
            id: tables.next_id("comments"),
            content: comment.content,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            user_id: comment.user_id,
            author_name: comment.author_name,
            author_email: comment.author_email,
            author_password: comment.author_password,
            like_count: 0,
            is_edited: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Comment>> {
        let tables = self.tables();
        Ok(tables
            .comments
            .iter()
            .find(|c| c.id == id && c.deleted_at.is_none())
            .cloned())
    }

    async fn list_for_post(&self, post_id: i64) -> RepoResult<Vec<Comment>> {
        let tables = self.tables();
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn list_replies(&self, parent_id: i64) -> RepoResult<Vec<Comment>> {
        let tables = self.tables();
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.parent_id == Some(parent_id) && c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn update_content(&self, id: i64, content: &str) -> RepoResult<Comment> {
        let mut tables = self.tables();
        let comment = tables
            .comments
            .iter_mut()
            .find(|c| c.id == id && c.deleted_at.is_none())
            .ok_or_else(|| not_found("comment"))?;
        comment.content = content.to_string();
        comment.is_edited = true;
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<u64> {
        let mut tables = self.tables();
        let now = Utc::now();
        let mut removed = 0;
        for comment in tables
            .comments
            .iter_mut()
            .filter(|c| (c.id == id || c.parent_id == Some(id)) && c.deleted_at.is_none())
        {
            comment.deleted_at = Some(now);
            removed += 1;
        }
        Ok(removed)
    }

    async fn adjust_like_count(&self, id: i64, delta: i32) -> RepoResult<()> {
        let mut tables = self.tables();
        if let Some(comment) = tables.comments.iter_mut().find(|c| c.id == id) {
            comment.like_count = (comment.like_count + delta).max(0);
        }
        Ok(())
    }

    async fn list(&self, page: &PageRequest) -> RepoResult<(Vec<Comment>, i64)> {
        let tables = self.tables();
        let mut comments: Vec<Comment> = tables.comments.iter().filter(|c| c.deleted_at.is_none()).cloned().collect();
        comments.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(paginate(comments, page))
    }

    async fn count(&self) -> RepoResult<i64> {
        let tables = self.tables();
        Ok(tables.comments.iter().filter(|c| c.deleted_at.is_none()).count() as i64)
    }
}

fn like_matches(like: &Like, user_id: i64, target: LikeTarget) -> bool {
    like.user_id == user_id
        && match target {
            LikeTarget::Post(id) => like.post_id == Some(id),
            LikeTarget::Comment(id) => like.comment_id == Some(id),
        }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn create(&self, user_id: i64, target: LikeTarget) -> RepoResult<Like> {
        let mut tables = self.tables();
        if tables.likes.iter().any(|l| like_matches(l, user_id, target)) {
            return Err(DatabaseError::Conflict("Already liked".into()));
        }
        let (post_id, comment_id) = match target {
            LikeTarget::Post(id) => (Some(id), None),
            LikeTarget::Comment(id) => (None, Some(id)),
        };
        let like = Like {
            id: tables.next_id("likes"),
            user_id,
            post_id,
            comment_id,
            created_at: Utc::now(),
        };
        tables.likes.push(like.clone());
        Ok(like)
    }

    async fn delete(&self, user_id: i64, target: LikeTarget) -> RepoResult<bool> {
        let mut tables = self.tables();
        let before = tables.likes.len();
        tables.likes.retain(|l| !like_matches(l, user_id, target));
        Ok(tables.likes.len() != before)
    }

    async fn liked_post_ids(&self, user_id: i64, post_ids: &[i64]) -> RepoResult<Vec<i64>> {
        let tables = self.tables();
        Ok(tables
            .likes
            .iter()
            .filter(|l| l.user_id == user_id)
            .filter_map(|l| l.post_id)
            .filter(|id| post_ids.contains(id))
            .collect())
    }
}

#[async_trait]
impl BookmarkRepository for MemoryStore {
    async fn create(&self, user_id: i64, post_id: i64) -> RepoResult<Bookmark> {
        let mut tables = self.tables();
        if tables.bookmarks.iter().any(|b| b.user_id == user_id && b.post_id == post_id) {
            return Err(DatabaseError::Conflict("Already bookmarked".into()));
        }
        let bookmark = Bookmark {
            id: tables.next_id("bookmarks"),
            user_id,
            post_id,
            created_at: Utc::now(),
        };
        tables.bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    async fn delete(&self, user_id: i64, post_id: i64) -> RepoResult<bool> {
        let mut tables = self.tables();
        let before = tables.bookmarks.len();
        tables.bookmarks.retain(|b| !(b.user_id == user_id && b.post_id == post_id));
        Ok(tables.bookmarks.len() != before)
    }

    async fn bookmarked_post_ids(&self, user_id: i64, post_ids: &[i64]) -> RepoResult<Vec<i64>> {
        let tables = self.tables();
        Ok(tables
            .bookmarks
            .iter()
            .filter(|b| b.user_id == user_id && post_ids.contains(&b.post_id))
            .map(|b| b.post_id)
            .collect())
    }

    async fn list_post_ids(&self, user_id: i64, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<i64>, i64)> {
        let tables = self.tables();
        let visible = |post_id: i64| tables.posts.iter().any(|p| p.id == post_id && p.is_visible(now));
        let mut ids: Vec<(i64, i64)> = tables
            .bookmarks
            .iter()
            .filter(|b| b.user_id == user_id && visible(b.post_id))
            .map(|b| (b.id, b.post_id))
            .collect();
        ids.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(paginate(ids.into_iter().map(|(_, post_id)| post_id).collect(), page))
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn create(&self, notification: NewNotification) -> RepoResult<Notification> {
        let mut tables = self.tables();
        let notification = Notification {
            id: tables.next_id("notifications"),
            user_id: notification.user_id,
            kind: notification.kind.as_str().to_string(),
            title: notification.title,
            message: notification.message,
            post_id: notification.post_id,
            comment_id: notification.comment_id,
            actor_id: notification.actor_id,
            is_read: false,
            read_at: None,
            link: notification.link,
            created_at: Utc::now(),
        };
        tables.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: i64, page: &PageRequest) -> RepoResult<(Vec<Notification>, i64)> {
        let tables = self.tables();
        let mut mine: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(paginate(mine, page))
    }

    async fn count_unread(&self, user_id: i64) -> RepoResult<i64> {
        let tables = self.tables();
        Ok(tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> RepoResult<bool> {
        let mut tables = self.tables();
        match tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.is_read = true;
                notification.read_at.get_or_insert_with(Utc::now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: i64) -> RepoResult<u64> {
        let mut tables = self.tables();
        let now = Utc::now();
        let mut updated = 0;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            notification.is_read = true;
            notification.read_at = Some(now);
            updated += 1;
        }
        Ok(updated)
    }
}
