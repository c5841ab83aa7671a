use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::auth::JwtManager;
use crate::config::{AppConfig, Environment};
use crate::database::postgres::{
    PgBookmarkRepository, PgCategoryRepository, PgCommentRepository, PgLikeRepository, PgNotificationRepository,
    PgPostRepository, PgTagRepository, PgUserRepository,
};
use crate::database::repository::{
    BookmarkRepository, CategoryRepository, CommentRepository, LikeRepository, NotificationRepository, PostRepository,
    TagRepository, UserRepository,
};
use crate::services::{
    AdminService, CategoryService, CommentService, InteractionService, NotificationService, PostService, TagService,
    UserService,
};
use crate::utils::cache::ViewCountCache;
use crate::utils::rate_limiter::RateLimiter;

/// Every persistence handle the services are built from
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub bookmarks: Arc<dyn BookmarkRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            tags: Arc::new(PgTagRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            likes: Arc::new(PgLikeRepository::new(pool.clone())),
            bookmarks: Arc::new(PgBookmarkRepository::new(pool.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pool.clone())),
        }
    }
}

/// Shared handler state. Cloned per request; everything inside is `Arc`-backed.
#[derive(Clone)]
pub struct AppState {
    pub environment: Environment,
    pub jwt: JwtManager,
    pub users: UserService,
    pub posts: PostService,
    pub comments: CommentService,
    pub interactions: InteractionService,
    pub notifications: NotificationService,
    pub categories: CategoryService,
    pub tags: TagService,
    pub admin: AdminService,
    /// `None` when rate limiting is disabled
    pub api_limiter: Option<RateLimiter>,
    pub comment_limiter: Option<RateLimiter>,
    /// `None` when running without a database (tests)
    pub pool: Option<PgPool>,
}

impl AppState {
    /// Must be called inside a tokio runtime: caches and limiters spawn sweepers.
    pub fn new(config: &AppConfig, repos: Repositories, pool: Option<PgPool>) -> Self {
        let jwt = JwtManager::new(&config.jwt);
        let notifications = NotificationService::new(repos.notifications.clone());

        let comments = CommentService::new(
            repos.comments.clone(),
            repos.posts.clone(),
            repos.users.clone(),
            notifications.clone(),
        );

        let posts = PostService::new(
            repos.posts.clone(),
            repos.users.clone(),
            repos.categories.clone(),
            repos.tags.clone(),
            repos.likes.clone(),
            repos.bookmarks.clone(),
            ViewCountCache::new(),
        );

        let interactions = InteractionService::new(
            repos.likes.clone(),
            repos.bookmarks.clone(),
            repos.posts.clone(),
            repos.comments.clone(),
            repos.users.clone(),
            notifications.clone(),
        );

        let admin = AdminService::new(
            repos.users.clone(),
            repos.posts.clone(),
            repos.comments.clone(),
            comments.clone(),
        );

        let limits = &config.rate_limit;
        let (api_limiter, comment_limiter) = if limits.enabled {
            (
                Some(RateLimiter::new(limits.api_requests, Duration::from_secs(limits.api_window_secs))),
                Some(RateLimiter::new(
                    limits.comment_requests,
                    Duration::from_secs(limits.comment_window_secs),
                )),
            )
        } else {
            (None, None)
        };

        Self {
            environment: config.environment,
            users: UserService::new(repos.users.clone(), jwt.clone()),
            jwt,
            posts,
            comments,
            interactions,
            notifications,
            categories: CategoryService::new(repos.categories),
            tags: TagService::new(repos.tags),
            admin,
            api_limiter,
            comment_limiter,
            pool,
        }
    }
}
