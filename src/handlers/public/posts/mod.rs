// handlers/public/posts/mod.rs - Reader-facing post routes

pub mod list; // GET /api/v1/posts, GET /api/v1/posts/search
pub mod show; // GET /api/v1/posts/:id, POST /api/v1/posts/:id/view

pub use list::{posts_get, posts_search};
pub use show::{post_get, post_view};
