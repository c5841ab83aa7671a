pub mod bookmarks; // POST|DELETE /api/v1/posts/:id/bookmark, GET /api/v1/bookmarks
pub mod likes; // POST|DELETE /api/v1/posts/:id/like, /api/v1/comments/:id/like

pub use bookmarks::{bookmark_delete, bookmark_post, bookmarks_get};
pub use likes::{comment_like_delete, comment_like_post, post_like_delete, post_like_post};
