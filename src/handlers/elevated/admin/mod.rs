pub mod dashboard; // GET /api/v1/admin/dashboard
pub mod moderation; // users and comments
pub mod posts; // POST /api/v1/admin/posts, PUT|DELETE /api/v1/admin/posts/:id
pub mod taxonomy; // categories and tags
