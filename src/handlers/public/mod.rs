// handlers/public/mod.rs - Public handlers
//
// No token required. Reader-facing routes run behind optional auth so a
// valid bearer still personalizes the response (is_liked / is_bookmarked)
// and lets comment authors act as themselves.

pub mod auth;
pub mod comments;
pub mod health;
pub mod posts;
pub mod taxonomy;
