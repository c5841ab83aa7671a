// handlers/protected/mod.rs - Protected handlers (JWT required)
//
// Every route here runs behind `jwt_auth_middleware`, so handlers can take
// `Extension<AuthUser>` unconditionally.

pub mod auth; // session and profile
pub mod interactions; // likes and bookmarks
pub mod notifications;
