// handlers/elevated/mod.rs - Elevated handlers (JWT + admin flag)
//
// Routes under /api/v1/admin run behind `jwt_auth_middleware` followed by
// `require_admin`. Handlers still take `Extension<AuthUser>` where the acting
// admin matters (authoring posts, audit logging).

pub mod admin;
