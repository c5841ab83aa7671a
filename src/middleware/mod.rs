pub mod admin;
pub mod auth;
pub mod extract;
pub mod rate_limit;
pub mod response;
pub mod security;

pub use admin::require_admin;
pub use auth::{jwt_auth_middleware, optional_auth_middleware, AuthUser};
pub use extract::{JsonBody, PathParam, QueryParams};
pub use rate_limit::{api_rate_limit, comment_rate_limit, request_ip};
pub use response::{ApiResponse, ApiResult};
pub use security::{request_id, security_headers};
