pub mod cache;
pub mod client_ip;
pub mod pagination;
pub mod rate_limiter;
pub mod slug;
pub mod validator;

pub use cache::{TtlCache, ViewCountCache};
pub use client_ip::client_ip;
pub use pagination::{PageQuery, PageRequest, Pagination};
pub use rate_limiter::RateLimiter;
pub use slug::slugify;
