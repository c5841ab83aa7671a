// handlers/public/auth/mod.rs - Token acquisition

pub mod login; // POST /api/v1/auth/login
pub mod refresh; // POST /api/v1/auth/refresh
pub mod register; // POST /api/v1/auth/register

pub use login::login_post;
pub use refresh::refresh_post;
pub use register::register_post;
