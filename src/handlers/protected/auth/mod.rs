pub mod profile; // GET|PUT /api/v1/auth/me
pub mod session; // POST /api/v1/auth/logout

pub use profile::{me_get, me_put};
pub use session::logout_post;
