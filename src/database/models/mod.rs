pub mod category;
pub mod comment;
pub mod interaction;
pub mod notification;
pub mod post;
pub mod tag;
pub mod user;
pub mod view_log;

pub use category::Category;
pub use comment::Comment;
pub use interaction::{Bookmark, Like};
pub use notification::{Notification, NotificationType};
pub use post::{Post, PostStatus};
pub use tag::Tag;
pub use user::User;
pub use view_log::ViewLog;
