//! Domain entities - the core business objects.

mod comment;
mod follow;
mod group;
mod page;
mod post;
mod user;

pub use comment::Comment;
pub use follow::Follow;
pub use group::Group;
pub use page::{DEFAULT_PAGE_SIZE, Page, PageRequest};
pub use post::Post;
pub use user::User;

/// Truncate to at most `max` characters, respecting char boundaries.
pub(crate) fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
