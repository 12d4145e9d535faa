use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::truncate_chars;

/// Post entity - a user-authored text entry, optionally tagged with a group
/// and an image. `created_at` is set once and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    /// Media path relative to the media root.
    pub image: Option<String>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, text: String, group_id: Option<Uuid>, image: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            created_at: Utc::now(),
            author_id,
            group_id,
            image,
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(truncate_chars(&self.text, 15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_first_fifteen_chars() {
        let post = Post::new(Uuid::new_v4(), "Привет, это длинный текст".into(), None, None);
        assert_eq!(post.to_string(), "Привет, это дли");
    }
}
