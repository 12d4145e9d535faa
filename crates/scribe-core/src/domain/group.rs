use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::truncate_chars;

/// Group entity - a named topic posts can be tagged with. Identified by slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub rules: Option<String>,
}

impl Group {
    pub const TITLE_MAX_CHARS: usize = 200;

    pub fn new(title: String, slug: String, description: String, rules: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            description,
            rules,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(truncate_chars(&self.title, 50))
    }
}
