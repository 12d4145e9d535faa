//! Use cases - everything a request handler asks of the domain.

mod feed;
mod groups;
mod page_cache;
mod posts;
mod social;

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, Group, Page, PageRequest, Post, User};
use crate::error::DomainError;
use crate::ports::{
    CommentRepository, FollowRepository, GroupRepository, MediaStore, PostRepository,
    UserRepository,
};

pub use page_cache::{DEFAULT_PAGE_TTL, PageCache, PageScope};

/// The repositories a [`BlogService`] works against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

/// A post together with the records needed to show it in a listing.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub post: Post,
    pub author: User,
    pub group: Option<Group>,
}

#[derive(Debug, Clone)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: User,
}

#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: Group,
    pub posts_count: u64,
    pub page: Page<FeedEntry>,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub author: User,
    pub posts_count: u64,
    pub following: bool,
    pub page: Page<FeedEntry>,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub entry: FeedEntry,
    pub author_posts_count: u64,
    pub comments: Vec<CommentEntry>,
    pub following: bool,
}

/// Blog use cases: feeds, posts, comments, follows and group administration.
#[derive(Clone)]
pub struct BlogService {
    repos: Repositories,
    media: Arc<dyn MediaStore>,
    pages: PageCache,
    page_size: u64,
}

impl BlogService {
    pub fn new(
        repos: Repositories,
        media: Arc<dyn MediaStore>,
        pages: PageCache,
        page_size: u64,
    ) -> Self {
        Self {
            repos,
            media,
            pages,
            page_size: page_size.max(1),
        }
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    pub fn page_cache(&self) -> &PageCache {
        &self.pages
    }

    /// Page request for a raw `page` query value at the configured page size.
    pub fn page_request(&self, raw: Option<&str>) -> PageRequest {
        PageRequest::parse(raw, self.page_size)
    }

    pub async fn user_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", username))
    }

    pub async fn group_by_slug(&self, slug: &str) -> Result<Group, DomainError> {
        self.repos
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Group", slug))
    }

    async fn is_following(&self, viewer: Option<Uuid>, author: Uuid) -> Result<bool, DomainError> {
        match viewer {
            Some(viewer) => Ok(self.repos.follows.is_following(viewer, author).await?),
            None => Ok(false),
        }
    }

    /// Attach authors and groups to a page of posts.
    async fn hydrate(&self, posts: Page<Post>) -> Result<Page<FeedEntry>, DomainError> {
        let Page {
            items,
            number,
            per_page,
            total_items,
        } = posts;

        let mut author_ids: Vec<Uuid> = items.iter().map(|p| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let mut group_ids: Vec<Uuid> = items.iter().filter_map(|p| p.group_id).collect();
        group_ids.sort_unstable();
        group_ids.dedup();

        let authors: HashMap<Uuid, User> = self
            .repos
            .users
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let groups: HashMap<Uuid, Group> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            self.repos
                .groups
                .find_by_ids(&group_ids)
                .await?
                .into_iter()
                .map(|g| (g.id, g))
                .collect()
        };

        let entries = items
            .into_iter()
            .filter_map(|post| {
                let Some(author) = authors.get(&post.author_id).cloned() else {
                    tracing::warn!(post_id = %post.id, "Post author missing, skipping");
                    return None;
                };
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                Some(FeedEntry {
                    post,
                    author,
                    group,
                })
            })
            .collect();

        Ok(Page {
            items: entries,
            number,
            per_page,
            total_items,
        })
    }
}
