use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Group, Page, PageRequest, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by username (exact match).
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Group>, RepoError>;

    /// All groups, ordered by title.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;
}

/// Which posts a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(Uuid),
    Author(Uuid),
    /// Posts by any of these authors. An empty list matches nothing.
    Authors(Vec<Uuid>),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::All => true,
            Self::Group(group_id) => post.group_id == Some(*group_id),
            Self::Author(author_id) => post.author_id == *author_id,
            Self::Authors(author_ids) => author_ids.contains(&post.author_id),
        }
    }
}

/// Post repository. Listings are newest first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// One page of the filtered listing; out-of-range pages clamp to the last page.
    async fn find_page(&self, filter: &PostFilter, page: PageRequest)
    -> Result<Page<Post>, RepoError>;

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Every comment of a post, newest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// Follow edges. The (user, author) pair is unique at the storage level.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Create the edge unless it exists; returns whether a row was inserted.
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;

    /// Remove the edge if present; returns whether a row was removed.
    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;

    /// Authors followed by `user_id`.
    async fn followed_authors(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError>;
}
