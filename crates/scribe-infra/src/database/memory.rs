//! In-memory record store - used when no database is configured and in tests.
//!
//! Mirrors the relational constraints of the PostgreSQL schema: unique
//! usernames, slugs and follow pairs, cascading deletes for users and posts,
//! and `SET NULL` on a post's group when the group goes away.
//! Note: Data is lost on process restart.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use scribe_core::domain::{Comment, Follow, Group, Page, PageRequest, Post, User};
use scribe_core::error::RepoError;
use scribe_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostFilter,
    PostRepository, UserRepository,
};
use scribe_core::services::Repositories;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
}

impl Tables {
    /// Posts matching `filter`, newest first. Equal timestamps keep the most
    /// recently inserted row first.
    fn posts_newest_first(&self, filter: &PostFilter) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .rev()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn check_post_refs(&self, post: &Post) -> Result<(), RepoError> {
        if !self.user_exists(post.author_id) {
            return Err(RepoError::Constraint("posts.author_id".to_string()));
        }
        if let Some(group_id) = post.group_id {
            if !self.groups.iter().any(|g| g.id == group_id) {
                return Err(RepoError::Constraint("posts.group_id".to_string()));
            }
        }
        Ok(())
    }
}

/// Shared tables behind the in-memory repositories.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository(self.clone())
    }

    pub fn groups(&self) -> InMemoryGroupRepository {
        InMemoryGroupRepository(self.clone())
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository(self.clone())
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        InMemoryCommentRepository(self.clone())
    }

    pub fn follows(&self) -> InMemoryFollowRepository {
        InMemoryFollowRepository(self.clone())
    }

    /// Every repository, wired to the same tables.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.users()),
            groups: Arc::new(self.groups()),
            posts: Arc::new(self.posts()),
            comments: Arc::new(self.comments()),
            follows: Arc::new(self.follows()),
        }
    }
}

pub struct InMemoryUserRepository(InMemoryStore);
pub struct InMemoryGroupRepository(InMemoryStore);
pub struct InMemoryPostRepository(InMemoryStore);
pub struct InMemoryCommentRepository(InMemoryStore);
pub struct InMemoryFollowRepository(InMemoryStore);

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.0.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("users.username".to_string()));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.0.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(RepoError::Constraint("users.username".to_string()));
        }
        let slot = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.0.tables.write().await;
        if !tables.user_exists(id) {
            return Err(RepoError::NotFound);
        }
        tables.users.retain(|u| u.id != id);

        let removed_posts: Vec<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        tables.posts.retain(|p| p.author_id != id);
        tables
            .comments
            .retain(|c| c.author_id != id && !removed_posts.contains(&c.post_id));
        tables
            .follows
            .retain(|f| f.user_id != id && f.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn insert(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.0.tables.write().await;
        if tables.groups.iter().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint("groups.slug".to_string()));
        }
        tables.groups.push(group.clone());
        Ok(group)
    }

    async fn update(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.0.tables.write().await;
        if tables
            .groups
            .iter()
            .any(|g| g.slug == group.slug && g.id != group.id)
        {
            return Err(RepoError::Constraint("groups.slug".to_string()));
        }
        let slot = tables
            .groups
            .iter_mut()
            .find(|g| g.id == group.id)
            .ok_or(RepoError::NotFound)?;
        *slot = group.clone();
        Ok(group)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.0.tables.write().await;
        let before = tables.groups.len();
        tables.groups.retain(|g| g.id != id);
        if tables.groups.len() == before {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.iter_mut().filter(|p| p.group_id == Some(id)) {
            post.group_id = None;
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Group>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables
            .groups
            .iter()
            .filter(|g| ids.contains(&g.id))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.0.tables.read().await;
        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.0.tables.write().await;
        tables.check_post_refs(&post)?;
        if tables.posts.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("posts.id".to_string()));
        }
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.0.tables.write().await;
        tables.check_post_refs(&post)?;
        let slot = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.0.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Err(RepoError::NotFound);
        }
        tables.comments.retain(|c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_page(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(Page::from_vec(tables.posts_newest_first(filter), page))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.posts.iter().filter(|p| filter.matches(p)).count() as u64)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.0.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(RepoError::Constraint("comments.post_id".to_string()));
        }
        if !tables.user_exists(comment.author_id) {
            return Err(RepoError::Constraint("comments.author_id".to_string()));
        }
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.0.tables.write().await;
        let slot = tables
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or(RepoError::NotFound)?;
        *slot = comment.clone();
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.0.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        if tables.comments.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.0.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }
}

#[async_trait]
impl FollowRepository for InMemoryFollowRepository {
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.0.tables.write().await;
        if !tables.user_exists(user_id) || !tables.user_exists(author_id) {
            return Err(RepoError::Constraint("follows.user_id".to_string()));
        }
        if tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(false);
        }
        tables.follows.push(Follow::new(user_id, author_id));
        Ok(true)
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.0.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() < before)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn followed_authors(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.author_id)
            .collect())
    }
}
