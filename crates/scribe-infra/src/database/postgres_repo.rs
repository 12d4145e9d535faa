//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, Condition, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use uuid::Uuid;

use scribe_core::domain::{Comment, Follow, Group, Page, PageRequest, Post, User};
use scribe_core::error::RepoError;
use scribe_core::ports::{
    CommentRepository, FollowRepository, GroupRepository, PostFilter, PostRepository,
    UserRepository,
};
use scribe_core::services::Repositories;

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Every repository, sharing one connection pool.
pub fn postgres_repositories(db: &DbConn) -> Repositories {
    Repositories {
        users: Arc::new(PostgresUserRepository::new(db.clone())),
        groups: Arc::new(PostgresGroupRepository::new(db.clone())),
        posts: Arc::new(PostgresPostRepository::new(db.clone())),
        comments: Arc::new(PostgresCommentRepository::new(db.clone())),
        follows: Arc::new(PostgresFollowRepository::new(db.clone())),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Group>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = GroupEntity::find()
            .filter(group::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

fn post_condition(filter: &PostFilter) -> Condition {
    match filter {
        PostFilter::All => Condition::all(),
        PostFilter::Group(id) => Condition::all().add(post::Column::GroupId.eq(*id)),
        PostFilter::Author(id) => Condition::all().add(post::Column::AuthorId.eq(*id)),
        PostFilter::Authors(ids) => {
            Condition::all().add(post::Column::AuthorId.is_in(ids.iter().copied()))
        }
    }
}

fn matches_nothing(filter: &PostFilter) -> bool {
    matches!(filter, PostFilter::Authors(ids) if ids.is_empty())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_page(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        if matches_nothing(filter) {
            return Ok(Page::new(Vec::new(), page.resolve(0), 0));
        }

        let paginator = PostEntity::find()
            .filter(post_condition(filter))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, page.per_page);

        let total = paginator.num_items().await.map_err(map_db_err)?;
        let request = page.resolve(total);
        let models = paginator
            .fetch_page(request.number - 1)
            .await
            .map_err(map_db_err)?;

        Ok(Page::new(
            models.into_iter().map(Into::into).collect(),
            request,
            total,
        ))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        if matches_nothing(filter) {
            return Ok(0);
        }
        PostEntity::find()
            .filter(post_condition(filter))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL follow repository. Relies on the unique
/// `(user_id, author_id)` index for idempotent inserts.
pub struct PostgresFollowRepository {
    db: DbConn,
}

impl PostgresFollowRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    fn edge(user_id: Uuid, author_id: Uuid) -> Condition {
        Condition::all()
            .add(follow::Column::UserId.eq(user_id))
            .add(follow::Column::AuthorId.eq(author_id))
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let model: follow::ActiveModel = Follow::new(user_id, author_id).into();
        let inserted = FollowEntity::insert(model)
            .on_conflict(
                OnConflict::columns([follow::Column::UserId, follow::Column::AuthorId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(inserted > 0)
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let result = FollowEntity::delete_many()
            .filter(Self::edge(user_id, author_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let count = FollowEntity::find()
            .filter(Self::edge(user_id, author_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }

    async fn followed_authors(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let edges = FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(edges.into_iter().map(|edge| edge.author_id).collect())
    }
}
