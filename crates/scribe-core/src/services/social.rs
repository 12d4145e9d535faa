use uuid::Uuid;

use super::BlogService;
use crate::domain::Comment;
use crate::error::DomainError;
use crate::forms::CommentForm;

impl BlogService {
    /// Attach a comment by `author_id` to the post at (username, post_id).
    pub async fn add_comment(
        &self,
        username: &str,
        post_id: &str,
        author_id: Uuid,
        form: &CommentForm,
    ) -> Result<Comment, DomainError> {
        let (_, post) = self.resolve_post(username, post_id).await?;
        let text = form.clean()?;

        let comment = self
            .repos
            .comments
            .insert(Comment::new(post.id, author_id, text))
            .await?;
        tracing::info!(comment_id = %comment.id, post_id = %post.id, author_id = %author_id, "Comment added");
        Ok(comment)
    }

    /// Follow `username`. Following yourself or someone already followed
    /// changes nothing; returns whether an edge was created.
    pub async fn follow(&self, viewer_id: Uuid, username: &str) -> Result<bool, DomainError> {
        let author = self.user_by_username(username).await?;
        if author.id == viewer_id {
            tracing::debug!(user_id = %viewer_id, "Ignoring self-follow");
            return Ok(false);
        }

        let created = self.repos.follows.follow(viewer_id, author.id).await?;
        tracing::info!(user_id = %viewer_id, author_id = %author.id, created, "Follow");
        Ok(created)
    }

    /// Stop following `username`; a missing edge is not an error.
    pub async fn unfollow(&self, viewer_id: Uuid, username: &str) -> Result<bool, DomainError> {
        let author = self.user_by_username(username).await?;
        let removed = self.repos.follows.unfollow(viewer_id, author.id).await?;
        tracing::info!(user_id = %viewer_id, author_id = %author.id, removed, "Unfollow");
        Ok(removed)
    }
}
