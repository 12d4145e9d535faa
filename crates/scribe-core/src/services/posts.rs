use uuid::Uuid;

use super::{BlogService, CommentEntry, FeedEntry, PageScope, PostDetail};
use crate::domain::{Group, Post, User};
use crate::error::{DomainError, ValidationErrors};
use crate::forms::{CleanPost, INVALID_CHOICE, PostForm};
use crate::ports::{ImageUpload, PostFilter};

/// Uploaded post images live under this media directory.
const POST_IMAGE_DIR: &str = "posts";

impl BlogService {
    /// Groups a post can be filed under.
    pub async fn groups(&self) -> Result<Vec<Group>, DomainError> {
        Ok(self.repos.groups.list().await?)
    }

    /// Resolve a post by its author's username and its id. A post that exists
    /// under a different author is reported as missing.
    pub async fn resolve_post(
        &self,
        username: &str,
        post_id: &str,
    ) -> Result<(User, Post), DomainError> {
        let not_found = || DomainError::not_found("Post", format!("{username}/{post_id}"));

        let id = Uuid::parse_str(post_id).map_err(|_| not_found())?;
        let author = self.user_by_username(username).await?;
        let post = self
            .repos
            .posts
            .find_by_id(id)
            .await?
            .filter(|post| post.is_authored_by(author.id))
            .ok_or_else(not_found)?;

        Ok((author, post))
    }

    pub async fn post_detail(
        &self,
        username: &str,
        post_id: &str,
        viewer: Option<Uuid>,
    ) -> Result<PostDetail, DomainError> {
        let (author, post) = self.resolve_post(username, post_id).await?;

        let group = match post.group_id {
            Some(id) => self.repos.groups.find_by_id(id).await?,
            None => None,
        };
        let author_posts_count = self
            .repos
            .posts
            .count(&PostFilter::Author(author.id))
            .await?;
        let following = self.is_following(viewer, author.id).await?;
        let comments = self.comment_entries(post.id).await?;

        Ok(PostDetail {
            entry: FeedEntry {
                post,
                author,
                group,
            },
            author_posts_count,
            comments,
            following,
        })
    }

    async fn comment_entries(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, DomainError> {
        let comments = self.repos.comments.find_by_post(post_id).await?;

        let mut author_ids: Vec<Uuid> = comments.iter().map(|c| c.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors = self.repos.users.find_by_ids(&author_ids).await?;

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                let author = authors.iter().find(|u| u.id == comment.author_id)?.clone();
                Some(CommentEntry { comment, author })
            })
            .collect())
    }

    /// Validate a submission and resolve its group.
    async fn clean_post(
        &self,
        form: &PostForm,
        upload: Option<ImageUpload>,
    ) -> Result<(CleanPost, Option<Group>), DomainError> {
        let clean = form.clean(upload)?;
        let group = match clean.group_id {
            Some(id) => Some(
                self.repos
                    .groups
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| ValidationErrors::field("group", INVALID_CHOICE))?,
            ),
            None => None,
        };
        Ok((clean, group))
    }

    /// Publish a new post owned by `author_id`.
    pub async fn create_post(
        &self,
        author_id: Uuid,
        form: &PostForm,
        upload: Option<ImageUpload>,
    ) -> Result<Post, DomainError> {
        let (clean, group) = self.clean_post(form, upload).await?;

        let image = match &clean.image {
            Some((format, bytes)) => Some(self.media.store(POST_IMAGE_DIR, *format, bytes).await?),
            None => None,
        };

        let post = Post::new(author_id, clean.text, clean.group_id, image.clone());
        let post = match self.repos.posts.insert(post).await {
            Ok(post) => post,
            Err(e) => {
                if let Some(path) = image {
                    self.discard_image(&path).await;
                }
                return Err(e.into());
            }
        };

        tracing::info!(post_id = %post.id, author_id = %author_id, post = %post, "Post created");
        self.invalidate_post_pages(&[group.as_ref()]).await;
        Ok(post)
    }

    /// The post as its author may edit it. Anyone else gets `PermissionDenied`.
    pub async fn post_for_edit(
        &self,
        username: &str,
        post_id: &str,
        editor_id: Uuid,
    ) -> Result<FeedEntry, DomainError> {
        let (author, post) = self.resolve_post(username, post_id).await?;
        if !post.is_authored_by(editor_id) {
            return Err(DomainError::PermissionDenied(
                "only the author may edit a post".to_string(),
            ));
        }
        let group = match post.group_id {
            Some(id) => self.repos.groups.find_by_id(id).await?,
            None => None,
        };
        Ok(FeedEntry {
            post,
            author,
            group,
        })
    }

    /// Replace text, group and (when uploaded) image of an existing post.
    /// The creation timestamp is preserved.
    pub async fn edit_post(
        &self,
        username: &str,
        post_id: &str,
        editor_id: Uuid,
        form: &PostForm,
        upload: Option<ImageUpload>,
    ) -> Result<Post, DomainError> {
        let FeedEntry {
            post,
            group: old_group,
            ..
        } = self.post_for_edit(username, post_id, editor_id).await?;
        let (clean, new_group) = self.clean_post(form, upload).await?;

        let uploaded = match &clean.image {
            Some((format, bytes)) => Some(self.media.store(POST_IMAGE_DIR, *format, bytes).await?),
            None => None,
        };
        let previous_image = post.image.clone();

        let result = self
            .repos
            .posts
            .update(Post {
                text: clean.text,
                group_id: clean.group_id,
                image: uploaded.clone().or_else(|| previous_image.clone()),
                ..post
            })
            .await;
        let updated = match result {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(path) = &uploaded {
                    self.discard_image(path).await;
                }
                return Err(e.into());
            }
        };

        // A replaced image is no longer referenced by anything.
        if uploaded.is_some() {
            if let Some(previous) = &previous_image {
                self.discard_image(previous).await;
            }
        }

        tracing::info!(post_id = %updated.id, editor_id = %editor_id, "Post edited");
        self.invalidate_post_pages(&[old_group.as_ref(), new_group.as_ref()])
            .await;
        Ok(updated)
    }

    /// Delete a stored image nothing points at any more. Failures only leak a file.
    async fn discard_image(&self, path: &str) {
        if let Err(e) = self.media.remove(path).await {
            tracing::warn!(path = %path, error = %e, "Failed to remove unused image");
        }
    }

    /// Drop the cached index pages and the pages of every affected group.
    async fn invalidate_post_pages(&self, groups: &[Option<&Group>]) {
        self.pages.invalidate(PageScope::Index).await;
        for group in groups.iter().flatten() {
            self.pages.invalidate(PageScope::Group(&group.slug)).await;
        }
    }
}
