use uuid::Uuid;

use super::{BlogService, FeedEntry, GroupFeed, Profile};
use crate::domain::{Page, PageRequest};
use crate::error::DomainError;
use crate::ports::PostFilter;

impl BlogService {
    /// The index page `page` lands on once clamped to the posts that exist.
    pub async fn index_page(&self, page: PageRequest) -> Result<PageRequest, DomainError> {
        let total = self.repos.posts.count(&PostFilter::All).await?;
        Ok(page.resolve(total))
    }

    /// Same as [`index_page`](Self::index_page) for one group's feed.
    pub async fn group_page(&self, slug: &str, page: PageRequest) -> Result<PageRequest, DomainError> {
        let group = self.group_by_slug(slug).await?;
        let total = self
            .repos
            .posts
            .count(&PostFilter::Group(group.id))
            .await?;
        Ok(page.resolve(total))
    }

    /// Every post, newest first.
    pub async fn feed(&self, page: PageRequest) -> Result<Page<FeedEntry>, DomainError> {
        let posts = self.repos.posts.find_page(&PostFilter::All, page).await?;
        self.hydrate(posts).await
    }

    /// Posts of one group, newest first.
    pub async fn group_feed(&self, slug: &str, page: PageRequest) -> Result<GroupFeed, DomainError> {
        let group = self.group_by_slug(slug).await?;
        let posts = self
            .repos
            .posts
            .find_page(&PostFilter::Group(group.id), page)
            .await?;
        let posts_count = posts.total_items;

        Ok(GroupFeed {
            group,
            posts_count,
            page: self.hydrate(posts).await?,
        })
    }

    /// An author's posts plus whether `viewer` follows them.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Profile, DomainError> {
        let author = self.user_by_username(username).await?;
        let posts = self
            .repos
            .posts
            .find_page(&PostFilter::Author(author.id), page)
            .await?;
        let posts_count = posts.total_items;
        let following = self.is_following(viewer, author.id).await?;

        Ok(Profile {
            author,
            posts_count,
            following,
            page: self.hydrate(posts).await?,
        })
    }

    /// Posts by everyone `viewer` follows. Never cached.
    pub async fn follow_feed(
        &self,
        viewer: Uuid,
        page: PageRequest,
    ) -> Result<Page<FeedEntry>, DomainError> {
        let authors = self.repos.follows.followed_authors(viewer).await?;
        let posts = self
            .repos
            .posts
            .find_page(&PostFilter::Authors(authors), page)
            .await?;
        self.hydrate(posts).await
    }
}
