use super::{BlogService, PageScope};
use crate::domain::Group;
use crate::error::{DomainError, RepoError, ValidationErrors};
use crate::forms::GroupForm;

const SLUG_TAKEN: &str = "Group with this slug already exists.";

impl BlogService {
    pub async fn create_group(&self, form: &GroupForm) -> Result<Group, DomainError> {
        let clean = form.clean()?;
        if self.repos.groups.find_by_slug(&clean.slug).await?.is_some() {
            return Err(ValidationErrors::field("slug", SLUG_TAKEN).into());
        }

        let group = Group::new(clean.title, clean.slug, clean.description, clean.rules);
        let group = self.repos.groups.insert(group).await.map_err(slug_conflict)?;
        tracing::info!(group_id = %group.id, slug = %group.slug, group = %group, "Group created");
        Ok(group)
    }

    /// Edit a group. Feed entries show the group title, so the index is
    /// invalidated along with the old and new group scopes.
    pub async fn update_group(&self, slug: &str, form: &GroupForm) -> Result<Group, DomainError> {
        let existing = self.group_by_slug(slug).await?;
        let clean = form.clean()?;
        if clean.slug != existing.slug
            && self.repos.groups.find_by_slug(&clean.slug).await?.is_some()
        {
            return Err(ValidationErrors::field("slug", SLUG_TAKEN).into());
        }

        let group = self
            .repos
            .groups
            .update(Group {
                title: clean.title,
                slug: clean.slug,
                description: clean.description,
                rules: clean.rules,
                ..existing
            })
            .await
            .map_err(slug_conflict)?;

        tracing::info!(group_id = %group.id, old_slug = %slug, slug = %group.slug, "Group updated");
        self.pages.invalidate(PageScope::Index).await;
        self.pages.invalidate(PageScope::Group(slug)).await;
        self.pages.invalidate(PageScope::Group(&group.slug)).await;
        Ok(group)
    }

    /// Delete a group. Its posts survive without a group.
    pub async fn delete_group(&self, slug: &str) -> Result<(), DomainError> {
        let group = self.group_by_slug(slug).await?;
        self.repos.groups.delete(group.id).await?;

        tracing::info!(group_id = %group.id, slug = %slug, "Group deleted");
        self.pages.invalidate(PageScope::Index).await;
        self.pages.invalidate(PageScope::Group(slug)).await;
        Ok(())
    }
}

fn slug_conflict(err: RepoError) -> DomainError {
    match err {
        RepoError::Constraint(_) => ValidationErrors::field("slug", SLUG_TAKEN).into(),
        other => other.into(),
    }
}
