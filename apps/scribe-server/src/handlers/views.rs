//! Domain records to page documents.

use scribe_core::domain::{Group, Page, User};
use scribe_core::forms::PostForm;
use scribe_core::services::{CommentEntry, FeedEntry};
use scribe_shared::dto::{
    CommentView, FormChoice, FormField, FormView, GroupLink, GroupView, PageView, PostView,
    UserSummary,
};

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

pub fn user_summary(user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        username: user.username.clone(),
    }
}

pub fn group_view(group: &Group) -> GroupView {
    GroupView {
        id: group.id,
        title: group.title.clone(),
        slug: group.slug.clone(),
        description: group.description.clone(),
        rules: group.rules.clone(),
    }
}

fn group_link(group: &Group) -> GroupLink {
    GroupLink {
        id: group.id,
        title: group.title.clone(),
        slug: group.slug.clone(),
    }
}

pub fn post_url(username: &str, post_id: impl std::fmt::Display) -> String {
    format!("/{username}/{post_id}/")
}

pub fn post_view(entry: &FeedEntry) -> PostView {
    PostView {
        id: entry.post.id,
        text: entry.post.text.clone(),
        created_at: entry.post.created_at,
        author: user_summary(&entry.author),
        group: entry.group.as_ref().map(group_link),
        image: entry.post.image.clone(),
        url: post_url(&entry.author.username, entry.post.id),
    }
}

pub fn comment_view(entry: &CommentEntry) -> CommentView {
    CommentView {
        id: entry.comment.id,
        text: entry.comment.text.clone(),
        created_at: entry.comment.created_at,
        author: user_summary(&entry.author),
    }
}

pub fn page_view(page: &Page<FeedEntry>) -> PageView<PostView> {
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    PageView {
        items: page.items.iter().map(post_view).collect(),
        number: page.number,
        num_pages: page.num_pages(),
        total_items: page.total_items,
        has_next,
        has_previous,
        next_page: has_next.then(|| page.number + 1),
        previous_page: has_previous.then(|| page.number - 1),
    }
}

fn field(name: &str, label: &str, kind: &str, required: bool) -> FormField {
    FormField {
        name: name.to_string(),
        label: label.to_string(),
        kind: kind.to_string(),
        required,
        value: None,
        choices: Vec::new(),
    }
}

/// The post form, prefilled from `entry` when editing.
pub fn post_form(action: String, groups: &[Group], entry: Option<&FeedEntry>) -> FormView {
    let mut text = field("text", "Text", "textarea", true);
    text.value = entry.map(|e| e.post.text.clone());

    let mut group = field("group", "Group", "select", false);
    group.value = entry.and_then(|e| e.post.group_id).map(|id| id.to_string());
    group.choices = groups
        .iter()
        .map(|g| FormChoice {
            value: g.id.to_string(),
            label: g.title.clone(),
        })
        .collect();

    let mut image = field("image", "Image", "file", false);
    image.value = entry.and_then(|e| e.post.image.clone());

    FormView {
        action,
        method: "post".to_string(),
        enctype: MULTIPART.to_string(),
        fields: vec![text, group, image],
    }
}

/// Put submitted text and group back into a post form.
pub fn refill_post_form(form: &mut FormView, submitted: &PostForm) {
    for field in &mut form.fields {
        match field.name.as_str() {
            "text" => field.value = Some(submitted.text.clone()),
            "group" => {
                field.value = submitted
                    .group
                    .as_deref()
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
            }
            _ => {}
        }
    }
}

pub fn comment_form(action: String) -> FormView {
    FormView {
        action,
        method: "post".to_string(),
        enctype: URLENCODED.to_string(),
        fields: vec![field("text", "Text", "textarea", true)],
    }
}

pub fn credentials_form(action: &str) -> FormView {
    FormView {
        action: action.to_string(),
        method: "post".to_string(),
        enctype: URLENCODED.to_string(),
        fields: vec![
            field("username", "Username", "text", true),
            field("password", "Password", "password", true),
        ],
    }
}
