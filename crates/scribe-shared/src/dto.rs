//! Page documents - what each route renders.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public face of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

/// A group as linked from a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLink {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: UserSummary,
    pub group: Option<GroupLink>,
    /// Media path of the attached image, relative to the media root.
    pub image: Option<String>,
    /// Detail page of the post.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: UserSummary,
}

/// One page of a listing with navigation data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total_items: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page: Option<u64>,
    pub previous_page: Option<u64>,
}

/// `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexView {
    pub page: PageView<PostView>,
}

/// `GET /group/<slug>/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupFeedView {
    pub group: GroupView,
    pub posts_count: u64,
    pub page: PageView<PostView>,
}

/// `GET /<username>/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub author: UserSummary,
    pub posts_count: u64,
    pub following: bool,
    pub page: PageView<PostView>,
}

/// `GET /follow/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowFeedView {
    pub page: PageView<PostView>,
}

/// Describes a form the client should render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormView {
    /// Where the form submits to.
    pub action: String,
    pub method: String,
    /// `multipart/form-data` or `application/x-www-form-urlencoded`.
    pub enctype: String,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    /// `textarea`, `select`, `file`, `text` or `password`.
    pub kind: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<FormChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormChoice {
    pub value: String,
    pub label: String,
}

/// `GET /new/` and `GET /<username>/<post_id>/edit/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormView {
    pub title: String,
    pub header: String,
    pub button: String,
    pub form: FormView,
    /// The post being edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostView>,
    /// Field name to messages, set when a submission was refused.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

/// `GET /<username>/<post_id>/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailView {
    pub post: PostView,
    pub author_posts_count: u64,
    pub comments: Vec<CommentView>,
    pub comment_form: FormView,
    pub following: bool,
    pub can_edit: bool,
}

/// `GET /auth/login/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginFormView {
    pub form: FormView,
    pub next: Option<String>,
}

/// `GET /about/author/` and `GET /about/tech/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutView {
    pub title: String,
    pub body: String,
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}
