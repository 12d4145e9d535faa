//! Feeds and post pages.

use actix_web::{HttpResponse, http::header, http::header::ContentType, web};
use serde::{Deserialize, Serialize};

use scribe_core::ValidationErrors;
use scribe_core::domain::Group;
use scribe_core::error::DomainError;
use scribe_core::forms::PostForm;
use scribe_core::services::{FeedEntry, PageCache, PageScope};
use scribe_shared::ApiResponse;
use scribe_shared::dto::{GroupFeedView, IndexView, PostDetailView, PostFormView};

use super::views::{
    comment_form, comment_view, group_view, page_view, post_form, post_url, post_view,
    refill_post_form,
};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::upload::PostSubmission;
use crate::state::AppState;

/// Header telling whether a feed came out of the page cache.
pub const CACHE_STATUS_HEADER: &str = "X-Page-Cache";

/// `?page=` on every paginated route.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostPath {
    pub username: String,
    pub post_id: String,
}

pub(super) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn json_body(body: String, cache_status: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::json())
        .insert_header((CACHE_STATUS_HEADER, cache_status))
        .body(body)
}

/// Render a feed document and store it under `key`.
async fn store_page<T: Serialize>(
    state: &AppState,
    key: &str,
    document: T,
) -> AppResult<HttpResponse> {
    let body = serde_json::to_string(&ApiResponse::ok(document))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    state.blog.page_cache().put(key, &body).await;
    Ok(json_body(body, "miss"))
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let request = state
        .blog
        .index_page(state.blog.page_request(query.page.as_deref()))
        .await?;
    let key = PageCache::key(PageScope::Index, request.number);
    if let Some(body) = state.blog.page_cache().get(&key).await {
        return Ok(json_body(body, "hit"));
    }

    let page = state.blog.feed(request).await?;
    let document = IndexView {
        page: page_view(&page),
    };
    store_page(&state, &key, document).await
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let request = state
        .blog
        .group_page(slug.as_str(), state.blog.page_request(query.page.as_deref()))
        .await?;
    let key = PageCache::key(PageScope::Group(slug.as_str()), request.number);
    if let Some(body) = state.blog.page_cache().get(&key).await {
        return Ok(json_body(body, "hit"));
    }

    let feed = state.blog.group_feed(slug.as_str(), request).await?;
    let document = GroupFeedView {
        group: group_view(&feed.group),
        posts_count: feed.posts_count,
        page: page_view(&feed.page),
    };
    store_page(&state, &key, document).await
}

fn new_post_view(groups: &[Group]) -> PostFormView {
    PostFormView {
        title: "New post".to_string(),
        header: "Create a new post".to_string(),
        button: "Publish".to_string(),
        form: post_form("/new/".to_string(), groups, None),
        post: None,
        errors: Default::default(),
    }
}

fn edit_post_view(entry: &FeedEntry, groups: &[Group]) -> PostFormView {
    let action = format!("{}edit/", post_url(&entry.author.username, entry.post.id));
    PostFormView {
        title: "Edit".to_string(),
        header: "Edit post".to_string(),
        button: "Save".to_string(),
        form: post_form(action, groups, Some(entry)),
        post: Some(post_view(entry)),
        errors: Default::default(),
    }
}

/// The post form again, holding what was submitted and why it was refused.
fn refused_post_form(
    mut view: PostFormView,
    submitted: &PostForm,
    errors: ValidationErrors,
) -> HttpResponse {
    refill_post_form(&mut view.form, submitted);
    view.errors = errors.into_inner();
    HttpResponse::UnprocessableEntity().json(ApiResponse::invalid(view))
}

/// GET /new/
pub async fn new_post_form(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let groups = state.blog.groups().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(new_post_view(&groups))))
}

/// POST /new/
pub async fn new_post(
    state: web::Data<AppState>,
    identity: Identity,
    submission: PostSubmission,
) -> AppResult<HttpResponse> {
    let PostSubmission { form, upload } = submission;
    match state
        .blog
        .create_post(identity.user_id, &form, upload)
        .await
    {
        Ok(_) => Ok(redirect("/")),
        Err(DomainError::Validation(errors)) => {
            let groups = state.blog.groups().await?;
            Ok(refused_post_form(new_post_view(&groups), &form, errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /{username}/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<PostPath>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let detail = state
        .blog
        .post_detail(&path.username, &path.post_id, viewer.user_id())
        .await?;

    let url = post_url(&detail.entry.author.username, detail.entry.post.id);
    let can_edit = viewer
        .user_id()
        .is_some_and(|id| detail.entry.post.is_authored_by(id));

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostDetailView {
        post: post_view(&detail.entry),
        author_posts_count: detail.author_posts_count,
        comments: detail.comments.iter().map(comment_view).collect(),
        comment_form: comment_form(format!("{url}comment/")),
        following: detail.following,
        can_edit,
    })))
}

/// GET /{username}/{post_id}/edit/
pub async fn edit_post_form(
    state: web::Data<AppState>,
    path: web::Path<PostPath>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let entry = state
        .blog
        .post_for_edit(&path.username, &path.post_id, identity.user_id)
        .await?;
    let groups = state.blog.groups().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(edit_post_view(&entry, &groups))))
}

/// POST /{username}/{post_id}/edit/
pub async fn edit_post(
    state: web::Data<AppState>,
    path: web::Path<PostPath>,
    identity: Identity,
    submission: PostSubmission,
) -> AppResult<HttpResponse> {
    let PostSubmission { form, upload } = submission;
    let result = state
        .blog
        .edit_post(
            &path.username,
            &path.post_id,
            identity.user_id,
            &form,
            upload,
        )
        .await;

    match result {
        Ok(post) => Ok(redirect(&post_url(&path.username, post.id))),
        Err(DomainError::Validation(errors)) => {
            let entry = state
                .blog
                .post_for_edit(&path.username, &path.post_id, identity.user_id)
                .await?;
            let groups = state.blog.groups().await?;
            Ok(refused_post_form(edit_post_view(&entry, &groups), &form, errors))
        }
        Err(e) => Err(e.into()),
    }
}
