//! Comments, profiles and follows.

use actix_web::{HttpResponse, web};

use scribe_core::forms::CommentForm;
use scribe_shared::ApiResponse;
use scribe_shared::dto::{FollowFeedView, ProfileView};

use super::posts::{PageQuery, PostPath, redirect};
use super::views::{page_view, post_url, user_summary};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn profile_url(username: &str) -> String {
    format!("/{username}/")
}

/// POST /{username}/{post_id}/comment/
pub async fn add_comment(
    state: web::Data<AppState>,
    path: web::Path<PostPath>,
    identity: Identity,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let comment = state
        .blog
        .add_comment(&path.username, &path.post_id, identity.user_id, &form)
        .await?;

    Ok(redirect(&post_url(&path.username, comment.post_id)))
}

/// GET /{username}/
pub async fn profile(
    state: web::Data<AppState>,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let request = state.blog.page_request(query.page.as_deref());
    let profile = state
        .blog
        .profile(&username, viewer.user_id(), request)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ProfileView {
        author: user_summary(&profile.author),
        posts_count: profile.posts_count,
        following: profile.following,
        page: page_view(&profile.page),
    })))
}

/// GET /{username}/follow/
pub async fn profile_follow(
    state: web::Data<AppState>,
    username: web::Path<String>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    state.blog.follow(identity.user_id, &username).await?;
    Ok(redirect(&profile_url(&username)))
}

/// GET /{username}/unfollow/
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    username: web::Path<String>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    state.blog.unfollow(identity.user_id, &username).await?;
    Ok(redirect(&profile_url(&username)))
}

/// GET /follow/
pub async fn follow_index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let request = state.blog.page_request(query.page.as_deref());
    let page = state.blog.follow_feed(identity.user_id, request).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(FollowFeedView {
        page: page_view(&page),
    })))
}
