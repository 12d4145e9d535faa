//! Group administration - staff only.

use actix_web::{HttpResponse, web};

use scribe_core::forms::GroupForm;
use scribe_shared::ApiResponse;

use super::posts::redirect;
use super::views::group_view;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn require_staff(identity: &Identity) -> AppResult<()> {
    if identity.is_staff() {
        Ok(())
    } else {
        tracing::warn!(user_id = %identity.user_id, "Non-staff user tried group administration");
        Err(AppError::Forbidden(
            "Group administration is limited to staff".to_string(),
        ))
    }
}

/// POST /admin/groups/
pub async fn create_group(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<GroupForm>,
) -> AppResult<HttpResponse> {
    require_staff(&identity)?;
    let group = state.blog.create_group(&form).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(group_view(&group))))
}

/// POST /admin/groups/{slug}/
pub async fn update_group(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    identity: Identity,
    form: web::Form<GroupForm>,
) -> AppResult<HttpResponse> {
    require_staff(&identity)?;
    let group = state.blog.update_group(&slug, &form).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(group_view(&group))))
}

/// POST /admin/groups/{slug}/delete/
pub async fn delete_group(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    require_staff(&identity)?;
    state.blog.delete_group(&slug).await?;

    Ok(redirect("/"))
}
