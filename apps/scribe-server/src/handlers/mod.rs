//! HTTP handlers and route configuration.

mod about;
mod admin;
mod auth;
mod health;
mod posts;
mod social;
mod views;

#[cfg(test)]
mod tests;

use actix_web::{HttpRequest, HttpResponse, web};

use scribe_shared::ErrorResponse;

use crate::observability::RequestId;

/// Largest urlencoded form body accepted.
const FORM_LIMIT_BYTES: usize = 1024 * 1024;

/// Configure all application routes.
///
/// Fixed paths are registered before the `/{username}/...` patterns so a
/// username can never shadow them.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().limit(FORM_LIMIT_BYTES))
        .route("/", web::get().to(posts::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::resource("/new/")
                .route(web::get().to(posts::new_post_form))
                .route(web::post().to(posts::new_post)),
        )
        .route("/follow/", web::get().to(social::follow_index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .service(
            web::scope("/about")
                .route("/author/", web::get().to(about::author))
                .route("/tech/", web::get().to(about::tech)),
        )
        .service(
            web::scope("/auth")
                .route("/signup/", web::post().to(auth::signup))
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .route("/logout/", web::get().to(auth::logout)),
        )
        .service(
            web::scope("/admin/groups")
                .route("/", web::post().to(admin::create_group))
                .route("/{slug}/", web::post().to(admin::update_group))
                .route("/{slug}/delete/", web::post().to(admin::delete_group)),
        )
        .route("/{username}/", web::get().to(social::profile))
        .route("/{username}/follow/", web::get().to(social::profile_follow))
        .route("/{username}/unfollow/", web::get().to(social::profile_unfollow))
        .route("/{username}/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/{username}/{post_id}/edit/")
                .route(web::get().to(posts::edit_post_form))
                .route(web::post().to(posts::edit_post)),
        )
        .route(
            "/{username}/{post_id}/comment/",
            web::post().to(social::add_comment),
        );
}

/// Fallback for unmatched paths.
pub async fn not_found(req: HttpRequest, request_id: RequestId) -> HttpResponse {
    HttpResponse::NotFound().json(
        ErrorResponse::not_found("The requested page does not exist")
            .with_instance(req.path())
            .with_request_id(request_id.as_str()),
    )
}
