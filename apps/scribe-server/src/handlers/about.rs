//! Static about pages.

use actix_web::HttpResponse;

use scribe_shared::ApiResponse;
use scribe_shared::dto::AboutView;

fn about(title: &str, body: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(AboutView {
        title: title.to_string(),
        body: body.to_string(),
    }))
}

/// GET /about/author/
pub async fn author() -> HttpResponse {
    about(
        "About the author",
        "Scribe is written and run by a small team who like to write things down.",
    )
}

/// GET /about/tech/
pub async fn tech() -> HttpResponse {
    about(
        "Technologies",
        "Rust, actix-web, SeaORM on PostgreSQL, Redis for the page cache and tracing for logs.",
    )
}
