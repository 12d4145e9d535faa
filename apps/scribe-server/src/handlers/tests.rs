use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::Value;
use tempfile::TempDir;

use scribe_core::domain::{Group, Post, User};
use scribe_core::ports::PostFilter;
use scribe_infra::{InMemoryCache, InMemoryStore};

use super::posts::CACHE_STATUS_HEADER;
use super::{configure_routes, not_found};
use crate::config::AppConfig;
use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

const SMALL_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00\x21\xf9\x04\x01\x00\x00\x00\x00\x2c\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02\x44\x01\x00\x3b";
const BOUNDARY: &str = "scribe-test-boundary";

struct TestContext {
    state: AppState,
    cache: Arc<InMemoryCache>,
    media: TempDir,
}

fn context() -> TestContext {
    let media = TempDir::new().expect("temp media root");
    let config = AppConfig::for_tests(media.path().to_path_buf());
    let cache = Arc::new(InMemoryCache::new());
    let state = AppState::from_parts(&config, InMemoryStore::new().repositories(), cache.clone());
    TestContext {
        state,
        cache,
        media,
    }
}

macro_rules! test_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($ctx.state.clone()))
                .configure(configure_routes)
                .default_service(web::to(not_found)),
        )
        .await
    };
}

impl TestContext {
    async fn user(&self, username: &str) -> User {
        self.state
            .users()
            .insert(User::new(username.to_string(), "unused".to_string()))
            .await
            .expect("insert user")
    }

    fn session(&self, user: &User) -> Cookie<'static> {
        let roles = self.state.session.roles_for(&user.username);
        let token = self
            .state
            .tokens
            .generate_token(user.id, &user.username, roles)
            .expect("issue token");
        Cookie::new(self.state.session.cookie_name.clone(), token)
    }

    async fn group(&self, slug: &str) -> Group {
        self.state
            .blog
            .repositories()
            .groups
            .insert(Group::new(
                format!("Group {slug}"),
                slug.to_string(),
                "A place to talk".to_string(),
                None,
            ))
            .await
            .expect("insert group")
    }

    /// Writes straight to the store, bypassing cache invalidation.
    async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.state
            .blog
            .repositories()
            .posts
            .insert(Post::new(
                author.id,
                text.to_string(),
                group.map(|g| g.id),
                None,
            ))
            .await
            .expect("insert post")
    }

    async fn stored_post(&self, id: uuid::Uuid) -> Post {
        self.state
            .blog
            .repositories()
            .posts
            .find_by_id(id)
            .await
            .expect("find post")
            .expect("post exists")
    }

    async fn post_count(&self) -> u64 {
        self.state
            .blog
            .repositories()
            .posts
            .count(&PostFilter::All)
            .await
            .expect("count posts")
    }
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn cache_status<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(CACHE_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn item_texts(body: &Value) -> Vec<String> {
    body["data"]["page"]["items"]
        .as_array()
        .expect("page items")
        .iter()
        .map(|item| item["text"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn multipart_body(text: &str, image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\n{text}\r\n"
        )
        .as_bytes(),
    );
    if let Some((filename, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: image/gif\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[actix_web::test]
async fn test_index_lists_newest_first_ten_per_page() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    for i in 0..15 {
        ctx.post(&leo, &format!("post {i}"), None).await;
    }
    let app = test_app!(ctx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let texts = item_texts(&body);
    assert_eq!(texts.len(), 10);
    assert_eq!(texts[0], "post 14");
    assert_eq!(body["data"]["page"]["num_pages"], 2);
    assert_eq!(body["data"]["page"]["has_next"], true);

    let req = test::TestRequest::get().uri("/?page=2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let texts = item_texts(&body);
    assert_eq!(texts.len(), 5);
    assert_eq!(texts[4], "post 0");

    let req = test::TestRequest::get().uri("/?page=99").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["page"]["number"], 2);

    let req = test::TestRequest::get().uri("/?page=abc").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["page"]["number"], 1);
}

#[actix_web::test]
async fn test_empty_index_renders_an_empty_page() {
    let ctx = context();
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(item_texts(&body).is_empty());
    assert_eq!(body["data"]["page"]["num_pages"], 1);
}

#[actix_web::test]
async fn test_index_is_served_from_cache_until_cleared() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let app = test_app!(ctx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(cache_status(&resp), "miss");

    ctx.post(&leo, "written behind the cache", None).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(cache_status(&resp), "hit");
    let body: Value = test::read_body_json(resp).await;
    assert!(item_texts(&body).is_empty());

    ctx.state.blog.page_cache().clear().await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(cache_status(&resp), "miss");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(item_texts(&body), vec!["written behind the cache"]);
}

#[actix_web::test]
async fn test_new_post_shows_up_on_index_immediately() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let app = test_app!(ctx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(cache_status(&resp), "miss");

    let req = test::TestRequest::post()
        .uri("/new/")
        .cookie(ctx.session(&leo))
        .set_form([("text", "fresh"), ("group", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert_eq!(ctx.post_count().await, 1);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(cache_status(&resp), "miss");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(item_texts(&body), vec!["fresh"]);
}

#[actix_web::test]
async fn test_new_post_requires_login() {
    let ctx = context();
    let app = test_app!(ctx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/new/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Fnew%2F");

    let req = test::TestRequest::post()
        .uri("/new/")
        .set_form([("text", "anonymous")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(ctx.post_count().await, 0);
}

#[actix_web::test]
async fn test_new_post_without_text_is_unprocessable() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let cats = ctx.group("cats").await;
    let app = test_app!(ctx);

    let group = cats.id.to_string();
    let req = test::TestRequest::post()
        .uri("/new/")
        .cookie(ctx.session(&leo))
        .set_form([("text", "   "), ("group", group.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let view = &body["data"];
    assert_eq!(view["header"], "Create a new post");
    assert!(view["errors"]["text"].is_array());
    let fields = &view["form"]["fields"];
    assert_eq!(fields[0]["name"], "text");
    assert_eq!(fields[0]["value"], "   ");
    assert_eq!(fields[1]["name"], "group");
    assert_eq!(fields[1]["value"], group.as_str());
    assert_eq!(fields[1]["choices"][0]["value"], group.as_str());
    assert_eq!(ctx.post_count().await, 0);
}

#[actix_web::test]
async fn test_invalid_edit_returns_the_filled_form() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let post = ctx.post(&leo, "original", None).await;
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri(&format!("/leo/{}/edit/", post.id))
        .cookie(ctx.session(&leo))
        .set_form([("text", ""), ("group", "not-a-group")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;

    let view = &body["data"];
    assert_eq!(view["header"], "Edit post");
    assert_eq!(view["post"]["text"], "original");
    assert_eq!(view["form"]["action"], format!("/leo/{}/edit/", post.id));
    assert!(view["errors"]["text"].is_array());
    assert!(view["errors"]["group"].is_array());
    assert_eq!(view["form"]["fields"][1]["value"], "not-a-group");
    assert_eq!(ctx.stored_post(post.id).await.text, "original");
}

#[actix_web::test]
async fn test_new_post_with_unknown_group_is_unprocessable() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let app = test_app!(ctx);

    let group = uuid::Uuid::new_v4().to_string();
    let req = test::TestRequest::post()
        .uri("/new/")
        .cookie(ctx.session(&leo))
        .set_form([("text", "hello"), ("group", group.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"]["errors"]["group"].is_array());
    assert_eq!(body["data"]["form"]["fields"][1]["value"], group.as_str());
}

#[actix_web::test]
async fn test_multipart_post_stores_the_image() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/new/")
        .cookie(ctx.session(&leo))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body("with a picture", Some(("small.gif", SMALL_GIF))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let image = body["data"]["page"]["items"][0]["image"]
        .as_str()
        .expect("image path")
        .to_string();
    assert!(image.starts_with("posts/"));
    assert!(image.ends_with(".gif"));
    let stored = std::fs::read(ctx.media.path().join(&image)).expect("stored image");
    assert_eq!(stored, SMALL_GIF);
}

#[actix_web::test]
async fn test_multipart_post_rejects_non_images() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/new/")
        .cookie(ctx.session(&leo))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body("hello", Some(("notes.gif", &b"plain text"[..]))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"]["errors"]["image"].is_array());
    assert_eq!(ctx.post_count().await, 0);
}

#[actix_web::test]
async fn test_multipart_post_rejects_corrupted_gif() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let app = test_app!(ctx);

    let mut corrupted = b"GIF89a".to_vec();
    corrupted.extend_from_slice(b"this is not really an image at all");
    let req = test::TestRequest::post()
        .uri("/new/")
        .cookie(ctx.session(&leo))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body("hello", Some(("broken.gif", corrupted.as_slice()))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"]["errors"]["image"].is_array());
    assert_eq!(ctx.post_count().await, 0);
    let stored = std::fs::read_dir(ctx.media.path().join("posts"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(stored, 0);
}

#[actix_web::test]
async fn test_post_detail_and_malformed_ids() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let anna = ctx.user("anna").await;
    let post = ctx.post(&leo, "war and peace", None).await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri(&format!("/leo/{}/", post.id))
        .cookie(ctx.session(&leo))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["post"]["text"], "war and peace");
    assert_eq!(body["data"]["author_posts_count"], 1);
    assert_eq!(body["data"]["can_edit"], true);

    // Right id under the wrong author.
    let req = test::TestRequest::get()
        .uri(&format!("/{}/{}/", anna.username, post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/leo/not-a-uuid/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_only_the_author_may_edit() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let anna = ctx.user("anna").await;
    let post = ctx.post(&leo, "original", None).await;
    let app = test_app!(ctx);
    let edit_url = format!("/leo/{}/edit/", post.id);

    let req = test::TestRequest::get()
        .uri(&edit_url)
        .cookie(ctx.session(&anna))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&edit_url)
        .cookie(ctx.session(&anna))
        .set_form([("text", "vandalised")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(ctx.stored_post(post.id).await.text, "original");

    let req = test::TestRequest::post()
        .uri(&edit_url)
        .cookie(ctx.session(&leo))
        .set_form([("text", "revised")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/leo/{}/", post.id));

    let stored = ctx.stored_post(post.id).await;
    assert_eq!(stored.text, "revised");
    assert_eq!(stored.created_at, post.created_at);
}

#[actix_web::test]
async fn test_comments() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let anna = ctx.user("anna").await;
    let post = ctx.post(&leo, "commentable", None).await;
    let app = test_app!(ctx);
    let comment_url = format!("/leo/{}/comment/", post.id);
    let comments = &ctx.state.blog.repositories().comments;

    let req = test::TestRequest::post()
        .uri(&comment_url)
        .cookie(ctx.session(&anna))
        .set_form([("text", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(comments.find_by_post(post.id).await.unwrap().is_empty());

    let req = test::TestRequest::post()
        .uri(&comment_url)
        .set_form([("text", "anonymous")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(location(&resp).starts_with("/auth/login/?next="));
    assert!(comments.find_by_post(post.id).await.unwrap().is_empty());

    let req = test::TestRequest::post()
        .uri(&comment_url)
        .cookie(ctx.session(&anna))
        .set_form([("text", "lovely")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/leo/{}/", post.id));

    let req = test::TestRequest::get()
        .uri(&format!("/leo/{}/", post.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["comments"][0]["text"], "lovely");
    assert_eq!(body["data"]["comments"][0]["author"]["username"], "anna");
}

#[actix_web::test]
async fn test_group_feed_only_lists_its_own_posts() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let cats = ctx.group("cats").await;
    let dogs = ctx.group("dogs").await;
    ctx.post(&leo, "meow", Some(&cats)).await;
    ctx.post(&leo, "woof", Some(&dogs)).await;
    ctx.post(&leo, "no group", None).await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/group/cats/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(item_texts(&body), vec!["meow"]);
    assert_eq!(body["data"]["posts_count"], 1);
    assert_eq!(body["data"]["group"]["slug"], "cats");

    let req = test::TestRequest::get().uri("/group/birds/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_follow_is_idempotent_and_feeds_the_follow_page() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let anna = ctx.user("anna").await;
    ctx.post(&leo, "by leo", None).await;
    ctx.post(&anna, "by anna", None).await;
    let app = test_app!(ctx);
    let follows = &ctx.state.blog.repositories().follows;

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/leo/follow/")
            .cookie(ctx.session(&anna))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/leo/");
    }
    assert_eq!(follows.followed_authors(anna.id).await.unwrap(), vec![leo.id]);

    let req = test::TestRequest::get()
        .uri("/follow/")
        .cookie(ctx.session(&anna))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(item_texts(&body), vec!["by leo"]);

    let req = test::TestRequest::get()
        .uri("/leo/")
        .cookie(ctx.session(&anna))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["following"], true);
    assert_eq!(body["data"]["posts_count"], 1);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/leo/unfollow/")
            .cookie(ctx.session(&anna))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }
    assert!(!follows.is_following(anna.id, leo.id).await.unwrap());
}

#[actix_web::test]
async fn test_self_follow_creates_no_edge() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/leo/follow/")
        .cookie(ctx.session(&leo))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let follows = &ctx.state.blog.repositories().follows;
    assert!(follows.followed_authors(leo.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_follow_page_requires_login() {
    let ctx = context();
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/follow/?page=2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Ffollow%2F%3Fpage%3D2");
}

#[actix_web::test]
async fn test_unknown_paths_are_not_found() {
    let ctx = context();
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/a/b/c/d/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["instance"], "/a/b/c/d/");
    assert!(body["request_id"].is_string());

    let req = test::TestRequest::get().uri("/nobody/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_group_admin_is_staff_only() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let editor = ctx.user("editor").await;
    let app = test_app!(ctx);
    let form = [
        ("title", "Cats"),
        ("slug", "cats"),
        ("description", "All about cats"),
    ];

    let req = test::TestRequest::post()
        .uri("/admin/groups/")
        .cookie(ctx.session(&leo))
        .set_form(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/admin/groups/")
        .cookie(ctx.session(&editor))
        .set_form(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["slug"], "cats");

    let req = test::TestRequest::post()
        .uri("/admin/groups/")
        .cookie(ctx.session(&editor))
        .set_form(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["slug"].is_array());
}

#[actix_web::test]
async fn test_deleting_a_group_keeps_its_posts() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let editor = ctx.user("editor").await;
    let cats = ctx.group("cats").await;
    let post = ctx.post(&leo, "meow", Some(&cats)).await;
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/admin/groups/cats/delete/")
        .cookie(ctx.session(&editor))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    assert_eq!(ctx.stored_post(post.id).await.group_id, None);
    let groups = &ctx.state.blog.repositories().groups;
    assert!(groups.find_by_slug("cats").await.unwrap().is_none());
}

#[actix_web::test]
async fn test_signup_then_login() {
    let ctx = context();
    let app = test_app!(ctx);
    let credentials = [("username", "leo"), ("password", "war-and-peace")];

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_form(credentials)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert!(
        resp.response()
            .cookies()
            .any(|c| c.name() == ctx.state.session.cookie_name)
    );

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_form(credentials)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "leo"), ("password", "wrong-password")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([
            ("username", "leo"),
            ("password", "war-and-peace"),
            ("next", "/follow/"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/follow/");
}

#[actix_web::test]
async fn test_signup_rejects_reserved_usernames() {
    let ctx = context();
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_form([("username", "follow"), ("password", "long-enough")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["username"].is_array());
}

#[actix_web::test]
async fn test_static_pages() {
    let ctx = context();
    let app = test_app!(ctx);

    for uri in ["/about/author/", "/about/tech/", "/health", "/auth/login/"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }
}

#[actix_web::test]
async fn test_out_of_range_pages_share_one_cache_entry() {
    let ctx = context();
    let app = test_app!(ctx);

    for page in 1000..1005 {
        let req = test::TestRequest::get()
            .uri(&format!("/?page={page}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let expected = if page == 1000 { "miss" } else { "hit" };
        assert_eq!(cache_status(&resp), expected);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["page"]["number"], 1);
    }

    assert_eq!(ctx.cache.entry_count().await, 1);
}

#[actix_web::test]
async fn test_editing_a_post_image_removes_the_old_file() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let app = test_app!(ctx);
    let content_type = format!("multipart/form-data; boundary={BOUNDARY}");

    let req = test::TestRequest::post()
        .uri("/new/")
        .cookie(ctx.session(&leo))
        .insert_header((header::CONTENT_TYPE, content_type.clone()))
        .set_payload(multipart_body("first picture", Some(("one.gif", SMALL_GIF))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let posts = &ctx.state.blog.repositories().posts;
    let post = posts
        .find_page(&PostFilter::All, ctx.state.blog.page_request(None))
        .await
        .expect("list posts")
        .items
        .remove(0);
    let old_image = post.image.clone().expect("stored image");
    assert!(ctx.media.path().join(&old_image).exists());

    let req = test::TestRequest::post()
        .uri(&format!("/leo/{}/edit/", post.id))
        .cookie(ctx.session(&leo))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(multipart_body("second picture", Some(("two.gif", SMALL_GIF))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let new_image = ctx.stored_post(post.id).await.image.expect("new image");
    assert_ne!(new_image, old_image);
    assert!(ctx.media.path().join(&new_image).exists());
    assert!(!ctx.media.path().join(&old_image).exists());
}

#[actix_web::test]
async fn test_moving_a_post_refreshes_both_group_feeds() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let a = ctx.group("a").await;
    let b = ctx.group("b").await;
    let post = ctx.post(&leo, "wandering", Some(&a)).await;
    let app = test_app!(ctx);

    for uri in ["/group/a/", "/group/b/"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(cache_status(&resp), "miss");
    }

    let target = b.id.to_string();
    let req = test::TestRequest::post()
        .uri(&format!("/leo/{}/edit/", post.id))
        .cookie(ctx.session(&leo))
        .set_form([("text", "wandering"), ("group", target.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/group/a/").to_request()).await;
    assert_eq!(cache_status(&resp), "miss");
    let body: Value = test::read_body_json(resp).await;
    assert!(item_texts(&body).is_empty());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/group/b/").to_request()).await;
    assert_eq!(cache_status(&resp), "miss");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(item_texts(&body), vec!["wandering"]);
}

#[actix_web::test]
async fn test_renaming_a_group_drops_pages_under_the_old_slug() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let editor = ctx.user("editor").await;
    let cats = ctx.group("cats").await;
    ctx.post(&leo, "meow", Some(&cats)).await;
    let app = test_app!(ctx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/group/cats/").to_request()).await;
    assert_eq!(cache_status(&resp), "miss");

    let req = test::TestRequest::post()
        .uri("/admin/groups/cats/")
        .cookie(ctx.session(&editor))
        .set_form([
            ("title", "Felines"),
            ("slug", "felines"),
            ("description", "All about cats"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/group/cats/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // A new group taking over the slug starts from an empty feed.
    ctx.group("cats").await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/group/cats/").to_request()).await;
    assert_eq!(cache_status(&resp), "miss");
    let body: Value = test::read_body_json(resp).await;
    assert!(item_texts(&body).is_empty());

    let req = test::TestRequest::get().uri("/group/felines/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(item_texts(&body), vec!["meow"]);
    assert_eq!(body["data"]["group"]["title"], "Felines");
}
