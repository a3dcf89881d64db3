//! HTTP handlers and route configuration.

mod auth;
mod cache;
mod comments;
mod editor;
mod follow;
mod health;
mod posts;

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::middleware::error::{AppError, not_found};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/home", web::get().to(posts::index))
        .route("/group/{slug}", web::get().to(posts::group))
        .route("/profile/{username}", web::get().to(posts::profile))
        .route("/profile/{username}/follow", web::get().to(follow::follow))
        .route("/profile/{username}/unfollow", web::get().to(follow::unfollow))
        .route("/follow", web::get().to(follow::follow_index))
        .route("/create", web::get().to(editor::create_form))
        .route("/create", web::post().to(editor::create))
        .route("/posts/{post_id}", web::get().to(posts::detail))
        .route("/posts/{post_id}/edit", web::get().to(editor::edit_form))
        .route("/posts/{post_id}/edit", web::post().to(editor::edit))
        .route("/posts/{post_id}/comment", web::post().to(comments::add_comment))
        .route("/cache/clear", web::post().to(cache::clear))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                .route("/signup", web::post().to(auth::signup))
                .route("/login", web::get().to(auth::login_page))
                .route("/login", web::post().to(auth::login))
                .route("/me", web::get().to(auth::me))
                .route("/password", web::post().to(auth::change_password)),
        )
        .default_service(web::to(not_found));
}

/// `302 Found` to `location`.
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{}", urlencoding::encode(username))
}

pub(crate) fn post_url(post_id: Uuid) -> String {
    format!("/posts/{}", post_id)
}

/// Post ids that do not parse cannot name a post.
pub(crate) fn parse_post_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("No post matches \"{}\"", raw)))
}
